use std::sync::Once;

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Installs the global `env_logger` once; later calls are ignored.
///
/// Filter precedence: `config.filter`, then `RUST_LOG`, then "error" so that
/// wgpu's chatter stays quiet unless asked for.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = match &config.filter {
            Some(filter) => {
                let mut b = env_logger::Builder::new();
                b.parse_filters(filter);
                b
            }
            None => env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("error"),
            ),
        };

        if builder.try_init().is_err() {
            // Someone else installed a logger first; theirs wins.
            return;
        }

        log::debug!("logging initialized");
    });
}
