//! Window, event pump and OS plumbing.

mod native;
mod paths;
mod window;

pub use native::NativeWindow;
pub use paths::{executable_dir, resolve_resource};
pub use window::{Platform, PlatformEvent};
