use std::io;
use std::path::{Path, PathBuf};

/// Directory containing the running executable.
pub fn executable_dir() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory"))
}

/// Resolves `name` against `dir`. Absolute names are returned unchanged.
pub fn resolve_resource(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}
