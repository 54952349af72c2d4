use std::io;
use std::path::{Path, PathBuf};

pub mod schema;
pub mod settings;
pub mod storage;

pub use schema::SchemaManager;
pub use settings::{Auth, Database, Feed, Logger, Report, Server, Settings};
pub use storage::Storage;

/// Resolve a configured path against the working directory.
pub fn normalize_path(path: impl AsRef<Path>) -> io::Result<PathBuf> {
    let path = path.as_ref();
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
