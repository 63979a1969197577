mod compose;
mod config;
mod fetcher;
mod models;

pub use compose::local_file_path;
pub use self::config::*;
pub use fetcher::*;
pub use models::*;
