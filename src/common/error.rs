use std::path::PathBuf;

use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{prefix}: {message}"))]
    ConfigError { message: String, prefix: String },
    #[snafu(display("Failed to load configuration from {}: {source}", path.display()))]
    LoadError {
        path: PathBuf,
        source: config::ConfigError,
    },
    #[snafu(display("Invalid URL {url}: {source}"))]
    UrlError {
        url: String,
        source: url::ParseError,
    },
    #[snafu(display("Cloning {url} with branch {branch} failed: {message}"))]
    CloneError {
        url: String,
        branch: String,
        message: String,
    },
    #[snafu(display("Failed to run {command}: {source}"))]
    CommandError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("{message} {}: {source}", path.display()))]
    IoError {
        message: String,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to walk {}: {source}", path.display()))]
    WalkError {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[snafu(display("hugo {args} failed: {message}"))]
    HugoError { args: String, message: String },
    #[snafu(display("{message}: {source}"))]
    SerializeError {
        message: String,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
