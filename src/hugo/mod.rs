mod config;
mod runner;
pub mod shim;
mod site;

pub use self::config::*;
pub use runner::*;
pub use site::*;
