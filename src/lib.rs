pub mod common;
pub mod config;
pub mod hugo;
pub mod markup;
pub mod origin;
pub mod service;

pub use self::config::*;
