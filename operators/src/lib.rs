pub mod config;
pub mod error;
pub mod mock;
pub mod processing;
pub mod source;
pub mod util;
