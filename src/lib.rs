pub mod config;
pub mod conversion;
pub mod error;
pub mod evidence;
pub mod issue_key;
pub mod output;
pub mod status;

pub use error::{Error, Result};
