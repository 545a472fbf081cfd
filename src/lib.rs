//! Timeframe Archivist Library
//!
//! Archives the videos of recurring events: copies them off a phone through a
//! PowerShell device script, names them after the event and day, then uploads
//! them to S3 and Nextcloud and announces the links on Telegram.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
