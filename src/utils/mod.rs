//! Utility helpers.

pub mod fs;
pub mod path;
