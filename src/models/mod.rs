//! Data models.

pub mod config;
pub mod event;
pub mod selection;
pub mod video;
