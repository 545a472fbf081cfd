//! Core business logic modules.

pub mod catalog;
pub mod dispatch;
pub mod executor;
pub mod lock;
pub mod naming;
pub mod verify;
