//! External collaborators: device script, storage and chat services.

pub mod device;
pub mod nextcloud;
pub mod retry;
pub mod s3;
pub mod telegram;
