//! Copy verification.
//!
//! Checks that the device script really produced every listed video in the
//! destination folder before anything gets renamed.

use crate::error::MissingFile;
use crate::models::video::VideoBasicInfo;
use crate::Result;
use std::path::Path;

/// Fail unless `destination_root/original_name` exists for every video.
///
/// All missing files are reported together.
pub fn verify_presence(videos: &[VideoBasicInfo], destination_root: &Path) -> Result<()> {
    let missing: Vec<MissingFile> = videos
        .iter()
        .filter_map(|video| {
            let expected_path = destination_root.join(&video.original_name);
            if expected_path.is_file() {
                tracing::debug!("Copied: {}", expected_path.display());
                None
            } else {
                tracing::error!("Missing after copy: {}", expected_path.display());
                Some(MissingFile {
                    original_name: video.original_name.clone(),
                    expected_path,
                })
            }
        })
        .collect();

    if missing.is_empty() {
        tracing::info!("All {} video(s) present in {}", videos.len(), destination_root.display());
        Ok(())
    } else {
        Err(crate::Error::MissingFiles(missing))
    }
}
