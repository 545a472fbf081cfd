//! Video naming and layout.
//!
//! Titles follow the event template:
//! - `{title}{suffix}` when the event uses complex naming
//! - then ` DD_MM_YYYY` when the event ends titles with the date
//! - then ` (Part i of N)` when more than one video was recorded
//!
//! Parts are numbered in the order the videos are given, which must already
//! be ascending by creation time. No sorting happens here.

use crate::models::selection::Selection;
use crate::models::video::{VideoBasicInfo, VideoNamedTarget};
use crate::utils::path::{get_extension, windows_to_wsl_path};
use crate::Result;
use std::path::{Path, PathBuf};

/// Title shared by every video of the run, without part number or extension.
pub fn build_title(selection: &Selection) -> String {
    let event = selection.event();
    let mut title = event.video_title().to_string();

    if event.complex_naming() {
        if let Some(suffix) = selection.suffix() {
            title.push_str(suffix);
        }
    }
    if event.title_end_with_date() {
        title.push(' ');
        title.push_str(&selection.day().replace('/', "_"));
    }
    title
}

fn with_extension(stem: String, extension: &str) -> String {
    if extension.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, extension)
    }
}

/// Final file names, one per video, in input order.
pub fn target_names(title: &str, videos: &[VideoBasicInfo]) -> Vec<String> {
    let total = videos.len();
    videos
        .iter()
        .enumerate()
        .map(|(idx, video)| {
            let extension = get_extension(&video.original_name);
            let stem = if total == 1 {
                title.to_string()
            } else {
                format!("{} (Part {} of {})", title, idx + 1, total)
            };
            with_extension(stem, extension)
        })
        .collect()
}

/// Lay out targets under an already translated destination root.
pub fn layout_targets(
    selection: &Selection,
    videos: &[VideoBasicInfo],
    destination_root: &Path,
) -> Vec<VideoNamedTarget> {
    let title = build_title(selection);
    target_names(&title, videos)
        .into_iter()
        .zip(videos)
        .map(|(new_name, video)| VideoNamedTarget {
            path: under_root(destination_root, &new_name),
            video: video.clone(),
            new_name,
        })
        .collect()
}

/// `root + "/" + name`. Unlike `Path::join`, a leading `/` in the name
/// cannot replace the root.
fn under_root(root: &Path, name: &str) -> PathBuf {
    let mut path = root.as_os_str().to_owned();
    path.push("/");
    path.push(name);
    PathBuf::from(path)
}

/// Compute the final name and local path of every video.
///
/// `host_destination` is the Windows destination folder (`D:\...`).
pub fn compute_targets(
    selection: &Selection,
    videos: &[VideoBasicInfo],
    host_destination: &str,
) -> Result<Vec<VideoNamedTarget>> {
    let root = windows_to_wsl_path(host_destination)?;
    let targets = layout_targets(selection, videos, Path::new(&root));

    for target in &targets {
        tracing::debug!(
            "Target: {} -> {}",
            target.video.original_name,
            target.path.display()
        );
    }
    Ok(targets)
}
