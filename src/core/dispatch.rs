//! Upload and notification dispatch.
//!
//! Hands every renamed video to the destinations its event enables:
//! - S3, under the event's storage class
//! - Nextcloud, optionally with one public link per video
//! - Telegram, announcing those links

use crate::models::event::NextcloudSettings;
use crate::models::video::VideoNamedTarget;
use crate::services::nextcloud::{remote_file_path, NextcloudClient};
use crate::services::s3::S3Uploader;
use crate::services::telegram::{format_links_message, TelegramNotifier};
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};

/// What the dispatch produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// S3 object keys.
    pub s3_keys: Vec<String>,
    /// Nextcloud remote paths.
    pub nextcloud_paths: Vec<String>,
    /// Public share links.
    pub share_links: Vec<String>,
    /// Whether a Telegram message went out.
    pub notified: bool,
}

fn progress_bar(len: usize, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb.set_prefix(prefix.to_string());
    pb
}

/// Upload every target to S3. Stops at the first failure.
pub async fn upload_to_s3(
    uploader: &S3Uploader,
    targets: &[VideoNamedTarget],
    storage_class: &str,
) -> Result<Vec<String>> {
    tracing::info!("Uploading {} video(s) to S3 ({})", targets.len(), storage_class);
    let pb = progress_bar(targets.len(), "S3");
    let mut keys = Vec::with_capacity(targets.len());

    for target in targets {
        pb.set_message(target.new_name.clone());
        let key = uploader
            .upload_file(&target.path, &target.new_name, storage_class)
            .await
            .map_err(|e| {
                tracing::error!("S3 upload of {} failed: {}", target.new_name, e);
                e
            })?;
        keys.push(key);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(keys)
}

/// Upload every target to Nextcloud, creating share links if enabled.
///
/// Returns the remote paths and the links, in target order.
pub async fn upload_to_nextcloud(
    client: &NextcloudClient,
    targets: &[VideoNamedTarget],
    settings: &NextcloudSettings,
) -> Result<(Vec<String>, Vec<String>)> {
    tracing::info!(
        "Uploading {} video(s) to Nextcloud folder {}",
        targets.len(),
        settings.folder
    );
    client.ensure_folder(&settings.folder).await?;

    let pb = progress_bar(targets.len(), "Nextcloud");
    let mut paths = Vec::with_capacity(targets.len());
    let mut links = Vec::new();

    for target in targets {
        pb.set_message(target.new_name.clone());
        let remote_path = remote_file_path(&settings.folder, &target.new_name);
        client.upload_file(&target.path, &remote_path).await.map_err(|e| {
            tracing::error!("Nextcloud upload of {} failed: {}", target.new_name, e);
            e
        })?;
        if settings.public_share {
            links.push(client.create_public_share(&remote_path).await?);
        }
        paths.push(remote_path);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok((paths, links))
}

/// Message announcing an archived event.
pub fn notification_text(title: &str, links: &[String]) -> String {
    if links.is_empty() {
        title.to_string()
    } else {
        format!("{}\n{}", title, format_links_message(links))
    }
}

/// Announce the archive on Telegram.
pub async fn notify(notifier: &TelegramNotifier, title: &str, links: &[String]) -> Result<()> {
    notifier.send_message(&notification_text(title, links)).await?;
    Ok(())
}
