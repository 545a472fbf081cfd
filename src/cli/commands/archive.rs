//! Archive command implementation.
//!
//! Runs one event archive from start to end: pick the event, copy its videos
//! off the device, rename them, then upload and announce them.

use crate::cli::prompt::Prompter;
use crate::core::catalog::load_events;
use crate::core::dispatch::{self, DispatchSummary};
use crate::core::executor::{print_report, RenameExecutor};
use crate::core::lock::RunLock;
use crate::core::naming::{build_title, layout_targets};
use crate::core::verify::verify_presence;
use crate::models::config::Config;
use crate::models::event::{Event, NextcloudSettings};
use crate::models::selection::Selection;
use crate::services::device::{DeviceScript, PowershellScript};
use crate::services::nextcloud::NextcloudClient;
use crate::services::s3::S3Uploader;
use crate::services::telegram::TelegramNotifier;
use crate::utils::fs::ensure_directory;
use crate::utils::path::{forbidden_characters, windows_to_wsl_path};
use crate::Result;
use chrono::Local;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Where the videos land, as seen from the host and locally.
#[derive(Debug, Clone)]
pub struct Destination {
    /// Windows path handed to the device script.
    pub host: String,
    /// Same folder on this machine.
    pub local: PathBuf,
}

impl Destination {
    /// Translate a Windows destination folder.
    pub fn from_host(host: &str) -> Result<Self> {
        Ok(Self {
            host: host.to_string(),
            local: PathBuf::from(windows_to_wsl_path(host)?),
        })
    }
}

/// Services an event needs, built before any file is touched.
#[derive(Default)]
pub struct Dispatchers {
    s3: Option<(S3Uploader, String)>,
    nextcloud: Option<(NextcloudClient, NextcloudSettings)>,
    telegram: Option<TelegramNotifier>,
}

impl Dispatchers {
    /// Build the clients the event enables; missing settings fail here.
    pub fn for_event(config: &Config, event: &Event) -> Result<Self> {
        let mut dispatchers = Self::default();

        if let Some(s3) = event.s3() {
            let uploader = S3Uploader::new(&config.s3, &config.network)?;
            dispatchers.s3 = Some((uploader, s3.storage_class.clone()));
        }
        if let Some(nextcloud) = event.nextcloud() {
            let client = NextcloudClient::new(&config.nextcloud, &config.network)?;
            if nextcloud.telegram_notification {
                dispatchers.telegram =
                    Some(TelegramNotifier::new(&config.telegram, &config.network)?);
            }
            dispatchers.nextcloud = Some((client, nextcloud.clone()));
        }
        Ok(dispatchers)
    }

    pub fn is_empty(&self) -> bool {
        self.s3.is_none() && self.nextcloud.is_none()
    }
}

/// Run the interactive archive.
pub async fn run_archive(config: &Config, events_path: &Path) -> Result<DispatchSummary> {
    println!("{}", "[ARCHIVE] Timeframe Archivist".bold().cyan());
    println!();

    let events = load_events(events_path)?;
    let destination = Destination::from_host(config.destination_folder()?)?;

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let selection = prompter.prompt_selection(&events, Local::now().date_naive())?;

    let script = PowershellScript::new(&config.powershell, config.script_path.clone(), &destination.host);
    let dispatchers = Dispatchers::for_event(config, selection.event())?;

    archive(&selection, &script, &mut prompter, &destination, &dispatchers).await
}

/// Archive the videos of one selection.
pub async fn archive<D, R, W>(
    selection: &Selection,
    device: &D,
    prompter: &mut Prompter<R, W>,
    destination: &Destination,
    dispatchers: &Dispatchers,
) -> Result<DispatchSummary>
where
    D: DeviceScript,
    R: BufRead,
    W: Write,
{
    let event = selection.event();
    let title = build_title(selection);
    tracing::info!("Archiving '{}' of {}", event.key(), selection.day());

    ensure_directory(&destination.local)?;
    let _lock = RunLock::acquire(&destination.local)?;

    // List
    let videos = device.list_videos(selection)?;
    tracing::info!("{} video(s) found on the device", videos.len());
    if event.validation_videos_found() {
        prompter.confirm_videos(&videos)?;
    } else {
        for video in &videos {
            println!("  {} {} ({} Mb)", "[INFO]".cyan(), video.original_name, video.size_mb);
        }
    }

    // Copy
    println!("[INFO] Copying {} video(s) to {}", videos.len(), destination.host);
    device.copy_files(selection)?;
    verify_presence(&videos, &destination.local)?;

    // Rename
    let targets = layout_targets(selection, &videos, &destination.local);
    for target in &targets {
        let forbidden = forbidden_characters(&target.new_name);
        if !forbidden.is_empty() {
            tracing::warn!(
                "'{}' contains characters Windows may reject: {:?}",
                target.new_name,
                forbidden
            );
        }
    }
    let report = RenameExecutor::new(&destination.local)
        .with_progress(true)
        .execute(&targets);
    print_report(&report);
    report.into_result()?;

    // Dispatch
    let mut summary = DispatchSummary::default();
    if let Some((uploader, storage_class)) = &dispatchers.s3 {
        summary.s3_keys = dispatch::upload_to_s3(uploader, &targets, storage_class).await?;
    }
    if let Some((client, settings)) = &dispatchers.nextcloud {
        let (paths, links) = dispatch::upload_to_nextcloud(client, &targets, settings).await?;
        summary.nextcloud_paths = paths;
        summary.share_links = links;
    }
    if let Some(notifier) = &dispatchers.telegram {
        dispatch::notify(notifier, &title, &summary.share_links).await?;
        summary.notified = true;
    }

    // Clean up the device
    if event.delete_source_files() {
        println!("[INFO] Deleting {} video(s) from the device", videos.len());
        device.delete_files(selection)?;
    }

    print_summary(&title, &summary, targets.len());
    Ok(summary)
}

fn print_summary(title: &str, summary: &DispatchSummary, video_count: usize) {
    println!();
    println!("{}", "[Archive Summary]".bold().green());
    println!("  {} {}", "Title:".bold(), title);
    println!("  {} {}", "Videos:".bold(), video_count);
    if !summary.s3_keys.is_empty() {
        println!("  {} {}", "S3 objects:".bold(), summary.s3_keys.len());
    }
    if !summary.nextcloud_paths.is_empty() {
        println!("  {} {}", "Nextcloud files:".bold(), summary.nextcloud_paths.len());
    }
    for link in &summary.share_links {
        println!("  {} {}", "[LINK]".cyan(), link);
    }
    if summary.notified {
        println!("  {} Telegram notification sent", "[OK]".green());
    }
}
