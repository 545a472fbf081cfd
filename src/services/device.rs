//! Device script bridge.
//!
//! A PowerShell script on the Windows host talks to the phone: it lists the
//! videos recorded in a time window, copies them to the destination folder and
//! deletes them from the device. It answers on stdout with JSON, sometimes
//! encoded twice (a JSON string holding the JSON document).

use crate::models::selection::Selection;
use crate::models::video::{sort_by_creation, VideoBasicInfo};
use crate::Result;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// Command understood by the device script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptCommand {
    ListVideos,
    CopyFiles,
    DeleteFiles,
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptCommand::ListVideos => write!(f, "list_videos"),
            ScriptCommand::CopyFiles => write!(f, "copy_files"),
            ScriptCommand::DeleteFiles => write!(f, "delete_files"),
        }
    }
}

/// Decoded script answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptPayload {
    /// The script reported an error.
    Error(String),
    /// Videos matched by `list_videos`.
    Videos(Vec<VideoBasicInfo>),
    /// Nothing to report.
    Empty,
    /// Valid JSON of no known shape.
    Unexpected(Value),
}

/// Parse script output, unwrapping one level of string encoding.
pub fn decode_payload(stdout: &str) -> Result<ScriptPayload> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(ScriptPayload::Empty);
    }

    let mut value: Value = serde_json::from_str(trimmed)?;
    if let Value::String(inner) = &value {
        let inner = inner.trim();
        if inner.is_empty() {
            return Ok(ScriptPayload::Empty);
        }
        value = serde_json::from_str(inner)?;
    }

    match value {
        Value::Object(ref map) if map.contains_key("Error") => {
            let message = match &map["Error"] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Ok(ScriptPayload::Error(message))
        }
        Value::Array(_) => Ok(ScriptPayload::Videos(serde_json::from_value(value)?)),
        // ConvertTo-Json drops the array around a single element
        Value::Object(_) if value.get("original_name").is_some() => {
            Ok(ScriptPayload::Videos(vec![serde_json::from_value(value)?]))
        }
        other => Ok(ScriptPayload::Unexpected(other)),
    }
}

/// Operations the pipeline needs from the device.
pub trait DeviceScript {
    /// Videos recorded during the event window, oldest first.
    fn list_videos(&self, selection: &Selection) -> Result<Vec<VideoBasicInfo>>;

    /// Copy the event's videos to the destination folder.
    fn copy_files(&self, selection: &Selection) -> Result<()>;

    /// Delete the event's videos from the device.
    fn delete_files(&self, selection: &Selection) -> Result<()>;
}

/// Turn a `list_videos` answer into a sorted video list.
pub fn videos_from_payload(payload: ScriptPayload, selection: &Selection) -> Result<Vec<VideoBasicInfo>> {
    let event = selection.event();
    let no_videos = || crate::Error::NoVideosFound {
        day: selection.day().to_string(),
        start: event.event_start().to_string(),
        stop: event.event_stop().to_string(),
        timezone: event.event_timezone().to_string(),
    };

    match payload {
        ScriptPayload::Error(message) => Err(crate::Error::ExternalCommand(message)),
        ScriptPayload::Unexpected(value) => Err(crate::Error::ExternalCommand(format!(
            "{} returned an unexpected payload: {}",
            ScriptCommand::ListVideos,
            value
        ))),
        ScriptPayload::Empty => Err(no_videos()),
        ScriptPayload::Videos(videos) if videos.is_empty() => Err(no_videos()),
        ScriptPayload::Videos(mut videos) => {
            sort_by_creation(&mut videos);
            Ok(videos)
        }
    }
}

/// Error-or-success check for `copy_files` and `delete_files` answers.
pub fn ensure_success(payload: ScriptPayload) -> Result<()> {
    match payload {
        ScriptPayload::Error(message) => Err(crate::Error::ExternalCommand(message)),
        ScriptPayload::Unexpected(value) => {
            tracing::debug!("Device script answered: {}", value);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Runs the device script through PowerShell.
#[derive(Debug, Clone)]
pub struct PowershellScript {
    powershell: String,
    script_path: PathBuf,
    destination_folder: String,
}

impl PowershellScript {
    pub fn new(powershell: &str, script_path: PathBuf, destination_folder: &str) -> Self {
        Self {
            powershell: powershell.to_string(),
            script_path,
            destination_folder: destination_folder.to_string(),
        }
    }

    /// Arguments passed to PowerShell for a command.
    pub fn arguments(&self, selection: &Selection, command: ScriptCommand) -> Vec<String> {
        let event = selection.event();
        vec![
            "-ExecutionPolicy".to_string(),
            "Bypass".to_string(),
            "-File".to_string(),
            self.script_path.display().to_string(),
            "-day".to_string(),
            selection.day().to_string(),
            "-event_start".to_string(),
            event.event_start().to_string(),
            "-event_stop".to_string(),
            event.event_stop().to_string(),
            "-event_timezone".to_string(),
            event.event_timezone().to_string(),
            "-command".to_string(),
            command.to_string(),
            "-files_destination_path".to_string(),
            self.destination_folder.clone(),
        ]
    }

    fn run(&self, selection: &Selection, command: ScriptCommand) -> Result<ScriptPayload> {
        tracing::info!("Running device script: {}", command);

        let output = Command::new(&self.powershell)
            .args(self.arguments(selection, command))
            .output()
            .map_err(|e| {
                crate::Error::ExternalCommand(format!("failed to start {}: {}", self.powershell, e))
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::warn!("Device script stderr: {}", stderr.trim());
        }
        if !output.status.success() {
            return Err(crate::Error::ExternalCommand(format!(
                "{} exited with {}: {}",
                command,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        tracing::debug!("Device script stdout: {}", stdout.trim());
        decode_payload(&stdout).map_err(|e| {
            crate::Error::ExternalCommand(format!("{} returned unreadable output: {}", command, e))
        })
    }
}

impl DeviceScript for PowershellScript {
    fn list_videos(&self, selection: &Selection) -> Result<Vec<VideoBasicInfo>> {
        let payload = self.run(selection, ScriptCommand::ListVideos)?;
        videos_from_payload(payload, selection)
    }

    fn copy_files(&self, selection: &Selection) -> Result<()> {
        ensure_success(self.run(selection, ScriptCommand::CopyFiles)?)
    }

    fn delete_files(&self, selection: &Selection) -> Result<()> {
        ensure_success(self.run(selection, ScriptCommand::DeleteFiles)?)
    }
}
