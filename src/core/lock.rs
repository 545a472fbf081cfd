//! Single-instance run lock on a destination folder.
//!
//! The lock file holds the PID of the run that owns it. A lock left behind by
//! a process that no longer exists (killed at a prompt, for instance) is
//! taken over.

use crate::Result;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use sysinfo::{Pid, System};

/// Lock file name inside the destination folder.
pub const LOCK_FILE_NAME: &str = ".timeframe-archivist.lock";

/// Held for the duration of a run; the lock file is removed on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

/// PID recorded in a lock file, if readable.
fn holder_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn process_alive(pid: u32) -> bool {
    let mut system = System::new();
    system.refresh_process(Pid::from_u32(pid))
}

/// A lock whose owner is gone. Unreadable locks are never stale.
fn is_stale(path: &Path) -> bool {
    match holder_pid(path) {
        Some(pid) => !process_alive(pid),
        None => false,
    }
}

impl RunLock {
    /// Take the lock on `destination_root`.
    pub fn acquire(destination_root: &Path) -> Result<Self> {
        let path = destination_root.join(LOCK_FILE_NAME);
        match Self::create(&path) {
            Err(crate::Error::LockHeld(_)) if is_stale(&path) => {
                tracing::warn!(
                    "Taking over stale run lock {} (process {} is gone)",
                    path.display(),
                    holder_pid(&path).unwrap_or_default()
                );
                fs::remove_file(&path)?;
                Self::create(&path)
            }
            other => other,
        }
    }

    fn create(path: &Path) -> Result<Self> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(crate::Error::LockHeld(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        writeln!(file, "{}", std::process::id())?;
        tracing::debug!("Acquired run lock {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Could not remove run lock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Above any Linux `pid_max`.
    const DEAD_PID: u32 = 999_999_999;

    #[test]
    fn test_lock_is_exclusive() {
        let temp_dir = TempDir::new().unwrap();
        let lock = RunLock::acquire(temp_dir.path()).unwrap();
        assert!(lock.path().exists());

        let second = RunLock::acquire(temp_dir.path());
        assert!(matches!(second, Err(crate::Error::LockHeld(_))));

        drop(lock);
        assert!(!temp_dir.path().join(LOCK_FILE_NAME).exists());
        assert!(RunLock::acquire(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_lock_of_dead_process_is_taken_over() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(LOCK_FILE_NAME);
        fs::write(&path, format!("{}\n", DEAD_PID)).unwrap();

        let lock = RunLock::acquire(temp_dir.path()).unwrap();
        assert_eq!(holder_pid(lock.path()), Some(std::process::id()));
    }

    #[test]
    fn test_lock_of_live_process_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(LOCK_FILE_NAME);
        fs::write(&path, format!("{}\n", std::process::id())).unwrap();

        assert!(matches!(
            RunLock::acquire(temp_dir.path()),
            Err(crate::Error::LockHeld(_))
        ));
        assert!(path.exists());
    }

    #[test]
    fn test_unreadable_lock_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(LOCK_FILE_NAME);
        fs::write(&path, "not a pid").unwrap();

        assert!(matches!(
            RunLock::acquire(temp_dir.path()),
            Err(crate::Error::LockHeld(_))
        ));
    }
}
