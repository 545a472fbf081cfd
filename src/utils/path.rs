//! Path and file name helpers.

use crate::Result;
use regex::Regex;

/// Convert a Windows path to its WSL mount path.
///
/// `D:\Videos\Today` becomes `/mnt/d/Videos/Today`.
pub fn windows_to_wsl_path(windows_path: &str) -> Result<String> {
    let re = Regex::new(r"^([a-zA-Z]):\\(.*)$").map_err(|e| crate::Error::other(e.to_string()))?;
    let caps = re
        .captures(windows_path)
        .ok_or_else(|| crate::Error::InvalidPath(windows_path.to_string()))?;

    let drive = caps[1].to_lowercase();
    let remainder = caps[2].replace('\\', "/");
    Ok(format!("/mnt/{}/{}", drive, remainder))
}

/// Everything after the last `.` of a file name, or `""` when there is none.
pub fn get_extension(filename: &str) -> &str {
    filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

/// Characters of `name` that Windows refuses in file names.
pub fn forbidden_characters(name: &str) -> Vec<char> {
    const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    let mut found: Vec<char> = Vec::new();
    for c in name.chars() {
        if (FORBIDDEN.contains(&c) || c.is_control()) && !found.contains(&c) {
            found.push(c);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_to_wsl_path() {
        assert_eq!(windows_to_wsl_path(r"D:\Videos\Today").unwrap(), "/mnt/d/Videos/Today");
        assert_eq!(windows_to_wsl_path(r"c:\Users\me\file.txt").unwrap(), "/mnt/c/Users/me/file.txt");
        assert_eq!(windows_to_wsl_path(r"E:\").unwrap(), "/mnt/e/");
    }

    #[test]
    fn test_windows_to_wsl_path_rejects_other_shapes() {
        for input in ["NotAPath", "/mnt/d/Videos", r"DD:\Videos", r"D:/Videos", ""] {
            let err = windows_to_wsl_path(input).unwrap_err();
            assert!(matches!(err, crate::Error::InvalidPath(_)), "{input}");
        }
    }

    #[test]
    fn test_get_extension() {
        assert_eq!(get_extension("clip.mp4"), "mp4");
        assert_eq!(get_extension("IMG.0001.MOV"), "MOV");
        assert_eq!(get_extension("noextension"), "");
        assert_eq!(get_extension("trailing."), "");
    }

    #[test]
    fn test_forbidden_characters() {
        assert!(forbidden_characters("Match 01_01_2024 (Part 1 of 2).mov").is_empty());
        assert_eq!(forbidden_characters("Score 2:1 / final?.mov"), vec![':', '/', '?']);
        assert_eq!(forbidden_characters("a\0b"), vec!['\0']);
    }
}
