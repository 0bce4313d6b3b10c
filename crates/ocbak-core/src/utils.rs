//! Shared utility functions for ocbak crates

use crate::error::{Error, Result};
use camino::Utf8PathBuf;

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// containers and test harnesses that override HOME are respected.
pub fn get_home_dir() -> Result<Utf8PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(Utf8PathBuf::from(home));
        }
    }

    let home = dirs::home_dir().ok_or(Error::HomeNotFound)?;
    Utf8PathBuf::from_path_buf(home)
        .map_err(|p| Error::non_utf8_path(p.to_string_lossy().into_owned()))
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> Result<Utf8PathBuf> {
    if path == "~" {
        return get_home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => Ok(get_home_dir()?.join(rest)),
        None => Ok(Utf8PathBuf::from(path)),
    }
}

/// Hostname of this machine, or "unknown" when it cannot be read.
pub fn hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Formats bytes as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_get_home_dir_from_env() {
        let original = std::env::var("HOME").ok();
        std::env::set_var("HOME", "/tmp/ocbak-home");

        let home = get_home_dir().unwrap();
        assert_eq!(home, Utf8PathBuf::from("/tmp/ocbak-home"));

        match original {
            Some(value) => std::env::set_var("HOME", value),
            None => std::env::remove_var("HOME"),
        }
    }

    #[test]
    #[serial]
    fn test_expand_tilde() {
        let original = std::env::var("HOME").ok();
        std::env::set_var("HOME", "/tmp/ocbak-home");

        assert_eq!(
            expand_tilde("~/.openclaw").unwrap(),
            Utf8PathBuf::from("/tmp/ocbak-home/.openclaw")
        );
        assert_eq!(expand_tilde("~").unwrap(), Utf8PathBuf::from("/tmp/ocbak-home"));
        assert_eq!(
            expand_tilde("/var/backups").unwrap(),
            Utf8PathBuf::from("/var/backups")
        );
        // Only a leading tilde segment expands
        assert_eq!(expand_tilde("~user/x").unwrap(), Utf8PathBuf::from("~user/x"));

        match original {
            Some(value) => std::env::set_var("HOME", value),
            None => std::env::remove_var("HOME"),
        }
    }

    #[test]
    fn test_hostname_not_empty() {
        assert!(!hostname().is_empty());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1_048_576), "1.00 MB");
        assert_eq!(format_bytes(5_242_880), "5.00 MB");
        assert_eq!(format_bytes(1_073_741_824), "1.00 GB");
    }
}
