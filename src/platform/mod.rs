#[cfg(windows)]
pub mod explorer;
#[cfg(unix)]
pub mod unix;
#[cfg(windows)]
pub mod windows;

use anyhow::Result;
use std::path::Path;

/// Identifier of the device (volume) holding `path`.
pub fn device_id(path: &Path) -> Result<Option<u64>> {
    #[cfg(windows)]
    return windows::device_id(path);
    #[cfg(unix)]
    return unix::device_id(path);
    #[cfg(not(any(windows, unix)))]
    Ok(None)
}

/// Show a warning to the user. Falls back to stderr without a desktop shell.
pub fn warn(text: &str) {
    #[cfg(windows)]
    windows::message_box(crate::models::APP_NAME, text);
    #[cfg(not(windows))]
    eprintln!("{}: {}", crate::models::APP_NAME, text);
}
