use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::os::windows::ffi::OsStringExt;
use std::os::windows::fs::OpenOptionsExt;
use std::os::windows::io::AsRawHandle;
use std::path::{Path, PathBuf};
use windows::core::HSTRING;
use windows::Win32::Foundation::{HANDLE, HWND};
use windows::Win32::Storage::FileSystem::{
    GetFileInformationByHandle, BY_HANDLE_FILE_INFORMATION, FILE_FLAG_BACKUP_SEMANTICS,
};
use windows::Win32::System::DataExchange::{
    CloseClipboard, GetClipboardData, IsClipboardFormatAvailable, OpenClipboard,
};
use windows::Win32::System::Ole::CF_HDROP;
use windows::Win32::UI::Shell::{DragQueryFileW, HDROP};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, MessageBoxW, MB_ICONWARNING, MB_OK,
};

use crate::models::WindowHandle;

/// Volume serial number of the volume holding `path`.
pub fn device_id(path: &Path) -> Result<Option<u64>> {
    // Backup semantics lets directories be opened as well as files.
    let file = OpenOptions::new()
        .read(true)
        .custom_flags(FILE_FLAG_BACKUP_SEMANTICS.0)
        .open(path)?;
    let handle = HANDLE(file.as_raw_handle() as isize);
    let mut info = BY_HANDLE_FILE_INFORMATION::default();
    if unsafe { GetFileInformationByHandle(handle, &mut info) }.is_ok() {
        Ok(Some(info.dwVolumeSerialNumber as u64))
    } else {
        Ok(None)
    }
}

pub fn foreground_window() -> WindowHandle {
    let hwnd = unsafe { GetForegroundWindow() };
    WindowHandle(hwnd.0)
}

pub fn message_box(title: &str, text: &str) {
    unsafe {
        MessageBoxW(
            HWND(0),
            &HSTRING::from(text),
            &HSTRING::from(title),
            MB_OK | MB_ICONWARNING,
        );
    }
}

struct OpenedClipboard;

impl OpenedClipboard {
    fn open() -> Result<Self> {
        unsafe { OpenClipboard(HWND(0)) }.context("Failed to open clipboard")?;
        Ok(OpenedClipboard)
    }
}

impl Drop for OpenedClipboard {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseClipboard();
        }
    }
}

/// Paths from the clipboard's file drop list, in clipboard order.
pub fn clipboard_files() -> Result<Vec<PathBuf>> {
    let _clipboard = OpenedClipboard::open()?;

    let format = CF_HDROP.0 as u32;
    if unsafe { IsClipboardFormatAvailable(format) }.is_err() {
        return Ok(Vec::new());
    }
    let data = unsafe { GetClipboardData(format) }.context("Failed to read clipboard file list")?;
    let hdrop = HDROP(data.0);

    let count = unsafe { DragQueryFileW(hdrop, u32::MAX, None) };
    let mut files = Vec::with_capacity(count as usize);
    for index in 0..count {
        let len = unsafe { DragQueryFileW(hdrop, index, None) } as usize;
        if len == 0 {
            continue;
        }
        let mut buffer = vec![0u16; len + 1];
        let copied = unsafe { DragQueryFileW(hdrop, index, Some(buffer.as_mut_slice())) } as usize;
        buffer.truncate(copied);
        files.push(PathBuf::from(OsString::from_wide(&buffer)));
    }
    Ok(files)
}
