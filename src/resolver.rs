//! Finds the directory shown by a file-browser window. Shell objects release
//! themselves on drop.

use std::path::PathBuf;

use crate::models::WindowHandle;

pub trait Desktop {
    type Windows: ShellWindows;

    fn shell_windows(&self) -> Option<Self::Windows>;

    fn foreground_window(&self) -> WindowHandle;
}

pub enum Slot<B> {
    /// Index is past the last window.
    End,
    Other,
    Browser(B),
}

pub trait ShellWindows {
    type Browser: BrowserWindow;

    fn item(&self, index: i32) -> Slot<Self::Browser>;
}

pub trait BrowserWindow {
    fn handle(&self) -> Option<WindowHandle>;

    /// `None` when any step of the descent fails or the folder is virtual.
    fn folder_path(&self) -> Option<PathBuf>;
}

/// Directory displayed by the browser window `handle`, if it still exists.
pub fn resolve<D: Desktop>(desktop: &D, handle: WindowHandle) -> Option<PathBuf> {
    if handle.is_null() {
        return None;
    }
    let windows = desktop.shell_windows()?;
    let path = find_folder(&windows, handle)?;
    path.is_dir().then_some(path)
}

pub fn resolve_foreground<D: Desktop>(desktop: &D) -> Option<PathBuf> {
    resolve(desktop, desktop.foreground_window())
}

fn find_folder<W: ShellWindows>(windows: &W, handle: WindowHandle) -> Option<PathBuf> {
    for index in 0.. {
        let browser = match windows.item(index) {
            Slot::End => break,
            Slot::Other => continue,
            Slot::Browser(browser) => browser,
        };
        if browser.handle() != Some(handle) {
            continue;
        }
        // A match ends the scan whether or not its folder resolves.
        return browser.folder_path();
    }
    None
}
