//! Explorer windows through the shell automation object model.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use std::path::{Path, PathBuf};
use windows::core::{Interface, HSTRING, VARIANT};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoTaskMemFree, CoUninitialize, IServiceProvider,
    CLSCTX_ALL, COINIT_APARTMENTTHREADED,
};
use windows::Win32::UI::Shell::Common::ITEMIDLIST;
use windows::Win32::UI::Shell::{
    IFolderView, IPersistFolder2, IShellBrowser, IShellWindows, IWebBrowserApp, ILCreateFromPathW,
    ILFree, SHGetNameFromIDList, SHOpenFolderAndSelectItems, ShellWindows, SID_STopLevelBrowser,
    SIGDN_FILESYSPATH,
};

use crate::models::WindowHandle;
use crate::resolver::{BrowserWindow, Desktop, ShellWindows as ShellWindowList, Slot};
use crate::selection::Selector;

/// COM initialised for the current thread while this value lives.
pub struct ComScope {
    owned: bool,
}

impl ComScope {
    pub fn enter() -> Self {
        // S_FALSE (already initialised) still needs a balancing uninit;
        // RPC_E_CHANGED_MODE leaves COM usable but not ours to tear down.
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
        ComScope { owned: hr.is_ok() }
    }
}

impl Drop for ComScope {
    fn drop(&mut self) {
        if self.owned {
            unsafe { CoUninitialize() };
        }
    }
}

/// Owned item-identifier list, freed on drop.
struct IdList(*mut ITEMIDLIST);

impl IdList {
    fn from_path(path: &Path) -> Option<Self> {
        let wide = HSTRING::from(path.as_os_str());
        Self::from_raw(unsafe { ILCreateFromPathW(&wide) })
    }

    fn from_raw(raw: *mut ITEMIDLIST) -> Option<Self> {
        (!raw.is_null()).then_some(IdList(raw))
    }

    fn as_ptr(&self) -> *const ITEMIDLIST {
        self.0
    }

    fn filesystem_path(&self) -> Option<PathBuf> {
        let name = unsafe { SHGetNameFromIDList(self.as_ptr(), SIGDN_FILESYSPATH) }.ok()?;
        let path = PathBuf::from(OsString::from_wide(unsafe { name.as_wide() }));
        unsafe { CoTaskMemFree(Some(name.as_ptr() as *const _)) };
        Some(path)
    }
}

impl Drop for IdList {
    fn drop(&mut self) {
        unsafe { ILFree(Some(self.0 as *const _)) };
    }
}

/// The Windows desktop shell.
pub struct Explorer;

/// Open shell windows. Keeps COM initialised until dropped.
pub struct ExplorerWindows {
    windows: IShellWindows,
    _com: ComScope,
}

pub struct ExplorerBrowser(IWebBrowserApp);

impl Desktop for Explorer {
    type Windows = ExplorerWindows;

    fn shell_windows(&self) -> Option<ExplorerWindows> {
        let com = ComScope::enter();
        let windows: IShellWindows =
            unsafe { CoCreateInstance(&ShellWindows, None, CLSCTX_ALL) }.ok()?;
        Some(ExplorerWindows { windows, _com: com })
    }

    fn foreground_window(&self) -> WindowHandle {
        super::windows::foreground_window()
    }
}

impl ShellWindowList for ExplorerWindows {
    type Browser = ExplorerBrowser;

    fn item(&self, index: i32) -> Slot<ExplorerBrowser> {
        let Ok(dispatch) = (unsafe { self.windows.Item(&VARIANT::from(index)) }) else {
            return Slot::End;
        };
        match dispatch.cast::<IWebBrowserApp>() {
            Ok(app) => Slot::Browser(ExplorerBrowser(app)),
            Err(_) => Slot::Other,
        }
    }
}

impl BrowserWindow for ExplorerBrowser {
    fn handle(&self) -> Option<WindowHandle> {
        let hwnd = unsafe { self.0.HWND() }.ok()?;
        Some(WindowHandle(hwnd.0))
    }

    fn folder_path(&self) -> Option<PathBuf> {
        let provider: IServiceProvider = self.0.cast().ok()?;
        let browser: IShellBrowser = unsafe { provider.QueryService(&SID_STopLevelBrowser) }.ok()?;
        let view = unsafe { browser.QueryActiveShellView() }.ok()?;
        let folder_view: IFolderView = view.cast().ok()?;
        let folder: IPersistFolder2 = unsafe { folder_view.GetFolder() }.ok()?;
        let ids = IdList::from_raw(unsafe { folder.GetCurFolder() }.ok()?)?;
        ids.filesystem_path()
    }
}

impl Selector for Explorer {
    fn open_and_select(&self, dir: &Path, items: &[PathBuf]) -> Result<()> {
        let dir_ids = IdList::from_path(dir)
            .with_context(|| format!("No item id list for {}", dir.display()))?;
        let item_ids = items
            .iter()
            .map(|item| {
                IdList::from_path(item)
                    .with_context(|| format!("No item id list for {}", item.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        let children: Vec<*const ITEMIDLIST> = item_ids.iter().map(IdList::as_ptr).collect();

        let _com = ComScope::enter();
        unsafe { SHOpenFolderAndSelectItems(dir_ids.as_ptr(), Some(&children), 0) }
            .context("Shell refused to open and select items")?;
        Ok(())
    }
}
