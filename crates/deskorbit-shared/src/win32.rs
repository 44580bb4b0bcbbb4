//! Win32 implementation of the [`Shell`] seam
//!
//! The icon list view belongs to explorer.exe. Pointer-carrying list-view
//! messages are only meaningful with addresses from explorer's address
//! space, hence `VirtualAllocEx` / `WriteProcessMemory` / `ReadProcessMemory`.

use std::ffi::c_void;

use windows::Win32::Foundation::{
    CloseHandle, ERROR_PARTIAL_COPY, GetLastError, HANDLE, HWND, LPARAM, POINT, WIN32_ERROR, WPARAM,
};
use windows::Win32::Graphics::Gdi::ScreenToClient;
use windows::Win32::System::Diagnostics::Debug::{ReadProcessMemory, WriteProcessMemory};
use windows::Win32::System::Memory::{
    MEM_COMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_READWRITE, VirtualAllocEx, VirtualFreeEx,
};
use windows::Win32::System::Threading::{OpenProcess, PROCESS_ALL_ACCESS};
use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};
use windows::Win32::UI::WindowsAndMessaging::{
    FindWindowExW, GetCursorPos, GetWindowThreadProcessId, SendMessageW, SetProcessDPIAware,
};
use windows::core::{Error, PCWSTR};

use crate::error::{OrbitError, Result};
use crate::messages::Point;
use crate::remote::{ProcessMemory, RemoteAddress};
use crate::shell::{Shell, WindowHandle};

/// The live Windows desktop
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Shell;

/// Handle to the process owning the icon container; closed on drop
pub struct Win32Process {
    handle: HANDLE,
}

impl Drop for Win32Process {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

fn from_hwnd(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

fn last_error() -> u32 {
    unsafe { GetLastError() }.0
}

/// Win32 code behind `error`, matching what [`last_error`] reports
fn error_code(error: &Error) -> u32 {
    WIN32_ERROR::from_error(error).map_or(error.code().0 as u32, |code| code.0)
}

impl ProcessMemory for Win32Process {
    fn allocate(&self, size: usize) -> Result<RemoteAddress> {
        let address = unsafe {
            VirtualAllocEx(
                self.handle,
                None,
                size,
                MEM_COMMIT | MEM_RESERVE,
                PAGE_READWRITE,
            )
        };
        if address.is_null() {
            return Err(OrbitError::Allocation {
                size,
                code: last_error(),
            });
        }
        Ok(RemoteAddress(address as usize))
    }

    fn write(&self, address: RemoteAddress, bytes: &[u8]) -> Result<()> {
        let mut written = 0usize;
        let result = unsafe {
            WriteProcessMemory(
                self.handle,
                address.0 as *const c_void,
                bytes.as_ptr() as *const c_void,
                bytes.len(),
                Some(&mut written),
            )
        };
        match result {
            Err(e) => Err(OrbitError::Transfer {
                op: "write",
                code: error_code(&e),
            }),
            Ok(()) if written != bytes.len() => Err(OrbitError::Transfer {
                op: "write",
                code: ERROR_PARTIAL_COPY.0,
            }),
            Ok(()) => Ok(()),
        }
    }

    fn read(&self, address: RemoteAddress, buffer: &mut [u8]) -> Result<()> {
        let mut read = 0usize;
        let result = unsafe {
            ReadProcessMemory(
                self.handle,
                address.0 as *const c_void,
                buffer.as_mut_ptr() as *mut c_void,
                buffer.len(),
                Some(&mut read),
            )
        };
        match result {
            Err(e) => Err(OrbitError::Transfer {
                op: "read",
                code: error_code(&e),
            }),
            Ok(()) if read != buffer.len() => Err(OrbitError::Transfer {
                op: "read",
                code: ERROR_PARTIAL_COPY.0,
            }),
            Ok(()) => Ok(()),
        }
    }

    fn free(&self, address: RemoteAddress) -> Result<()> {
        unsafe { VirtualFreeEx(self.handle, address.0 as *mut c_void, 0, MEM_RELEASE) }.map_err(
            |e| OrbitError::Transfer {
                op: "free",
                code: error_code(&e),
            },
        )
    }
}

impl Shell for Win32Shell {
    type Process = Win32Process;

    fn find_window(
        &self,
        parent: Option<WindowHandle>,
        after: Option<WindowHandle>,
        class: &str,
    ) -> Option<WindowHandle> {
        let class_wide: Vec<u16> = class.encode_utf16().chain(std::iter::once(0)).collect();
        unsafe {
            FindWindowExW(
                parent.map(to_hwnd),
                after.map(to_hwnd),
                PCWSTR(class_wide.as_ptr()),
                PCWSTR::null(),
            )
        }
        .ok()
        .filter(|hwnd| !hwnd.is_invalid())
        .map(from_hwnd)
    }

    fn send_message(&self, window: WindowHandle, msg: u32, wparam: usize, lparam: isize) -> isize {
        unsafe {
            SendMessageW(
                to_hwnd(window),
                msg,
                Some(WPARAM(wparam)),
                Some(LPARAM(lparam)),
            )
        }
        .0
    }

    fn open_owner(&self, window: WindowHandle) -> Result<Win32Process> {
        let mut pid = 0u32;
        let thread_id = unsafe { GetWindowThreadProcessId(to_hwnd(window), Some(&mut pid)) };
        if thread_id == 0 || pid == 0 {
            return Err(OrbitError::Access { code: last_error() });
        }

        let handle = unsafe { OpenProcess(PROCESS_ALL_ACCESS, false, pid) }.map_err(|e| {
            OrbitError::Access {
                code: error_code(&e),
            }
        })?;
        log::debug!("Opened process {} owning {:?}", pid, window);

        Ok(Win32Process { handle })
    }

    fn cursor_position(&self) -> Result<Point> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }.map_err(|e| OrbitError::Cursor {
            code: error_code(&e),
        })?;
        Ok(Point::new(point.x, point.y))
    }

    fn screen_to_client(&self, window: WindowHandle, point: Point) -> Result<Point> {
        let mut converted = POINT {
            x: point.x,
            y: point.y,
        };
        if !unsafe { ScreenToClient(to_hwnd(window), &mut converted) }.as_bool() {
            return Err(OrbitError::Cursor { code: last_error() });
        }
        Ok(Point::new(converted.x, converted.y))
    }
}

/// Make cursor and icon coordinates agree on scaled displays
///
/// Prefers per-monitor awareness (Windows 10+), falling back to the legacy
/// system-DPI call.
pub fn enable_dpi_awareness() {
    unsafe {
        if SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2).is_err() {
            let _ = SetProcessDPIAware();
        }
    }
}
