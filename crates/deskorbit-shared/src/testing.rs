//! In-memory stand-in for the desktop shell and the process that owns the
//! icon list view
//!
//! The fake list view answers messages the way the real one does: records
//! referenced by lParam are looked up in the fake foreign memory, so a
//! pointer to local memory would simply not be found.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{OrbitError, Result};
use crate::messages::*;
use crate::remote::{ProcessMemory, RemoteAddress};
use crate::shell::{Shell, WindowHandle};

pub const PROGMAN: WindowHandle = WindowHandle(0x10);
pub const DEFVIEW: WindowHandle = WindowHandle(0x20);
pub const LISTVIEW: WindowHandle = WindowHandle(0x30);

const ERROR_NOT_ENOUGH_MEMORY: u32 = 8;
const ERROR_PARTIAL_COPY: u32 = 299;
const ERROR_NOACCESS: u32 = 998;
const ERROR_INVALID_WINDOW_HANDLE: u32 = 1400;
const ERROR_ACCESS_DENIED: u32 = 5;

/// Address space of the fake foreign process, with accounting
#[derive(Default)]
pub struct FakeMemory {
    next: Cell<usize>,
    regions: RefCell<HashMap<usize, Vec<u8>>>,
    transfers: Cell<usize>,
    allocations: Cell<usize>,
    pub frees: RefCell<Vec<usize>>,
    pub frees_before_close: Cell<usize>,
    pub opens: Cell<usize>,
    pub closes: Cell<usize>,
    /// Fail the nth (1-based) read or write
    pub fail_transfer: Cell<Option<usize>>,
    /// Fail the nth (1-based) allocation
    pub fail_alloc: Cell<Option<usize>>,
    pub fail_free: Cell<bool>,
}

impl FakeMemory {
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn open(self: &Rc<Self>) -> FakeProcess {
        self.opens.set(self.opens.get() + 1);
        FakeProcess {
            memory: Rc::clone(self),
        }
    }

    /// Regions still allocated
    pub fn live(&self) -> usize {
        self.regions.borrow().len()
    }

    pub fn transfers(&self) -> usize {
        self.transfers.get()
    }

    /// Foreign-side read of a region by its base address
    fn load(&self, address: usize, len: usize) -> Option<Vec<u8>> {
        let regions = self.regions.borrow();
        let region = regions.get(&address)?;
        region.get(..len).map(<[u8]>::to_vec)
    }

    /// Foreign-side write into a region by its base address
    fn store(&self, address: usize, bytes: &[u8]) -> bool {
        let mut regions = self.regions.borrow_mut();
        match regions.get_mut(&address) {
            Some(region) if region.len() >= bytes.len() => {
                region[..bytes.len()].copy_from_slice(bytes);
                true
            }
            _ => false,
        }
    }

    fn next_transfer_fails(&self) -> bool {
        let n = self.transfers.get() + 1;
        self.transfers.set(n);
        self.fail_transfer.get() == Some(n)
    }
}

/// Opened handle to the fake process; counts its close on drop
pub struct FakeProcess {
    memory: Rc<FakeMemory>,
}

impl ProcessMemory for FakeProcess {
    fn allocate(&self, size: usize) -> Result<RemoteAddress> {
        let memory = &self.memory;
        let n = memory.allocations.get() + 1;
        memory.allocations.set(n);
        if memory.fail_alloc.get() == Some(n) {
            return Err(OrbitError::Allocation {
                size,
                code: ERROR_NOT_ENOUGH_MEMORY,
            });
        }

        let slot = memory.next.get() + 1;
        memory.next.set(slot);
        let address = 0x7ff0_0000 + slot * 0x1000;
        memory.regions.borrow_mut().insert(address, vec![0; size]);
        Ok(RemoteAddress(address))
    }

    fn write(&self, address: RemoteAddress, bytes: &[u8]) -> Result<()> {
        if self.memory.next_transfer_fails() {
            return Err(OrbitError::Transfer {
                op: "write",
                code: ERROR_PARTIAL_COPY,
            });
        }
        if self.memory.store(address.0, bytes) {
            Ok(())
        } else {
            Err(OrbitError::Transfer {
                op: "write",
                code: ERROR_NOACCESS,
            })
        }
    }

    fn read(&self, address: RemoteAddress, buffer: &mut [u8]) -> Result<()> {
        if self.memory.next_transfer_fails() {
            return Err(OrbitError::Transfer {
                op: "read",
                code: ERROR_PARTIAL_COPY,
            });
        }
        match self.memory.load(address.0, buffer.len()) {
            Some(bytes) => {
                buffer.copy_from_slice(&bytes);
                Ok(())
            }
            None => Err(OrbitError::Transfer {
                op: "read",
                code: ERROR_NOACCESS,
            }),
        }
    }

    fn free(&self, address: RemoteAddress) -> Result<()> {
        let memory = &self.memory;
        memory.frees.borrow_mut().push(address.0);
        if memory.closes.get() == 0 {
            memory.frees_before_close.set(memory.frees_before_close.get() + 1);
        }
        if memory.fail_free.get() {
            return Err(OrbitError::Transfer {
                op: "free",
                code: ERROR_NOACCESS,
            });
        }
        memory.regions.borrow_mut().remove(&address.0);
        Ok(())
    }
}

impl Drop for FakeProcess {
    fn drop(&mut self) {
        self.memory.closes.set(self.memory.closes.get() + 1);
    }
}

#[derive(Debug, Clone)]
pub struct FakeIcon {
    pub label: String,
    pub position: Point,
}

/// A desktop with a window tree, a list view and a mouse
pub struct FakeShell {
    windows: Vec<(WindowHandle, Option<WindowHandle>, &'static str)>,
    pub memory: Rc<FakeMemory>,
    pub icons: RefCell<Vec<FakeIcon>>,
    pub ex_style: Cell<u32>,
    /// Ignore style changes, like a container that refuses them
    pub style_locked: Cell<bool>,
    pub cursor: Cell<Point>,
    pub client_origin: Point,
    pub moves: RefCell<Vec<(usize, i16, i16)>>,
    pub deny_open: Cell<bool>,
    pub lookups: Cell<usize>,
}

impl FakeShell {
    /// Explorer's usual shape: Progman > SHELLDLL_DefView > SysListView32
    pub fn desktop(labels: &[&str]) -> Self {
        let shell = Self::with_windows(vec![
            (PROGMAN, None, "Progman"),
            (DEFVIEW, Some(PROGMAN), "SHELLDLL_DefView"),
            (LISTVIEW, Some(DEFVIEW), "SysListView32"),
        ]);
        shell.set_labels(labels);
        shell
    }

    pub fn with_windows(windows: Vec<(WindowHandle, Option<WindowHandle>, &'static str)>) -> Self {
        Self {
            windows,
            memory: FakeMemory::shared(),
            icons: RefCell::new(Vec::new()),
            ex_style: Cell::new(LVS_EX_SNAPTOGRID | 0x1),
            style_locked: Cell::new(false),
            cursor: Cell::new(Point::default()),
            client_origin: Point::default(),
            moves: RefCell::new(Vec::new()),
            deny_open: Cell::new(false),
            lookups: Cell::new(0),
        }
    }

    pub fn set_labels(&self, labels: &[&str]) {
        *self.icons.borrow_mut() = labels
            .iter()
            .enumerate()
            .map(|(i, label)| FakeIcon {
                label: label.to_string(),
                position: Point::new(i as i32 * 100, 20),
            })
            .collect();
    }

    fn is_list_view(&self, window: WindowHandle) -> bool {
        self.windows
            .iter()
            .any(|&(handle, _, class)| handle == window && class == "SysListView32")
    }

    fn fetch_text(&self, index: usize, record: usize) -> isize {
        let Some(bytes) = self.memory.load(record, LABEL_REQUEST_SIZE) else {
            return 0;
        };
        let Some(request) = LabelRequest::from_bytes(&bytes) else {
            return 0;
        };
        if request.mask & LVIF_TEXT == 0 || request.text_max <= 0 {
            return 0;
        }
        let icons = self.icons.borrow();
        let Some(icon) = icons.get(index) else {
            return 0;
        };

        let mut units: Vec<u16> = icon.label.encode_utf16().collect();
        units.truncate(request.text_max as usize - 1);
        let len = units.len();
        units.push(0);
        let text: Vec<u8> = units.iter().flat_map(|u| u.to_ne_bytes()).collect();
        if self.memory.store(request.text, &text) {
            len as isize
        } else {
            0
        }
    }
}

impl Shell for FakeShell {
    type Process = FakeProcess;

    fn find_window(
        &self,
        parent: Option<WindowHandle>,
        after: Option<WindowHandle>,
        class: &str,
    ) -> Option<WindowHandle> {
        self.lookups.set(self.lookups.get() + 1);
        let siblings = self.windows.iter().filter(|&&(_, p, _)| p == parent);
        let mut past_after = after.is_none();
        for &(handle, _, window_class) in siblings {
            if !past_after {
                past_after = Some(handle) == after;
                continue;
            }
            if window_class == class {
                return Some(handle);
            }
        }
        None
    }

    fn send_message(&self, window: WindowHandle, msg: u32, wparam: usize, lparam: isize) -> isize {
        if !self.is_list_view(window) {
            return 0;
        }
        match msg {
            LVM_GETITEMCOUNT => self.icons.borrow().len() as isize,
            LVM_GETITEMTEXTW => self.fetch_text(wparam, lparam as usize),
            LVM_GETITEMPOSITION => {
                let icons = self.icons.borrow();
                match icons.get(wparam) {
                    Some(icon) => self
                        .memory
                        .store(lparam as usize, &icon.position.to_bytes())
                        as isize,
                    None => 0,
                }
            }
            LVM_SETITEMPOSITION => {
                let (x, y) = unpack_position(lparam);
                let mut icons = self.icons.borrow_mut();
                match icons.get_mut(wparam) {
                    Some(icon) => {
                        icon.position = Point::new(x as i32, y as i32);
                        self.moves.borrow_mut().push((wparam, x, y));
                        1
                    }
                    None => 0,
                }
            }
            LVM_SETEXTENDEDLISTVIEWSTYLE => {
                let old = self.ex_style.get();
                if !self.style_locked.get() {
                    let mask = wparam as u32;
                    let value = lparam as u32;
                    self.ex_style.set((old & !mask) | (value & mask));
                }
                old as isize
            }
            LVM_GETEXTENDEDLISTVIEWSTYLE => self.ex_style.get() as isize,
            _ => 0,
        }
    }

    fn open_owner(&self, window: WindowHandle) -> Result<FakeProcess> {
        if !self.is_list_view(window) {
            return Err(OrbitError::NotFound);
        }
        if self.deny_open.get() {
            return Err(OrbitError::Access {
                code: ERROR_ACCESS_DENIED,
            });
        }
        Ok(self.memory.open())
    }

    fn cursor_position(&self) -> Result<Point> {
        Ok(self.cursor.get())
    }

    fn screen_to_client(&self, window: WindowHandle, point: Point) -> Result<Point> {
        if !self.windows.iter().any(|&(handle, _, _)| handle == window) {
            return Err(OrbitError::Cursor {
                code: ERROR_INVALID_WINDOW_HANDLE,
            });
        }
        Ok(Point::new(
            point.x - self.client_origin.x,
            point.y - self.client_origin.y,
        ))
    }
}
