//! The seam between the core and the operating system

use crate::error::Result;
use crate::messages::Point;
use crate::remote::ProcessMemory;

/// Opaque identifier of a window owned by another process
///
/// Never destroyed by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// Operating system primitives used to reach the icon container
pub trait Shell {
    /// Handle to the container's owning process; dropping it closes the handle
    type Process: ProcessMemory;

    /// Find the first window of `class` under `parent` (top level when
    /// `None`), starting after the sibling `after`
    fn find_window(
        &self,
        parent: Option<WindowHandle>,
        after: Option<WindowHandle>,
        class: &str,
    ) -> Option<WindowHandle>;

    /// Send a message synchronously and return its result
    fn send_message(&self, window: WindowHandle, msg: u32, wparam: usize, lparam: isize) -> isize;

    /// Open the process that owns `window` with full access
    fn open_owner(&self, window: WindowHandle) -> Result<Self::Process>;

    /// Current mouse position in screen coordinates
    fn cursor_position(&self) -> Result<Point>;

    /// Convert a screen point into `window`'s client coordinates
    fn screen_to_client(&self, window: WindowHandle, point: Point) -> Result<Point>;
}
