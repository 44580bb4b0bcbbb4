//! Icon queries and placement through the container's message interface
//!
//! Messages that carry a pointer (label and position fetches) go through a
//! fresh process handle and fresh [`RemoteBuffer`]s for every call. Nothing
//! is pooled, so no remote resource outlives the call that created it.

use crate::LABEL_CAPACITY;
use crate::error::{OrbitError, Result};
use crate::locator::IconLocator;
use crate::messages::*;
use crate::remote::RemoteBuffer;
use crate::shell::{Shell, WindowHandle};

/// Mouse position relative to one icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorReport {
    /// Mouse in screen coordinates
    pub mouse_screen: Point,
    /// Mouse in the container's client coordinates
    pub mouse_client: Point,
    /// Icon in the container's client coordinates
    pub icon_client: Point,
    /// `mouse_client - icon_client`
    pub delta: Point,
}

/// Access to the desktop icons
pub struct IconRegistry<S: Shell> {
    shell: S,
    locator: IconLocator,
}

impl<S: Shell> IconRegistry<S> {
    /// Registry that re-resolves the container on every call
    pub fn new(shell: S) -> Self {
        Self::with_locator(shell, IconLocator::default())
    }

    /// Registry using a specific locator (e.g. one caching for the session)
    pub fn with_locator(shell: S, locator: IconLocator) -> Self {
        Self { shell, locator }
    }

    /// The underlying shell
    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Resolve the icon container
    pub fn container(&self) -> Result<WindowHandle> {
        self.locator
            .resolve(&self.shell)
            .ok_or(OrbitError::NotFound)
    }

    /// Current number of icons
    pub fn count(&self) -> Result<usize> {
        let container = self.container()?;
        Ok(self.count_in(container))
    }

    fn count_in(&self, container: WindowHandle) -> usize {
        let count = self
            .shell
            .send_message(container, LVM_GETITEMCOUNT, 0, 0);
        usize::try_from(count).unwrap_or(0)
    }

    /// Label of the icon at `index`
    ///
    /// Returns `Ok(None)` when the container is missing or `index` is out of
    /// range. Remote failures are returned as errors once both remote
    /// buffers have been freed and the process handle closed.
    pub fn label(&self, index: usize) -> Result<Option<String>> {
        let Some(container) = self.locator.resolve(&self.shell) else {
            log::warn!("Desktop ListView not found");
            return Ok(None);
        };

        let count = self.count_in(container);
        if index >= count {
            log::debug!("Icon index {} out of range (count {})", index, count);
            return Ok(None);
        }

        let process = self.shell.open_owner(container)?;
        let text = RemoteBuffer::allocate(&process, LABEL_CAPACITY * 2)?;
        let record = RemoteBuffer::allocate(&process, LABEL_REQUEST_SIZE)?;

        // pszText has to point into the foreign process
        let request = LabelRequest::text(index as i32, text.address().0, LABEL_CAPACITY);
        record.write(&request.to_bytes())?;

        self.shell.send_message(
            container,
            LVM_GETITEMTEXTW,
            index,
            record.address().as_lparam(),
        );

        let bytes = text.read(LABEL_CAPACITY * 2)?;
        Ok(Some(decode_label(&bytes)))
    }

    /// Labels of every icon, in index order
    pub fn labels(&self) -> Result<Vec<(usize, String)>> {
        let count = self.count()?;
        let mut labels = Vec::with_capacity(count);
        for index in 0..count {
            if let Some(label) = self.label(index)? {
                labels.push((index, label));
            }
        }
        Ok(labels)
    }

    /// Position of the icon at `index`, in the container's client coordinates
    pub fn position(&self, index: usize) -> Result<Point> {
        let container = self.container()?;
        let process = self.shell.open_owner(container)?;
        let point = RemoteBuffer::allocate(&process, POINT_SIZE)?;

        let found = self.shell.send_message(
            container,
            LVM_GETITEMPOSITION,
            index,
            point.address().as_lparam(),
        );
        if found == 0 {
            return Err(OrbitError::NotFound);
        }

        let bytes = point.read(POINT_SIZE)?;
        Point::from_bytes(&bytes).ok_or(OrbitError::Transfer {
            op: "read",
            code: 0x12b,
        })
    }

    /// Move the icon at `index`
    ///
    /// The position travels by value, packed to 16 bits per axis (see
    /// [`pack_position`]).
    pub fn set_position(&self, index: usize, x: i32, y: i32) -> Result<()> {
        let container = self.container()?;
        self.shell.send_message(
            container,
            LVM_SETITEMPOSITION,
            index,
            pack_position(x, y),
        );
        Ok(())
    }

    /// Clear the snap-to-grid extended style and report whether it stuck
    pub fn disable_snap_to_grid(&self) -> bool {
        let Some(container) = self.locator.resolve(&self.shell) else {
            return false;
        };

        // wParam selects the bit, lParam = 0 clears it
        self.shell.send_message(
            container,
            LVM_SETEXTENDEDLISTVIEWSTYLE,
            LVS_EX_SNAPTOGRID as usize,
            0,
        );

        let style = self
            .shell
            .send_message(container, LVM_GETEXTENDEDLISTVIEWSTYLE, 0, 0);
        (style as u32 & LVS_EX_SNAPTOGRID) == 0
    }

    /// Mouse position in screen coordinates
    pub fn cursor(&self) -> Result<Point> {
        self.shell.cursor_position()
    }

    /// Mouse position relative to the icon at `index`
    pub fn cursor_relative_to(&self, index: usize) -> Result<CursorReport> {
        let container = self.container()?;
        let mouse_screen = self.shell.cursor_position()?;
        let mouse_client = self.shell.screen_to_client(container, mouse_screen)?;
        let icon_client = self.position(index)?;

        Ok(CursorReport {
            mouse_screen,
            mouse_client,
            icon_client,
            delta: Point::new(mouse_client.x - icon_client.x, mouse_client.y - icon_client.y),
        })
    }
}
