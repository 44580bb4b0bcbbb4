//! Memory inside the foreign process that owns the icon container
//!
//! List-view messages that carry a pointer are dereferenced by the
//! container's own process, so any record they reference (and any pointer
//! inside that record) must live in that process's address space. A
//! [`RemoteBuffer`] is such a region: it can only be written, read, and
//! handed back to the container as a message argument.
//!
//! Buffers borrow the process they were allocated in. They free themselves
//! on drop, which the borrow checker orders before the process handle is
//! closed.

use crate::error::{OrbitError, Result};

/// Address of a region in the foreign process
///
/// Meaningless locally; it is only ever passed back to the foreign side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemoteAddress(pub usize);

impl RemoteAddress {
    /// The address as a message parameter
    pub fn as_lparam(self) -> isize {
        self.0 as isize
    }
}

/// Raw memory primitives of an opened foreign process
///
/// Dropping the implementor closes the process handle.
pub trait ProcessMemory {
    /// Reserve and commit `size` read/write bytes
    fn allocate(&self, size: usize) -> Result<RemoteAddress>;

    /// Copy `bytes` to `address`; a short write is an error
    fn write(&self, address: RemoteAddress, bytes: &[u8]) -> Result<()>;

    /// Fill `buffer` from `address`; a short read is an error
    fn read(&self, address: RemoteAddress, buffer: &mut [u8]) -> Result<()>;

    /// Release a region returned by [`ProcessMemory::allocate`]
    fn free(&self, address: RemoteAddress) -> Result<()>;
}

/// A scoped allocation inside the foreign process, freed on drop
pub struct RemoteBuffer<'p, P: ProcessMemory + ?Sized> {
    process: &'p P,
    address: RemoteAddress,
    size: usize,
}

impl<'p, P: ProcessMemory + ?Sized> RemoteBuffer<'p, P> {
    /// Allocate `size` bytes in `process`
    pub fn allocate(process: &'p P, size: usize) -> Result<Self> {
        let address = process.allocate(size)?;
        log::debug!("Allocated {} remote bytes at {:#x}", size, address.0);
        Ok(Self {
            process,
            address,
            size,
        })
    }

    /// Address to hand to the container
    pub fn address(&self) -> RemoteAddress {
        self.address
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Copy `bytes` to the start of the buffer
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.size() {
            // ERROR_INSUFFICIENT_BUFFER
            return Err(OrbitError::Transfer {
                op: "write",
                code: 0x7a,
            });
        }
        self.process.write(self.address, bytes)
    }

    /// Copy `len` bytes out of the start of the buffer
    pub fn read(&self, len: usize) -> Result<Vec<u8>> {
        if len > self.size() {
            return Err(OrbitError::Transfer {
                op: "read",
                code: 0x7a,
            });
        }
        let mut bytes = vec![0u8; len];
        self.process.read(self.address, &mut bytes)?;
        Ok(bytes)
    }
}

impl<P: ProcessMemory + ?Sized> Drop for RemoteBuffer<'_, P> {
    fn drop(&mut self) {
        match self.process.free(self.address) {
            Ok(()) => log::debug!("Freed {} remote bytes at {:#x}", self.size(), self.address.0),
            Err(e) => log::warn!("Leaking remote buffer at {:#x}: {}", self.address.0, e),
        }
    }
}
