//! Shared core for deskorbit
//!
//! Drives the desktop's icon list view from outside its owning process and
//! animates the icons along an elliptical ring around a "planet" painted on
//! the wallpaper.
//!
//! # Architecture
//!
//! - [`Shell`] - the seam over the operating system (window lookup, messages,
//!   opening the owning process, cursor queries)
//! - [`IconLocator`] - resolves the icon container through the shell's
//!   window class chain
//! - [`RemoteBuffer`] - scoped memory inside the foreign process, freed on drop
//! - [`IconRegistry`] - count, label, position and placement of icons
//! - [`Orbit`] - the per-frame animation loop
//!
//! The Win32 backend lives in [`win32`] and is only built on Windows. Every
//! other module is platform independent.

#![deny(missing_docs)]

pub mod error;
pub mod icons;
pub mod locator;
pub mod messages;
pub mod orbit;
pub mod remote;
pub mod shell;
#[cfg(windows)]
pub mod win32;

#[cfg(test)]
mod testing;

pub use error::*;
pub use icons::*;
pub use locator::*;
pub use messages::{Point, pack_position, unpack_position};
pub use orbit::*;
pub use remote::*;
pub use shell::*;

/// Capacity of the label buffer, in UTF-16 code units
pub const LABEL_CAPACITY: usize = 260;
