//! List-view message vocabulary and the records exchanged with the container
//!
//! Records that travel by reference are serialized explicitly at their C
//! offsets into zero-filled buffers, in native byte order, so they can be
//! copied verbatim into the foreign process:
//!
//! ```text
//! LVITEMW (64-bit)                 POINT
//! ┌────────────────────────┐       ┌──────────┐
//! │ mask       @0   u32    │       │ x  i32   │
//! │ iItem      @4   i32    │       │ y  i32   │
//! │ ...                    │       └──────────┘
//! │ pszText    @24  ptr    │  <- remote text buffer address
//! │ cchTextMax @32  i32    │  <- 260
//! │ ...                    │
//! └────────────────────────┘
//! ```

use std::mem::{offset_of, size_of};

/// Base of the list-view message range
pub const LVM_FIRST: u32 = 0x1000;
/// Query the number of items
pub const LVM_GETITEMCOUNT: u32 = LVM_FIRST + 4;
/// Move an item (position packed into lParam)
pub const LVM_SETITEMPOSITION: u32 = LVM_FIRST + 15;
/// Fetch an item position into a POINT referenced by lParam
pub const LVM_GETITEMPOSITION: u32 = LVM_FIRST + 16;
/// Set extended styles (wParam = mask, lParam = values)
pub const LVM_SETEXTENDEDLISTVIEWSTYLE: u32 = LVM_FIRST + 54;
/// Read the extended style bitmask
pub const LVM_GETEXTENDEDLISTVIEWSTYLE: u32 = LVM_FIRST + 55;
/// Fetch item text into the LVITEMW referenced by lParam
pub const LVM_GETITEMTEXTW: u32 = LVM_FIRST + 115;

/// LVITEMW mask bit requesting the text field
pub const LVIF_TEXT: u32 = 0x0001;
/// Extended style bit that snaps icons to the desktop grid
pub const LVS_EX_SNAPTOGRID: u32 = 0x0008_0000;

/// Serialized size of [`LabelRequest`]
pub const LABEL_REQUEST_SIZE: usize = size_of::<LabelRequest>();
/// Serialized size of [`Point`]
pub const POINT_SIZE: usize = size_of::<Point>();

/// Mirror of the list view's LVITEMW record
///
/// Pointer fields hold addresses in the foreign process and are never
/// dereferenced locally.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelRequest {
    /// Which fields are valid (`LVIF_*`)
    pub mask: u32,
    /// Target item index
    pub item: i32,
    /// Target sub-item (unused)
    pub sub_item: i32,
    /// Item state (unused)
    pub state: u32,
    /// Item state mask (unused)
    pub state_mask: u32,
    /// Remote address of the text buffer
    pub text: usize,
    /// Text buffer capacity in UTF-16 units
    pub text_max: i32,
    /// Image index (unused)
    pub image: i32,
    /// User data (unused)
    pub param: isize,
    /// Indent (unused)
    pub indent: i32,
    /// Group id (unused)
    pub group_id: i32,
    /// Column count (unused)
    pub columns: u32,
    /// Column list pointer (unused)
    pub column_list: usize,
    /// Column format pointer (unused)
    pub column_formats: usize,
    /// Group index (unused)
    pub group: i32,
}

impl LabelRequest {
    /// Request the text of `item` into a remote buffer of `capacity` units
    pub fn text(item: i32, text: usize, capacity: usize) -> Self {
        Self {
            mask: LVIF_TEXT,
            item,
            text,
            text_max: capacity as i32,
            ..Default::default()
        }
    }

    /// Serialize to the foreign process's layout; padding is zeroed
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; LABEL_REQUEST_SIZE];
        put(&mut bytes, offset_of!(Self, mask), &self.mask.to_ne_bytes());
        put(&mut bytes, offset_of!(Self, item), &self.item.to_ne_bytes());
        put(&mut bytes, offset_of!(Self, sub_item), &self.sub_item.to_ne_bytes());
        put(&mut bytes, offset_of!(Self, state), &self.state.to_ne_bytes());
        put(&mut bytes, offset_of!(Self, state_mask), &self.state_mask.to_ne_bytes());
        put(&mut bytes, offset_of!(Self, text), &self.text.to_ne_bytes());
        put(&mut bytes, offset_of!(Self, text_max), &self.text_max.to_ne_bytes());
        put(&mut bytes, offset_of!(Self, image), &self.image.to_ne_bytes());
        put(&mut bytes, offset_of!(Self, param), &self.param.to_ne_bytes());
        put(&mut bytes, offset_of!(Self, indent), &self.indent.to_ne_bytes());
        put(&mut bytes, offset_of!(Self, group_id), &self.group_id.to_ne_bytes());
        put(&mut bytes, offset_of!(Self, columns), &self.columns.to_ne_bytes());
        put(&mut bytes, offset_of!(Self, column_list), &self.column_list.to_ne_bytes());
        put(
            &mut bytes,
            offset_of!(Self, column_formats),
            &self.column_formats.to_ne_bytes(),
        );
        put(&mut bytes, offset_of!(Self, group), &self.group.to_ne_bytes());
        bytes
    }

    /// Deserialize from the foreign process's layout
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < LABEL_REQUEST_SIZE {
            return None;
        }
        Some(Self {
            mask: u32::from_ne_bytes(take(bytes, offset_of!(Self, mask))),
            item: i32::from_ne_bytes(take(bytes, offset_of!(Self, item))),
            sub_item: i32::from_ne_bytes(take(bytes, offset_of!(Self, sub_item))),
            state: u32::from_ne_bytes(take(bytes, offset_of!(Self, state))),
            state_mask: u32::from_ne_bytes(take(bytes, offset_of!(Self, state_mask))),
            text: usize::from_ne_bytes(take(bytes, offset_of!(Self, text))),
            text_max: i32::from_ne_bytes(take(bytes, offset_of!(Self, text_max))),
            image: i32::from_ne_bytes(take(bytes, offset_of!(Self, image))),
            param: isize::from_ne_bytes(take(bytes, offset_of!(Self, param))),
            indent: i32::from_ne_bytes(take(bytes, offset_of!(Self, indent))),
            group_id: i32::from_ne_bytes(take(bytes, offset_of!(Self, group_id))),
            columns: u32::from_ne_bytes(take(bytes, offset_of!(Self, columns))),
            column_list: usize::from_ne_bytes(take(bytes, offset_of!(Self, column_list))),
            column_formats: usize::from_ne_bytes(take(bytes, offset_of!(Self, column_formats))),
            group: i32::from_ne_bytes(take(bytes, offset_of!(Self, group))),
        })
    }
}

/// A point in screen or client coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
}

impl Point {
    /// Create a point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Serialize as the foreign process's POINT
    pub fn to_bytes(&self) -> [u8; POINT_SIZE] {
        let mut bytes = [0u8; POINT_SIZE];
        bytes[0..4].copy_from_slice(&self.x.to_ne_bytes());
        bytes[4..8].copy_from_slice(&self.y.to_ne_bytes());
        bytes
    }

    /// Deserialize a POINT read back from the foreign process
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < POINT_SIZE {
            return None;
        }
        Some(Self {
            x: i32::from_ne_bytes(take(bytes, 0)),
            y: i32::from_ne_bytes(take(bytes, 4)),
        })
    }
}

/// Pack a position into the lParam of `LVM_SETITEMPOSITION`
///
/// Each axis keeps only its low 16 bits, so anything outside
/// `i16::MIN..=i16::MAX` wraps. Callers that care must range-check first.
pub fn pack_position(x: i32, y: i32) -> isize {
    let lo = (x as u32) & 0xFFFF;
    let hi = (y as u32) & 0xFFFF;
    (lo | (hi << 16)) as usize as isize
}

/// Recover the signed 16-bit halves of a packed position
pub fn unpack_position(lparam: isize) -> (i16, i16) {
    let raw = lparam as usize as u32;
    ((raw & 0xFFFF) as u16 as i16, (raw >> 16) as u16 as i16)
}

/// Decode a UTF-16 label buffer up to its first NUL
pub fn decode_label(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

fn put(bytes: &mut [u8], offset: usize, value: &[u8]) {
    bytes[offset..offset + value.len()].copy_from_slice(value);
}

fn take<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}
