//! # Layout Constants
//!
//! This module centralizes every on-disk layout value. Constants that derive
//! from each other are co-located and the derivations are pinned by
//! compile-time assertions, so a change to one value cannot silently skew
//! the file format.
//!
//! ## Dependency Graph
//!
//! ```text
//! PAGE_SIZE (4096 bytes)
//!       │
//!       ├─> LEAF_NODE_SPACE_FOR_CELLS (PAGE_SIZE - LEAF_NODE_HEADER_SIZE)
//!       │         │
//!       │         └─> LEAF_NODE_MAX_CELLS (13 with the fixed row schema)
//!       │                   │
//!       │                   └─> LEAF_NODE_RIGHT/LEFT_SPLIT_COUNT (7 / 7)
//!       │
//!       └─> TABLE_MAX_PAGES bounds the page cache and the file
//!
//! ROW_SIZE (293 bytes)
//!       │
//!       └─> LEAF_NODE_CELL_SIZE (key + serialized row = 297)
//! ```
//!
//! ## Row Layout (293 bytes)
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  --------------------------------------
//! 0       4     id (u32, little-endian)
//! 4       33    username (NUL-padded, 32 bytes of text)
//! 37      256   email (NUL-padded, 255 bytes of text)
//! ```
//!
//! ## Node Header Layouts
//!
//! Every node starts with a 6-byte common header; leaf and internal nodes
//! extend it to 14 bytes:
//!
//! ```text
//! Offset  Size  Common          Leaf             Internal
//! ------  ----  --------------  ---------------  ---------------
//! 0       1     node_type       node_type        node_type
//! 1       1     is_root         is_root          is_root
//! 2       4     parent          parent           parent
//! 6       4                     num_cells        num_keys
//! 10      4                     next_leaf        right_child
//! 14            cells: (u32 key, 293-byte row)   cells: (u32 child, u32 key)
//! ```

// ============================================================================
// PAGE GEOMETRY
// ============================================================================

/// Size of every database page in bytes. The file is a flat sequence of
/// pages and its length is always a whole multiple of this.
pub const PAGE_SIZE: usize = 4096;

/// Upper bound on the number of pages a table may occupy. Also the length
/// of the pager's in-memory slot array.
pub const TABLE_MAX_PAGES: usize = 100;

/// Page number of the root node. The root stays at page 0 across all
/// splits; splitting the root relocates its contents instead.
pub const ROOT_PAGE_NUM: u32 = 0;

/// Sentinel for an internal node's missing right child. The root lives at
/// page 0, so 0 cannot double as "no child" the way it does for leaf
/// sibling pointers.
pub const INVALID_PAGE_NUM: u32 = u32::MAX;

// ============================================================================
// ROW LAYOUT
// ============================================================================

/// Maximum username length in bytes (text, excluding the NUL terminator).
pub const COLUMN_USERNAME_SIZE: usize = 32;

/// Maximum email length in bytes (text, excluding the NUL terminator).
pub const COLUMN_EMAIL_SIZE: usize = 255;

/// Serialized size of the id column.
pub const ID_SIZE: usize = 4;

/// Serialized size of the username field, including the NUL terminator.
pub const USERNAME_CAPACITY: usize = COLUMN_USERNAME_SIZE + 1;

/// Serialized size of the email field, including the NUL terminator.
pub const EMAIL_CAPACITY: usize = COLUMN_EMAIL_SIZE + 1;

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_CAPACITY;

/// Serialized size of a full row.
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_CAPACITY + EMAIL_CAPACITY;

const _: () = assert!(ROW_SIZE == 293, "row layout drifted from the file format");

// ============================================================================
// NODE HEADERS
// ============================================================================

/// Size of the header shared by both node types: type byte, root flag,
/// parent page number.
pub const COMMON_NODE_HEADER_SIZE: usize = 1 + 1 + 4;

/// Leaf header: common header plus num_cells and next_leaf.
pub const LEAF_NODE_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE + 4 + 4;

/// Internal header: common header plus num_keys and right_child.
pub const INTERNAL_NODE_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE + 4 + 4;

// ============================================================================
// LEAF NODE BODY
// ============================================================================

/// Size of a leaf cell key.
pub const LEAF_NODE_KEY_SIZE: usize = 4;

/// Size of a leaf cell value (one serialized row).
pub const LEAF_NODE_VALUE_SIZE: usize = ROW_SIZE;

/// Size of a full leaf cell.
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + LEAF_NODE_VALUE_SIZE;

/// Bytes available for cells after the leaf header.
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;

/// Cells a leaf can hold at rest. One more forces a split.
pub const LEAF_NODE_MAX_CELLS: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;

/// Cells the new right sibling receives in a split of the virtual
/// (max + 1)-cell array.
pub const LEAF_NODE_RIGHT_SPLIT_COUNT: usize = (LEAF_NODE_MAX_CELLS + 1) / 2;

/// Cells the original leaf keeps in a split.
pub const LEAF_NODE_LEFT_SPLIT_COUNT: usize =
    (LEAF_NODE_MAX_CELLS + 1) - LEAF_NODE_RIGHT_SPLIT_COUNT;

const _: () = assert!(LEAF_NODE_MAX_CELLS == 13, "leaf fanout drifted from the file format");

const _: () = assert!(
    LEAF_NODE_LEFT_SPLIT_COUNT + LEAF_NODE_RIGHT_SPLIT_COUNT == LEAF_NODE_MAX_CELLS + 1,
    "split counts must cover the virtual cell array exactly"
);

const _: () = assert!(
    LEAF_NODE_HEADER_SIZE + LEAF_NODE_MAX_CELLS * LEAF_NODE_CELL_SIZE <= PAGE_SIZE,
    "a full leaf must fit in one page"
);

// ============================================================================
// INTERNAL NODE BODY
// ============================================================================

/// Size of an internal cell's child page number.
pub const INTERNAL_NODE_CHILD_SIZE: usize = 4;

/// Size of an internal cell's key.
pub const INTERNAL_NODE_KEY_SIZE: usize = 4;

/// Size of a full internal cell.
pub const INTERNAL_NODE_CELL_SIZE: usize = INTERNAL_NODE_CHILD_SIZE + INTERNAL_NODE_KEY_SIZE;

/// Maximum keys in an internal node. Kept low so multi-level splits occur
/// with small data sets.
pub const INTERNAL_NODE_MAX_KEYS: usize = 3;

const _: () = assert!(
    INTERNAL_NODE_HEADER_SIZE + (INTERNAL_NODE_MAX_KEYS + 1) * INTERNAL_NODE_CELL_SIZE <= PAGE_SIZE,
    "a full internal node must fit in one page"
);
