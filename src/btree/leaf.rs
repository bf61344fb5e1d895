//! # Leaf Nodes
//!
//! Leaf nodes store the user rows. After the 14-byte header the page is a
//! packed array of fixed-size cells, each a `u32` key followed by one
//! serialized row, kept sorted by key:
//!
//! ```text
//! +---------------------------+
//! | Leaf header (14 bytes)    |
//! +---------------------------+
//! | Cell 0: key | row (293 B) |   offset 14
//! | Cell 1: key | row         |   offset 14 + 297
//! | ...                       |
//! | Cell 12                   |   last cell a page can hold
//! +---------------------------+
//! | unused tail               |
//! +---------------------------+
//! ```
//!
//! Because cells are fixed-size there is no slot indirection: cell `i`
//! lives at `14 + i * 297` and insertion shifts the tail of the array one
//! cell to the right, high end first.
//!
//! ## Search
//!
//! [`LeafNode::find`] binary-searches the sorted keys over the half-open
//! interval `[lo, hi)` with midpoint `(lo + hi) / 2`. An exact hit returns
//! `Found(i)`; otherwise the search converges on the smallest index whose
//! key exceeds the target, which is exactly the insertion index. That
//! tie-break decides which leaf an equal key lands in after a split, so it
//! must not drift.
//!
//! The views borrow the page buffer: [`LeafNode`] wraps `&[u8]` for reads,
//! [`LeafNodeMut`] wraps `&mut [u8]` for mutation. Construction validates
//! the page size and node type once; accessors after that read headers
//! infallibly.

use eyre::{ensure, Result};

use crate::btree::node::{LeafHeader, NodeType};
use crate::config::{
    LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_KEY_SIZE, LEAF_NODE_MAX_CELLS, PAGE_SIZE,
};
use crate::row::Row;

/// Outcome of a key search in a leaf: either the cell holding the key, or
/// the index where it would be inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
    Found(usize),
    NotFound(usize),
}

impl SearchResult {
    /// The cell index regardless of whether the key was present.
    pub fn index(self) -> usize {
        match self {
            SearchResult::Found(i) | SearchResult::NotFound(i) => i,
        }
    }
}

#[derive(Debug)]
pub struct LeafNode<'a> {
    data: &'a [u8],
}

pub struct LeafNodeMut<'a> {
    data: &'a mut [u8],
}

fn cell_offset(index: usize) -> usize {
    LEAF_NODE_HEADER_SIZE + index * LEAF_NODE_CELL_SIZE
}

impl<'a> LeafNode<'a> {
    pub fn from_page(data: &'a [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = LeafHeader::from_bytes(data)?;
        ensure!(
            header.node_type()? == NodeType::Leaf,
            "expected a leaf page, got {:?}",
            header.node_type()?
        );
        Ok(Self { data })
    }

    fn header(&self) -> &LeafHeader {
        LeafHeader::from_bytes(self.data).unwrap()
    }

    pub fn num_cells(&self) -> u32 {
        self.header().num_cells()
    }

    pub fn next_leaf(&self) -> u32 {
        self.header().next_leaf()
    }

    pub fn is_root(&self) -> bool {
        self.header().is_root()
    }

    pub fn parent(&self) -> u32 {
        self.header().parent()
    }

    fn key_raw(&self, index: usize) -> u32 {
        let offset = cell_offset(index);
        u32::from_le_bytes(
            self.data[offset..offset + LEAF_NODE_KEY_SIZE]
                .try_into()
                .unwrap(),
        )
    }

    pub fn key_at(&self, index: usize) -> Result<u32> {
        ensure!(
            index < self.num_cells() as usize,
            "cell index {} out of bounds (num_cells={})",
            index,
            self.num_cells()
        );
        Ok(self.key_raw(index))
    }

    /// The serialized row stored in cell `index`.
    pub fn value_at(&self, index: usize) -> Result<&'a [u8]> {
        ensure!(
            index < self.num_cells() as usize,
            "cell index {} out of bounds (num_cells={})",
            index,
            self.num_cells()
        );
        let offset = cell_offset(index) + LEAF_NODE_KEY_SIZE;
        Ok(&self.data[offset..offset + LEAF_NODE_CELL_SIZE - LEAF_NODE_KEY_SIZE])
    }

    /// The raw bytes of cell `index` (key and value together).
    pub fn cell_bytes(&self, index: usize) -> Result<&'a [u8]> {
        ensure!(
            index < self.num_cells() as usize,
            "cell index {} out of bounds (num_cells={})",
            index,
            self.num_cells()
        );
        let offset = cell_offset(index);
        Ok(&self.data[offset..offset + LEAF_NODE_CELL_SIZE])
    }

    /// Key of the last cell. The leaf must be non-empty.
    pub fn max_key(&self) -> Result<u32> {
        let num_cells = self.num_cells() as usize;
        ensure!(num_cells > 0, "max key of an empty leaf is undefined");
        Ok(self.key_raw(num_cells - 1))
    }

    pub fn find(&self, key: u32) -> SearchResult {
        let mut min_index = 0usize;
        let mut one_past_max_index = self.num_cells() as usize;

        while one_past_max_index != min_index {
            let index = (min_index + one_past_max_index) / 2;
            let key_at_index = self.key_raw(index);
            if key == key_at_index {
                return SearchResult::Found(index);
            }
            if key < key_at_index {
                one_past_max_index = index;
            } else {
                min_index = index + 1;
            }
        }

        SearchResult::NotFound(min_index)
    }
}

impl<'a> LeafNodeMut<'a> {
    pub fn from_page(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = LeafHeader::from_bytes(data)?;
        ensure!(
            header.node_type()? == NodeType::Leaf,
            "expected a leaf page, got {:?}",
            header.node_type()?
        );
        Ok(Self { data })
    }

    /// Formats `data` as an empty leaf: no cells, no sibling, not root.
    pub fn init(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        LeafHeader::from_bytes_mut(data)?.init();
        Ok(Self { data })
    }

    pub fn as_ref(&self) -> LeafNode<'_> {
        LeafNode { data: self.data }
    }

    fn header_mut(&mut self) -> &mut LeafHeader {
        LeafHeader::from_bytes_mut(self.data).unwrap()
    }

    pub fn num_cells(&self) -> u32 {
        self.as_ref().num_cells()
    }

    pub fn set_num_cells(&mut self, num_cells: u32) {
        self.header_mut().set_num_cells(num_cells);
    }

    pub fn set_next_leaf(&mut self, next_leaf: u32) {
        self.header_mut().set_next_leaf(next_leaf);
    }

    pub fn set_parent(&mut self, parent: u32) {
        self.header_mut().set_parent(parent);
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.header_mut().set_is_root(is_root);
    }

    /// Writes `key` and the serialized `row` into cell `index`,
    /// overwriting whatever is there. Does not touch `num_cells`.
    pub fn write_cell(&mut self, index: usize, key: u32, row: &Row) -> Result<()> {
        ensure!(
            index <= LEAF_NODE_MAX_CELLS,
            "cell index {} beyond leaf capacity",
            index
        );
        let offset = cell_offset(index);
        self.data[offset..offset + LEAF_NODE_KEY_SIZE].copy_from_slice(&key.to_le_bytes());
        row.write_to(&mut self.data[offset + LEAF_NODE_KEY_SIZE..offset + LEAF_NODE_CELL_SIZE])
    }

    /// Copies a raw cell (key and value) into cell `index`.
    pub fn copy_cell_from(&mut self, index: usize, cell: &[u8]) -> Result<()> {
        ensure!(
            cell.len() == LEAF_NODE_CELL_SIZE,
            "cell source has {} bytes, expected {}",
            cell.len(),
            LEAF_NODE_CELL_SIZE
        );
        ensure!(
            index <= LEAF_NODE_MAX_CELLS,
            "cell index {} beyond leaf capacity",
            index
        );
        let offset = cell_offset(index);
        self.data[offset..offset + LEAF_NODE_CELL_SIZE].copy_from_slice(cell);
        Ok(())
    }

    /// Inserts a cell at `index`, shifting later cells right. The leaf
    /// must have room; a full leaf is the caller's cue to split.
    pub fn insert_at(&mut self, index: usize, key: u32, row: &Row) -> Result<()> {
        let num_cells = self.num_cells() as usize;
        ensure!(
            num_cells < LEAF_NODE_MAX_CELLS,
            "insert into a full leaf (num_cells={})",
            num_cells
        );
        ensure!(
            index <= num_cells,
            "insert index {} out of bounds (num_cells={})",
            index,
            num_cells
        );

        if index < num_cells {
            let start = cell_offset(index);
            let end = cell_offset(num_cells);
            self.data.copy_within(start..end, start + LEAF_NODE_CELL_SIZE);
        }

        self.write_cell(index, key, row)?;
        self.set_num_cells(num_cells as u32 + 1);
        Ok(())
    }
}
