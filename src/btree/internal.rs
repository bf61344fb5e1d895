//! # Internal Nodes
//!
//! Internal nodes route searches. After the 14-byte header the page holds
//! a packed array of `(child_page: u32, key: u32)` cells plus the
//! header's right-child pointer, giving `num_keys + 1` children:
//!
//! ```text
//! +-----------------------------+
//! | Internal header (14 bytes)  |   right_child lives in the header
//! +-----------------------------+
//! | Cell 0: child | key         |   offset 14
//! | Cell 1: child | key         |   offset 22
//! | ...                         |
//! +-----------------------------+
//! ```
//!
//! Routing invariant: every key in the subtree at `child(i)` is `<=`
//! `key(i)`, and every key under the right child is greater than the last
//! key. [`InternalNode::find_child_index`] binary-searches for the
//! smallest index whose key is `>=` the target; index `num_keys` means
//! the right child.
//!
//! A freshly initialized internal node has its right child set to
//! [`INVALID_PAGE_NUM`]: the root lives at page 0, so a zeroed pointer
//! would silently make the node a parent of the root.

use eyre::{bail, ensure, Result};

use crate::btree::node::{InternalHeader, NodeType};
use crate::config::{
    INTERNAL_NODE_CELL_SIZE, INTERNAL_NODE_CHILD_SIZE, INTERNAL_NODE_HEADER_SIZE,
    INTERNAL_NODE_MAX_KEYS, INVALID_PAGE_NUM, PAGE_SIZE,
};

#[derive(Debug)]
pub struct InternalNode<'a> {
    data: &'a [u8],
}

pub struct InternalNodeMut<'a> {
    data: &'a mut [u8],
}

fn cell_offset(index: usize) -> usize {
    INTERNAL_NODE_HEADER_SIZE + index * INTERNAL_NODE_CELL_SIZE
}

impl<'a> InternalNode<'a> {
    pub fn from_page(data: &'a [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = InternalHeader::from_bytes(data)?;
        ensure!(
            header.node_type()? == NodeType::Internal,
            "expected an internal page, got {:?}",
            header.node_type()?
        );
        Ok(Self { data })
    }

    fn header(&self) -> &InternalHeader {
        InternalHeader::from_bytes(self.data).unwrap()
    }

    pub fn num_keys(&self) -> u32 {
        self.header().num_keys()
    }

    pub fn right_child(&self) -> u32 {
        self.header().right_child()
    }

    pub fn is_root(&self) -> bool {
        self.header().is_root()
    }

    pub fn parent(&self) -> u32 {
        self.header().parent()
    }

    fn key_raw(&self, index: usize) -> u32 {
        let offset = cell_offset(index) + INTERNAL_NODE_CHILD_SIZE;
        u32::from_le_bytes(self.data[offset..offset + 4].try_into().unwrap())
    }

    fn child_raw(&self, index: usize) -> u32 {
        let offset = cell_offset(index);
        u32::from_le_bytes(self.data[offset..offset + 4].try_into().unwrap())
    }

    pub fn key_at(&self, index: usize) -> Result<u32> {
        ensure!(
            index < self.num_keys() as usize,
            "key index {} out of bounds (num_keys={})",
            index,
            self.num_keys()
        );
        Ok(self.key_raw(index))
    }

    /// Child pointer for slot `index`. Index `num_keys` resolves to the
    /// right child; anything past that is a fatal error.
    pub fn child_at(&self, index: usize) -> Result<u32> {
        let num_keys = self.num_keys() as usize;
        if index > num_keys {
            bail!(
                "tried to access child {} of an internal node with {} keys",
                index,
                num_keys
            );
        }
        let child = if index == num_keys {
            self.right_child()
        } else {
            self.child_raw(index)
        };
        ensure!(
            child != INVALID_PAGE_NUM,
            "child {} of internal node is not initialized",
            index
        );
        Ok(child)
    }

    /// Key of the last cell. Distinct from the subtree maximum, which
    /// lives under the right child.
    pub fn max_key(&self) -> Result<u32> {
        let num_keys = self.num_keys() as usize;
        ensure!(num_keys > 0, "max key of an empty internal node is undefined");
        Ok(self.key_raw(num_keys - 1))
    }

    /// Index of the child whose subtree should contain `key`: the
    /// smallest index with `key_at(index) >= key`, or `num_keys` for the
    /// right child.
    pub fn find_child_index(&self, key: u32) -> usize {
        let mut min_index = 0usize;
        let mut max_index = self.num_keys() as usize;

        while min_index != max_index {
            let index = (min_index + max_index) / 2;
            let key_to_right = self.key_raw(index);
            if key_to_right >= key {
                max_index = index;
            } else {
                min_index = index + 1;
            }
        }

        min_index
    }
}

impl<'a> InternalNodeMut<'a> {
    pub fn from_page(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = InternalHeader::from_bytes(data)?;
        ensure!(
            header.node_type()? == NodeType::Internal,
            "expected an internal page, got {:?}",
            header.node_type()?
        );
        Ok(Self { data })
    }

    /// Formats `data` as an empty internal node with no right child.
    pub fn init(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        InternalHeader::from_bytes_mut(data)?.init(INVALID_PAGE_NUM);
        Ok(Self { data })
    }

    pub fn as_ref(&self) -> InternalNode<'_> {
        InternalNode { data: self.data }
    }

    fn header_mut(&mut self) -> &mut InternalHeader {
        InternalHeader::from_bytes_mut(self.data).unwrap()
    }

    pub fn num_keys(&self) -> u32 {
        self.as_ref().num_keys()
    }

    pub fn right_child(&self) -> u32 {
        self.as_ref().right_child()
    }

    pub fn set_num_keys(&mut self, num_keys: u32) {
        self.header_mut().set_num_keys(num_keys);
    }

    pub fn set_right_child(&mut self, right_child: u32) {
        self.header_mut().set_right_child(right_child);
    }

    pub fn set_parent(&mut self, parent: u32) {
        self.header_mut().set_parent(parent);
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.header_mut().set_is_root(is_root);
    }

    /// Writes a `(child, key)` cell at `index`, ignoring `num_keys`.
    pub fn set_cell(&mut self, index: usize, child: u32, key: u32) -> Result<()> {
        ensure!(
            index <= INTERNAL_NODE_MAX_KEYS,
            "cell index {} beyond internal node capacity",
            index
        );
        let offset = cell_offset(index);
        self.data[offset..offset + 4].copy_from_slice(&child.to_le_bytes());
        self.data[offset + 4..offset + 8].copy_from_slice(&key.to_le_bytes());
        Ok(())
    }

    pub fn set_key(&mut self, index: usize, key: u32) -> Result<()> {
        ensure!(
            index < self.num_keys() as usize,
            "key index {} out of bounds (num_keys={})",
            index,
            self.num_keys()
        );
        let offset = cell_offset(index) + INTERNAL_NODE_CHILD_SIZE;
        self.data[offset..offset + 4].copy_from_slice(&key.to_le_bytes());
        Ok(())
    }

    /// Copies the cell at `from` over the cell at `to`.
    pub fn copy_cell(&mut self, from: usize, to: usize) -> Result<()> {
        ensure!(
            from <= INTERNAL_NODE_MAX_KEYS && to <= INTERNAL_NODE_MAX_KEYS,
            "cell copy {} -> {} beyond internal node capacity",
            from,
            to
        );
        self.data
            .copy_within(cell_offset(from)..cell_offset(from) + INTERNAL_NODE_CELL_SIZE, cell_offset(to));
        Ok(())
    }

    /// Rewrites the separator that currently equals `old_key`. A key
    /// greater than every separator belongs to the right child and has no
    /// cell to rewrite, so it is left alone.
    pub fn update_key(&mut self, old_key: u32, new_key: u32) -> Result<()> {
        let index = self.as_ref().find_child_index(old_key);
        if index < self.num_keys() as usize {
            self.set_key(index, new_key)?;
        }
        Ok(())
    }
}
