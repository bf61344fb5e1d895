//! # Node Headers
//!
//! Every page holding a tree node starts with a 6-byte common header; leaf
//! and internal nodes extend it to 14 bytes. The header structs below are
//! `zerocopy` views parsed in place from page buffers, with all multi-byte
//! fields as explicit little-endian types — the on-disk format never
//! depends on host byte order or struct padding.
//!
//! ```text
//! Offset  Size  Common       Leaf          Internal
//! ------  ----  -----------  ------------  ------------
//! 0       1     node_type    node_type     node_type
//! 1       1     is_root      is_root       is_root
//! 2       4     parent       parent        parent
//! 6       4                  num_cells     num_keys
//! 10      4                  next_leaf     right_child
//! ```
//!
//! `node_type` is 0 for internal nodes and 1 for leaves. `next_leaf` uses
//! 0 as the "no sibling" sentinel (the root occupies page 0, so no leaf
//! can ever point there); `right_child` instead uses
//! [`INVALID_PAGE_NUM`](crate::config::INVALID_PAGE_NUM) because an
//! internal node's right child legitimately starts out unset.

use eyre::{bail, ensure, Result};
use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::{
    COMMON_NODE_HEADER_SIZE, INTERNAL_NODE_HEADER_SIZE, LEAF_NODE_HEADER_SIZE,
};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Internal = 0,
    Leaf = 1,
}

impl NodeType {
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(NodeType::Internal),
            1 => Ok(NodeType::Leaf),
            other => bail!("invalid node type byte {:#04x}", other),
        }
    }
}

/// The 6-byte header shared by both node types.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct NodeHeader {
    node_type: u8,
    is_root: u8,
    parent: U32<LittleEndian>,
}

/// The full 14-byte leaf header.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct LeafHeader {
    node_type: u8,
    is_root: u8,
    parent: U32<LittleEndian>,
    num_cells: U32<LittleEndian>,
    next_leaf: U32<LittleEndian>,
}

/// The full 14-byte internal-node header.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct InternalHeader {
    node_type: u8,
    is_root: u8,
    parent: U32<LittleEndian>,
    num_keys: U32<LittleEndian>,
    right_child: U32<LittleEndian>,
}

const _: () = assert!(size_of::<NodeHeader>() == COMMON_NODE_HEADER_SIZE);
const _: () = assert!(size_of::<LeafHeader>() == LEAF_NODE_HEADER_SIZE);
const _: () = assert!(size_of::<InternalHeader>() == INTERNAL_NODE_HEADER_SIZE);

macro_rules! header_from_bytes {
    ($name:ident) => {
        impl $name {
            pub fn from_bytes(data: &[u8]) -> Result<&Self> {
                ensure!(
                    data.len() >= size_of::<Self>(),
                    "buffer too small for {}: {} < {}",
                    stringify!($name),
                    data.len(),
                    size_of::<Self>()
                );
                Self::ref_from_bytes(&data[..size_of::<Self>()])
                    .map_err(|e| eyre::eyre!("failed to read {}: {:?}", stringify!($name), e))
            }

            pub fn from_bytes_mut(data: &mut [u8]) -> Result<&mut Self> {
                ensure!(
                    data.len() >= size_of::<Self>(),
                    "buffer too small for {}: {} < {}",
                    stringify!($name),
                    data.len(),
                    size_of::<Self>()
                );
                Self::mut_from_bytes(&mut data[..size_of::<Self>()])
                    .map_err(|e| eyre::eyre!("failed to read {}: {:?}", stringify!($name), e))
            }
        }
    };
}

header_from_bytes!(NodeHeader);
header_from_bytes!(LeafHeader);
header_from_bytes!(InternalHeader);

impl NodeHeader {
    pub fn node_type(&self) -> Result<NodeType> {
        NodeType::from_byte(self.node_type)
    }

    pub fn is_root(&self) -> bool {
        self.is_root != 0
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.is_root = is_root as u8;
    }

    pub fn parent(&self) -> u32 {
        self.parent.get()
    }

    pub fn set_parent(&mut self, parent: u32) {
        self.parent = U32::new(parent);
    }
}

impl LeafHeader {
    pub fn init(&mut self) {
        self.node_type = NodeType::Leaf as u8;
        self.is_root = 0;
        self.parent = U32::new(0);
        self.num_cells = U32::new(0);
        self.next_leaf = U32::new(0);
    }

    pub fn node_type(&self) -> Result<NodeType> {
        NodeType::from_byte(self.node_type)
    }

    pub fn is_root(&self) -> bool {
        self.is_root != 0
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.is_root = is_root as u8;
    }

    pub fn parent(&self) -> u32 {
        self.parent.get()
    }

    pub fn set_parent(&mut self, parent: u32) {
        self.parent = U32::new(parent);
    }

    pub fn num_cells(&self) -> u32 {
        self.num_cells.get()
    }

    pub fn set_num_cells(&mut self, num_cells: u32) {
        self.num_cells = U32::new(num_cells);
    }

    pub fn next_leaf(&self) -> u32 {
        self.next_leaf.get()
    }

    pub fn set_next_leaf(&mut self, next_leaf: u32) {
        self.next_leaf = U32::new(next_leaf);
    }
}

impl InternalHeader {
    pub fn init(&mut self, right_child: u32) {
        self.node_type = NodeType::Internal as u8;
        self.is_root = 0;
        self.parent = U32::new(0);
        self.num_keys = U32::new(0);
        self.right_child = U32::new(right_child);
    }

    pub fn node_type(&self) -> Result<NodeType> {
        NodeType::from_byte(self.node_type)
    }

    pub fn is_root(&self) -> bool {
        self.is_root != 0
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.is_root = is_root as u8;
    }

    pub fn parent(&self) -> u32 {
        self.parent.get()
    }

    pub fn set_parent(&mut self, parent: u32) {
        self.parent = U32::new(parent);
    }

    pub fn num_keys(&self) -> u32 {
        self.num_keys.get()
    }

    pub fn set_num_keys(&mut self, num_keys: u32) {
        self.num_keys = U32::new(num_keys);
    }

    pub fn right_child(&self) -> u32 {
        self.right_child.get()
    }

    pub fn set_right_child(&mut self, right_child: u32) {
        self.right_child = U32::new(right_child);
    }
}

/// Reads the node type of the node stored in `page`.
pub fn node_type(page: &[u8]) -> Result<NodeType> {
    NodeHeader::from_bytes(page)?.node_type()
}

/// Reads the root flag of the node stored in `page`.
pub fn is_node_root(page: &[u8]) -> Result<bool> {
    Ok(NodeHeader::from_bytes(page)?.is_root())
}

/// Sets the root flag of the node stored in `page`.
pub fn set_node_root(page: &mut [u8], is_root: bool) -> Result<()> {
    NodeHeader::from_bytes_mut(page)?.set_is_root(is_root);
    Ok(())
}

/// Reads the parent page number of the node stored in `page`.
pub fn node_parent(page: &[u8]) -> Result<u32> {
    Ok(NodeHeader::from_bytes(page)?.parent())
}

/// Sets the parent page number of the node stored in `page`.
pub fn set_node_parent(page: &mut [u8], parent: u32) -> Result<()> {
    NodeHeader::from_bytes_mut(page)?.set_parent(parent);
    Ok(())
}
