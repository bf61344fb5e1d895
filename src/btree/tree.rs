//! # B+Tree Algorithms
//!
//! The tree logic over the pager: descent search, leaf insertion, splits
//! with key promotion, and root management. [`BTree`] borrows the pager
//! and the root page number for the duration of one operation; all state
//! lives in the pages themselves.
//!
//! ## Shape
//!
//! ```text
//!                   [page 0: internal root]
//!                   /          |           \
//!          [leaf]        [leaf]        [leaf]   <- rows live here
//!             └──────────────>└────────────>      (next_leaf chain)
//! ```
//!
//! The root is always page 0. When it splits, its contents move to a
//! freshly allocated page and page 0 is re-initialized as an internal
//! node over the two halves, so the root page number never changes.
//!
//! ## Insert Path
//!
//! ```text
//! 1. Descend from the root, binary-searching separators, to the leaf
//!    that covers the key. The landing cell index is the insertion point.
//! 2. A key already present at that index is a duplicate; nothing is
//!    written.
//! 3. Room in the leaf: shift the tail one cell right, write the cell.
//! 4. Full leaf: split. The virtual array of max+1 cells (old cells plus
//!    the new one at its insertion index) is distributed — the upper half
//!    to a new right sibling, the lower half back onto the old page. The
//!    sibling chain is re-linked through the new leaf.
//! 5. Root leaf split: create a new root. Otherwise the parent's
//!    separator for the old leaf is refreshed and the new sibling is
//!    inserted into the parent, splitting internal nodes upward as
//!    needed.
//! ```
//!
//! ## Split Mechanics
//!
//! A split snapshots the overfull page and rebuilds both halves from the
//! copy, walking the virtual index from the top down. Working from a
//! snapshot sidesteps aliasing between the two destination pages and the
//! source cells.
//!
//! Internal splits follow the same outline with one extra wrinkle: the
//! node's right child has no cell, so it is moved first and the highest
//! remaining cell child is demoted to take its place. Children that move
//! to the new node get their parent pointers rewritten.

use eyre::{ensure, Result};

use crate::btree::internal::{InternalNode, InternalNodeMut};
use crate::btree::leaf::{LeafNode, LeafNodeMut};
use crate::btree::node::{self, NodeType};
use crate::config::{
    INTERNAL_NODE_MAX_KEYS, INVALID_PAGE_NUM, LEAF_NODE_LEFT_SPLIT_COUNT, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_RIGHT_SPLIT_COUNT,
};
use crate::cursor::Cursor;
use crate::row::Row;
use crate::storage::{Page, Pager};

/// Outcome of an insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    Inserted,
    DuplicateKey,
}

#[derive(Debug)]
pub struct BTree<'a> {
    pager: &'a mut Pager,
    root_page: u32,
}

impl<'a> BTree<'a> {
    pub fn new(pager: &'a mut Pager, root_page: u32) -> Self {
        Self { pager, root_page }
    }

    /// Returns a cursor at the cell holding `key`, or at the position
    /// where it would be inserted.
    pub fn find(&mut self, key: u32) -> Result<Cursor> {
        let root_page = self.root_page;
        match node::node_type(self.pager.get_page(root_page)?)? {
            NodeType::Leaf => self.leaf_find(root_page, key),
            NodeType::Internal => self.internal_find(root_page, key),
        }
    }

    fn leaf_find(&mut self, page_num: u32, key: u32) -> Result<Cursor> {
        let page = self.pager.get_page(page_num)?;
        let leaf = LeafNode::from_page(page)?;
        Ok(Cursor {
            page_num,
            cell_num: leaf.find(key).index() as u32,
            end_of_table: false,
        })
    }

    fn internal_find(&mut self, page_num: u32, key: u32) -> Result<Cursor> {
        let child_page = {
            let page = self.pager.get_page(page_num)?;
            let internal = InternalNode::from_page(page)?;
            internal.child_at(internal.find_child_index(key))?
        };
        match node::node_type(self.pager.get_page(child_page)?)? {
            NodeType::Leaf => self.leaf_find(child_page, key),
            NodeType::Internal => self.internal_find(child_page, key),
        }
    }

    /// Inserts `row` keyed by its id. The duplicate check inspects the
    /// landing cell before anything is written, so a rejected insert
    /// leaves the tree untouched.
    pub fn insert(&mut self, row: &Row) -> Result<InsertResult> {
        let key = row.id;
        let cursor = self.find(key)?;

        {
            let page = self.pager.get_page(cursor.page_num)?;
            let leaf = LeafNode::from_page(page)?;
            if cursor.cell_num < leaf.num_cells()
                && leaf.key_at(cursor.cell_num as usize)? == key
            {
                return Ok(InsertResult::DuplicateKey);
            }
        }

        self.leaf_insert(&cursor, key, row)?;
        Ok(InsertResult::Inserted)
    }

    fn leaf_insert(&mut self, cursor: &Cursor, key: u32, row: &Row) -> Result<()> {
        let num_cells = {
            let page = self.pager.get_page(cursor.page_num)?;
            LeafNode::from_page(page)?.num_cells() as usize
        };

        if num_cells >= LEAF_NODE_MAX_CELLS {
            return self.leaf_split_insert(cursor, key, row);
        }

        let page = self.pager.get_page(cursor.page_num)?;
        LeafNodeMut::from_page(page)?.insert_at(cursor.cell_num as usize, key, row)
    }

    /// Splits the full leaf under `cursor` while inserting `(key, row)`,
    /// then promotes the separator into the parent.
    fn leaf_split_insert(&mut self, cursor: &Cursor, key: u32, row: &Row) -> Result<()> {
        let old_page_num = cursor.page_num;
        let old_max = self.max_key(old_page_num)?;
        let new_page_num = self.pager.unused_page_num();

        let snapshot: Box<Page> = Box::new(*self.pager.get_page(old_page_num)?);
        let old_leaf = LeafNode::from_page(&snapshot[..])?;
        let old_is_root = old_leaf.is_root();
        let old_parent = old_leaf.parent();
        let old_next_leaf = old_leaf.next_leaf();

        {
            let page = self.pager.get_page(new_page_num)?;
            let mut new_leaf = LeafNodeMut::init(page)?;
            new_leaf.set_parent(old_parent);
            // The new sibling takes over the old leaf's position in the
            // chain; the old leaf points at the sibling.
            new_leaf.set_next_leaf(old_next_leaf);
        }

        // Distribute the virtual array of max+1 cells, upper half to the
        // new sibling, walking from the top so nothing is overwritten
        // before it is read.
        for i in (0..=LEAF_NODE_MAX_CELLS).rev() {
            let dest_page_num = if i >= LEAF_NODE_LEFT_SPLIT_COUNT {
                new_page_num
            } else {
                old_page_num
            };
            let index_within_node = i % LEAF_NODE_LEFT_SPLIT_COUNT;

            let page = self.pager.get_page(dest_page_num)?;
            let mut destination = LeafNodeMut::from_page(page)?;

            if i == cursor.cell_num as usize {
                destination.write_cell(index_within_node, key, row)?;
            } else if i > cursor.cell_num as usize {
                destination.copy_cell_from(index_within_node, old_leaf.cell_bytes(i - 1)?)?;
            } else {
                destination.copy_cell_from(index_within_node, old_leaf.cell_bytes(i)?)?;
            }
        }

        {
            let page = self.pager.get_page(old_page_num)?;
            let mut old = LeafNodeMut::from_page(page)?;
            old.set_num_cells(LEAF_NODE_LEFT_SPLIT_COUNT as u32);
            old.set_next_leaf(new_page_num);
        }
        {
            let page = self.pager.get_page(new_page_num)?;
            LeafNodeMut::from_page(page)?.set_num_cells(LEAF_NODE_RIGHT_SPLIT_COUNT as u32);
        }

        if old_is_root {
            self.create_new_root(new_page_num)
        } else {
            let new_max = self.max_key(old_page_num)?;
            {
                let page = self.pager.get_page(old_parent)?;
                InternalNodeMut::from_page(page)?.update_key(old_max, new_max)?;
            }
            self.internal_insert(old_parent, new_page_num)
        }
    }

    /// Rebuilds page 0 as an internal root over its relocated old
    /// contents and the new right child produced by a split.
    fn create_new_root(&mut self, right_child_page_num: u32) -> Result<()> {
        let root_page_num = self.root_page;
        // Materialize the right child before allocating the left child:
        // an internal split hands in a page number that is still at the
        // tail, and the left child must not collide with it.
        self.pager.get_page(right_child_page_num)?;
        let left_child_page_num = self.pager.unused_page_num();

        let root_snapshot: Box<Page> = Box::new(*self.pager.get_page(root_page_num)?);
        let root_was_internal =
            node::node_type(&root_snapshot[..])? == NodeType::Internal;

        // An internal split hands us a still-blank right child; a leaf
        // split hands us a populated sibling.
        if root_was_internal {
            let page = self.pager.get_page(right_child_page_num)?;
            InternalNodeMut::init(page)?;
        }

        {
            let page = self.pager.get_page(left_child_page_num)?;
            page.copy_from_slice(&root_snapshot[..]);
            node::set_node_root(page, false)?;
        }

        // The old root's children now hang under the left child.
        if root_was_internal {
            let children = {
                let page = self.pager.get_page(left_child_page_num)?;
                let left = InternalNode::from_page(page)?;
                (0..=left.num_keys() as usize)
                    .map(|i| left.child_at(i))
                    .collect::<Result<Vec<u32>>>()?
            };
            for child in children {
                node::set_node_parent(self.pager.get_page(child)?, left_child_page_num)?;
            }
        }

        let left_max = self.max_key(left_child_page_num)?;
        {
            let page = self.pager.get_page(root_page_num)?;
            let mut root = InternalNodeMut::init(page)?;
            root.set_is_root(true);
            root.set_num_keys(1);
            root.set_cell(0, left_child_page_num, left_max)?;
            root.set_right_child(right_child_page_num);
        }

        node::set_node_parent(self.pager.get_page(left_child_page_num)?, root_page_num)?;
        node::set_node_parent(self.pager.get_page(right_child_page_num)?, root_page_num)?;
        Ok(())
    }

    /// Adds `child_page_num` to the internal node at `parent_page_num`,
    /// keyed by the child's maximum key.
    fn internal_insert(&mut self, parent_page_num: u32, child_page_num: u32) -> Result<()> {
        let child_max = self.max_key(child_page_num)?;

        let (index, original_num_keys, right_child_page) = {
            let page = self.pager.get_page(parent_page_num)?;
            let parent = InternalNode::from_page(page)?;
            (
                parent.find_child_index(child_max),
                parent.num_keys() as usize,
                parent.right_child(),
            )
        };

        if original_num_keys >= INTERNAL_NODE_MAX_KEYS {
            return self.internal_split_insert(parent_page_num, child_page_num);
        }

        if right_child_page == INVALID_PAGE_NUM {
            // An internal node without a right child is empty.
            let page = self.pager.get_page(parent_page_num)?;
            InternalNodeMut::from_page(page)?.set_right_child(child_page_num);
            return Ok(());
        }

        let right_max = self.max_key(right_child_page)?;

        let page = self.pager.get_page(parent_page_num)?;
        let mut parent = InternalNodeMut::from_page(page)?;
        parent.set_num_keys(original_num_keys as u32 + 1);

        if child_max > right_max {
            // The new child outranks the right child: demote the old
            // right child into the cell array and take its place.
            parent.set_cell(original_num_keys, right_child_page, right_max)?;
            parent.set_right_child(child_page_num);
        } else {
            for i in ((index + 1)..=original_num_keys).rev() {
                parent.copy_cell(i - 1, i)?;
            }
            parent.set_cell(index, child_page_num, child_max)?;
        }
        Ok(())
    }

    /// Splits a full internal node while inserting `child_page_num`.
    fn internal_split_insert(&mut self, page_to_split: u32, child_page_num: u32) -> Result<()> {
        let mut old_page_num = page_to_split;
        let old_max = self.max_key(old_page_num)?;
        let child_max = self.max_key(child_page_num)?;
        let new_page_num = self.pager.unused_page_num();

        // Splitting the root folds the new node into the fresh root right
        // away; any other split has to insert it into the parent at the
        // end, once the old node's keys have moved over.
        let splitting_root = node::is_node_root(self.pager.get_page(old_page_num)?)?;

        if splitting_root {
            self.create_new_root(new_page_num)?;
            // The contents we are splitting were relocated to the new
            // root's first child.
            let root_page = self.root_page;
            let page = self.pager.get_page(root_page)?;
            old_page_num = InternalNode::from_page(page)?.child_at(0)?;
        } else {
            let page = self.pager.get_page(new_page_num)?;
            InternalNodeMut::init(page)?;
        }

        // Move the old node's right child over first and leave the old
        // node temporarily without one.
        {
            let moved = {
                let page = self.pager.get_page(old_page_num)?;
                let old = InternalNode::from_page(page)?;
                ensure!(
                    old.right_child() != INVALID_PAGE_NUM,
                    "splitting an internal node with no right child"
                );
                old.right_child()
            };
            self.internal_insert(new_page_num, moved)?;
            node::set_node_parent(self.pager.get_page(moved)?, new_page_num)?;
            let page = self.pager.get_page(old_page_num)?;
            InternalNodeMut::from_page(page)?.set_right_child(INVALID_PAGE_NUM);
        }

        // Keys above the middle follow, one at a time.
        for i in ((INTERNAL_NODE_MAX_KEYS / 2 + 1)..INTERNAL_NODE_MAX_KEYS).rev() {
            let moved = {
                let page = self.pager.get_page(old_page_num)?;
                InternalNode::from_page(page)?.child_at(i)?
            };
            self.internal_insert(new_page_num, moved)?;
            node::set_node_parent(self.pager.get_page(moved)?, new_page_num)?;

            let page = self.pager.get_page(old_page_num)?;
            let mut old = InternalNodeMut::from_page(page)?;
            let num_keys = old.num_keys();
            old.set_num_keys(num_keys - 1);
        }

        // Demote the highest remaining child to be the right child.
        {
            let page = self.pager.get_page(old_page_num)?;
            let mut old = InternalNodeMut::from_page(page)?;
            let num_keys = old.num_keys() as usize;
            let demoted = old.as_ref().child_at(num_keys - 1)?;
            old.set_right_child(demoted);
            old.set_num_keys(num_keys as u32 - 1);
        }

        // The pending child goes into whichever half now covers its keys.
        let max_after_split = self.max_key(old_page_num)?;
        let destination_page_num = if child_max < max_after_split {
            old_page_num
        } else {
            new_page_num
        };
        self.internal_insert(destination_page_num, child_page_num)?;
        node::set_node_parent(self.pager.get_page(child_page_num)?, destination_page_num)?;

        // Refresh the old node's separator in its parent, and hook the
        // new node in next to it when this was not a root split.
        let parent_page_num = node::node_parent(self.pager.get_page(old_page_num)?)?;
        let new_old_max = self.max_key(old_page_num)?;
        {
            let page = self.pager.get_page(parent_page_num)?;
            InternalNodeMut::from_page(page)?.update_key(old_max, new_old_max)?;
        }

        if !splitting_root {
            // Parent pointer first: if the parent is itself full, the
            // recursive insert re-homes the new node and must be the one
            // that writes the final value.
            node::set_node_parent(self.pager.get_page(new_page_num)?, parent_page_num)?;
            self.internal_insert(parent_page_num, new_page_num)?;
        }
        Ok(())
    }

    /// Largest key in the subtree rooted at `page_num`: the last cell of
    /// a leaf, or the recursive maximum under an internal node's right
    /// child.
    fn max_key(&mut self, page_num: u32) -> Result<u32> {
        match node::node_type(self.pager.get_page(page_num)?)? {
            NodeType::Leaf => {
                let page = self.pager.get_page(page_num)?;
                LeafNode::from_page(page)?.max_key()
            }
            NodeType::Internal => {
                let right_child = {
                    let page = self.pager.get_page(page_num)?;
                    InternalNode::from_page(page)?.right_child()
                };
                ensure!(
                    right_child != INVALID_PAGE_NUM,
                    "max key of an internal node with no right child is undefined"
                );
                self.max_key(right_child)
            }
        }
    }

    /// Renders the tree structure, one node per line, children indented
    /// under their parent.
    pub fn render(&mut self) -> Result<String> {
        let mut out = String::new();
        self.render_node(self.root_page, 0, &mut out)?;
        Ok(out)
    }

    fn render_node(&mut self, page_num: u32, depth: usize, out: &mut String) -> Result<()> {
        use std::fmt::Write;

        match node::node_type(self.pager.get_page(page_num)?)? {
            NodeType::Leaf => {
                let keys = {
                    let page = self.pager.get_page(page_num)?;
                    let leaf = LeafNode::from_page(page)?;
                    (0..leaf.num_cells() as usize)
                        .map(|i| leaf.key_at(i))
                        .collect::<Result<Vec<u32>>>()?
                };
                writeln!(out, "{}- leaf (size {})", "  ".repeat(depth), keys.len())?;
                for key in keys {
                    writeln!(out, "{}- {}", "  ".repeat(depth + 1), key)?;
                }
            }
            NodeType::Internal => {
                let (keys, children) = {
                    let page = self.pager.get_page(page_num)?;
                    let internal = InternalNode::from_page(page)?;
                    let num_keys = internal.num_keys() as usize;
                    let keys = (0..num_keys)
                        .map(|i| internal.key_at(i))
                        .collect::<Result<Vec<u32>>>()?;
                    let children = (0..=num_keys)
                        .map(|i| internal.child_at(i))
                        .collect::<Result<Vec<u32>>>()?;
                    (keys, children)
                };
                writeln!(out, "{}- internal (size {})", "  ".repeat(depth), keys.len())?;
                for (i, key) in keys.iter().enumerate() {
                    self.render_node(children[i], depth + 1, out)?;
                    writeln!(out, "{}- key {}", "  ".repeat(depth + 1), key)?;
                }
                if let Some(right_child) = children.last() {
                    self.render_node(*right_child, depth + 1, out)?;
                }
            }
        }
        Ok(())
    }
}
