//! Loop
//!
//! Grounded on the natural-loop-body and depth-via-containment algorithms in
//! `ControlFlow.cpp`/`Loop.cpp`, with the off-by-one in the source's
//! last-block predicate corrected per spec.md §9's REDESIGN FLAG (the depth
//! containment check here excludes self via index inequality, not the
//! source's buggy `count == idx - 1` form).

use crate::bitset::Bitset;

#[derive(Debug, Clone)]
pub struct Loop {
    pub index: usize,
    pub head_block: usize,
    pub tail_block: usize,
    pub members: Bitset,
    pub depth: u32,
}

impl Loop {
    pub fn new(index: usize, head_block: usize, tail_block: usize, members: Bitset) -> Self {
        Self { index, head_block, tail_block, members, depth: 0 }
    }

    pub fn head(&self) -> usize {
        self.head_block
    }

    pub fn tail(&self) -> usize {
        self.tail_block
    }

    pub fn has_block(&self, block_index: usize) -> bool {
        self.members.has(block_index)
    }

    pub fn count_blocks(&self) -> usize {
        self.members.count_ones()
    }

    /// `true` iff `other` strictly contains this loop's members (used to
    /// compute depth: `depth(L) = 1 + #{L' != L : L.members ⊆ L'.members}`).
    pub fn is_child_of(&self, other: &Loop) -> bool {
        self.index != other.index && self.members.is_subset_of(&other.members)
    }
}
