//! BasicBlock
//!
//! Owns no instructions directly (the arena does); holds the index range
//! into `ControlFlow::instructions` plus non-owning successor/predecessor
//! edges, matching the index-based arena design in spec.md §9.

use smallvec::SmallVec;

#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub function_index: usize,
    pub index: usize,
    pub address: u64,
    /// Flat indices into `ControlFlow::instructions`, in program order.
    pub instruction_indices: Vec<usize>,
    pub successors: SmallVec<[usize; 2]>,
    pub predecessors: SmallVec<[usize; 2]>,
    pub reachable: bool,
    pub loop_index: Option<usize>,
}

impl BasicBlock {
    pub fn new(function_index: usize, index: usize, address: u64) -> Self {
        Self {
            function_index,
            index,
            address,
            instruction_indices: Vec::new(),
            successors: SmallVec::new(),
            predecessors: SmallVec::new(),
            reachable: false,
            loop_index: None,
        }
    }

    pub fn is_head(&self) -> bool {
        self.index == 0
    }

    /// `true` iff `count == idx + 1`, i.e. this is the last block. The
    /// source this is grounded on computes the equivalent check as
    /// `count == idx - 1`, which is off by one; spec.md calls that out
    /// explicitly as a bug to correct.
    pub fn is_tail(&self, block_count: usize) -> bool {
        block_count == self.index + 1
    }

    pub fn has_fallthrough_target(&self, size: u64) -> bool {
        self.successors.iter().any(|&s| s != self.index) && size > 0
    }

    pub fn size(&self, instruction_size_at: impl Fn(usize) -> u8) -> u64 {
        self.instruction_indices.iter().map(|&i| instruction_size_at(i) as u64).sum()
    }
}
