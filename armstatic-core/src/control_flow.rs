//! ControlFlow
//!
//! Block wiring, dominators, back-edge detection, and natural-loop recovery,
//! grounded directly on the worklist/DFS algorithms in `ControlFlow.cpp`.
//! `findBasicBlock`/`findInstruction` use binary search here rather than the
//! source's linear scan with its TODO, per spec.md §9's REDESIGN FLAG — both
//! vectors are maintained sorted by address.

use std::collections::HashMap;

use crate::basic_block::BasicBlock;
use crate::bitset::Bitset;
use crate::instruction::Instruction;
use crate::loop_info::Loop;

#[derive(Debug, Clone)]
pub struct ControlFlow {
    pub function_index: usize,
    pub blocks: Vec<BasicBlock>,
    pub instructions: Vec<Instruction>,
    pub loops: Vec<Loop>,
    dominators: Vec<Bitset>,
}

impl ControlFlow {
    /// Build from a function's decoded instruction stream and precomputed
    /// leader addresses (§4.3 step 6/7 happen in `Function::disassemble`;
    /// this takes the already-partitioned leaders and wires the graph).
    pub fn build(
        function_index: usize,
        mut instructions: Vec<Instruction>,
        leader_addresses: &[u64],
        func_vaddr: u64,
        func_size: u64,
    ) -> Self {
        let mut blocks: Vec<BasicBlock> = Vec::with_capacity(leader_addresses.len());
        for (i, &addr) in leader_addresses.iter().enumerate() {
            blocks.push(BasicBlock::new(function_index, i, addr));
        }

        let block_at_address: HashMap<u64, usize> =
            leader_addresses.iter().enumerate().map(|(i, &a)| (a, i)).collect();

        let mut current_block = 0usize;
        for (flat_idx, insn) in instructions.iter_mut().enumerate() {
            if let Some(&b) = block_at_address.get(&insn.address) {
                current_block = b;
            }
            insn.basic_block_index = Some(current_block);
            insn.index_in_block = blocks[current_block].instruction_indices.len();
            blocks[current_block].instruction_indices.push(flat_idx);
        }

        let in_function = |addr: u64| addr >= func_vaddr && addr < func_vaddr + func_size;

        for b in 0..blocks.len() {
            let Some(&tail_flat) = blocks[b].instruction_indices.last() else { continue };
            let targets = instructions[tail_flat].control_targets();
            for target in targets {
                if !in_function(target) {
                    continue;
                }
                if let Some(&target_block) = block_at_address.get(&target) {
                    blocks[b].successors.push(target_block);
                    blocks[target_block].predecessors.push(b);
                }
            }
        }

        let mut cf = ControlFlow {
            function_index,
            blocks,
            instructions,
            loops: Vec::new(),
            dominators: Vec::new(),
        };
        cf.compute_dominators_and_reachability();
        let back_edges = cf.find_back_edges();
        cf.build_natural_loops(&back_edges);
        cf.compute_loop_depths();
        cf.assign_loop_back_pointers();
        cf
    }

    pub fn entry_block(&self) -> usize {
        0
    }

    /// Forward reachability from entry, independent of the dominator
    /// fixpoint below: a node with no path from entry would otherwise sit at
    /// the dominator computation's all-set sentinel forever and read back as
    /// "reachable" by accident.
    fn compute_forward_reachability(&self) -> Vec<bool> {
        let n = self.blocks.len();
        let mut reached = vec![false; n];
        if n == 0 {
            return reached;
        }
        let entry = self.entry_block();
        reached[entry] = true;
        let mut stack = vec![entry];
        while let Some(b) = stack.pop() {
            for &s in &self.blocks[b].successors {
                if !reached[s] {
                    reached[s] = true;
                    stack.push(s);
                }
            }
        }
        reached
    }

    /// Classical iterative worklist dominators (§4.5 step 3), forward only.
    /// Only runs over blocks forward-reachable from entry; unreachable
    /// blocks keep an empty dominator set.
    fn compute_dominators_and_reachability(&mut self) {
        let n = self.blocks.len();
        if n == 0 {
            return;
        }
        let entry = self.entry_block();
        let reached = self.compute_forward_reachability();

        let mut dom: Vec<Bitset> = (0..n)
            .map(|b| if b == entry { Bitset::new(n) } else { Bitset::all_set(n) })
            .collect();
        dom[entry].set(entry);

        let mut on_worklist = vec![false; n];
        on_worklist[entry] = true;
        let mut worklist: Vec<usize> = vec![entry];
        for &s in self.blocks[entry].successors.clone().iter() {
            if !on_worklist[s] {
                worklist.push(s);
                on_worklist[s] = true;
            }
        }

        while let Some(b) = worklist.pop() {
            on_worklist[b] = false;
            if b != entry {
                let preds = self.blocks[b].predecessors.clone();
                let mut new_dom = if preds.is_empty() {
                    Bitset::new(n)
                } else {
                    let mut acc = dom[preds[0]].clone();
                    for &p in &preds[1..] {
                        acc.intersect(&dom[p]);
                    }
                    acc
                };
                new_dom.set(b);
                if new_dom != dom[b] {
                    dom[b] = new_dom;
                    for &s in self.blocks[b].successors.clone().iter() {
                        if !on_worklist[s] {
                            worklist.push(s);
                            on_worklist[s] = true;
                        }
                    }
                }
            }
        }

        for b in 0..n {
            if !reached[b] {
                dom[b] = Bitset::new(n);
            }
            self.blocks[b].reachable = reached[b];
        }
        self.dominators = dom;
    }

    /// DFS back-edge detection (§4.5 step 4): `visited` entered, `closed`
    /// fully explored; a successor that is visited-but-not-closed is a back
    /// edge `(head = successor, tail = current)`. Only edges where `head`
    /// dominates `tail` are kept (others are discarded per §4.5 step 5).
    fn find_back_edges(&self) -> Vec<(usize, usize)> {
        let n = self.blocks.len();
        if n == 0 {
            return Vec::new();
        }
        let mut visited = Bitset::new(n);
        let mut closed = Bitset::new(n);
        let mut raw_back_edges = Vec::new();
        // (node, next successor cursor to visit)
        let mut stack: Vec<(usize, usize)> = vec![(self.entry_block(), 0)];
        visited.set(self.entry_block());

        while let Some(top) = stack.last().copied() {
            let (node, cursor) = top;
            let succ_count = self.blocks[node].successors.len();
            if cursor < succ_count {
                let next = self.blocks[node].successors[cursor];
                stack.last_mut().unwrap().1 += 1;
                if !visited.has(next) {
                    visited.set(next);
                    stack.push((next, 0));
                } else if !closed.has(next) {
                    raw_back_edges.push((next, node));
                }
            } else {
                closed.set(node);
                stack.pop();
            }
        }

        raw_back_edges.into_iter().filter(|&(head, tail)| self.dominators[tail].has(head)).collect()
    }

    /// Natural-loop-body recovery (§4.5 step 5): backward reachability from
    /// `tail` through predecessors, stopping at `head`.
    fn build_natural_loops(&mut self, back_edges: &[(usize, usize)]) {
        for (loop_idx, &(head, tail)) in back_edges.iter().enumerate() {
            let n = self.blocks.len();
            let mut members = Bitset::new(n);
            members.set(head);
            members.set(tail);
            let mut stack = vec![tail];
            while let Some(b) = stack.pop() {
                if b == head {
                    continue;
                }
                for &p in self.blocks[b].predecessors.clone().iter() {
                    if !members.has(p) {
                        members.set(p);
                        stack.push(p);
                    }
                }
            }
            self.loops.push(Loop::new(loop_idx, head, tail, members));
        }
    }

    /// §4.5 step 6: `depth(L) = 1 + #{L' != L : L.members ⊆ L'.members}`.
    fn compute_loop_depths(&mut self) {
        let snapshot: Vec<Bitset> = self.loops.iter().map(|l| l.members.clone()).collect();
        for i in 0..self.loops.len() {
            let mut depth = 1u32;
            for (j, other) in snapshot.iter().enumerate() {
                if i != j && snapshot[i].is_subset_of(other) {
                    depth += 1;
                }
            }
            self.loops[i].depth = depth;
        }
    }

    /// §4.5 step 7: greatest depth wins; ties are impossible (sets differ).
    fn assign_loop_back_pointers(&mut self) {
        for b in 0..self.blocks.len() {
            let mut best: Option<usize> = None;
            for (li, l) in self.loops.iter().enumerate() {
                if l.has_block(b) {
                    best = match best {
                        None => Some(li),
                        Some(cur) if l.depth > self.loops[cur].depth => Some(li),
                        other => other,
                    };
                }
            }
            self.blocks[b].loop_index = best;
        }
    }

    pub fn find_basic_block(&self, vaddr: u64) -> Option<&BasicBlock> {
        let idx = self.find_basic_block_index(vaddr)?;
        Some(&self.blocks[idx])
    }

    /// Binary search over addresses; blocks are sorted by construction.
    pub fn find_basic_block_index(&self, vaddr: u64) -> Option<usize> {
        let pos = self.blocks.partition_point(|b| b.address <= vaddr);
        if pos == 0 {
            return None;
        }
        let candidate = pos - 1;
        let end = self.block_end_address(candidate);
        if vaddr >= self.blocks[candidate].address && vaddr < end {
            Some(candidate)
        } else {
            None
        }
    }

    fn block_end_address(&self, block_idx: usize) -> u64 {
        self.blocks[block_idx]
            .instruction_indices
            .last()
            .map(|&flat| {
                let insn = &self.instructions[flat];
                insn.address + insn.size as u64
            })
            .unwrap_or(self.blocks[block_idx].address)
    }

    pub fn find_instruction(&self, vaddr: u64) -> Option<&Instruction> {
        let pos = self.instructions.partition_point(|i| i.address <= vaddr);
        if pos == 0 {
            return None;
        }
        let candidate = &self.instructions[pos - 1];
        if vaddr >= candidate.address && vaddr < candidate.address + candidate.size as u64 {
            Some(candidate)
        } else {
            None
        }
    }

    /// §4.6 `findLoop`: the deepest loop whose members contain the block at
    /// `vaddr`.
    pub fn find_loop(&self, vaddr: u64) -> Option<&Loop> {
        let block_idx = self.find_basic_block_index(vaddr)?;
        self.blocks[block_idx].loop_index.map(|li| &self.loops[li])
    }

    /// §4.6 `parentOf`: any `L'` with `L ⊂ L'` and `depth(L') = depth(L) - 1`.
    pub fn parent_of(&self, l: &Loop) -> Option<&Loop> {
        self.loops.iter().find(|other| other.index != l.index && l.is_child_of(other) && other.depth + 1 == l.depth)
    }
}
