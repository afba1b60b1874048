//! Function
//!
//! `disassemble()` mirrors `Function::disasm`/`Function::disassemble` in the
//! source: a bounds-checked cursor walk through the decoder, leader
//! discovery over the decoded stream, then a single `ControlFlow::build`
//! call. Idempotent per spec.md §4.3 via the `disassembled` guard.

use log::{debug, warn};

use crate::control_flow::ControlFlow;
use crate::decoder::{fail_to_error, DecodeMode, Decoder};
use crate::instruction::Instruction;

#[derive(Debug, Clone)]
pub struct Function {
    pub binary_index: usize,
    pub file_offset: u64,
    pub vaddr: u64,
    pub size: u64,
    pub index: usize,
    pub symbol_index: Option<usize>,
    pub is_thumb: bool,
    pub is_armv8: bool,
    pub control_flow: Option<ControlFlow>,
    disassembled: bool,
}

impl Function {
    pub fn new(
        binary_index: usize,
        file_offset: u64,
        vaddr: u64,
        size: u64,
        index: usize,
        symbol_index: Option<usize>,
        is_thumb: bool,
    ) -> Self {
        Self {
            binary_index,
            file_offset,
            vaddr,
            size,
            index,
            symbol_index,
            is_thumb,
            is_armv8: false,
            control_flow: None,
            disassembled: false,
        }
    }

    pub fn end_address(&self) -> u64 {
        self.vaddr + self.size
    }

    pub fn in_range(&self, addr: u64) -> bool {
        addr >= self.vaddr && addr < self.end_address()
    }

    fn disassemble_mode(&self) -> DecodeMode {
        if self.is_thumb {
            DecodeMode::Thumb2
        } else {
            DecodeMode::Arm
        }
    }

    /// §4.3: idempotent, no-op when `fileOffset == 0`.
    pub fn disassemble(&mut self, bytes: &[u8], decoder: &dyn Decoder) {
        if self.disassembled {
            return;
        }
        self.disassembled = true;
        if self.file_offset == 0 {
            return;
        }

        let limit = self.size as usize;
        let mode = self.disassemble_mode();

        let mut raw_instructions: Vec<(u64, crate::decoder::Decoded)> = Vec::new();
        let mut cur: usize = 0;
        while cur < limit {
            let addr = self.vaddr + cur as u64;
            let remaining = limit - cur;
            let outcome = decoder.decode(&bytes[cur..limit], remaining, mode, addr);
            match outcome {
                Ok(decoded) => {
                    let size = decoded.size as usize;
                    if cur + size > limit {
                        break;
                    }
                    cur += size;
                    raw_instructions.push((addr, decoded));
                }
                Err(fail) => {
                    let err = fail_to_error(addr, &fail);
                    warn!("{err}");
                    let hint = fail.consumed_hint.max(2) as usize;
                    if cur + hint > limit {
                        break;
                    }
                    cur += hint;
                }
            }
        }

        if raw_instructions.is_empty() {
            debug!("function at 0x{:08x} yielded no instructions", self.vaddr);
            return;
        }

        let instructions: Vec<Instruction> = raw_instructions
            .into_iter()
            .enumerate()
            .map(|(flat, (addr, decoded))| Instruction::new(addr, flat, decoded, self.index))
            .collect();

        let leaders = Self::find_leaders(&instructions, self.vaddr, self.size);
        self.control_flow = Some(ControlFlow::build(self.index, instructions, &leaders, self.vaddr, self.size));
    }

    /// §4.3 step 6: first instruction is a leader; branch fall-through and
    /// target are leaders if inside this function.
    fn find_leaders(instructions: &[Instruction], func_vaddr: u64, func_size: u64) -> Vec<u64> {
        let in_range = |addr: u64| addr >= func_vaddr && addr < func_vaddr + func_size;
        let mut leader_set: std::collections::BTreeSet<u64> = std::collections::BTreeSet::new();
        leader_set.insert(instructions[0].address);

        for insn in instructions {
            if !insn.is_branch() {
                continue;
            }
            let ft = insn.fallthrough_address();
            if in_range(ft) {
                leader_set.insert(ft);
            }
            let tgt = insn.branch_target();
            if tgt != crate::instruction::INVALID_ADDRESS && in_range(tgt) {
                leader_set.insert(tgt);
            }
        }

        leader_set.into_iter().collect()
    }

    pub fn find_basic_block(&self, vaddr: u64) -> Option<&crate::basic_block::BasicBlock> {
        self.control_flow.as_ref()?.find_basic_block(vaddr)
    }

    pub fn find_instruction(&self, vaddr: u64) -> Option<&Instruction> {
        self.control_flow.as_ref()?.find_instruction(vaddr)
    }

    pub fn count_basic_blocks(&self) -> usize {
        self.control_flow.as_ref().map(|cf| cf.blocks.len()).unwrap_or(0)
    }

    pub fn count_instructions(&self) -> usize {
        self.control_flow.as_ref().map(|cf| cf.instructions.len()).unwrap_or(0)
    }
}
