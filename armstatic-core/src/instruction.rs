//! Instruction
//!
//! Wraps a `Decoded` (the decoder's raw output) with address/back-pointer
//! bookkeeping and the classification predicates §4.4 defines. The branch
//! target and control-successor logic live here because they are pure
//! functions of one instruction's fields, not of the surrounding block.

use smallvec::SmallVec;

use crate::decoder::{Condition, DatatypeKind, Decoded, Opcode, PC_REGISTER};

pub const INVALID_ADDRESS: u64 = u64::MAX;

#[derive(Debug, Clone)]
pub struct Instruction {
    pub address: u64,
    pub size: u8,
    pub index_in_block: usize,
    pub flat_index: usize,
    pub decoded: Decoded,
    pub function_index: usize,
    pub basic_block_index: Option<usize>,
}

impl Instruction {
    pub fn new(address: u64, flat_index: usize, decoded: Decoded, function_index: usize) -> Self {
        let size = decoded.size;
        Self {
            address,
            size,
            index_in_block: 0,
            flat_index,
            decoded,
            function_index,
            basic_block_index: None,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.decoded.opcode
    }

    pub fn condition(&self) -> Condition {
        self.decoded.condition
    }

    pub fn immediate(&self) -> Option<i64> {
        self.decoded.immediate
    }

    pub fn mnemonic(&self) -> &'static str {
        self.decoded.opcode.mnemonic()
    }

    /// §4.4 `touchesPC`.
    pub fn touches_pc(&self) -> bool {
        matches!(
            self.decoded.opcode,
            Opcode::B | Opcode::Bl | Opcode::Bx | Opcode::Blx | Opcode::Bxj | Opcode::Cbz | Opcode::Cbnz
        ) || self.decoded.destination_is_pc()
            || self.decoded.touches_pc_register_list()
    }

    /// §4.4 `isConditionalBranch`.
    pub fn is_conditional_branch(&self) -> bool {
        self.touches_pc()
            && (self.decoded.condition != Condition::Always
                || matches!(self.decoded.opcode, Opcode::Cbz | Opcode::Cbnz))
    }

    /// §4.4 `isUnconditionalBranch`.
    pub fn is_unconditional_branch(&self) -> bool {
        self.touches_pc()
            && self.decoded.condition == Condition::Always
            && !matches!(self.decoded.opcode, Opcode::Cbz | Opcode::Cbnz)
    }

    /// §4.4 `isBranch`.
    pub fn is_branch(&self) -> bool {
        self.is_conditional_branch() || self.is_unconditional_branch()
    }

    /// §4.4 `isCall`.
    pub fn is_call(&self) -> bool {
        matches!(self.decoded.opcode, Opcode::Bl | Opcode::Blx)
    }

    /// §4.4 `hasFallthrough`.
    pub fn has_fallthrough(&self) -> bool {
        !self.is_branch() || self.is_conditional_branch() || self.is_call()
    }

    pub fn is_load(&self) -> bool {
        matches!(self.decoded.opcode, Opcode::Ldr | Opcode::VLoad | Opcode::Pop)
    }

    pub fn is_store(&self) -> bool {
        matches!(self.decoded.opcode, Opcode::Str | Opcode::VStore | Opcode::Push)
    }

    pub fn is_fp_op(&self) -> bool {
        self.decoded.source_datatype.is_fp() || self.decoded.destination_datatype.is_fp()
    }

    pub fn source_register_size_bits(&self) -> Option<u32> {
        self.decoded.source_datatype.bits()
    }

    pub fn source_element_size_bits(&self) -> Option<u32> {
        self.decoded.source_datatype.bits()
    }

    pub fn destination_datatype(&self) -> DatatypeKind {
        self.decoded.destination_datatype
    }

    /// §4.4 branch-target computation. Returns `INVALID_ADDRESS` when there
    /// is no encoded immediate (register/indirect branch).
    pub fn branch_target(&self) -> u64 {
        let Some(imm) = self.decoded.immediate else {
            return INVALID_ADDRESS;
        };
        if !self.is_branch() {
            return INVALID_ADDRESS;
        }
        use crate::decoder::DecodeMode;
        let mut base = self.address;
        if self.decoded.mode == DecodeMode::Thumb2 && self.decoded.opcode == Opcode::Blx {
            base &= !0x3;
        }
        let pc_offset: u64 = match self.decoded.mode {
            DecodeMode::Arm => 8,
            DecodeMode::Thumb | DecodeMode::Thumb2 => 4,
        };
        let target = base.wrapping_add(pc_offset).wrapping_add(imm as u64);
        (target as u32) as u64
    }

    /// §4.3: "inside this function" membership for leader discovery.
    pub fn fallthrough_address(&self) -> u64 {
        self.address + self.size as u64
    }

    /// §4.4 `getControlTargets`: fall-through first, then branch target.
    /// Used to wire CFG successor edges.
    pub fn control_targets(&self) -> SmallVec<[u64; 2]> {
        let mut targets = SmallVec::new();
        if self.has_fallthrough() {
            targets.push(self.fallthrough_address());
        }
        if self.is_branch() {
            let t = self.branch_target();
            if t != INVALID_ADDRESS {
                targets.push(t);
            }
        }
        targets
    }

    /// §6.2 `+flw`: explicit branch targets only, excluding fall-through.
    pub fn explicit_targets(&self) -> SmallVec<[u64; 2]> {
        let mut targets = SmallVec::new();
        if self.is_branch() {
            let t = self.branch_target();
            if t != INVALID_ADDRESS {
                targets.push(t);
            }
        }
        targets
    }

    pub fn touches_pc_via_register(&self) -> bool {
        self.decoded.destination_is_pc()
    }

    pub const PC: u8 = PC_REGISTER;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{DecodeMode, ReferenceDecoder};
    use crate::decoder::Decoder as _;

    fn decode_one(bytes: &[u8], mode: DecodeMode, vaddr: u64) -> Decoded {
        ReferenceDecoder::new().decode(bytes, bytes.len(), mode, vaddr).unwrap()
    }

    #[test]
    fn thumb_bx_lr_has_no_fallthrough() {
        let bytes = 0x4770u16.to_le_bytes();
        let d = decode_one(&bytes, DecodeMode::Thumb, 0x1000);
        let insn = Instruction::new(0x1000, 0, d, 0);
        assert!(insn.is_unconditional_branch());
        assert!(!insn.has_fallthrough());
        assert_eq!(insn.branch_target(), INVALID_ADDRESS);
    }

    #[test]
    fn arm_conditional_data_processing_has_fallthrough_only() {
        // cmp r0, #0 style data-processing with cond != AL is not a branch.
        let word: u32 = 0x0150_0000; // cond=EQ, opc=0xA (CMP), I=0
        let bytes = word.to_le_bytes();
        let d = decode_one(&bytes, DecodeMode::Arm, 0x8000);
        let insn = Instruction::new(0x8000, 0, d, 0);
        assert!(!insn.is_branch());
        assert!(insn.has_fallthrough());
        let targets = insn.control_targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0], 0x8004);
    }

    #[test]
    fn thumb_conditional_branch_has_fallthrough_and_target() {
        // beq with imm8 = 4 -> target = addr + 4(pc offset) + 8
        let h: u16 = 0xD004;
        let bytes = h.to_le_bytes();
        let d = decode_one(&bytes, DecodeMode::Thumb, 0x2000);
        let insn = Instruction::new(0x2000, 0, d, 0);
        assert!(insn.is_conditional_branch());
        assert!(insn.has_fallthrough());
        let targets = insn.control_targets();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0], 0x2002);
        assert_eq!(targets[1], 0x2000 + 4 + 8);
    }
}
