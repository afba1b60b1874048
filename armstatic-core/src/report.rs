//! Static-file emitter
//!
//! Line-oriented report per spec.md §6.2. Sequence, function id, and block
//! id are monotonic counters over the walk, not the model's own indices,
//! matching `Function::print`/`ControlFlow::print` in the source walking
//! parent-to-child and emitting one primary line plus tagged continuations.

use std::io::Write;

use crate::binary::Binary;
use crate::container::Symbol;
use crate::error::Result;
use crate::instruction::{Instruction, INVALID_ADDRESS};

const UNKNOWN: &str = "__unknown__";

/// Cloning functions/symbols up front keeps the write loop free of borrows
/// back into `binary`, since `Binary::functions` needs `&mut self` to drive
/// its lazy discovery.
pub fn write_static_file<W: Write>(out: &mut W, binary: &mut Binary, app_name: &str) -> Result<()> {
    let functions = binary.functions().to_vec();
    let symbols = binary.symbols().to_vec();

    let function_count = functions.len();
    let mut block_count = 0usize;
    let mut insn_count = 0usize;
    for f in &functions {
        block_count += f.count_basic_blocks();
        insn_count += f.count_instructions();
    }

    writeln!(out, "; appname {app_name}")?;
    writeln!(out, "; appsize {function_count}")?;
    writeln!(out, "; blocks {block_count}")?;
    writeln!(out, "; insns {insn_count}")?;

    let mut seq = 0usize;
    for (func_id, function) in functions.iter().enumerate() {
        let func_name = function
            .symbol_index
            .map(|i| symbols[i].name.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());

        let Some(cf) = function.control_flow.as_ref() else { continue };

        for (bb_id, block) in cf.blocks.iter().enumerate() {
            for &flat in &block.instruction_indices {
                let insn = &cf.instructions[flat];
                write_instruction_lines(out, insn, &func_name, func_id, bb_id, seq, cf, &symbols)?;
                seq += 1;
            }
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn write_instruction_lines<W: Write>(
    out: &mut W,
    insn: &Instruction,
    func_name: &str,
    func_id: usize,
    bb_id: usize,
    seq: usize,
    cf: &crate::control_flow::ControlFlow,
    symbols: &[Symbol],
) -> Result<()> {
    writeln!(out, "{seq} 0x{:08x} {func_name} {func_id} {bb_id} {UNKNOWN}:0", insn.address)?;
    writeln!(out, "  +str {}", insn.mnemonic())?;

    let mode_tag = match insn.decoded.mode {
        crate::decoder::DecodeMode::Arm => "arm",
        crate::decoder::DecodeMode::Thumb => "thumb",
        crate::decoder::DecodeMode::Thumb2 => "thumb2",
    };
    writeln!(out, "  +isa {mode_tag} {}", insn.size)?;

    if insn.decoded.condition != crate::decoder::Condition::Always {
        writeln!(out, "  +prd {}", insn.decoded.condition.name())?;
    }

    let targets = insn.explicit_targets();
    if !targets.is_empty() {
        let joined = targets.iter().map(|t| format!("0x{t:08x}")).collect::<Vec<_>>().join(" ");
        writeln!(out, "  +flw {joined}")?;
    }

    if let Some(loop_index) = cf.blocks[insn.basic_block_index.unwrap_or(bb_id)].loop_index {
        let l = &cf.loops[loop_index];
        writeln!(out, "  +lpi {} {} {} 0x{:08x} 0x{:08x}", cf.loops.len(), l.index, l.depth, cf.blocks[l.head_block].address, cf.blocks[l.tail_block].address)?;
        if let Some(parent) = cf.parent_of(l) {
            writeln!(out, "  +lpc 0x{:08x} 0x{:08x}", cf.blocks[parent.head_block].address, cf.blocks[parent.tail_block].address)?;
        }
    }

    writeln!(
        out,
        "  +cnt {} {} {} {}",
        insn.is_branch() as u8,
        insn.is_fp_op() as u8,
        insn.is_load() as u8,
        insn.is_store() as u8
    )?;

    if let Some(bits) = insn.source_register_size_bits() {
        writeln!(out, "  +srg 1x{bits}:{}:{}", insn.is_fp_op() as u8, (!insn.is_fp_op()) as u8)?;
    }

    if insn.is_call() {
        let target = insn.branch_target();
        if target != INVALID_ADDRESS {
            let name = symbols
                .iter()
                .find(|s| s.value == target)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| UNKNOWN.to_string());
            writeln!(out, "  +ipa 0x{target:08x} {name}")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::ReferenceDecoder;
    use crate::function::Function;

    #[test]
    fn straight_line_function_emits_one_line_per_instruction() {
        let mov: u32 = 0x03A0_0001;
        let bx: u32 = 0xE12F_FF1E;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&mov.to_le_bytes());
        bytes.extend_from_slice(&bx.to_le_bytes());

        let mut f = Function::new(0, 0x1000, 0x8000, 8, 0, None, false);
        f.disassemble(&bytes, &ReferenceDecoder::new());
        let cf = f.control_flow.as_ref().expect("control flow built");

        let mut out: Vec<u8> = Vec::new();
        let mut seq = 0usize;
        for (bb_id, block) in cf.blocks.iter().enumerate() {
            for &flat in &block.instruction_indices {
                write_instruction_lines(&mut out, &cf.instructions[flat], "f", 0, bb_id, seq, cf, &[]).unwrap();
                seq += 1;
            }
        }

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("+str").count(), 2);
        assert!(text.contains("bx"));
        assert!(!text.contains("+flw"));
    }
}
