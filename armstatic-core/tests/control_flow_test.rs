use armstatic_core::{
    Condition, ControlFlow, DatatypeKind, DecodeMode, Decoded, Instruction, Opcode,
};
use smallvec::SmallVec;

fn insn(addr: u64, opcode: Opcode, cond: Condition, imm: Option<i64>, flat: usize) -> Instruction {
    let decoded = Decoded {
        size: 4,
        opcode,
        condition: cond,
        immediate: imm,
        mode: DecodeMode::Arm,
        operand_regs: SmallVec::new(),
        register_list: 0,
        source_datatype: DatatypeKind::None,
        destination_datatype: DatatypeKind::None,
    };
    Instruction::new(addr, flat, decoded, 0)
}

/// entry(0x8000) -[fallthrough]-> head(0x8004) -[beq]-> exit(0x8010)
///                                head -[fallthrough]-> body(0x800C) -[b]-> head (back edge)
#[test]
fn back_edge_forms_a_natural_loop() {
    let i0 = insn(0x8000, Opcode::Mov, Condition::Always, None, 0);
    let i1 = insn(0x8004, Opcode::Cmp, Condition::Always, None, 1);
    // beq 0x8010: target = 0x8008 + 8 + imm = 0x8010 -> imm = 0
    let i2 = insn(0x8008, Opcode::B, Condition::Eq, Some(0), 2);
    // b 0x8004: target = 0x800C + 8 + imm = 0x8004 -> imm = -16
    let i3 = insn(0x800C, Opcode::B, Condition::Always, Some(-16), 3);
    let i4 = insn(0x8010, Opcode::Bx, Condition::Always, None, 4);

    let leaders = vec![0x8000u64, 0x8004, 0x800C, 0x8010];
    let cf = ControlFlow::build(0, vec![i0, i1, i2, i3, i4], &leaders, 0x8000, 0x14);

    assert_eq!(cf.blocks.len(), 4);
    assert_eq!(cf.blocks[0].successors.as_slice(), &[1]);
    assert_eq!(cf.blocks[1].successors.len(), 2);
    assert!(cf.blocks[1].successors.contains(&2));
    assert!(cf.blocks[1].successors.contains(&3));
    assert_eq!(cf.blocks[2].successors.as_slice(), &[1]);
    assert!(cf.blocks[3].successors.is_empty());

    assert!(cf.blocks.iter().all(|b| b.reachable));

    assert_eq!(cf.loops.len(), 1);
    let l = &cf.loops[0];
    assert_eq!(l.head(), 1);
    assert_eq!(l.tail(), 2);
    assert!(l.has_block(1));
    assert!(l.has_block(2));
    assert!(!l.has_block(0));
    assert!(!l.has_block(3));

    assert_eq!(cf.find_loop(0x8004).map(|l| l.index), Some(0));
    assert!(cf.find_loop(0x8000).is_none());
}

/// A leader with no incoming edge from anywhere in the function is
/// forward-unreachable from entry even though it was given a block of its
/// own.
#[test]
fn block_with_no_path_from_entry_is_marked_unreachable() {
    let i0 = insn(0x9000, Opcode::Bx, Condition::Always, None, 0);
    let i1 = insn(0x9004, Opcode::Bx, Condition::Always, None, 1);

    let leaders = vec![0x9000u64, 0x9004];
    let cf = ControlFlow::build(0, vec![i0, i1], &leaders, 0x9000, 0x8);

    assert!(cf.blocks[0].reachable);
    assert!(!cf.blocks[1].reachable);
    assert!(cf.loops.is_empty());
}
