//! armstatic-core
//!
//! Static binary-analysis core for ARM/Thumb/Thumb2 executables: container
//! parsing (ELF32/64, Mach-O32/64), a pluggable ARM/Thumb/Thumb2 decoder,
//! control-flow-graph construction, dominator and natural-loop analysis, and
//! a line-oriented report emitter. `Binary` is the entry point; everything
//! else is reached through it or through the types it returns.

pub mod basic_block;
pub mod binary;
pub mod bitset;
pub mod byte_source;
pub mod container;
pub mod control_flow;
pub mod decoder;
pub mod error;
pub mod function;
pub mod instruction;
pub mod loop_info;
pub mod report;

pub use basic_block::BasicBlock;
pub use binary::Binary;
pub use bitset::Bitset;
pub use container::{
    BinaryFormat, Container, Section, SectionFlags, SectionKind, Segment, SegmentFlags, Symbol,
    SymbolBinding, SymbolType,
};
pub use control_flow::ControlFlow;
pub use decoder::{
    Condition, DatatypeKind, DecodeMode, Decoded, Decoder, DecoderResult, Opcode, ReferenceDecoder,
};
pub use error::{Error, Result};
pub use function::Function;
pub use instruction::{Instruction, INVALID_ADDRESS};
pub use loop_info::Loop;
pub use report::write_static_file;
