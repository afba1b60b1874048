//! Container (ELF / Mach-O)
//!
//! Per the REDESIGN FLAGS in spec.md §9, the original's virtual-dispatch
//! `ElfBinary`/`MachOBinary` class tree collapses into one tagged variant
//! with a small shared capability surface — `format`, `entry`, `sections`,
//! `segments`, `symbols`, `inside_text_range`, `vaddr_to_file`. 32/64-bit is
//! a runtime tag (`ElfClass`/`MachClass`) rather than a type parameter,
//! since the arithmetic is identical and only field widths differ, and
//! `goblin` already normalizes that for us.

pub mod elf;
pub mod macho;
pub mod section;
pub mod segment;
pub mod symbol;

use crate::error::{Error, Result};
use elf::ElfContainer;
use macho::MachContainer;
pub use section::{Section, SectionFlags, SectionKind};
pub use segment::{Segment, SegmentFlags};
pub use symbol::{Symbol, SymbolBinding, SymbolType};

/// Format tag exposed to callers (spec.md §3: `Binary.format`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFormat {
    Elf32,
    Elf64,
    MachO32,
    MachO64,
}

#[derive(Debug, Clone)]
pub enum Container {
    Elf(ElfContainer),
    Mach(MachContainer),
}

impl Container {
    /// Trial each known format in order; fail with `AmbiguousFormat` if more
    /// than one verifies, `UnknownFormat` if none do. Per spec.md §4.1 this
    /// is a cheap magic/class check before the full parse.
    pub fn detect(data: &[u8]) -> Result<Self> {
        let elf_ok = elf::verify(data);
        let mach_ok = macho::verify(data);

        if elf_ok && mach_ok {
            return Err(Error::AmbiguousFormat);
        }

        if elf_ok {
            return Ok(Container::Elf(ElfContainer::parse(data)?));
        }
        if mach_ok {
            return Ok(Container::Mach(MachContainer::parse(data)?));
        }
        Err(Error::UnknownFormat)
    }

    pub fn format(&self) -> BinaryFormat {
        match self {
            Container::Elf(c) => match c.class {
                elf::ElfClass::Elf32 => BinaryFormat::Elf32,
                elf::ElfClass::Elf64 => BinaryFormat::Elf64,
            },
            Container::Mach(c) => match c.class {
                macho::MachClass::MachO32 => BinaryFormat::MachO32,
                macho::MachClass::MachO64 => BinaryFormat::MachO64,
            },
        }
    }

    pub fn entry(&self) -> u64 {
        match self {
            Container::Elf(c) => c.entry,
            Container::Mach(c) => c.entry,
        }
    }

    pub fn sections(&self) -> &[Section] {
        match self {
            Container::Elf(c) => &c.sections,
            Container::Mach(c) => &c.sections,
        }
    }

    /// Empty for Mach-O until a Mach-O-specific notion of "segment" is
    /// needed beyond vaddr<->file mapping, which `vaddr_to_file` already
    /// covers uniformly for both formats.
    pub fn segments(&self) -> &[Segment] {
        match self {
            Container::Elf(c) => &c.segments,
            Container::Mach(c) => &c.segments,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        match self {
            Container::Elf(c) => &c.symbols,
            Container::Mach(c) => &c.symbols,
        }
    }

    pub fn inside_text_range(&self, vaddr: u64) -> bool {
        match self {
            Container::Elf(c) => c.inside_text_range(vaddr),
            Container::Mach(c) => c.inside_text_range(vaddr),
        }
    }

    pub fn vaddr_to_file(&self, vaddr: u64) -> u64 {
        match self {
            Container::Elf(c) => c.vaddr_to_file(vaddr),
            Container::Mach(c) => c.vaddr_to_file(vaddr),
        }
    }

    pub fn is_64_bit(&self) -> bool {
        matches!(self.format(), BinaryFormat::Elf64 | BinaryFormat::MachO64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_format_on_garbage() {
        let data = vec![0u8; 64];
        assert!(matches!(Container::detect(&data), Err(Error::UnknownFormat)));
    }
}
