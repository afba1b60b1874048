//! ELF Container
//!
//! Parses ELF32/ELF64 structural metadata. The raw struct layouts (ELF
//! header, program/section header tables) are "standardized and assumed
//! available" per spec.md §1 — we lean on `goblin` for that table
//! arithmetic rather than re-deriving it, and implement the
//! container-level semantics spec.md §4.1 actually specifies ourselves:
//! format verification, vaddr<->file-offset mapping, text-range membership,
//! and Thumb-bit-aware function-symbol enumeration.

use goblin::elf::Elf;
use goblin::elf::program_header::PT_LOAD;
use goblin::elf::section_header::{SHF_ALLOC, SHF_EXECINSTR, SHF_MERGE, SHF_WRITE, SHT_NOBITS, SHT_PROGBITS, SHT_STRTAB, SHT_SYMTAB, SHT_DYNSYM};
use goblin::elf::sym::STT_FUNC;

use crate::error::{Error, Result};
use super::section::{Section, SectionFlags, SectionKind};
use super::segment::{Segment, SegmentFlags};
use super::symbol::{Symbol, SymbolBinding, SymbolType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    Elf32,
    Elf64,
}

#[derive(Debug, Clone)]
pub struct ElfContainer {
    pub class: ElfClass,
    pub entry: u64,
    pub sections: Vec<Section>,
    pub segments: Vec<Segment>,
    pub symbols: Vec<Symbol>,
}

/// Verify the ELF magic/class per spec.md §4.1 without fully parsing.
pub fn verify(data: &[u8]) -> bool {
    data.len() >= 20 && data[0..4] == [0x7F, b'E', b'L', b'F'] && (data[4] == 1 || data[4] == 2)
}

impl ElfContainer {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let elf = Elf::parse(data).map_err(|e| Error::MalformedHeader(e.to_string()))?;

        let class = if elf.is_64 { ElfClass::Elf64 } else { ElfClass::Elf32 };

        let mut sections = Vec::with_capacity(elf.section_headers.len());
        for sh in elf.section_headers.iter() {
            let name = elf
                .shdr_strtab
                .get_at(sh.sh_name)
                .unwrap_or("")
                .to_string();

            let flags = SectionFlags {
                read: true,
                write: sh.sh_flags as u64 & SHF_WRITE as u64 != 0,
                exec: sh.sh_flags as u64 & SHF_EXECINSTR as u64 != 0,
                alloc: sh.sh_flags as u64 & SHF_ALLOC as u64 != 0,
                merge: sh.sh_flags as u64 & SHF_MERGE as u64 != 0,
            };

            let kind = if sh.sh_type == SHT_PROGBITS && flags.exec {
                SectionKind::Text
            } else if sh.sh_type == SHT_NOBITS {
                SectionKind::Bss
            } else if sh.sh_type == SHT_STRTAB {
                SectionKind::StringTab
            } else if sh.sh_type == SHT_SYMTAB || sh.sh_type == SHT_DYNSYM {
                SectionKind::SymTab
            } else if sh.sh_type == SHT_PROGBITS && flags.alloc {
                SectionKind::Data
            } else if name.starts_with(".debug") {
                SectionKind::Debug
            } else {
                SectionKind::Other
            };

            sections.push(Section {
                name,
                file_offset: sh.sh_offset,
                vaddr: sh.sh_addr,
                size: sh.sh_size,
                flags,
                kind,
            });
        }

        let mut segments = Vec::new();
        for ph in elf.program_headers.iter() {
            if ph.p_type != PT_LOAD {
                continue;
            }
            segments.push(Segment {
                file_offset: ph.p_offset,
                vaddr: ph.p_vaddr,
                file_size: ph.p_filesz,
                mem_size: ph.p_memsz,
                kind: ph.p_type,
                flags: SegmentFlags {
                    read: ph.p_flags & 0x4 != 0,
                    write: ph.p_flags & 0x2 != 0,
                    exec: ph.p_flags & 0x1 != 0,
                },
            });
        }

        let mut symbols = Vec::new();
        for sym in elf.syms.iter() {
            let name = elf.strtab.get_at(sym.st_name).unwrap_or("").to_string();
            let sym_type = if sym.st_type() == STT_FUNC {
                SymbolType::Function
            } else {
                SymbolType::Other
            };
            let binding = match sym.st_bind() {
                0 => SymbolBinding::Local,
                1 => SymbolBinding::Global,
                2 => SymbolBinding::Weak,
                _ => SymbolBinding::Other,
            };
            let section_index = if sym.st_shndx != 0 && sym.st_shndx < sections.len() {
                Some(sym.st_shndx)
            } else {
                None
            };
            symbols.push(Symbol::new(
                name,
                sym.st_value,
                sym.st_size,
                binding,
                sym_type,
                section_index,
            ));
        }

        Ok(Self {
            class,
            entry: elf.entry,
            sections,
            segments,
            symbols,
        })
    }

    pub fn inside_text_range(&self, vaddr: u64) -> bool {
        self.sections.iter().any(|s| s.is_text() && s.in_range(vaddr))
    }

    /// Per spec.md §4.1: first segment containing `v` wins; 0 if none do.
    pub fn vaddr_to_file(&self, v: u64) -> u64 {
        for seg in &self.segments {
            if seg.is_valid_vaddr(v) {
                return seg.vaddr_to_file_offset(v);
            }
        }
        0
    }
}
