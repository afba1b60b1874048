//! Mach-O Container
//!
//! spec.md leaves Mach-O function/symbol enumeration as an Open Question
//! (the EPAX source asserts on every Mach-O path). `goblin::mach` parses
//! the load-command/segment/section/symbol tables cheaply enough that we
//! take the other horn: implement it with the same `Section`/`Segment`/
//! `Symbol` shapes ELF uses, so `Container` stays a single capability
//! interface rather than a half-finished variant.

use goblin::mach::Mach;

use crate::error::{Error, Result};
use super::section::{Section, SectionFlags, SectionKind};
use super::segment::{Segment, SegmentFlags};
use super::symbol::{Symbol, SymbolBinding, SymbolType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachClass {
    MachO32,
    MachO64,
}

#[derive(Debug, Clone)]
pub struct MachContainer {
    pub class: MachClass,
    pub entry: u64,
    pub sections: Vec<Section>,
    pub segments: Vec<Segment>,
    pub symbols: Vec<Symbol>,
}

const MH_MAGIC: u32 = 0xfeedface;
const MH_CIGAM: u32 = 0xcefaedfe;
const MH_MAGIC_64: u32 = 0xfeedfacf;
const MH_CIGAM_64: u32 = 0xcffaedfe;
const FAT_MAGIC: u32 = 0xcafebabe;
const FAT_CIGAM: u32 = 0xbebafeca;

/// Verify the Mach-O (or fat) magic per spec.md §4.1 without fully parsing.
pub fn verify(data: &[u8]) -> bool {
    if data.len() < 4 {
        return false;
    }
    let magic = u32::from_ne_bytes([data[0], data[1], data[2], data[3]]);
    let magic_be = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    matches!(
        magic_be,
        MH_MAGIC | MH_CIGAM | MH_MAGIC_64 | MH_CIGAM_64 | FAT_MAGIC | FAT_CIGAM
    ) || matches!(magic, MH_MAGIC | MH_MAGIC_64)
}

impl MachContainer {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mach = Mach::parse(data).map_err(|e| Error::MalformedHeader(e.to_string()))?;
        let macho = match mach {
            Mach::Binary(m) => m,
            // Fat (universal) binaries bundle multiple architecture
            // slices; picking the right slice without a target
            // architecture hint is out of scope for this tool, so fat
            // inputs are reported rather than guessed at.
            Mach::Fat(_) => {
                return Err(Error::UnimplementedFormat(
                    "fat (universal) Mach-O binaries are not supported; extract a single-architecture slice first".into(),
                ))
            }
        };

        let class = if macho.is_64 { MachClass::MachO64 } else { MachClass::MachO32 };

        let mut sections = Vec::new();
        let mut segments = Vec::new();

        for segment in macho.segments.iter() {
            let seg_name = segment.name().unwrap_or("").to_string();
            segments.push(Segment {
                file_offset: segment.fileoff,
                vaddr: segment.vmaddr,
                file_size: segment.filesize,
                mem_size: segment.vmsize,
                kind: 0,
                flags: SegmentFlags {
                    read: segment.initprot & 0x1 != 0,
                    write: segment.initprot & 0x2 != 0,
                    exec: segment.initprot & 0x4 != 0,
                },
            });

            let is_text_segment = seg_name == "__TEXT";

            if let Ok(sects) = segment.sections() {
                for (sect, _data) in sects {
                    let name = sect.name().unwrap_or("").to_string();
                    let is_exec = is_text_segment && name == "__text";
                    let flags = SectionFlags {
                        read: true,
                        write: !is_text_segment,
                        exec: is_exec,
                        alloc: true,
                        merge: false,
                    };
                    let kind = if is_exec {
                        SectionKind::Text
                    } else if name.starts_with("__debug") {
                        SectionKind::Debug
                    } else if name == "__bss" {
                        SectionKind::Bss
                    } else {
                        SectionKind::Data
                    };
                    sections.push(Section {
                        name,
                        file_offset: sect.offset as u64,
                        vaddr: sect.addr,
                        size: sect.size,
                        flags,
                        kind,
                    });
                }
            }
        }

        let mut symbols = Vec::new();
        if let Some(iter) = macho.symbols() {
            for entry in iter.flatten() {
                let (name, nlist) = entry;
                // N_SECT (defined in a numbered section) is the closest
                // Mach-O analogue of ELF's STT_FUNC for our purposes: a
                // symbol with a concrete address inside a text section.
                const N_TYPE: u8 = 0x0e;
                const N_SECT: u8 = 0x0e;
                let is_sect_defined = nlist.n_type & N_TYPE == N_SECT;
                let in_text = nlist.n_sect > 0
                    && nlist.n_sect - 1 < sections.len()
                    && sections[nlist.n_sect - 1].is_text();
                let sym_type = if is_sect_defined && in_text {
                    SymbolType::Function
                } else {
                    SymbolType::Other
                };
                let binding = if nlist.n_type & 0x01 != 0 {
                    SymbolBinding::Global
                } else {
                    SymbolBinding::Local
                };
                let section_index = if nlist.n_sect > 0 { Some(nlist.n_sect - 1) } else { None };
                symbols.push(Symbol::new(
                    name.to_string(),
                    nlist.n_value,
                    0,
                    binding,
                    sym_type,
                    section_index,
                ));
            }
        }

        Ok(Self {
            class,
            entry: macho.entry,
            sections,
            segments,
            symbols,
        })
    }

    pub fn inside_text_range(&self, vaddr: u64) -> bool {
        self.sections.iter().any(|s| s.is_text() && s.in_range(vaddr))
    }

    pub fn vaddr_to_file(&self, v: u64) -> u64 {
        for seg in &self.segments {
            if seg.is_valid_vaddr(v) {
                return seg.vaddr_to_file_offset(v);
            }
        }
        0
    }
}
