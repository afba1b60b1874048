//! Binary
//!
//! Grounded on `ElfBinary::findFunctions`: symbol enumeration filtered to
//! function symbols inside the text range, sorted by ascending vaddr and
//! reindexed, sizes resolved from the symbol or inferred from the
//! end-address formula in §4.1, then each function is disassembled in
//! order. Lazy one-shot guards match spec.md §5's "lazy per category" rule.

use log::debug;

use crate::byte_source::ByteSource;
use crate::container::{BinaryFormat, Container, Section, Segment, Symbol};
use crate::decoder::{Decoder, ReferenceDecoder};
use crate::error::Result;
use crate::function::Function;

pub struct Binary {
    source: ByteSource,
    container: Container,
    decoder: ReferenceDecoder,
    functions: Vec<Function>,
    functions_found: bool,
}

impl Binary {
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let source = ByteSource::from_path(path)?;
        let container = Container::detect(source.all())?;
        Ok(Self {
            source,
            container,
            decoder: ReferenceDecoder::new(),
            functions: Vec::new(),
            functions_found: false,
        })
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let source = ByteSource::from_bytes(data);
        let container = Container::detect(source.all())?;
        Ok(Self {
            source,
            container,
            decoder: ReferenceDecoder::new(),
            functions: Vec::new(),
            functions_found: false,
        })
    }

    pub fn format(&self) -> BinaryFormat {
        self.container.format()
    }

    pub fn entry(&self) -> u64 {
        self.container.entry()
    }

    pub fn sections(&self) -> &[Section] {
        self.container.sections()
    }

    pub fn segments(&self) -> &[Segment] {
        self.container.segments()
    }

    pub fn symbols(&self) -> &[Symbol] {
        self.container.symbols()
    }

    pub fn inside_text_range(&self, vaddr: u64) -> bool {
        self.container.inside_text_range(vaddr)
    }

    /// §4.1 end-address inference: `min(section_end, next_function_file_offset)`,
    /// both terms measured in file offsets (the next function's vaddr is
    /// mapped through `vaddr_to_file` before the comparison).
    fn function_end_address(&self, sym: &Symbol, next_vaddr: Option<u64>) -> Option<u64> {
        let mut candidate = sym
            .section_index
            .and_then(|idx| self.container.sections().get(idx))
            .map(|sect| sect.file_offset + sect.size);

        if let Some(next) = next_vaddr {
            let next_file_offset = self.container.vaddr_to_file(next);
            candidate = Some(match candidate {
                Some(c) => c.min(next_file_offset),
                None => next_file_offset,
            });
        }
        candidate
    }

    /// Lazy, one-shot: trigger function discovery (which transitively
    /// enumerates sections/symbols, already eager in `Container::parse`).
    pub fn functions(&mut self) -> &[Function] {
        self.ensure_functions_found();
        &self.functions
    }

    fn ensure_functions_found(&mut self) {
        if self.functions_found {
            return;
        }
        self.functions_found = true;

        let mut candidates: Vec<(u64, &Symbol)> = self
            .container
            .symbols()
            .iter()
            .filter(|s| s.is_function() && self.container.inside_text_range(s.value))
            .map(|s| (s.value, s))
            .collect();
        candidates.sort_by_key(|(vaddr, _)| *vaddr);

        let mut built: Vec<(u64, u64, u64, bool, Option<usize>)> = Vec::new();
        for (i, (vaddr, sym)) in candidates.iter().enumerate() {
            let file_offset = self.container.vaddr_to_file(*vaddr);
            let next_vaddr = candidates.get(i + 1).map(|(v, _)| *v);
            let size = if sym.size > 0 {
                sym.size
            } else {
                self.function_end_address(sym, next_vaddr)
                    .map(|end| end.saturating_sub(file_offset))
                    .unwrap_or(0)
            };
            let symbol_index = self.container.symbols().iter().position(|s| std::ptr::eq(s, *sym));
            built.push((file_offset, *vaddr, size, sym.is_thumb, symbol_index));
        }

        self.functions = built
            .into_iter()
            .enumerate()
            .map(|(idx, (file_offset, vaddr, size, is_thumb, symbol_index))| {
                Function::new(0, file_offset, vaddr, size, idx, symbol_index, is_thumb)
            })
            .collect();

        debug_assert!(self.functions.windows(2).all(|w| w[0].vaddr < w[1].vaddr), "functions must be sorted");

        for f in &mut self.functions {
            if f.file_offset == 0 || f.size == 0 {
                continue;
            }
            let start = f.file_offset as usize;
            let end = (f.file_offset + f.size) as usize;
            let Ok(bytes) = self.source.read(start as u64, f.size) else {
                debug!("function at 0x{:08x} has out-of-range file range [{}, {})", f.vaddr, start, end);
                continue;
            };
            f.disassemble(bytes, &self.decoder);
        }
    }

    pub fn count_functions(&mut self) -> usize {
        self.functions().len()
    }

    pub fn find_function_at(&mut self, vaddr: u64) -> Option<&Function> {
        self.ensure_functions_found();
        let pos = self.functions.partition_point(|f| f.vaddr <= vaddr);
        if pos == 0 {
            return None;
        }
        let candidate = &self.functions[pos - 1];
        if candidate.in_range(vaddr) {
            Some(candidate)
        } else {
            None
        }
    }
}
