//! Symbol Table Entries
//!
//! The Thumb-entry convention lives here: `Symbol::new` strips the low bit
//! of `value` and records whether it was set, so every later consumer
//! (`Function` discovery, the decoder mode selector) reads a clean address
//! plus an explicit `is_thumb` flag instead of re-deriving it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    Function,
    Object,
    Section,
    File,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolBinding {
    Local,
    Global,
    Weak,
    Other,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    /// Virtual address with the Thumb bit already stripped.
    pub value: u64,
    pub size: u64,
    pub binding: SymbolBinding,
    pub sym_type: SymbolType,
    pub section_index: Option<usize>,
    /// True if the raw symbol value had its low bit set (Thumb entry).
    pub is_thumb: bool,
}

impl Symbol {
    /// Build a symbol from a raw (possibly Thumb-tagged) address, stripping
    /// the low bit and recording it as `is_thumb` per spec §4.1.
    pub fn new(
        name: String,
        raw_value: u64,
        size: u64,
        binding: SymbolBinding,
        sym_type: SymbolType,
        section_index: Option<usize>,
    ) -> Self {
        let is_thumb = raw_value & 1 != 0;
        Self {
            name,
            value: raw_value & !1,
            size,
            binding,
            sym_type,
            section_index,
            is_thumb,
        }
    }

    pub fn is_function(&self) -> bool {
        self.sym_type == SymbolType::Function
    }
}
