//! Error Taxonomy
//!
//! This module provides the error types returned by the container parser,
//! the decoder seam, and the function/control-flow builders, using
//! `thiserror` for zero-cost, descriptive error values.
//!
//! # Error Categories
//! - **Container errors**: format detection and section/segment/symbol table
//!   parsing (`UnknownFormat`, `AmbiguousFormat`, `MalformedHeader`,
//!   `TruncatedFile`, `DanglingReference`, `UnimplementedFormat`).
//! - **Decode errors**: per-instruction decode failure (`DecodeFailure`),
//!   non-fatal — callers log and skip per the recovery policy in §7.
//! - **I/O errors**: wrapped from `std::io::Error`.

use thiserror::Error;

/// Errors surfaced by `armstatic-core`.
#[derive(Error, Debug)]
pub enum Error {
    /// The file's magic bytes did not match any supported container format.
    #[error("unknown container format")]
    UnknownFormat,

    /// More than one container format verified against the same file.
    #[error("ambiguous container format: more than one format verified")]
    AmbiguousFormat,

    /// A structural header field was out of range for the file's size.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// A read was attempted past the end of the file.
    #[error("truncated file: {0}")]
    TruncatedFile(String),

    /// A string-table, section, or segment index referenced by another
    /// structure was out of range.
    #[error("dangling reference: {0}")]
    DanglingReference(String),

    /// The decoder could not decode the bytes at an instruction address.
    ///
    /// Non-fatal: the affected instruction is recorded as an opaque,
    /// `__unknown__` instruction and analysis continues.
    #[error("decode failure at 0x{address:08x}: {reason}")]
    DecodeFailure { address: u64, reason: String },

    /// A format-specific code path that this implementation does not cover
    /// (e.g. an unsupported Mach-O load command).
    #[error("unimplemented format feature: {0}")]
    UnimplementedFormat(String),

    /// Underlying I/O failure reading the object file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
