//! Source positions attached to AST nodes and emitted instructions.

/// A span in the source code (byte offsets).
///
/// The compiler never reads the source text; spans are opaque metadata
/// threaded from the AST into the emitted code so the VM can report runtime
/// failures with accurate locations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}
