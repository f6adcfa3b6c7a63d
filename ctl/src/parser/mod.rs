pub mod error;
mod scan;

pub use error::ParseError;

use crate::block::lines::split_lines;
use crate::block::DEFAULT_MARKER;
use crate::store::BlockStore;

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
    marker: char,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser {
            source,
            file_id,
            marker: DEFAULT_MARKER,
        }
    }

    pub fn with_marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }

    /// Split the source into its blocks.
    pub fn parse(&self) -> BlockStore {
        self.parse_with_diagnostics().0
    }

    /// Like [`Parser::parse`], also reporting text that belongs to no block.
    pub fn parse_with_diagnostics(&self) -> (BlockStore, Vec<ParseError>) {
        scan::scan_lines(split_lines(&self.source), self.marker, self.file_id)
    }
}

/// Parse already split lines (each optionally ending in its terminator).
pub fn parse_lines<I, S>(lines: I, marker: char) -> BlockStore
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    scan::scan_lines(lines, marker, 0).0
}
