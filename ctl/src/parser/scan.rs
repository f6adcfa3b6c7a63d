use std::ops::Range;

use log::debug;

use crate::block::{Lines, block_name};
use crate::parser::error::ParseError;
use crate::store::BlockStore;

struct ScanState {
    marker: char,
    file_id: usize,
    store: BlockStore,
    /// The block being collected: its name and lines so far.
    open: Option<(String, Lines)>,
    /// Byte range of the non-blank text seen before the first block.
    preamble: Option<Range<usize>>,
    offset: usize,
}

impl ScanState {
    fn new(marker: char, file_id: usize) -> Self {
        ScanState {
            marker,
            file_id,
            store: BlockStore::new(),
            open: None,
            preamble: None,
            offset: 0,
        }
    }

    fn push_line(&mut self, line: String) {
        let span = self.offset..self.offset + line.len();
        self.offset = span.end;

        if let Some(name) = block_name(&line, self.marker) {
            let name = name.to_string();
            self.flush();
            self.open = Some((name, vec![line]));
            return;
        }

        match &mut self.open {
            Some((_, lines)) => lines.push(line),
            None if line.trim().is_empty() => {}
            None => {
                let preamble = self.preamble.get_or_insert(span.clone());
                preamble.end = span.end;
            }
        }
    }

    fn flush(&mut self) {
        if let Some((name, lines)) = self.open.take() {
            self.store.add_block(&name, lines);
        }
    }

    fn finish(mut self) -> (BlockStore, Vec<ParseError>) {
        self.flush();

        let mut warnings = Vec::new();
        if let Some(span) = self.preamble {
            warnings.push(
                ParseError::warning("text before the first block is ignored", span, self.file_id)
                    .with_note(format!(
                        "blocks start with a line beginning with '{}'",
                        self.marker
                    )),
            );
        }

        debug!("parsed {} block name(s)", self.store.len());
        (self.store, warnings)
    }
}

pub(crate) fn scan_lines<I, S>(lines: I, marker: char, file_id: usize) -> (BlockStore, Vec<ParseError>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut state = ScanState::new(marker, file_id);
    for line in lines {
        state.push_line(line.into());
    }
    state.finish()
}
