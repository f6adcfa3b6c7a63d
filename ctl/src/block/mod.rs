pub mod lines;

/// The lines of one block occurrence, each carrying its own terminator.
pub type Lines = Vec<String>;

/// Marker that opens a block in NONMEM control streams (`$PROBLEM`, `$DATA`, ...).
pub const DEFAULT_MARKER: char = '$';

/// A named block of a control file.
/// The same name may occur several times in a source file (e.g. repeated
/// `$THETA` records); each occurrence is kept separately and in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The opening token, marker included. Case-sensitive.
    pub name: String,
    /// Occurrences in source order. Never empty for a block held by a store.
    pub occurrences: Vec<Lines>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Block {
            name: name.into(),
            occurrences: Vec::new(),
        }
    }

    pub fn occurrence_count(&self) -> usize {
        self.occurrences.len()
    }

    /// All occurrences concatenated, as shown to an editor.
    pub fn text(&self) -> String {
        self.occurrences
            .iter()
            .flat_map(|occurrence| occurrence.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Returns the block name if `line` opens a block.
///
/// A line opens a block when its whitespace-stripped content starts with
/// `marker`; the name is the first whitespace-delimited token of that content.
pub fn block_name(line: &str, marker: char) -> Option<&str> {
    let stripped = line.trim();
    if !stripped.starts_with(marker) {
        return None;
    }
    stripped.split_whitespace().next()
}
