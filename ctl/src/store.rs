use std::fmt;

use indexmap::IndexMap;
use log::debug;

use crate::block::{Block, Lines};
use crate::changelog::ChangeLog;
use crate::error::StoreError;

/// Blocks of a control file keyed by name, plus the history of their edits.
///
/// Names iterate in first-seen order. Updating a block keeps its position.
/// Cloning (see [`BlockStore::copy`]) is deep: no line buffer or log entry is
/// shared between the copies.
#[derive(Debug, Clone, Default, Eq)]
pub struct BlockStore {
    blocks: IndexMap<String, Block>,
    change_log: ChangeLog,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `content` as a new occurrence of `name`.
    pub fn add_block(&mut self, name: &str, content: Lines) {
        self.blocks
            .entry(name.to_string())
            .or_insert_with(|| Block::new(name))
            .occurrences
            .push(content);
    }

    /// Replace every occurrence of `name` with the single occurrence
    /// `new_content` and record the change.
    pub fn update_block(&mut self, name: &str, new_content: Lines) -> Result<(), StoreError> {
        let Some(block) = self.blocks.get_mut(name) else {
            return Err(StoreError::BlockNotFound(name.to_string()));
        };

        let original = std::mem::replace(&mut block.occurrences, vec![new_content.clone()]);
        debug!(
            "updated block '{}' ({} occurrence(s) replaced)",
            name,
            original.len()
        );
        self.change_log.log_change(name, original, new_content);
        Ok(())
    }

    /// Reconstruct the control file text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for block in self.blocks.values() {
            for line in block.occurrences.iter().flatten() {
                out.push_str(line);
            }
            out.push('\n');
        }
        out.trim().to_string()
    }

    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn get(&self, name: &str) -> Option<&Block> {
        self.blocks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Number of distinct block names.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.change_log
    }
}

/// Two stores are equal when they hold the same blocks in the same order and
/// the same change log.
impl PartialEq for BlockStore {
    fn eq(&self, other: &Self) -> bool {
        self.blocks.iter().eq(other.blocks.iter()) && self.change_log == other.change_log
    }
}

impl fmt::Display for BlockStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
