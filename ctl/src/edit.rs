//! Applying text produced by an editing surface to a store.

use log::debug;

use crate::block::lines::split_lines;
use crate::error::StoreError;
use crate::store::BlockStore;

/// Replace block `name` with the edited `text`, split into lines that keep
/// their terminators.
pub fn apply_edit(store: &mut BlockStore, name: &str, text: &str) -> Result<(), StoreError> {
    store.update_block(name, split_lines(text))?;
    debug!("block '{}' updated from editor text", name);
    Ok(())
}

/// Apply a set of edits (block name, edited text) to a copy of `store`.
///
/// Every name is checked before anything is applied, so an unknown block
/// leaves no partially edited copy behind. Edits are applied in the given
/// order; a name listed twice is logged twice.
pub fn edit_blocks<'a, I>(store: &BlockStore, edits: I) -> Result<BlockStore, StoreError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let edits: Vec<(&str, &str)> = edits.into_iter().collect();
    if let Some((name, _)) = edits.iter().find(|(name, _)| !store.contains(name)) {
        return Err(StoreError::BlockNotFound(name.to_string()));
    }

    let mut updated = store.copy();
    for (name, text) in edits {
        apply_edit(&mut updated, name, text)?;
    }
    Ok(updated)
}
