//! Boundary to a modeling library that owns structured model objects.
//!
//! The library is only ever asked for the control-file code of a model and
//! for a new model parsed from code; everything in between happens on blocks.

use crate::block::lines::split_lines;
use crate::parser::parse_lines;
use crate::store::BlockStore;

pub trait ModelLibrary {
    type Handle;
    type Dataset;
    type DataInfo;
    type Error: std::error::Error;

    /// The model's control-file code. Must already be in NONMEM format.
    fn code(&self, model: &Self::Handle) -> String;

    fn parse_model(&self, code: &str) -> Result<Self::Handle, Self::Error>;

    fn dataset(&self, model: &Self::Handle) -> Self::Dataset;

    fn datainfo(&self, model: &Self::Handle) -> Self::DataInfo;

    fn with_dataset(
        &self,
        model: Self::Handle,
        dataset: Self::Dataset,
        datainfo: Self::DataInfo,
    ) -> Result<Self::Handle, Self::Error>;
}

/// Split a model's code into blocks.
pub fn blocks_from_model<L: ModelLibrary>(library: &L, model: &L::Handle, marker: char) -> BlockStore {
    parse_lines(split_lines(&library.code(model)), marker)
}

/// Build a model from rendered blocks, keeping the dataset of `parent`.
pub fn blocks_to_model<L: ModelLibrary>(
    library: &L,
    blocks: &BlockStore,
    parent: &L::Handle,
) -> Result<L::Handle, L::Error> {
    let model = library.parse_model(&blocks.render())?;
    library.with_dataset(model, library.dataset(parent), library.datainfo(parent))
}
