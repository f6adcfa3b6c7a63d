pub mod block;
pub mod changelog;
pub mod edit;
pub mod error;
pub mod model;
pub mod parser;
pub mod store;

pub use block::{Block, DEFAULT_MARKER, Lines};
pub use changelog::{ChangeLog, ChangeLogEntry};
pub use error::StoreError;
pub use store::BlockStore;
