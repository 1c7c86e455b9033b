mod arena;
mod assemble;
mod handle;
mod node;
mod raw_tree;

pub(crate) use handle::Handle;
pub(crate) use node::{Metadata, Node};
pub(crate) use raw_tree::{Inserted, Leaves, RawTree};
