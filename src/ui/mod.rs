//! The canvas editor's document model and its conversion into a `Graph`.

pub mod types;

pub use types::*;
