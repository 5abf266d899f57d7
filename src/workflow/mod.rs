pub mod document;
pub mod serialize;

pub use document::*;
pub use serialize::*;
