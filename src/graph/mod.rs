pub mod conversion;
pub mod definition;
pub mod order;

pub use conversion::*;
pub use definition::*;
pub use order::*;

pub const TRACING_TARGET: &str = "cwlforge::graph";
