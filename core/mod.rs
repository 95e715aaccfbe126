// Core module: chat types and text handling (NO I/O dependencies)
pub mod types;
pub mod text;

pub use types::*;
pub use text::*;
