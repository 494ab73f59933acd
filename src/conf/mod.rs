//! Target config format rendering.

mod header;
mod writer;

pub use header::{HeaderConfig, TIME_PLACEHOLDER};
pub use writer::{ConfWriter, FINAL_RULE};
