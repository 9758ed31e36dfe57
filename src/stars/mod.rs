//! Core STARS result decoder module

pub mod accumulator;
pub mod codec;
pub mod format;
pub mod reader;
pub mod types;
mod utils;

pub use accumulator::{ParseResult, ResultAccumulator, SnapshotSeries};
pub use reader::{parse, parse_run, parse_streams, parse_with_config, run_paths};
pub use types::error::{Result, StarsError};
pub use types::models::{DecoderConfig, TimeSelection};
pub use utils::parse_encoding;
