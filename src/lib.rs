//! # stars-reader
//!
//! A decoder for STARS simulator result files.
//!
//! A finished run leaves two sibling files: a line-oriented text index
//! (`.irf`) and a binary payload (`.mrf`) whose length-prefixed blocks are
//! positionally tied to the index records. This crate walks both in step and
//! returns the time vector, grid temperature snapshots and species-history
//! rows as dense series.
//!
//! ```no_run
//! use stars_reader::{parse_run, DecoderConfig};
//!
//! let config = DecoderConfig::new(22, 22);
//! let result = parse_run("runs/rto_experiment", &config).unwrap();
//! println!("{} snapshots", result.grid_temperature.len());
//! ```
pub mod stars;

// Re-export the main types for convenience
pub use stars::{
    DecoderConfig,
    ParseResult,
    Result,
    SnapshotSeries,
    StarsError,
    TimeSelection,
    parse,
    parse_run,
    parse_streams,
    parse_with_config,
    types::templates::{Bazargan, Bo, Murat, ProductProfile, ReactionTemplate, SevenSpecies},
};
