//! Codec layer for the binary payload stream.
//!
//! # Submodules
//!
//! - [`payload`][]: Length-prefixed block cursor and float64 array decoding

pub mod payload;
