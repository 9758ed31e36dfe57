//! Index-stream parsing layer.
//!
//! This module bridges the raw index lines and the payload cursor.
//!
//! # Module Organization
//!
//! - [`index`]: Tokenizes the `.irf` stream with one line of lookahead
//! - [`dispatch`]: Maps each record keyword to a handler and keeps the
//!   payload cursor in step with the index
//!
//! # Architecture
//!
//! ```text
//! .irf (text)                     .mrf (binary)
//! ┌──────────────────────┐        ┌───────────────┐
//! │ INTERNAL-UNIT-TABLE  │        │               │
//! │ NCOMP / COMPNAME     │        │               │
//! │ GRID ... 2 ... /     │ ─────→ │ block, block  │ skipped
//! │ TIME 1 0.0           │        │               │
//! │ GRID-VALUE .. TEMP / │ ─────→ │ block         │ decoded
//! │ SPEC-HISTORY SPVALS /│ ─────→ │ block         │ decoded
//! │ WELL-ARRAY 0 1       │ ─────→ │ block         │ skipped
//! └──────────────────────┘        └───────────────┘
//! ```

pub mod dispatch;
pub mod index;
