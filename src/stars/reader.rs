use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::accumulator::{ParseResult, ResultAccumulator};
use super::codec::payload::{BinaryPayloadReader, MAX_F64_COUNT};
use super::format::dispatch::{ParseContext, RecordDispatcher};
use super::format::index::IndexStreamReader;
use super::types::error::{Result, StarsError};
use super::types::models::DecoderConfig;

/// Extension of the text index stream.
pub const INDEX_EXTENSION: &str = "irf";

/// Extension of the binary payload stream.
pub const PAYLOAD_EXTENSION: &str = "mrf";

/// Decodes one run from explicit file paths.
///
/// # Arguments
/// * `index_path` - Path to the `.irf` index file
/// * `binary_path` - Path to the `.mrf` payload file
/// * `num_sphist` - Width of every species-history vector
/// * `grid_cell_count` - Width of every grid temperature snapshot
///
/// # Errors
/// Returns an error if:
/// - Either file cannot be opened or read
/// - A multi-line record is never terminated
/// - The payload ends inside a declared block
/// - A decoded record disagrees with the configured widths
/// - Payload bytes remain after the index is exhausted
pub fn parse(
    index_path: impl AsRef<Path>,
    binary_path: impl AsRef<Path>,
    num_sphist: usize,
    grid_cell_count: usize,
) -> Result<ParseResult> {
    parse_with_config(index_path, binary_path, &DecoderConfig::new(num_sphist, grid_cell_count))
}

/// Decodes one run from explicit file paths with full configuration.
///
/// Both handles are owned by this call and closed on every exit path.
pub fn parse_with_config(
    index_path: impl AsRef<Path>,
    binary_path: impl AsRef<Path>,
    config: &DecoderConfig,
) -> Result<ParseResult> {
    let index_path = index_path.as_ref();
    let binary_path = binary_path.as_ref();
    info!("Opening STARS results: {} + {}", index_path.display(), binary_path.display());

    let index = BufReader::new(File::open(index_path)?);
    let binary = BufReader::new(File::open(binary_path)?);
    parse_streams(index, binary, config)
}

/// Decodes the `<base>.irf` / `<base>.mrf` pair.
///
/// `base` may carry either extension or none.
pub fn parse_run(base: impl AsRef<Path>, config: &DecoderConfig) -> Result<ParseResult> {
    let (index_path, binary_path) = run_paths(base);
    parse_with_config(index_path, binary_path, config)
}

/// Resolves the two sibling files of a run.
pub fn run_paths(base: impl AsRef<Path>) -> (PathBuf, PathBuf) {
    let base = base.as_ref();
    let has_run_extension = base
        .extension()
        .is_some_and(|ext| ext == INDEX_EXTENSION || ext == PAYLOAD_EXTENSION);

    if has_run_extension {
        (base.with_extension(INDEX_EXTENSION), base.with_extension(PAYLOAD_EXTENSION))
    } else {
        let with_suffix = |ext: &str| {
            let mut name = OsString::from(base.as_os_str());
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        };
        (with_suffix(INDEX_EXTENSION), with_suffix(PAYLOAD_EXTENSION))
    }
}

/// Decodes one run from already-open streams.
///
/// Scans the index until it is exhausted, dispatching each record, then
/// requires the payload cursor to sit exactly at end of stream.
pub fn parse_streams<I: BufRead, B: BufRead>(index: I, binary: B, config: &DecoderConfig) -> Result<ParseResult> {
    validate_config(config)?;

    let mut ctx = ParseContext::new(
        IndexStreamReader::new(index, config.encoding),
        BinaryPayloadReader::new(binary),
        ResultAccumulator::new(config.grid_cell_count, config.num_sphist),
    );
    let dispatcher = RecordDispatcher::new(config);

    let mut records = 0usize;
    while let Some(kind) = dispatcher.dispatch(&mut ctx)? {
        records += 1;
        debug!("Handled {} record ({} so far)", kind, records);
    }

    if !ctx.payload.at_end()? {
        let offset = ctx.payload.offset();
        let trailing = ctx.payload.drain_remaining()?;
        return Err(StarsError::StreamDesync { offset, trailing });
    }

    let (times, grids, species) = ctx.acc.counts();
    info!(
        "STARS results decoded: {} records, {} time stamps, {} grid snapshots, {} species rows, {} payload bytes",
        records,
        times,
        grids,
        species,
        ctx.payload.offset()
    );
    Ok(ctx.acc.freeze())
}

fn validate_config(config: &DecoderConfig) -> Result<()> {
    let widths = [("num_sphist", config.num_sphist), ("grid_cell_count", config.grid_cell_count)];
    for (field, width) in widths {
        let bound = match width {
            0 => 1,
            w if w > MAX_F64_COUNT => MAX_F64_COUNT,
            _ => continue,
        };
        return Err(StarsError::RecordWidthMismatch {
            record: "configuration",
            field: field.to_string(),
            expected: bound,
            found: width as u64,
        });
    }
    Ok(())
}
