//! # Record Dispatch
//!
//! Classifies each index record by keyword and runs the matching handler.
//! Handlers fall into four groups:
//!
//! 1.  **Inline**: values are taken from index tokens only (unit tables,
//!     component tables, `TIME`, `TIMCHR`, `SPHIST-NAMES`).
//! 2.  **Binary, decoded**: `GRID-VALUE` and `SPEC-HISTORY` announce one
//!     payload block per listed property. `TEMP` and `SPVALS` are decoded,
//!     every other property block is skipped.
//! 3.  **Binary, skipped**: `GRID`, the `*-ARRAY` records and unknown
//!     `NAME ( count )` headers announce a counted run of blocks that are
//!     consumed without decoding.
//! 4.  **Structural**: `*-REC` lists ending in `/`, kept verbatim.
//!
//! Every binary-bearing handler consumes exactly the blocks its record
//! announces. Getting this wrong desynchronizes every later record.

use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::OnceLock;

use log::{debug, trace};
use regex::Regex;

use crate::stars::accumulator::ResultAccumulator;
use crate::stars::codec::payload::{BinaryPayloadReader, F64_WIDTH};
use crate::stars::format::index::IndexStreamReader;
use crate::stars::types::error::{Result, StarsError};
use crate::stars::types::models::*;
use crate::stars::utils::{self, numeric_token, strip_quotes};

/// Matches unknown headers of the form `NAME ( count )` or `NAME(count)`.
static COUNTED_HEADER: OnceLock<Regex> = OnceLock::new();

fn counted_header_regex() -> &'static Regex {
    COUNTED_HEADER.get_or_init(|| Regex::new(r"^\S+?\s*\(\s*(\d+)\s*\)$").expect("Invalid counted header regex"))
}

/// Returns the block count of a `NAME ( count )` header line.
///
/// A count that does not fit in `usize` is an [`StarsError::InvalidField`].
pub fn counted_header(tokens: &[String], line: usize) -> Result<Option<usize>> {
    let text = tokens.join(" ");
    let Some(caps) = counted_header_regex().captures(&text) else {
        return Ok(None);
    };
    let raw = &caps[1];
    raw.parse().map(Some).map_err(|_| StarsError::InvalidField {
        line,
        keyword: tokens.first().cloned().unwrap_or_default(),
        field: "block count",
        value: raw.to_string(),
    })
}

/// How far below a `SPEC-HISTORY` header a selected `TIME` line may sit.
const SPECIES_HISTORY_TIME_WINDOW: usize = 3;

/// Everything one scan owns: both cursors and the accumulator.
///
/// Created fresh per parse and threaded through every handler.
#[derive(Debug)]
pub struct ParseContext<I, B> {
    pub index: IndexStreamReader<I>,
    pub payload: BinaryPayloadReader<B>,
    pub acc: ResultAccumulator,
    /// Start lines of recent `SPEC-HISTORY` headers, oldest first.
    species_history_lines: VecDeque<usize>,
}

impl<I, B> ParseContext<I, B> {
    fn note_species_history(&mut self, line: usize) {
        let oldest = line.saturating_sub(SPECIES_HISTORY_TIME_WINDOW);
        self.species_history_lines.retain(|&start| start >= oldest);
        self.species_history_lines.push_back(line);
    }

    /// True when a `SPEC-HISTORY` header started 1 or 3 lines above `line`.
    fn follows_species_history(&self, line: usize) -> bool {
        [1, SPECIES_HISTORY_TIME_WINDOW]
            .iter()
            .filter_map(|&gap| line.checked_sub(gap))
            .any(|start| self.species_history_lines.contains(&start))
    }
}

impl<I: BufRead, B: BufRead> ParseContext<I, B> {
    pub fn new(index: IndexStreamReader<I>, payload: BinaryPayloadReader<B>, acc: ResultAccumulator) -> Self {
        Self {
            index,
            payload,
            acc,
            species_history_lines: VecDeque::new(),
        }
    }
}

/// Which property of a property record gets decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodedProperty {
    GridTemperature,
    SpeciesValues,
}

/// Maps index records to handlers. Holds the widths needed to size reads.
#[derive(Debug)]
pub struct RecordDispatcher<'a> {
    config: &'a DecoderConfig,
}

impl<'a> RecordDispatcher<'a> {
    pub fn new(config: &'a DecoderConfig) -> Self {
        Self { config }
    }

    /// Handles the record at the index cursor.
    ///
    /// Returns the record's kind, or `None` when the index stream is exhausted.
    pub fn dispatch<I: BufRead, B: BufRead>(&self, ctx: &mut ParseContext<I, B>) -> Result<Option<RecordKind>> {
        let kind = match ctx.index.peek_keyword()? {
            Some(keyword) => RecordKind::from(keyword),
            None => return Ok(None),
        };

        match kind {
            RecordKind::InternalUnitTable => self.internal_unit_table(ctx)?,
            RecordKind::OutputUnitTable => self.output_unit_table(ctx)?,
            RecordKind::ComponentCount => self.component_count(ctx)?,
            RecordKind::ComponentNames => self.component_rows(ctx, kind)?,
            RecordKind::ComponentPhaseTemplate => self.component_rows(ctx, kind)?,
            RecordKind::Time => self.time(ctx)?,
            RecordKind::TimeLabel => self.time_label(ctx)?,
            RecordKind::SpeciesHistoryNames => self.species_history_names(ctx)?,
            RecordKind::GridStructure => self.grid_structure(ctx)?,
            RecordKind::GridValue => self.property_record(ctx, "GRID-VALUE", GRID_TEMPERATURE_FIELD, DecodedProperty::GridTemperature)?,
            RecordKind::SpeciesHistory => self.property_record(ctx, "SPEC-HISTORY", SPECIES_VALUES_FIELD, DecodedProperty::SpeciesValues)?,
            RecordKind::BinaryArray => self.binary_array(ctx)?,
            RecordKind::StructuralList => self.structural_list(ctx)?,
            RecordKind::Unknown => self.unknown(ctx)?,
        }
        Ok(Some(kind))
    }

    fn internal_unit_table<I: BufRead, B: BufRead>(&self, ctx: &mut ParseContext<I, B>) -> Result<()> {
        let keyword = "INTERNAL-UNIT-TABLE";
        ctx.index.expect_line(keyword)?;
        for _ in 0..UNIT_TABLE_ROWS {
            let row = ctx.index.expect_line("internal unit table row")?;
            let line = ctx.index.line_number();
            let name = utils::token(&row, 1, line, keyword)?.to_string();
            let description = utils::token(&row, 3, line, keyword)?.to_string();
            ctx.acc.units.internal.push(name);
            ctx.acc.units.descriptions.push(description);
        }
        debug!("Loaded internal unit table: {} rows", UNIT_TABLE_ROWS);
        Ok(())
    }

    fn output_unit_table<I: BufRead, B: BufRead>(&self, ctx: &mut ParseContext<I, B>) -> Result<()> {
        let keyword = "OUTPUT-UNIT-TABLE";
        ctx.index.expect_line(keyword)?;
        for _ in 0..UNIT_TABLE_ROWS {
            let row = ctx.index.expect_line("output unit table row")?;
            let line = ctx.index.line_number();
            ctx.acc.units.output.push(utils::token(&row, 1, line, keyword)?.to_string());
        }
        debug!("Loaded output unit table: {} rows", UNIT_TABLE_ROWS);
        Ok(())
    }

    fn component_count<I: BufRead, B: BufRead>(&self, ctx: &mut ParseContext<I, B>) -> Result<()> {
        let tokens = ctx.index.expect_line("NCOMP")?;
        let count: usize = numeric_token(&tokens, 1, ctx.index.line_number(), "NCOMP", "component count")?;
        debug!("Component count: {}", count);
        ctx.acc.components.count = Some(count);
        Ok(())
    }

    /// `COMPNAME` and `COMP-PHASE-TEMPLATE`: one row per component.
    fn component_rows<I: BufRead, B: BufRead>(&self, ctx: &mut ParseContext<I, B>, kind: RecordKind) -> Result<()> {
        let (keyword, column) = match kind {
            RecordKind::ComponentNames => ("COMPNAME", 1),
            _ => ("COMP-PHASE-TEMPLATE", 2),
        };
        let header_line = ctx.index.line_number();
        let count = ctx.acc.components.count.ok_or_else(|| StarsError::MalformedIndex {
            line: header_line,
            reason: format!("{} appears before NCOMP", keyword),
        })?;
        ctx.index.expect_line(keyword)?;

        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            let row = ctx.index.expect_line(keyword)?;
            values.push(strip_quotes(utils::token(&row, column, ctx.index.line_number(), keyword)?));
        }
        debug!("Loaded {} {} rows", values.len(), keyword);

        if kind == RecordKind::ComponentNames {
            ctx.acc.components.names = values;
        } else {
            ctx.acc.components.phase_templates = values;
        }
        Ok(())
    }

    /// `TIME <step> <value> ...`. A line with a single field is read as `TIME <value>`.
    fn time<I: BufRead, B: BufRead>(&self, ctx: &mut ParseContext<I, B>) -> Result<()> {
        let tokens = ctx.index.expect_line("TIME")?;
        let line = ctx.index.line_number();

        let selected = match self.config.time_selection {
            TimeSelection::All => true,
            TimeSelection::AfterSpeciesHistory => ctx.follows_species_history(line),
        };
        if !selected {
            trace!("TIME record at line {} not selected", line);
            return Ok(());
        }

        let field = if tokens.len() == 2 { 1 } else { 2 };
        let value: f64 = numeric_token(&tokens, field, line, "TIME", "time value")?;
        ctx.acc.append_time(value);
        Ok(())
    }

    fn time_label<I: BufRead, B: BufRead>(&self, ctx: &mut ParseContext<I, B>) -> Result<()> {
        let tokens = ctx.index.expect_line("TIMCHR")?;
        let line = ctx.index.line_number();
        ctx.acc.time_labels.push(TimeLabel {
            label: utils::token(&tokens, 2, line, "TIMCHR")?.to_string(),
            unit: strip_quotes(utils::token(&tokens, 3, line, "TIMCHR")?),
        });
        Ok(())
    }

    fn species_history_names<I: BufRead, B: BufRead>(&self, ctx: &mut ParseContext<I, B>) -> Result<()> {
        ctx.index.expect_line("SPHIST-NAMES")?;
        let mut names = Vec::with_capacity(self.config.num_sphist);
        for _ in 0..self.config.num_sphist {
            let row = ctx.index.expect_line("SPHIST-NAMES row")?;
            names.push(SpeciesHistoryName {
                number: row[0].clone(),
                name: row.iter().skip(3).map(|t| strip_quotes(t)).collect::<Vec<_>>().join(" "),
            });
        }
        debug!("Loaded {} species history names", names.len());
        ctx.acc.species_names = names;
        Ok(())
    }

    /// `GRID <type> <count> ... /` followed by `count` blocks of geometry.
    fn grid_structure<I: BufRead, B: BufRead>(&self, ctx: &mut ParseContext<I, B>) -> Result<()> {
        let line = ctx.index.line_number();
        let tokens = ctx.index.read_record_until(RECORD_TERMINATOR)?;
        let count: usize = numeric_token(&tokens, 2, line, "GRID", "item count")?;
        let skipped = ctx.payload.skip_blocks(count)?;
        debug!("Skipped GRID record: {} blocks, {} bytes", count, skipped);
        Ok(())
    }

    /// `GRID-VALUE` / `SPEC-HISTORY`: one payload block per listed property.
    fn property_record<I: BufRead, B: BufRead>(
        &self,
        ctx: &mut ParseContext<I, B>,
        keyword: &'static str,
        decoded_field: &str,
        decoded: DecodedProperty,
    ) -> Result<()> {
        let start_line = ctx.index.line_number();
        let tokens = ctx.index.read_record_until(RECORD_TERMINATOR)?;
        if decoded == DecodedProperty::SpeciesValues {
            ctx.note_species_history(start_line);
        }

        let properties = tokens.get(PROPERTY_RECORD_HEADER_TOKENS..).unwrap_or_default();
        for property in properties {
            if property != decoded_field {
                ctx.payload.skip_length_prefixed_block()?;
                continue;
            }
            let block = ctx.payload.read_length_prefixed_block()?;
            match decoded {
                DecodedProperty::GridTemperature => {
                    let values = ctx.payload.decode_f64_array(&block, self.config.grid_cell_count)?;
                    ctx.acc.append_grid_temperature(values);
                }
                DecodedProperty::SpeciesValues => {
                    self.check_species_width(&ctx.payload, keyword, property, block.len())?;
                    let values = ctx.payload.decode_f64_array(&block, self.config.num_sphist)?;
                    ctx.acc.append_species_history(values);
                }
            }
        }
        trace!("{} record at line {}: {} property blocks", keyword, start_line, properties.len());
        Ok(())
    }

    /// A species block must hold whole float64 values, exactly `num_sphist` of them.
    fn check_species_width<B: BufRead>(
        &self,
        payload: &BinaryPayloadReader<B>,
        keyword: &'static str,
        property: &str,
        length: usize,
    ) -> Result<()> {
        if length % F64_WIDTH != 0 {
            return Err(StarsError::TruncatedBinary {
                context: format!("{} {} block is not a whole number of float64 values", keyword, property),
                offset: payload.block_offset(),
                expected: (self.config.num_sphist * F64_WIDTH) as u64,
                found: length as u64,
            });
        }
        let found = length / F64_WIDTH;
        if found != self.config.num_sphist {
            return Err(StarsError::RecordWidthMismatch {
                record: keyword,
                field: property.to_string(),
                expected: self.config.num_sphist,
                found: found as u64,
            });
        }
        Ok(())
    }

    /// `WELL-ARRAY <type> <count>`: `count` blocks, never decoded.
    fn binary_array<I: BufRead, B: BufRead>(&self, ctx: &mut ParseContext<I, B>) -> Result<()> {
        let tokens = ctx.index.expect_line("binary array")?;
        let count: usize = numeric_token(&tokens, 2, ctx.index.line_number(), &tokens[0], "item count")?;
        let skipped = ctx.payload.skip_blocks(count)?;
        trace!("Skipped {}: {} blocks, {} bytes", tokens[0], count, skipped);
        Ok(())
    }

    fn structural_list<I: BufRead, B: BufRead>(&self, ctx: &mut ParseContext<I, B>) -> Result<()> {
        let mut tokens = ctx.index.read_record_until(RECORD_TERMINATOR)?;
        let keyword = tokens.remove(0);
        trace!("Stored {} list: {} entries", keyword, tokens.len());
        ctx.acc.structural_records.insert(keyword, tokens);
        Ok(())
    }

    fn unknown<I: BufRead, B: BufRead>(&self, ctx: &mut ParseContext<I, B>) -> Result<()> {
        let tokens = ctx.index.expect_line("record")?;
        if let Some(count) = counted_header(&tokens, ctx.index.line_number())? {
            let skipped = ctx.payload.skip_blocks(count)?;
            debug!(
                "Skipped unrecognized counted record '{}' at line {}: {} blocks, {} bytes",
                tokens[0],
                ctx.index.line_number(),
                count,
                skipped
            );
        }
        Ok(())
    }
}
