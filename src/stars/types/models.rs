//! Core data structures for STARS result-file components.
//!
//! This module defines the fundamental types used throughout the library:
//! - The closed set of index-stream record kinds
//! - Static tables parsed once near the start of the index stream
//! - Decoder configuration supplied by the caller

use encoding_rs::Encoding;

use super::templates::ReactionTemplate;

/// Number of rows in both the internal and the output unit tables.
pub const UNIT_TABLE_ROWS: usize = 21;

/// Token that closes a multi-line index record.
pub const RECORD_TERMINATOR: &str = "/";

/// Property name decoded from `GRID-VALUE` records.
pub const GRID_TEMPERATURE_FIELD: &str = "TEMP";

/// Property name decoded from `SPEC-HISTORY` records.
pub const SPECIES_VALUES_FIELD: &str = "SPVALS";

/// Number of header tokens (keyword included) that precede the property
/// list of a `GRID-VALUE` or `SPEC-HISTORY` record.
pub const PROPERTY_RECORD_HEADER_TOKENS: usize = 4;

/// Record types the decoder knows about, keyed by the first token of an
/// index line.
///
/// Matching is case-sensitive. Anything not listed is `Unknown` and is
/// skipped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    InternalUnitTable,
    OutputUnitTable,
    ComponentCount,
    ComponentNames,
    ComponentPhaseTemplate,
    Time,
    TimeLabel,
    SpeciesHistoryNames,
    /// `GRID`: structural record followed by a counted run of binary blocks.
    GridStructure,
    /// `GRID-VALUE`: one block per listed property, `TEMP` decoded.
    GridValue,
    /// `SPEC-HISTORY`: one block per listed property, `SPVALS` decoded.
    SpeciesHistory,
    /// `WELL-ARRAY`, `LAYER-ARRAY`, `GROUP-ARRAY`: counted blocks, never decoded.
    BinaryArray,
    /// `WELL-REC`, `SECTOR-REC`, `RSTSPECnn-REC`, ...: text lists ending in `/`.
    StructuralList,
    Unknown,
}

impl From<&str> for RecordKind {
    fn from(keyword: &str) -> Self {
        match keyword {
            "INTERNAL-UNIT-TABLE" => Self::InternalUnitTable,
            "OUTPUT-UNIT-TABLE" => Self::OutputUnitTable,
            "NCOMP" => Self::ComponentCount,
            "COMPNAME" => Self::ComponentNames,
            "COMP-PHASE-TEMPLATE" => Self::ComponentPhaseTemplate,
            "TIME" => Self::Time,
            "TIMCHR" => Self::TimeLabel,
            "SPHIST-NAMES" => Self::SpeciesHistoryNames,
            "GRID" => Self::GridStructure,
            "GRID-VALUE" => Self::GridValue,
            "SPEC-HISTORY" => Self::SpeciesHistory,
            "WELL-ARRAY" | "LAYER-ARRAY" | "GROUP-ARRAY" => Self::BinaryArray,
            "WELL-REC" | "LAYER-REC" | "GROUP-REC" | "SECTOR-REC" => Self::StructuralList,
            other if is_restart_spec_record(other) => Self::StructuralList,
            _ => Self::Unknown,
        }
    }
}

/// Matches `RSTSPEC01-REC` through `RSTSPEC22-REC`.
fn is_restart_spec_record(keyword: &str) -> bool {
    keyword
        .strip_prefix("RSTSPEC")
        .and_then(|rest| rest.strip_suffix("-REC"))
        .filter(|digits| digits.len() == 2)
        .and_then(|digits| digits.parse::<u8>().ok())
        .is_some_and(|n| (1..=22).contains(&n))
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            RecordKind::InternalUnitTable => "internal unit table",
            RecordKind::OutputUnitTable => "output unit table",
            RecordKind::ComponentCount => "component count",
            RecordKind::ComponentNames => "component names",
            RecordKind::ComponentPhaseTemplate => "component phase template",
            RecordKind::Time => "time",
            RecordKind::TimeLabel => "time label",
            RecordKind::SpeciesHistoryNames => "species history names",
            RecordKind::GridStructure => "grid structure",
            RecordKind::GridValue => "grid value",
            RecordKind::SpeciesHistory => "species history",
            RecordKind::BinaryArray => "binary array",
            RecordKind::StructuralList => "structural list",
            RecordKind::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Unit names and descriptions from the two unit tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitTable {
    /// Internal unit names, one per table row.
    pub internal: Vec<String>,
    /// Descriptions paired with `internal`.
    pub descriptions: Vec<String>,
    /// Output unit names, one per table row.
    pub output: Vec<String>,
}

/// Component count and per-component metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentTable {
    /// Declared by `NCOMP`. `None` until that record is seen.
    pub count: Option<usize>,
    pub names: Vec<String>,
    pub phase_templates: Vec<String>,
}

/// One row of the `SPHIST-NAMES` table.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesHistoryName {
    pub number: String,
    pub name: String,
}

/// A `TIMCHR` record: the simulator's own rendering of a time stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeLabel {
    pub label: String,
    pub unit: String,
}

/// Which `TIME` records contribute to the time vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSelection {
    /// Every `TIME` record is appended.
    #[default]
    All,
    /// Only `TIME` lines located one or three physical lines after a
    /// `SPEC-HISTORY` header. Full simulator output repeats `TIME` for
    /// other record groups; this keeps exactly one stamp per species row.
    AfterSpeciesHistory,
}

/// Caller-supplied configuration. None of it can be derived from the
/// streams, so it must be known before parsing starts.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Width of every `SPVALS` vector (`numSPHIST`).
    pub num_sphist: usize,
    /// Width of every `TEMP` grid snapshot.
    pub grid_cell_count: usize,
    /// Text encoding of the index stream.
    pub encoding: &'static Encoding,
    pub time_selection: TimeSelection,
}

impl DecoderConfig {
    pub fn new(num_sphist: usize, grid_cell_count: usize) -> Self {
        Self {
            num_sphist,
            grid_cell_count,
            encoding: encoding_rs::UTF_8,
            time_selection: TimeSelection::default(),
        }
    }

    /// Widths taken from a reaction template.
    pub fn for_template<T: ReactionTemplate>() -> Self {
        Self::new(T::NUM_SPHIST, T::GRID_CELLS)
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_time_selection(mut self, time_selection: TimeSelection) -> Self {
        self.time_selection = time_selection;
        self
    }
}
