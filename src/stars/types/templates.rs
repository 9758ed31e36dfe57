//! Reaction-model templates.
//!
//! Each runfile template emits a different species-history layout. The
//! decoder only needs a handful of facts about a template: how wide its
//! vectors are and which columns hold the produced gases. Those facts live
//! on zero-sized marker types so a caller picks a template explicitly.

use std::collections::BTreeMap;

use super::error::{Result, StarsError};
use crate::stars::accumulator::{ParseResult, SnapshotSeries};

/// Offset between Kelvin and Celsius.
const KELVIN_OFFSET: f64 = 273.15;

/// Where a template's reference temperature comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemperatureSource {
    /// A cell of the `TEMP` grid snapshot.
    GridColumn(usize),
    /// A species-history column, optionally reported in Kelvin.
    SpeciesColumn { column: usize, kelvin: bool },
}

/// Layout facts for one reaction-model template.
pub trait ReactionTemplate {
    /// A short name used for logging and the command line.
    const NAME: &'static str;

    /// Width of every `SPVALS` vector.
    const NUM_SPHIST: usize;

    /// Width of every `TEMP` grid snapshot.
    const GRID_CELLS: usize;

    /// Produced-gas series as `(name, species column)` pairs.
    const PRODUCTS: &'static [(&'static str, usize)];

    const TEMPERATURE: TemperatureSource;

    /// Slices a decoded run into named product series.
    fn profile(result: &ParseResult) -> Result<ProductProfile> {
        let mut products = BTreeMap::new();
        for &(name, column) in Self::PRODUCTS {
            products.insert(name.to_string(), column_of(&result.species_history, column, "species history")?);
        }

        let temperature = match Self::TEMPERATURE {
            TemperatureSource::GridColumn(column) => column_of(&result.grid_temperature, column, "grid value")?,
            TemperatureSource::SpeciesColumn { column, kelvin } => {
                let values = column_of(&result.species_history, column, "species history")?;
                if kelvin {
                    values.into_iter().map(|t| t - KELVIN_OFFSET).collect()
                } else {
                    values
                }
            }
        };

        Ok(ProductProfile {
            template: Self::NAME,
            time: result.time.clone(),
            products,
            temperature,
        })
    }
}

fn column_of(series: &SnapshotSeries, column: usize, record: &'static str) -> Result<Vec<f64>> {
    series.column(column).ok_or_else(|| StarsError::RecordWidthMismatch {
        record,
        field: format!("column {}", column),
        expected: column + 1,
        found: series.width() as u64,
    })
}

/// Named product series extracted from a [`ParseResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProductProfile {
    pub template: &'static str,
    pub time: Vec<f64>,
    pub products: BTreeMap<String, Vec<f64>>,
    /// Reference temperature per snapshot, in Celsius.
    pub temperature: Vec<f64>,
}

/// Murat's four-reaction template.
#[derive(Debug)]
pub struct Murat;

impl ReactionTemplate for Murat {
    const NAME: &'static str = "MURAT";
    const NUM_SPHIST: usize = 22;
    const GRID_CELLS: usize = 22;
    const PRODUCTS: &'static [(&'static str, usize)] =
        &[("N2", 8), ("O2", 9), ("H2O", 10), ("CO", 11), ("CO2", 12)];
    const TEMPERATURE: TemperatureSource = TemperatureSource::GridColumn(8);
}

/// The heavy-oil (BO) template.
#[derive(Debug)]
pub struct Bo;

impl ReactionTemplate for Bo {
    const NAME: &'static str = "BO";
    const NUM_SPHIST: usize = 18;
    const GRID_CELLS: usize = 22;
    const PRODUCTS: &'static [(&'static str, usize)] =
        &[("N2", 6), ("O2", 7), ("H2O", 8), ("CO", 9), ("CO2", 10)];
    const TEMPERATURE: TemperatureSource = TemperatureSource::GridColumn(8);
}

/// Bazargan's two-coke template, which only reports oxygen.
#[derive(Debug)]
pub struct Bazargan;

impl ReactionTemplate for Bazargan {
    const NAME: &'static str = "BAZARGAN";
    const NUM_SPHIST: usize = 12;
    const GRID_CELLS: usize = 22;
    const PRODUCTS: &'static [(&'static str, usize)] = &[("O2", 3)];
    const TEMPERATURE: TemperatureSource = TemperatureSource::SpeciesColumn { column: 11, kelvin: false };
}

/// The seven-column kinetic-cell template shared by the Arrhenius and
/// non-Arrhenius models.
#[derive(Debug)]
pub struct SevenSpecies;

impl ReactionTemplate for SevenSpecies {
    const NAME: &'static str = "VKC7";
    const NUM_SPHIST: usize = 7;
    const GRID_CELLS: usize = 22;
    const PRODUCTS: &'static [(&'static str, usize)] =
        &[("N2", 0), ("O2", 1), ("CO", 2), ("CO2", 3), ("H2O", 4), ("Oil", 5)];
    const TEMPERATURE: TemperatureSource = TemperatureSource::SpeciesColumn { column: 6, kelvin: true };
}

/// Looks up `(NUM_SPHIST, GRID_CELLS)` by template name, case-insensitively.
pub fn widths_by_name(name: &str) -> Option<(usize, usize)> {
    let upper = name.to_ascii_uppercase();
    if upper == Murat::NAME {
        Some((Murat::NUM_SPHIST, Murat::GRID_CELLS))
    } else if upper == Bo::NAME {
        Some((Bo::NUM_SPHIST, Bo::GRID_CELLS))
    } else if upper == Bazargan::NAME {
        Some((Bazargan::NUM_SPHIST, Bazargan::GRID_CELLS))
    } else if upper == SevenSpecies::NAME || upper == "MASTER" || upper == "NONARR" {
        Some((SevenSpecies::NUM_SPHIST, SevenSpecies::GRID_CELLS))
    } else {
        None
    }
}
