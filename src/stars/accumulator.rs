//! Append-only storage for decoded snapshots and the frozen result.

use std::collections::BTreeMap;

use log::warn;

use super::types::models::{ComponentTable, SpeciesHistoryName, TimeLabel, UnitTable};

/// A dense, row-major series of equally wide snapshots.
///
/// Row `i` is the `i`-th decoded record of its kind, in stream order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotSeries {
    width: usize,
    values: Vec<f64>,
}

impl SnapshotSeries {
    fn from_rows(width: usize, rows: Vec<Vec<f64>>) -> Self {
        let mut values = Vec::with_capacity(width * rows.len());
        for row in rows {
            debug_assert_eq!(row.len(), width);
            values.extend(row);
        }
        Self { width, values }
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        if self.width == 0 { 0 } else { self.values.len() / self.width }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values per snapshot.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.width)?;
        let end = start.checked_add(self.width)?;
        self.values.get(start..end).filter(|row| !row.is_empty())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.width.max(1))
    }

    /// One value per snapshot, or `None` when `index` is outside the row width.
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        (index < self.width).then(|| self.rows().map(|row| row[index]).collect())
    }

    /// All values, row after row.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Rows as owned vectors.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }
}

/// The decoded contents of one simulation run. Immutable once returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    pub time: Vec<f64>,
    pub grid_temperature: SnapshotSeries,
    pub species_history: SnapshotSeries,
    pub units: UnitTable,
    pub components: ComponentTable,
    pub species_names: Vec<SpeciesHistoryName>,
    pub time_labels: Vec<TimeLabel>,
    /// `*-REC` lists, keyed by keyword. A repeated keyword keeps the last list.
    pub structural_records: BTreeMap<String, Vec<String>>,
}

impl ParseResult {
    /// True when the time vector never decreases.
    pub fn is_time_sorted(&self) -> bool {
        self.time.windows(2).all(|w| w[0] <= w[1])
    }

    /// True when time, grid and species series all have the same length.
    pub fn is_aligned(&self) -> bool {
        self.time.len() == self.grid_temperature.len() && self.time.len() == self.species_history.len()
    }

    /// A copy with time and both series reordered by ascending time.
    ///
    /// Returns `None` unless the three series are aligned.
    pub fn sorted_by_time(&self) -> Option<ParseResult> {
        if !self.is_aligned() {
            return None;
        }
        let mut order: Vec<usize> = (0..self.time.len()).collect();
        order.sort_by(|&a, &b| self.time[a].total_cmp(&self.time[b]));

        let reorder = |series: &SnapshotSeries| {
            let rows = order
                .iter()
                .filter_map(|&i| series.row(i).map(<[f64]>::to_vec))
                .collect();
            SnapshotSeries::from_rows(series.width(), rows)
        };

        Some(ParseResult {
            time: order.iter().map(|&i| self.time[i]).collect(),
            grid_temperature: reorder(&self.grid_temperature),
            species_history: reorder(&self.species_history),
            ..self.clone()
        })
    }
}

/// Mutable state collected during one scan.
#[derive(Debug)]
pub struct ResultAccumulator {
    grid_cell_count: usize,
    num_sphist: usize,
    time: Vec<f64>,
    grid_temperature: Vec<Vec<f64>>,
    species_history: Vec<Vec<f64>>,
    pub(crate) units: UnitTable,
    pub(crate) components: ComponentTable,
    pub(crate) species_names: Vec<SpeciesHistoryName>,
    pub(crate) time_labels: Vec<TimeLabel>,
    pub(crate) structural_records: BTreeMap<String, Vec<String>>,
}

impl ResultAccumulator {
    pub fn new(grid_cell_count: usize, num_sphist: usize) -> Self {
        Self {
            grid_cell_count,
            num_sphist,
            time: Vec::new(),
            grid_temperature: Vec::new(),
            species_history: Vec::new(),
            units: UnitTable::default(),
            components: ComponentTable::default(),
            species_names: Vec::new(),
            time_labels: Vec::new(),
            structural_records: BTreeMap::new(),
        }
    }

    pub fn append_time(&mut self, value: f64) {
        self.time.push(value);
    }

    pub fn append_grid_temperature(&mut self, vector: Vec<f64>) {
        self.grid_temperature.push(vector);
    }

    pub fn append_species_history(&mut self, vector: Vec<f64>) {
        self.species_history.push(vector);
    }

    /// Counts of (time, grid, species) rows appended so far.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.time.len(), self.grid_temperature.len(), self.species_history.len())
    }

    /// Converts the collected rows into dense series.
    ///
    /// Row order equals append order. Nothing is sorted or deduplicated.
    pub fn freeze(self) -> ParseResult {
        let result = ParseResult {
            time: self.time,
            grid_temperature: SnapshotSeries::from_rows(self.grid_cell_count, self.grid_temperature),
            species_history: SnapshotSeries::from_rows(self.num_sphist, self.species_history),
            units: self.units,
            components: self.components,
            species_names: self.species_names,
            time_labels: self.time_labels,
            structural_records: self.structural_records,
        };

        if !result.is_aligned() {
            warn!(
                "Series lengths differ: {} time stamps, {} grid snapshots, {} species rows",
                result.time.len(),
                result.grid_temperature.len(),
                result.species_history.len()
            );
        }
        if let Some(count) = result.components.count {
            if count != self.num_sphist {
                warn!(
                    "NCOMP declares {} components but species-history rows are {} wide",
                    count, self.num_sphist
                );
            }
        }
        if !result.is_time_sorted() {
            warn!("Time vector is not in ascending order");
        }
        result
    }
}
