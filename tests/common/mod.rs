#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use stars_reader::{DecoderConfig, ParseResult, Result, parse_streams};

/// Big-endian encoding of a float64 array, as the simulator writes it.
pub fn be_f64_bytes(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Builds a matching `.irf` / `.mrf` pair in memory.
#[derive(Debug, Default, Clone)]
pub struct RunBuilder {
    pub index: Vec<u8>,
    pub payload: Vec<u8>,
}

impl RunBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, line: &str) -> Self {
        self.index.extend_from_slice(line.as_bytes());
        self.index.push(b'\n');
        self
    }

    pub fn raw_line(mut self, line: &[u8]) -> Self {
        self.index.extend_from_slice(line);
        self.index.push(b'\n');
        self
    }

    /// Appends a block whose length prefix matches its body.
    pub fn block(self, body: &[u8]) -> Self {
        self.block_with_prefix(body.len() as u64, body)
    }

    /// Appends a block with an arbitrary length prefix.
    pub fn block_with_prefix(mut self, declared: u64, body: &[u8]) -> Self {
        self.payload.extend_from_slice(&declared.to_be_bytes());
        self.payload.extend_from_slice(body);
        self
    }

    pub fn f64_block(self, values: &[f64]) -> Self {
        self.block(&be_f64_bytes(values))
    }

    pub fn raw_payload(mut self, bytes: &[u8]) -> Self {
        self.payload.extend_from_slice(bytes);
        self
    }

    pub fn time(self, step: u32, value: f64) -> Self {
        self.line(&format!("TIME {} {:?}", step, value))
    }

    pub fn grid_temperature(self, temps: &[f64]) -> Self {
        self.line("GRID-VALUE 1 0 ALL TEMP /").f64_block(temps)
    }

    pub fn species_history(self, values: &[f64]) -> Self {
        self.line("SPEC-HISTORY 1 0 ALL SPVALS /").f64_block(values)
    }

    pub fn parse(&self, config: &DecoderConfig) -> Result<ParseResult> {
        parse_streams(Cursor::new(&self.index), Cursor::new(&self.payload), config)
    }

    /// Writes `<dir>/<name>.irf` and `<dir>/<name>.mrf`, returning the base path.
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let base = dir.join(name);
        fs::write(dir.join(format!("{}.irf", name)), &self.index).expect("write irf");
        fs::write(dir.join(format!("{}.mrf", name)), &self.payload).expect("write mrf");
        base
    }
}

/// Two time stamps, one grid snapshot of 3 cells, one species row of 4 values.
pub fn scenario_a() -> RunBuilder {
    RunBuilder::new()
        .time(1, 0.0)
        .grid_temperature(&[20.0, 20.5, 21.0])
        .species_history(&[0.1, 0.2, 0.3, 0.4])
        .time(2, 1.0)
}

pub fn scenario_config() -> DecoderConfig {
    DecoderConfig::new(4, 3)
}
