mod common;

use common::RunBuilder;
use stars_reader::stars::types::templates::widths_by_name;
use stars_reader::{Bazargan, Bo, DecoderConfig, Murat, ParseResult, ReactionTemplate};

/// One snapshot whose species value `i` is `i` and grid cell `i` is `100 + i`.
fn indexed_run<T: ReactionTemplate>() -> ParseResult {
    let species: Vec<f64> = (0..T::NUM_SPHIST).map(|i| i as f64).collect();
    let grid: Vec<f64> = (0..T::GRID_CELLS).map(|i| 100.0 + i as f64).collect();
    RunBuilder::new()
        .time(1, 0.5)
        .grid_temperature(&grid)
        .species_history(&species)
        .parse(&DecoderConfig::for_template::<T>())
        .expect("parse ok")
}

#[test]
fn murat_reads_products_and_grid_temperature() {
    let profile = Murat::profile(&indexed_run::<Murat>()).expect("profile");

    assert_eq!(profile.template, "MURAT");
    assert_eq!(profile.time, vec![0.5]);
    assert_eq!(profile.products.len(), 5);
    assert_eq!(profile.products["N2"], vec![8.0]);
    assert_eq!(profile.products["CO2"], vec![12.0]);
    assert_eq!(profile.temperature, vec![108.0]);
}

#[test]
fn bo_reads_products_and_grid_temperature() {
    let profile = Bo::profile(&indexed_run::<Bo>()).expect("profile");

    assert_eq!(profile.template, "BO");
    assert_eq!(profile.products["N2"], vec![6.0]);
    assert_eq!(profile.products["H2O"], vec![8.0]);
    assert_eq!(profile.products["CO2"], vec![10.0]);
    assert_eq!(profile.temperature, vec![108.0]);
}

#[test]
fn bazargan_reads_oxygen_and_celsius_species_temperature() {
    let profile = Bazargan::profile(&indexed_run::<Bazargan>()).expect("profile");

    assert_eq!(profile.template, "BAZARGAN");
    assert_eq!(profile.products.keys().collect::<Vec<_>>(), vec!["O2"]);
    assert_eq!(profile.products["O2"], vec![3.0]);
    assert_eq!(profile.temperature, vec![11.0]);
}

#[test]
fn template_widths_resolve_by_name() {
    assert_eq!(widths_by_name("MURAT"), Some((22, 22)));
    assert_eq!(widths_by_name("murat"), Some((22, 22)));
    assert_eq!(widths_by_name("Bo"), Some((18, 22)));
    assert_eq!(widths_by_name("bazargan"), Some((12, 22)));
    assert_eq!(widths_by_name("VKC7"), Some((7, 22)));
    assert_eq!(widths_by_name("Master"), Some((7, 22)));
    assert_eq!(widths_by_name("nonarr"), Some((7, 22)));
    assert_eq!(widths_by_name("arrhenius"), None);
}
