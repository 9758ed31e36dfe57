use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use stars_reader::stars::parse_encoding;
use stars_reader::stars::types::templates::widths_by_name;
use stars_reader::{
    Bazargan, Bo, DecoderConfig, Murat, ParseResult, ProductProfile, ReactionTemplate, SevenSpecies, TimeSelection,
    parse_run,
};
use std::env;

const USAGE: &str = "<run-base | file.irf> [--template NAME] [--sphist N] [--cells N] \
[--encoding LABEL] [--after-spec-history] [--verbose | --quiet]";

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1].starts_with("--") {
        eprintln!("Usage: {} {}", args[0], USAGE);
        std::process::exit(1);
    }

    let run_base = &args[1];
    let value_of = |name: &str| flag_value(&args, name);
    let has_flag = |name: &str| args.iter().any(|arg| arg == name);
    let parse_width = |name: &str| -> Option<usize> {
        value_of(name).map(|raw| match raw.parse::<usize>() {
            Ok(width) if width > 0 => width,
            _ => {
                eprintln!("ERROR: {} expects a positive integer, got '{}'.", name, raw);
                std::process::exit(1);
            }
        })
    };

    let level = if has_flag("--verbose") {
        LevelFilter::Debug
    } else if has_flag("--quiet") {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    if let Err(e) = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("WARNING: Logging disabled: {}", e);
    }

    // Template widths first, explicit flags override them.
    let template = value_of("--template");
    let (mut num_sphist, mut grid_cells) = (None, None);
    if let Some(name) = template {
        match widths_by_name(name) {
            Some((n, g)) => {
                num_sphist = Some(n);
                grid_cells = Some(g);
            }
            None => {
                eprintln!("ERROR: Unknown template '{}'. Expected MURAT, BO, BAZARGAN or VKC7.", name);
                std::process::exit(1);
            }
        }
    }
    let num_sphist = parse_width("--sphist").or(num_sphist);
    let grid_cells = parse_width("--cells").or(grid_cells);

    let (Some(num_sphist), Some(grid_cells)) = (num_sphist, grid_cells) else {
        eprintln!("ERROR: Species-history width and grid cell count are required (--template, or --sphist and --cells).");
        std::process::exit(1);
    };

    let mut config = DecoderConfig::new(num_sphist, grid_cells);
    if let Some(label) = value_of("--encoding") {
        config = config.with_encoding(parse_encoding(label));
    }
    if has_flag("--after-spec-history") {
        config = config.with_time_selection(TimeSelection::AfterSpeciesHistory);
    }

    println!("Reading STARS run: {}", run_base);
    println!("{}", "=".repeat(60));

    match parse_run(run_base, &config) {
        Ok(result) => {
            print_summary(&result);
            if let Some(name) = template {
                print_profile(name, &result);
            }
        }
        Err(e) => {
            eprintln!("\nERROR: Failed to decode STARS results");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

/// Value following `name`, if the flag is present.
fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let idx = args.iter().position(|arg| arg == name)?;
    match args.get(idx + 1) {
        Some(value) => Some(value.as_str()),
        None => {
            eprintln!("ERROR: {} flag requires an argument.", name);
            std::process::exit(1);
        }
    }
}

fn print_summary(result: &ParseResult) {
    println!("\nRun Information:");
    println!("  Components: {}", result.components.names.join(", "));
    println!("  Species history columns: {}", result.species_history.width());
    println!("  Grid cells: {}", result.grid_temperature.width());

    println!("\nStatistics:");
    println!("  Time stamps: {}", result.time.len());
    println!("  Grid snapshots: {}", result.grid_temperature.len());
    println!("  Species history rows: {}", result.species_history.len());
    if let (Some(first), Some(last)) = (result.time.first(), result.time.last()) {
        println!("  Time range: {} .. {}", first, last);
    }
    if !result.is_time_sorted() {
        println!("  Note: time vector is not in ascending order");
    }

    if let Some(row) = result.grid_temperature.rows().last() {
        println!("\nLast grid temperature snapshot:");
        println!("  {:?}", row);
    }
    if let Some(row) = result.species_history.rows().last() {
        println!("\nLast species history row:");
        for (i, value) in row.iter().enumerate() {
            let name = result.species_names.get(i).map(|n| n.name.as_str()).unwrap_or("");
            println!("  {:>3}. {:<40} {}", i + 1, name, value);
        }
    }
}

fn print_profile(name: &str, result: &ParseResult) {
    let profile = match name.to_ascii_uppercase().as_str() {
        "MURAT" => Murat::profile(result),
        "BO" => Bo::profile(result),
        "BAZARGAN" => Bazargan::profile(result),
        _ => SevenSpecies::profile(result),
    };
    match profile {
        Ok(ProductProfile { template, products, temperature, .. }) => {
            println!("\nProduct profile ({}):", template);
            for (gas, series) in &products {
                let peak = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                println!("  {:<4} peak {}", gas, peak);
            }
            if let Some(t) = temperature.last() {
                println!("  Final temperature: {} C", t);
            }
        }
        Err(e) => eprintln!("\nWARNING: Could not build product profile: {}", e),
    }
}
