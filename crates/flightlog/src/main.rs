//! `flightlog` - CLI for the personal flight history tracker
//!
//! Imports crew-schedule exports, records trips, and prints the rotations
//! table and the statistics dashboard.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{debug, info};

use flightlog::cli::{
    AddCommand, Cli, Command, ConfigCommand, ImportCommand, RotationsCommand, StatsCommand,
};
use flightlog::display::{rotation_rows, with_commas};
use flightlog::duration::{to_days_text, to_display};
use flightlog::form::TripForm;
use flightlog::import::DATE_FORMAT;
use flightlog::stats::Dashboard;
use flightlog::{init_logging, parse_trips, Config, ReferenceData, Storage, StorageStats};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // `config validate --file` reports on its own file instead of failing here.
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        return handle_validate(file.clone().or_else(|| cli.config.clone()));
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Import(cmd) => handle_import(&config, &cmd),
        Command::Add(cmd) => handle_add(&config, &cmd),
        Command::NextNumber => {
            let storage = open_storage(&config)?;
            println!("{}", storage.next_trip_number()?);
            Ok(())
        }
        Command::Rotations(cmd) => handle_rotations(&config, &cmd),
        Command::Stats(cmd) => handle_stats(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_storage(config: &Config) -> Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("failed to open database {}", path.display()))
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn handle_import(config: &Config, cmd: &ImportCommand) -> Result<()> {
    let mut options = config.import_options();
    if let Some(header_lines) = cmd.header_lines {
        options.header_lines = header_lines;
    }

    let text = read_input(&cmd.file)?;
    let trips = parse_trips(&text, &options)
        .with_context(|| format!("failed to import {}", cmd.file.display()))?;
    let legs: usize = trips.iter().map(|t| t.legs().len()).sum();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&trips)?);
    }

    if cmd.dry_run {
        info!(trips = trips.len(), legs, "Dry run, nothing stored");
        if !cmd.json {
            println!("Parsed {} trips ({legs} legs)", trips.len());
        }
        return Ok(());
    }

    let storage = open_storage(config)?;
    let outcome = storage.append_all(&trips);
    let written = outcome.written;
    outcome
        .into_result()
        .with_context(|| format!("import stopped after {written} of {} trips", trips.len()))?;

    if !cmd.json {
        println!("Imported {written} trips ({legs} legs)");
    }
    Ok(())
}

fn handle_add(config: &Config, cmd: &AddCommand) -> Result<()> {
    let text = read_input(&cmd.file)?;
    let form: TripForm = serde_json::from_str(&text).context("malformed trip form")?;

    let storage = open_storage(config)?;
    let trip_number = storage.next_trip_number()?;
    debug!(trip_number, "Assigning trip number");
    let trip = form.into_trip(trip_number)?;

    if cmd.dry_run {
        println!("{}", serde_json::to_string_pretty(&trip)?);
        return Ok(());
    }

    storage.append_trip(&trip).map_err(|err| {
        let context = if err.is_duplicate() {
            "trip number was taken by another writer, run add again"
        } else {
            "failed to store trip"
        };
        anyhow::Error::new(err).context(context)
    })?;
    println!(
        "Added trip {trip_number} ({}, {} legs)",
        trip.rotation,
        trip.legs().len()
    );
    Ok(())
}

fn handle_rotations(config: &Config, cmd: &RotationsCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let trips = storage.list_trips()?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&trips)?);
        return Ok(());
    }

    if trips.is_empty() {
        println!("No trips recorded.");
        return Ok(());
    }

    for row in rotation_rows(&trips) {
        let trip = row.trip;
        println!(
            "Trip {:<5} {:<10} {} day(s)  credit {}  TAFB {}",
            trip.trip_number,
            trip.rotation.as_str(),
            trip.trip_length(),
            to_display(i64::from(trip.credit_value)),
            to_display(i64::from(trip.time_away_from_base)),
        );
        for leg_row in &row.legs {
            let leg = leg_row.leg;
            let date = leg_row
                .shown_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default();
            println!(
                "  {date:<10}  {}-{}  {:>6}  {:>6} mi  {:<10} {} #{:<5}{}",
                leg.start_airport,
                leg.end_airport,
                to_display(i64::from(leg.duration)),
                with_commas(u64::from(leg.mileage)),
                leg.aircraft.to_string(),
                leg.aircraft.body,
                leg.flight_number,
                if leg.layover { "  layover" } else { "" },
            );
        }
        println!();
    }
    Ok(())
}

fn handle_stats(config: &Config, cmd: &StatsCommand) -> Result<()> {
    let reference = ReferenceData::load(
        config.reference.airports_path.as_deref(),
        config.reference.states_path.as_deref(),
    )
    .context("failed to load reference data")?;

    let storage = open_storage(config)?;
    let trips = storage.list_trips()?;
    let dashboard = Dashboard::build(&trips, &reference);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    print_dashboard(&dashboard);
    print_storage(&storage.stats()?, storage.path());
    Ok(())
}

fn print_storage(stats: &StorageStats, path: &Path) {
    let date = |d: Option<NaiveDate>| {
        d.map_or_else(|| "-".to_string(), |d| d.format(DATE_FORMAT).to_string())
    };

    println!();
    println!("Storage");
    println!("=======");
    println!("  Database:         {}", path.display());
    println!("  Stored trips:     {}", with_commas(u64::from(stats.trips)));
    println!("  Stored legs:      {}", with_commas(u64::from(stats.legs)));
    println!("  First flight:     {}", date(stats.first_flight));
    println!("  Last flight:      {}", date(stats.last_flight));
    println!("  Size:             {} bytes", with_commas(stats.db_size_bytes));
}

fn minutes(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn count(value: usize) -> String {
    with_commas(u64::try_from(value).unwrap_or(u64::MAX))
}

fn print_dashboard(dashboard: &Dashboard<'_>) {
    let totals = &dashboard.totals;

    println!("Totals");
    println!("======");
    println!("  Trips:            {}", count(totals.trips));
    println!("  Legs:             {}", count(totals.legs));
    println!("  Days flown:       {}", count(totals.days_flown));
    println!("  Miles:            {}", with_commas(totals.mileage));
    println!("  Block time:       {}", to_days_text(minutes(totals.duration)));
    println!("  Credit:           {}", to_display(minutes(totals.credit_value)));
    println!(
        "  Away from base:   {}",
        to_days_text(minutes(totals.time_away_from_base))
    );
    println!(
        "  Makes:            Airbus {}  Boeing {}  Other {}",
        totals.by_make.airbus, totals.by_make.boeing, totals.by_make.other
    );
    println!(
        "  Bodies:           Narrowbody {}  Widebody {}",
        totals.by_body.narrow, totals.by_body.wide
    );
    println!(
        "  Around the globe: {} times",
        dashboard.distance.globe_laps_text()
    );
    println!(
        "  To the moon:      {}%",
        dashboard.distance.moon_percent_text()
    );

    if let Some(extremes) = &dashboard.extremes {
        println!();
        println!("Flights");
        println!("=======");
        if let Some(shortest) = extremes.shortest {
            println!(
                "  Shortest: {}-{} {} mi",
                shortest.start_airport,
                shortest.end_airport,
                with_commas(u64::from(shortest.mileage))
            );
        }
        let longest = extremes.longest;
        println!(
            "  Longest:  {}-{} {} mi",
            longest.start_airport,
            longest.end_airport,
            with_commas(u64::from(longest.mileage))
        );
    }

    if !dashboard.aircraft.is_empty() {
        println!();
        println!("Aircraft");
        println!("========");
        for row in &dashboard.aircraft {
            println!(
                "  {}{:<10} {:>5} legs  {:>10}  {:>10} mi",
                row.make,
                row.model,
                row.count,
                to_display(minutes(row.duration)),
                with_commas(row.mileage)
            );
        }
    }

    if !dashboard.trip_lengths.is_empty() {
        println!();
        println!("Trip lengths");
        println!("============");
        for row in &dashboard.trip_lengths {
            println!(
                "  {} day(s): {:>4} trips  credit {}-{}  TAFB {}-{}",
                row.trip_length,
                row.count,
                to_display(i64::from(row.credit_min)),
                to_display(i64::from(row.credit_max)),
                to_display(i64::from(row.time_away_min)),
                to_display(i64::from(row.time_away_max)),
            );
        }
    }

    if !dashboard.state_visits.is_empty() {
        println!();
        println!("States visited");
        println!("==============");
        for (state, visits) in &dashboard.state_visits {
            println!("  {state}  {visits}");
        }
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let builtin = "(built-in)".to_string();
                let shown = |p: &Option<PathBuf>| {
                    p.as_ref()
                        .map_or_else(|| builtin.clone(), |p| p.display().to_string())
                };

                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Import]");
                println!("  Header lines:   {}", config.import.header_lines);
                println!("  Delimiter:      {:?}", config.import.delimiter);
                println!();
                println!("[Reference]");
                println!("  Airports:       {}", shown(&config.reference.airports_path));
                println!("  States:         {}", shown(&config.reference.states_path));
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => handle_validate(file)?,
    }
    Ok(())
}

fn handle_validate(file: Option<PathBuf>) -> Result<()> {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());

    Config::load_from(Some(path.clone()))
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    println!("Configuration is valid.");
    Ok(())
}
