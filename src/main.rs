#![warn(missing_docs)]
//! Command-line front end for crusade planet maps.
//!
//! Administers the alliance roster and drives generation, expansion and
//! inspection of the map stored in a SQLite file.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crusade_map::{AllianceId, Campaign, CrusadeConfig, MapStore, SqliteStore};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

/// Generate and grow hex planet maps for a crusade campaign.
#[derive(Parser, Debug)]
#[command(name = "crusade-map", version, about)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database, overriding `store.database_path`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Seed for reproducible generation; entropy when omitted.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register an alliance.
    AllianceAdd {
        /// Unique alliance name.
        name: String,
    },
    /// Register a player, optionally inside an alliance.
    PlayerAdd {
        /// Alliance the player fights for.
        alliance_id: Option<AllianceId>,
    },
    /// Generate a fresh planet.
    Generate {
        /// Rings around the center; `campaign.initial_rings` when omitted.
        #[arg(long)]
        rings: Option<u32>,
    },
    /// Expand the planet out to a ring count.
    Expand {
        /// Target ring count.
        #[arg(long)]
        rings: u32,
    },
    /// Expand the planet to the size the roster warrants.
    Grow,
    /// Print the stored planet.
    Show {
        /// Dump cells and edges as JSON instead of a summary line.
        #[arg(long)]
        json: bool,
    },
    /// Delete every cell and edge, keeping the roster.
    Clear,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = CrusadeConfig::load(cli.config.as_deref())?;
    let db_path = cli.db.unwrap_or_else(|| config.store.database_path.clone());
    let store = SqliteStore::open(&db_path)?;
    let mut campaign = Campaign::new(store, &config)?;

    let mut rng = match cli.seed {
        Some(seed) => {
            tracing::info!(target: "crusade_map::cli", seed, "cli.rng.seeded");
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };

    match cli.command {
        Command::AllianceAdd { name } => {
            let id = campaign.store_mut().add_alliance(&name)?;
            println!("alliance {id}: {name}");
        }
        Command::PlayerAdd { alliance_id } => {
            let id = campaign.store_mut().add_player(alliance_id)?;
            match alliance_id {
                Some(alliance) => println!("player {id} joined alliance {alliance}"),
                None => println!("player {id} (unaffiliated)"),
            }
        }
        Command::Generate { rings } => {
            let batch = campaign.generate_planet(rings, &mut rng)?;
            println!(
                "generated {} cells, {} edges",
                batch.cells.len(),
                batch.edges.len()
            );
        }
        Command::Expand { rings } => {
            let batch = campaign.expand_planet(rings, &mut rng)?;
            println!(
                "added {} cells, {} edges",
                batch.cells.len(),
                batch.edges.len()
            );
        }
        Command::Grow => {
            let rings = campaign.warranted_rings()?;
            let batch = campaign.grow_for_players(&mut rng)?;
            println!(
                "roster warrants radius {rings}: added {} cells, {} edges",
                batch.cells.len(),
                batch.edges.len()
            );
        }
        Command::Show { json } => {
            let map = campaign.store().load_map()?;
            if json {
                let dump = serde_json::json!({
                    "summary": map.summary(),
                    "cells": map.cells(),
                    "edges": map.edges(),
                });
                println!("{}", serde_json::to_string_pretty(&dump)?);
            } else {
                println!("{}", map.summary());
            }
        }
        Command::Clear => {
            campaign.clear_planet()?;
            println!("map cleared");
        }
    }
    Ok(())
}
