use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Track weather observations for a catalog of locations.
#[derive(Debug, Parser)]
#[command(name = "geoweather", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load (or refresh) the location catalog from a CSV file
    Load {
        /// CSV file with name, latitude and longitude columns
        file: PathBuf,
    },

    /// Fetch current weather for all known locations and append to the log
    Sync {
        /// Keep running, refreshing on the configured interval
        #[arg(long)]
        watch: bool,
    },

    /// Show the latest observation per location
    Snapshot,

    /// Show all observations for one location, oldest first
    History {
        /// Location name as loaded into the catalog
        location: String,
    },

    /// List the location keys present in the observation log
    Locations,
}
