use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve the minimum-distance EVRPTW for each instance
    Solve {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Solve the battery-degradation extension for each instance
    SolveBd {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        bd: BdArgs,
    },
    /// Price the battery-degradation cost of previously solved routes
    BdCost {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        bd: BdArgs,

        /// Directory holding the `<instance>_result.csv` files to price
        #[arg(long)]
        routes_dir: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
pub struct CommonArgs {
    /// Directory with `<instance>_locations.csv` / `<instance>_other.csv`
    #[arg(long)]
    pub data_dir: PathBuf,

    /// Directory for the `<instance>_result.csv` output files
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Solver wall-clock budget per instance, in seconds
    #[arg(long, default_value_t = 7200.0)]
    pub time_limit: f64,

    /// Instance names (file stems), solved in order
    #[arg(required = true)]
    pub instances: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct BdArgs {
    /// Degradation price level: 0 = (0.1, 0.2), 1 = (0.5, 1), 2 = (2.5, 5)
    #[arg(long, default_value_t = 0)]
    pub price_level: usize,

    /// Lower state-of-charge threshold, as a fraction of battery capacity
    #[arg(long, default_value_t = 0.25)]
    pub lb: f64,

    /// Upper state-of-charge threshold, as a fraction of battery capacity
    #[arg(long, default_value_t = 0.85)]
    pub ub: f64,
}
