//! CLI Module
//!
//! Command-line interface for combining, comparing and summarizing layered
//! values read from a JSON file.

pub mod commands;
pub mod input;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Layered - annotate values and watch the annotations merge
#[derive(Parser, Debug)]
#[command(name = "layered")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Combine every input value with one operation
    #[command(name = "combine")]
    Combine {
        /// JSON file holding an array of annotated values
        input: PathBuf,

        /// Operation applied to the base values
        #[arg(short, long, value_enum, default_value_t = CombineOp::Collect)]
        op: CombineOp,

        /// Print the result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Compare exactly two values, base and layers
    #[command(name = "compare")]
    Compare {
        /// JSON file holding an array of two annotated values
        input: PathBuf,
    },

    /// Show the merged value of every layer across the inputs
    #[command(name = "summarize")]
    Summarize {
        /// JSON file holding an array of annotated values
        input: PathBuf,
    },
}

/// Base operation used by `combine`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CombineOp {
    /// Numeric sum (merges units as `add`)
    Sum,
    /// Numeric product (merges units as `multiply`)
    Product,
    /// String concatenation
    Concat,
    /// Gather the base values into an array
    Collect,
}

impl CombineOp {
    /// Name of the layered procedure; layers such as `unit` key their merge
    /// rule on it
    pub fn procedure_name(self) -> &'static str {
        match self {
            CombineOp::Sum => "add",
            CombineOp::Product => "multiply",
            CombineOp::Concat => "concat",
            CombineOp::Collect => "collect",
        }
    }
}
