pub mod analyze;
pub mod decode;
pub mod sanitize;
pub mod scan;
pub mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::ShieldConfig;
use crate::error::Result;

#[derive(Debug, Parser)]
#[command(name = "inputshield", version, about = "Decode, score and sanitize suspicious links and text")]
pub struct Cli {
    /// Config file. Default: ~/.config/inputshield/config.yml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log decode layers and rule hits to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score a URL and print the report as JSON.
    Analyze {
        url: String,
        /// Skip backend enrichment.
        #[arg(long)]
        offline: bool,
    },
    /// Clean a piece of text the way the input shield would.
    Sanitize {
        /// Text to clean. Read from stdin when omitted.
        text: Option<String>,
        /// Treat the text as pasted rather than typed.
        #[arg(long)]
        paste: bool,
    },
    /// Show every decoding layer peeled off the text.
    Decode {
        text: String,
        #[arg(long, value_enum, default_value_t = Profile::Shield)]
        profile: Profile,
    },
    /// Report every line of a file or directory that carries an injection payload.
    Scan { path: PathBuf },
    /// Show sanitizing statistics.
    Stats {
        /// Trailing window in days (1 to 366).
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=366))]
        days: u32,
        /// Zero today's counters.
        #[arg(long)]
        reset: bool,
    },
}

/// Decoder preset selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    Url,
    Shield,
}

impl Cli {
    pub fn load_config(&self) -> Result<ShieldConfig> {
        match &self.config {
            Some(path) => ShieldConfig::load_from(path),
            None => ShieldConfig::load(),
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;
    match cli.command {
        Command::Analyze { url, offline } => analyze::run(&config, &url, offline).await,
        Command::Sanitize { text, paste } => sanitize::run(&config, text, paste),
        Command::Decode { text, profile } => decode::run(&config, &text, profile),
        Command::Scan { path } => scan::run(&config, &path),
        Command::Stats { days, reset } => stats::run(&config, days, reset),
    }
}
