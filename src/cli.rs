use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use limic_core::ExtractConfig;

#[derive(Debug, Parser)]
#[command(
    name = "limic",
    version,
    about = "Extract pruned navigation graphs along power line infrastructure"
)]
pub struct Cli {
    /// TOML file with extraction parameters
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract the graph of a single topology file
    File {
        /// Topology JSON file
        input: PathBuf,
        /// Output file, `.geojson` renders a feature collection
        output: PathBuf,
        #[command(flatten)]
        params: ExtractArgs,
    },
    /// Extract the graph of one area of a snapshot cache
    Cache {
        /// Snapshot JSON file such as `cache.europe.json`
        snapshot: PathBuf,
        /// Output file, `.geojson` renders a feature collection
        output: PathBuf,
        /// Area to extract, taken from the snapshot file name by default
        #[arg(long)]
        area: Option<String>,
        #[command(flatten)]
        params: ExtractArgs,
    },
}

/// Command line overrides of the extraction parameters
#[derive(Debug, Clone, Default, Args)]
pub struct ExtractArgs {
    /// Maximum free-flight distance in meters
    #[arg(long)]
    pub around: Option<f64>,
    /// Fraction of a segment length where crossings are ignored
    #[arg(long)]
    pub eps: Option<f64>,
    /// Minimum distance in meters from restricted structures
    #[arg(long = "safe-dist")]
    pub safe_distance: Option<f64>,
    /// Weight multiplier for free-flight edges
    #[arg(long = "penalize")]
    pub penalty: Option<f64>,
    /// Crossings closer than this many meters are merged
    #[arg(long)]
    pub merge_distance: Option<f64>,
    /// Also write the extraction report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,
}

impl ExtractArgs {
    pub fn apply(&self, config: &mut ExtractConfig) {
        if let Some(around) = self.around {
            config.around = around;
        }
        if let Some(eps) = self.eps {
            config.eps = eps;
        }
        if let Some(safe_distance) = self.safe_distance {
            config.safe_distance = safe_distance;
        }
        if let Some(penalty) = self.penalty {
            config.penalty = penalty;
        }
        if let Some(merge_distance) = self.merge_distance {
            config.merge_distance = merge_distance;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "limic",
            "file",
            "in.json",
            "out.json",
            "--around",
            "500",
            "--penalize",
            "5",
        ]);
        let Command::File { params, .. } = cli.command else {
            panic!("expected file command");
        };

        let mut config = ExtractConfig::default();
        params.apply(&mut config);
        assert_eq!(config.around, 500.0);
        assert_eq!(config.penalty, 5.0);
        assert_eq!(config.eps, 0.01);
    }
}
