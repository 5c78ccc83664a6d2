//! CLI argument parsing for anonym-eval

use crate::channel::Channel;
use crate::setting::ParameterSetting;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for comparison results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table on stdout (default)
    Text,
    /// JSON document on stdout
    Json,
    /// One CSV file per (channel, metric) in the output directory
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "anonym-eval")]
#[command(version)]
#[command(
    about = "Evaluate anonymized physiological time series against the real population",
    long_about = None
)]
pub struct Cli {
    /// TOML configuration file (flags below override its values)
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Real records drawn per anonymized record for nearest-neighbor search
    #[arg(short = 'k', long = "sample-size", value_name = "K", global = true)]
    pub sample_size: Option<usize>,

    /// Fixed seed for reference sampling (default: entropy, logged at start)
    #[arg(long = "seed", value_name = "SEED", global = true)]
    pub seed: Option<u64>,

    /// Score records on the current thread only
    #[arg(long = "no-parallel", global = true)]
    pub no_parallel: bool,

    /// Enable debug logging (TRACE level)
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Nearest-neighbor DTW dissimilarity of every anonymized record
    Dissim {
        #[command(flatten)]
        populations: PopulationArgs,

        /// Proportion level of the setting (names the output file)
        #[arg(long = "prop", value_name = "P", requires = "perturb")]
        prop: Option<String>,

        /// Perturbation level of the setting (names the output file)
        #[arg(long = "perturb", value_name = "Q", requires = "prop")]
        perturb: Option<String>,
    },

    /// Summary metrics of both populations, one CSV per (channel, metric)
    Describe {
        #[command(flatten)]
        populations: PopulationArgs,

        #[command(flatten)]
        setting: SettingArgs,
    },

    /// KS and Mann-Whitney tests on every summary metric
    Compare {
        #[command(flatten)]
        populations: PopulationArgs,

        #[command(flatten)]
        setting: SettingArgs,

        /// Restrict to these channels (e.g., --channel FC,PAS)
        #[arg(long = "channel", value_name = "CHANNEL", value_delimiter = ',')]
        channels: Vec<Channel>,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Dissimilarity, description and comparison in one go
    Run {
        #[command(flatten)]
        populations: PopulationArgs,

        #[command(flatten)]
        setting: SettingArgs,
    },
}

/// Input and output directories shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct PopulationArgs {
    /// Directory of real `*_series.txt` records
    #[arg(long = "real", value_name = "DIR")]
    pub real: PathBuf,

    /// Directory of anonymized `*_series.txt` records
    #[arg(long = "anonym", value_name = "DIR")]
    pub anonym: PathBuf,

    /// Output directory (created if missing)
    #[arg(long = "out", value_name = "DIR")]
    pub out: PathBuf,
}

/// Anonymization parameter setting of the evaluated population
#[derive(Args, Debug, Clone)]
pub struct SettingArgs {
    /// Proportion level
    #[arg(long = "prop", value_name = "P")]
    pub prop: String,

    /// Perturbation level
    #[arg(long = "perturb", value_name = "Q")]
    pub perturb: String,
}

impl SettingArgs {
    pub fn to_setting(&self) -> ParameterSetting {
        ParameterSetting::new(&self.prop, &self.perturb)
    }
}

impl Command {
    pub fn populations(&self) -> &PopulationArgs {
        match self {
            Command::Dissim { populations, .. }
            | Command::Describe { populations, .. }
            | Command::Compare { populations, .. }
            | Command::Run { populations, .. } => populations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRS: [&str; 6] = ["--real", "r", "--anonym", "a", "--out", "o"];

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["anonym-eval"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_cli_dissim_without_setting() {
        let mut args = vec!["dissim"];
        args.extend_from_slice(&DIRS);
        let cli = parse(&args);

        match cli.command {
            Command::Dissim {
                populations,
                prop,
                perturb,
            } => {
                assert_eq!(populations.real, PathBuf::from("r"));
                assert_eq!(populations.anonym, PathBuf::from("a"));
                assert_eq!(populations.out, PathBuf::from("o"));
                assert!(prop.is_none());
                assert!(perturb.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_dissim_prop_requires_perturb() {
        let mut args = vec!["anonym-eval", "dissim", "--prop", "0.5"];
        args.extend_from_slice(&DIRS);
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_compare_channels_and_format() {
        let mut args = vec![
            "compare", "--prop", "0.25", "--perturb", "0.05", "--channel", "fc,PAM", "--format",
            "json",
        ];
        args.extend_from_slice(&DIRS);
        let cli = parse(&args);

        match cli.command {
            Command::Compare {
                setting,
                channels,
                format,
                ..
            } => {
                assert_eq!(
                    setting.to_setting().to_string(),
                    "prop-level_0.25_perturb-level_0.05"
                );
                assert_eq!(channels, vec![Channel::Fc, Channel::Pam]);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_compare_defaults() {
        let mut args = vec!["compare", "--prop", "0.25", "--perturb", "0.05"];
        args.extend_from_slice(&DIRS);
        let cli = parse(&args);

        match cli.command {
            Command::Compare {
                channels, format, ..
            } => {
                assert!(channels.is_empty());
                assert_eq!(format, OutputFormat::Text);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_describe_requires_setting() {
        let mut args = vec!["anonym-eval", "describe"];
        args.extend_from_slice(&DIRS);
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_unknown_channel_rejected() {
        let mut args = vec![
            "anonym-eval", "compare", "--prop", "1", "--perturb", "1", "--channel", "SPO2",
        ];
        args.extend_from_slice(&DIRS);
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let mut args = vec![
            "run",
            "--prop",
            "0.5",
            "--perturb",
            "0.1",
            "--seed",
            "42",
            "-k",
            "5",
            "--no-parallel",
            "--debug",
        ];
        args.extend_from_slice(&DIRS);
        let cli = parse(&args);

        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.sample_size, Some(5));
        assert!(cli.no_parallel);
        assert!(cli.debug);
        assert!(cli.config.is_none());
        assert_eq!(cli.command.populations().out, PathBuf::from("o"));
    }

    #[test]
    fn test_cli_global_defaults() {
        let mut args = vec!["dissim"];
        args.extend_from_slice(&DIRS);
        let cli = parse(&args);

        assert!(cli.seed.is_none());
        assert!(cli.sample_size.is_none());
        assert!(!cli.no_parallel);
        assert!(!cli.debug);
    }
}
