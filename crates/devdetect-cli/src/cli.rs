use clap::{Parser, Subcommand};
use devdetect::DetectorConfig;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "devdetect")]
#[command(author, version, about = "Classify User-Agent strings by device class")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path, used when it exists
    #[arg(short, long, global = true, default_value = "devdetect.yaml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the device class of each User-Agent
    Detect {
        /// Data file, overrides `data_file` from the configuration
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Print one JSON object per line
        #[arg(long)]
        json: bool,

        /// User-Agent strings to classify
        #[arg(required = true)]
        user_agents: Vec<String>,
    },

    /// Detect from many threads while the data file is reloaded periodically
    Stress {
        /// Data file, overrides `data_file` from the configuration
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Reader threads
        #[arg(short, long, default_value = "40")]
        threads: usize,

        /// Detections per reader thread
        #[arg(short, long, default_value = "1000000")]
        loops: u64,

        /// Milliseconds between reloads, overrides `reload_interval_ms`
        #[arg(long)]
        reload_interval_ms: Option<u64>,

        /// Block readers during each reload
        #[arg(long)]
        quiesce: bool,
    },

    /// Write a hash-trie data file from a YAML source
    Compile {
        /// YAML source describing properties, profiles and patterns
        #[arg(short, long)]
        source: PathBuf,

        /// Data file to write
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Load the configuration file if present, otherwise defaults.
pub fn load_config(path: &Path) -> anyhow::Result<DetectorConfig> {
    if path.exists() {
        Ok(DetectorConfig::from_file(path)?)
    } else {
        Ok(DetectorConfig::default())
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
    fn test_stress_defaults() {
        let cli = Cli::parse_from(["devdetect", "stress"]);
        match cli.command {
            Commands::Stress {
                threads,
                loops,
                reload_interval_ms,
                quiesce,
                data,
            } => {
                assert_eq!(threads, 40);
                assert_eq!(loops, 1_000_000);
                assert_eq!(reload_interval_ms, None);
                assert!(!quiesce);
                assert!(data.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_detect_requires_user_agents() {
        assert!(Cli::try_parse_from(["devdetect", "detect"]).is_err());

        let cli = Cli::parse_from(["devdetect", "detect", "--json", "-d", "x.trie", "ua one", ""]);
        match cli.command {
            Commands::Detect { data, json, user_agents } => {
                assert_eq!(data, Some(PathBuf::from("x.trie")));
                assert!(json);
                assert_eq!(user_agents, vec!["ua one".to_string(), String::new()]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();

        let config = load_config(&dir.path().join("missing.yaml")).unwrap();
        assert_eq!(config.reload_interval_ms, 200);

        let path = dir.path().join("devdetect.yaml");
        std::fs::write(&path, "data_file: other.trie\nquiesce_readers_on_reload: true\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.data_file, PathBuf::from("other.trie"));
        assert!(config.quiesce_readers_on_reload);

        std::fs::write(&path, "reload_interval_ms: [not a number]\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
