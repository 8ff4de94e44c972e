use anyhow::{bail, Context};
use clap::Parser;
use devdetect::{Detector, DetectorConfig};
use devdetect_cli::cli::{load_config, Cli, Commands};
use devdetect_cli::stress::{self, StressOptions};
use devdetect_core::DeviceClass;
use devdetect_trie::{DataSetBuilder, DataSetSource};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
struct Detection<'a> {
    user_agent: &'a str,
    class: DeviceClass,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Detect {
            data,
            json,
            user_agents,
        } => {
            let config = override_data_file(config, data);
            let detector = Detector::from_config(&config)?;

            for (user_agent, class) in user_agents.iter().zip(detector.detect_all(&user_agents)) {
                if json {
                    println!("{}", serde_json::to_string(&Detection {
                        user_agent: user_agent.as_str(),
                        class,
                    })?);
                } else {
                    println!("{}", class);
                }
            }
        }

        Commands::Stress {
            data,
            threads,
            loops,
            reload_interval_ms,
            quiesce,
        } => {
            let mut config = override_data_file(config, data);
            if let Some(interval) = reload_interval_ms {
                config.reload_interval_ms = interval;
            }
            if quiesce {
                config.quiesce_readers_on_reload = true;
            }

            let detector = Detector::from_config(&config)?;
            let options = StressOptions {
                threads,
                loops,
                reload_interval: config.reload_interval(),
            };

            println!("Stressing {}", config.data_file.display());
            println!("  Threads:         {}", options.threads);
            println!("  Loops:           {}", options.loops);
            println!("  Reload interval: {:?}", options.reload_interval);
            println!("  Quiesce readers: {}", config.quiesce_readers_on_reload);
            println!();

            let report = stress::run(&detector, &options);
            println!("{}", serde_json::to_string_pretty(&report)?);

            let tracker = detector.provider().tracker();
            drop(detector);
            if tracker.live() != 0 {
                bail!("{} data sets still alive after shutdown", tracker.live());
            }
            if !report.passed() {
                bail!(
                    "{} misclassifications, {} data sets retained",
                    report.misclassified,
                    report.retained
                );
            }
            info!("Stress run passed in {} ms", report.elapsed_ms);
        }

        Commands::Compile { source, output } => {
            let definition = DataSetSource::from_file(&source)
                .with_context(|| format!("Failed to read {}", source.display()))?;
            let written = DataSetBuilder::from_source(&definition)
                .write_to(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            println!(
                "Wrote {} ({} bytes, {} profiles, {} patterns)",
                output.display(),
                written,
                definition.profiles.len(),
                definition.patterns.len()
            );
        }
    }

    Ok(())
}

fn override_data_file(config: DetectorConfig, data: Option<PathBuf>) -> DetectorConfig {
    match data {
        Some(path) => config.with_data_file(path),
        None => config,
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "devdetect=debug"
    } else {
        "devdetect=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
