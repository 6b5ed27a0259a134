//! logreport CLI binary entry point.
//! Delegates to library modules for loading and rendering and prints results.

use clap::Parser;
use logreport::analyzer::{LogAnalyzer, LogCorpus};
use logreport::boundaries::TestBoundaries;
use logreport::cli::{Cli, Commands};
use logreport::config::{self, CliOverrides};
use logreport::{bundle, output};
use std::fs;

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", output::error_prefix(), message);
    std::process::exit(2);
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Report {
            patterns,
            repo_root,
            output,
            context_radius,
            min_skip,
            check,
        } => {
            let eff = config::resolve_effective(CliOverrides {
                repo_root: repo_root.as_deref(),
                output: output.as_deref(),
                context_radius,
                min_skip,
            })
            .unwrap_or_else(|e| fail(e));
            // Friendly note if no config was found
            if eff.config_path.is_none() && eff.output != "json" {
                eprintln!(
                    "{} No logreport.toml found; using defaults.",
                    output::note_prefix()
                );
            }
            let result = bundle::run_batch(&eff.repo_root, &patterns, &eff.emit)
                .unwrap_or_else(|e| fail(e));
            output::print_batch(&result, &eff.output);
            if result.summary.bundles == 0 {
                std::process::exit(2);
            }
            if check && result.summary.errors > 0 {
                std::process::exit(1);
            }
        }
        Commands::Boundaries {
            log,
            repo_root,
            output,
        } => {
            let eff = config::resolve_effective(CliOverrides {
                repo_root: repo_root.as_deref(),
                output: output.as_deref(),
                ..CliOverrides::default()
            })
            .unwrap_or_else(|e| fail(e));
            let text = fs::read_to_string(&log)
                .unwrap_or_else(|e| fail(format!("failed to read {}: {}", log, e)));
            let corpus = LogCorpus::from_text(&text);
            let boundaries = TestBoundaries::scan(corpus.lines());
            output::print_boundaries(&boundaries, &eff.output);
        }
    }
}
