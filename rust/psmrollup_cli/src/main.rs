mod cli;
mod config;
mod errors;
mod processing;

use clap::Parser;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;

#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> std::result::Result<(), errors::CliError> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        ) // This uses RUST_LOG environment variable
        .init();

    // Parse command line arguments
    let args = Cli::parse();

    // Load and parse configuration
    let conf = match std::fs::File::open(args.config.clone()) {
        Ok(x) => x,
        Err(e) => {
            return Err(errors::CliError::Io {
                source: e.to_string(),
                path: Some(args.config.to_string_lossy().to_string()),
            });
        }
    };
    let config: Result<Config, _> = serde_json::from_reader(conf);
    let mut config = match config {
        Ok(x) => x,
        Err(e) => {
            return Err(errors::CliError::ParseError { msg: e.to_string() });
        }
    };

    // Override config with command line arguments if provided
    config.apply_cli_args(&args);
    let input_paths = config.input_paths()?;
    let output_config = config.output_config()?;
    info!("Parsed configuration: {:#?}", config.clone());

    if config.analysis.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.analysis.threads)
            .build_global()
            .map_err(|e| errors::CliError::Config {
                source: format!("Unable to set up {} threads: {}", config.analysis.threads, e),
            })?;
    }

    // Create output directory
    match std::fs::create_dir_all(&output_config.directory) {
        Ok(_) => info!("Created output directory {:?}", output_config.directory),
        Err(e) => {
            return Err(errors::CliError::Io {
                source: e.to_string(),
                path: Some(output_config.directory.to_string_lossy().to_string()),
            });
        }
    };

    let params = &config.analysis.params;
    let inputs = processing::load_inputs(&input_paths, &params.decoy_tag)?;
    let evidence = psmrollup::run(inputs, params)?;
    info!(
        "Stage timings: {}",
        serde_json::to_string(&evidence.timings).unwrap_or_default()
    );
    processing::write_outputs(&evidence, &output_config)?;

    Ok(())
}
