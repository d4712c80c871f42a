use psmrollup::RollupParams;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;

use crate::cli::Cli;
use crate::errors::CliError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct InputConfig {
    pub psm_file: Option<PathBuf>,
    pub protein_file: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub unimod_file: Option<PathBuf>,
}

/// Input locations once every one of them is known.
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub psm_file: PathBuf,
    pub protein_file: PathBuf,
    pub database: PathBuf,
    pub unimod_file: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Worker threads for the parallel stages, 0 lets rayon decide.
    pub threads: usize,
    #[serde(flatten)]
    pub params: RollupParams,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
    #[serde(default)]
    pub pretty: bool,
}

fn required(value: &Option<PathBuf>, flag: &str) -> Result<PathBuf, CliError> {
    value.clone().ok_or_else(|| CliError::Config {
        source: format!(
            "No {} provided, please provide one in either the config file or with the --{} flag",
            flag.replace('-', " "),
            flag
        ),
    })
}

impl Config {
    /// Applies the command line overrides on top of the config file values.
    pub fn apply_cli_args(&mut self, args: &Cli) {
        if let Some(x) = &args.psm_file {
            self.input.psm_file = Some(x.clone());
        }
        if let Some(x) = &args.protein_file {
            self.input.protein_file = Some(x.clone());
        }
        if let Some(x) = &args.database {
            self.input.database = Some(x.clone());
        }
        if let Some(x) = &args.unimod_file {
            self.input.unimod_file = Some(x.clone());
        }
        if let Some(x) = &args.output_dir {
            let pretty = self.output.as_ref().map(|o| o.pretty).unwrap_or(false);
            self.output = Some(OutputConfig {
                directory: x.clone(),
                pretty,
            });
        }
        if args.include_decoys {
            self.analysis.params.include_decoys = true;
        }
        if args.progress {
            self.analysis.params.show_progress = true;
        }
    }

    pub fn input_paths(&self) -> Result<InputPaths, CliError> {
        Ok(InputPaths {
            psm_file: required(&self.input.psm_file, "psm-file")?,
            protein_file: required(&self.input.protein_file, "protein-file")?,
            database: required(&self.input.database, "database")?,
            unimod_file: required(&self.input.unimod_file, "unimod-file")?,
        })
    }

    pub fn output_config(&self) -> Result<OutputConfig, CliError> {
        self.output.clone().ok_or_else(|| CliError::Config {
            source: "No output directory provided, please provide one in either the config file or with the --output-dir flag".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const CONFIG: &str = r#"{
        "input": {
            "psm_file": "psms.ndjson",
            "protein_file": "proteins.json",
            "database": "db.fasta"
        },
        "analysis": {
            "threads": 4,
            "decoy_tag": "DECOY_",
            "mass_bins": {"amplitude": 250.0}
        },
        "output": {"directory": "out"}
    }"#;

    #[test]
    fn test_parse_config() {
        let config: Config = serde_json::from_str(CONFIG).unwrap();
        assert_eq!(config.analysis.threads, 4);
        assert_eq!(config.analysis.params.decoy_tag.as_str(), "DECOY_");
        assert_eq!(config.analysis.params.mass_bins.amplitude, 250.0);
        assert_eq!(config.analysis.params.mass_bins.width, 0.1);
        assert!(!config.output.unwrap().pretty);
    }

    #[test]
    fn test_missing_input_is_reported() {
        let config: Config = serde_json::from_str(CONFIG).unwrap();
        let err = config.input_paths().unwrap_err();
        assert!(err.to_string().contains("--unimod-file"));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config: Config = serde_json::from_str(CONFIG).unwrap();
        let args = Cli::parse_from([
            "psmrollup",
            "--config",
            "cfg.json",
            "--unimod-file",
            "unimod.obo",
            "--output-dir",
            "elsewhere",
            "--include-decoys",
        ]);
        config.apply_cli_args(&args);

        let paths = config.input_paths().unwrap();
        assert_eq!(paths.unimod_file, PathBuf::from("unimod.obo"));
        assert_eq!(paths.psm_file, PathBuf::from("psms.ndjson"));
        assert_eq!(
            config.output_config().unwrap().directory,
            PathBuf::from("elsewhere")
        );
        assert!(config.analysis.params.include_decoys);
    }
}
