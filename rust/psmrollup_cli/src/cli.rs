use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Path to the validated PSM file (will over-write the config file)
    #[arg(long)]
    pub psm_file: Option<PathBuf>,

    /// Path to the protein inference results (will over-write the config file)
    #[arg(long)]
    pub protein_file: Option<PathBuf>,

    /// Path to the protein database, FASTA or records (will over-write the config file)
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Path to the reference modification table, OBO or records
    /// (will over-write the config file)
    #[arg(short, long)]
    pub unimod_file: Option<PathBuf>,

    /// Path to the output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Keep decoy proteins in the protein output
    #[arg(long)]
    pub include_decoys: bool,

    /// Show a progress bar during protein assembly
    #[arg(long)]
    pub progress: bool,
}
