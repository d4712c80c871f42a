use super::config::{
    InputPaths,
    OutputConfig,
};
use crate::errors::CliError;
use psmrollup::data_sources::{
    read_fasta,
    read_records,
};
use psmrollup::modifications::{
    ModificationEntry,
    read_unimod_obo,
};
use psmrollup::{
    DecoyTag,
    Evidence,
    ProteinDatabase,
    ProteinDbRecord,
    RollupInputs,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;
use tracing::info;

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|x| x.to_str())
        .map(|x| extensions.iter().any(|e| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn load_database(path: &Path, decoy_tag: &DecoyTag) -> Result<ProteinDatabase, CliError> {
    let records: Vec<ProteinDbRecord> = if has_extension(path, &["fasta", "fas", "fa"]) {
        read_fasta(path, decoy_tag)?
    } else {
        read_records(path)?
    };
    Ok(ProteinDatabase::new(records))
}

fn load_modifications(path: &Path) -> Result<Vec<ModificationEntry>, CliError> {
    if has_extension(path, &["obo"]) {
        Ok(read_unimod_obo(path)?)
    } else {
        Ok(read_records(path)?)
    }
}

pub fn load_inputs(paths: &InputPaths, decoy_tag: &DecoyTag) -> Result<RollupInputs, CliError> {
    let start = Instant::now();

    info!("Reading PSMs from {:?}", paths.psm_file);
    let psms = read_records(&paths.psm_file)?;
    info!("Reading proteins from {:?}", paths.protein_file);
    let proteins = read_records(&paths.protein_file)?;
    info!("Reading protein database from {:?}", paths.database);
    let database = load_database(&paths.database, decoy_tag)?;
    info!("Reading modifications from {:?}", paths.unimod_file);
    let modifications = load_modifications(&paths.unimod_file)?;

    info!("Loaded inputs in {:?}", start.elapsed());
    Ok(RollupInputs {
        psms,
        proteins,
        database,
        modifications,
    })
}

fn write_json<T: Serialize + ?Sized>(
    data: &T,
    path: &Path,
    pretty: bool,
) -> Result<(), CliError> {
    let io_err = |e: std::io::Error| CliError::Io {
        source: e.to_string(),
        path: Some(path.to_string_lossy().to_string()),
    };
    let file = File::create(path).map_err(io_err)?;
    let writer = BufWriter::new(file);
    let res = if pretty {
        serde_json::to_writer_pretty(writer, data)
    } else {
        serde_json::to_writer(writer, data)
    };
    res.map_err(|e| CliError::Io {
        source: e.to_string(),
        path: Some(path.to_string_lossy().to_string()),
    })
}

pub fn write_outputs(evidence: &Evidence, output: &OutputConfig) -> Result<(), CliError> {
    let dir = &output.directory;
    write_json(&evidence.psms, &dir.join("psm.json"), output.pretty)?;
    write_json(&evidence.ions, &dir.join("ion.json"), output.pretty)?;
    write_json(&evidence.peptides, &dir.join("peptide.json"), output.pretty)?;
    write_json(&evidence.proteins, &dir.join("protein.json"), output.pretty)?;
    write_json(&evidence.mass_bins, &dir.join("modifications.json"), output.pretty)?;
    info!("Wrote results to {:?}", dir);
    Ok(())
}
