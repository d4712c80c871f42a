use crate::database::ProteinDbRecord;
use crate::errors::InputReadingError;
use crate::models::DecoyTag;
use regex::Regex;
use std::io::{
    BufRead,
    BufReader,
};
use std::path::{
    Path,
    PathBuf,
};
use std::sync::LazyLock;
use tracing::debug;

/// `OS=`, `OX=`, `GN=`, `PE=` and `SV=` fields of a UniProt header.
static UNIPROT_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s(OS|OX|GN|PE|SV)=").unwrap());

/// `sp|ACCESSION|ENTRY_NAME` (or `tr|...`).
static UNIPROT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:sp|tr)\|([^|]+)\|(\S+)$").unwrap());

pub fn read_fasta(
    path: &Path,
    decoy_tag: &DecoyTag,
) -> Result<Vec<ProteinDbRecord>, InputReadingError> {
    let file = std::fs::File::open(path).map_err(|e| InputReadingError::FileReadingError {
        source: e,
        context: "Error opening FASTA file",
        path: PathBuf::from(path),
    })?;
    let records = parse_fasta(BufReader::new(file), decoy_tag)?;
    debug!("Read {} entries from {}", records.len(), path.display());
    Ok(records)
}

/// Parses FASTA entries into database records.
///
/// Sequence lines are concatenated; blank lines and `;` comment lines are
/// skipped. Sequence data before the first header is an error.
pub fn parse_fasta<R: BufRead>(
    reader: R,
    decoy_tag: &DecoyTag,
) -> Result<Vec<ProteinDbRecord>, InputReadingError> {
    let mut out = Vec::new();
    let mut current: Option<ProteinDbRecord> = None;

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| InputReadingError::FileReadingError {
            source: e,
            context: "Error reading FASTA line",
            path: PathBuf::new(),
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(done) = current.take() {
                out.push(done);
            }
            current = Some(parse_header(header, decoy_tag));
            continue;
        }

        match current.as_mut() {
            Some(rec) => rec.sequence.push_str(line),
            None => {
                return Err(InputReadingError::HeaderParsingError {
                    line: i + 1,
                    context: "sequence data found before the first header".to_string(),
                });
            }
        }
    }

    if let Some(done) = current.take() {
        out.push(done);
    }
    Ok(out)
}

/// Splits a header (without the leading `>`) into its fields.
///
/// UniProt style headers fill the protein name, organism, gene and existence
/// fields. Anything else keeps the first token as ID and the rest as the
/// description.
pub fn parse_header(header: &str, decoy_tag: &DecoyTag) -> ProteinDbRecord {
    let header = header.trim();
    let (part_header, rest) = match header.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (header, ""),
    };
    let is_decoy = decoy_tag.is_decoy(part_header);
    let bare = if is_decoy {
        &part_header[decoy_tag.as_str().len()..]
    } else {
        part_header
    };

    let mut rec = ProteinDbRecord {
        original_header: header.to_string(),
        part_header: part_header.to_string(),
        is_decoy,
        ..Default::default()
    };

    let Some(caps) = UNIPROT_ID_RE.captures(bare) else {
        rec.id = bare.to_string();
        rec.description = rest.to_string();
        return rec;
    };
    rec.id = caps[1].to_string();
    rec.entry_name = caps[2].to_string();

    let fields: Vec<_> = UNIPROT_FIELD_RE.captures_iter(rest).collect();
    let name_end = fields
        .first()
        .and_then(|c| c.get(0))
        .map(|m| m.start())
        .unwrap_or(rest.len());
    rec.protein_name = rest[..name_end].trim().to_string();

    for (j, caps) in fields.iter().enumerate() {
        let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value_end = fields
            .get(j + 1)
            .and_then(|c| c.get(0))
            .map(|m| m.start())
            .unwrap_or(rest.len());
        let value = rest[whole.end()..value_end].trim().to_string();
        match key.as_str() {
            "OS" => rec.organism = value,
            "GN" => rec.gene_names = value,
            "PE" => rec.protein_existence = value,
            _ => {}
        }
    }

    rec
}
