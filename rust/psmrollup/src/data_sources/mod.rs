pub mod fasta;
pub mod records;

pub use fasta::{
    parse_fasta,
    read_fasta,
};
pub use records::{
    RecordFormat,
    RecordReader,
    read_records,
    read_records_with_format,
};
