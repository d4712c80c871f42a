pub mod data_sources;
pub mod database;
pub mod errors;
pub mod evidence;
pub mod models;
pub mod modifications;
pub mod pipeline;
pub mod utils;

pub use database::{
    ProteinDatabase,
    ProteinDbRecord,
};
pub use errors::{
    Result,
    RollupError,
};
pub use evidence::{
    IonEvidence,
    PeptideEvidence,
    ProteinEvidence,
    PsmEvidence,
};
pub use models::{
    DecoyTag,
    IonFormKey,
};
pub use pipeline::{
    Evidence,
    RollupInputs,
    RollupParams,
    run,
};
