mod decoy;
mod ion_form;
mod records;

pub use decoy::DecoyTag;
pub use ion_form::IonFormKey;
pub use records::{
    PeptideIonIdentification,
    ProteinIdentification,
    PsmRecord,
    SearchScores,
};
