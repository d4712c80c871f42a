mod bins;
mod unimod;

pub use bins::{
    BinMember,
    MassBin,
    MassBinParams,
    MassBinner,
    annotate_bins,
    apply_correction,
    bin_mass_differences,
};
pub use unimod::{
    DEFAULT_UNIMOD_TOLERANCE,
    ModificationEntry,
    UNKNOWN_MODIFICATION,
    UnimodTable,
    map_mass_diffs,
    parse_unimod_obo,
    read_unimod_obo,
};
