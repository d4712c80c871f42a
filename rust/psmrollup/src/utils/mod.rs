pub mod mass;
mod search;

pub use mass::{
    PROTON_MASS,
    is_unmodified_mass_diff,
    neutral_mass_to_mz,
    round_decimals,
};
pub use search::binary_search_range_by_key;
