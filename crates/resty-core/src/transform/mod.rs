pub mod normalize;
pub mod uri;

pub use normalize::{NormalizeOptions, normalize, normalize_with_options};
