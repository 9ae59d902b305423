pub mod api;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod parse;
pub mod transform;

pub use api::{Api, Content};
pub use convert::{Converter, ParamSource, ParamValue};
pub use error::{ApiError, ErrorKind, LoadError};
pub use model::ApiSpec;
