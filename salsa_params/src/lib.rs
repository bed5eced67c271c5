pub use crate::error::ParamError;
pub use crate::overrides::Overrides;
pub use crate::param_set::ParamSet;
pub use crate::value::{toml_to_yaml, ParamValue};

pub mod error;
pub mod overrides;
pub mod param_set;
pub mod value;
