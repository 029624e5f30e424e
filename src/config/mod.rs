//! Build configuration (noun module)
//!
//! One validated [`Config`] is loaded from YAML at startup and passed by
//! reference to every component.

mod error;
mod params;
mod release;

pub use error::ConfigError;
pub use params::{ColumnOrder, Config, FieldGroupParams};
pub use release::ReleaseTag;
