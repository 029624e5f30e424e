//! Type sampler (verb module)
//!
//! Classifies individual values into [`TypeTag`](crate::types::TypeTag)s.
//! A null value yields `None` and contributes no type evidence.

mod classify;
mod datetime;
mod normalize;

pub use classify::{classify_json, classify_str, sample_field, sample_json_field, sample_str};
pub use datetime::{is_bq_date, is_bq_time, is_bq_timestamp};
pub use normalize::{normalize, NULL_TOKENS};
