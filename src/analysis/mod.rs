//! Analysis client: the boundary to the external vision service.
//!
//! One request per chunk goes out; decorated text comes back. The
//! [`extract`] pass isolates the structured payload, [`validate`]
//! turns loose records into [`crate::types::ImageMetadata`], and
//! nothing unvalidated crosses this module's boundary.

pub mod extract;
mod http;
pub mod validate;

pub use http::{AnalysisClient, HttpAnalysisClient};
pub use validate::RawMetadata;
