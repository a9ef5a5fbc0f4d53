//! # stackctl_spec
//!
//! Loads a single YAML spec document: Jinja-render, resolve `!include`
//! tags, merge a caller-supplied base underneath, then deserialize into a
//! typed model from [`stackctl_core::model`].

pub mod error;
pub mod spec;

pub use error::{SpecError, SpecResult};
pub use spec::Spec;
