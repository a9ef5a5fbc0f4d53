//! # stackctl_templates
//!
//! Jinja-equivalent template rendering and `!include`-aware YAML loading.
//!
//! Repos that ship a `templates/` directory are rendered through a
//! [`minijinja`] environment extended with a `from_yaml` filter, a
//! `to_json` filter, and a `readfile` global, matching the filters the
//! core repo's templates expect. Plain spec YAML documents (cluster,
//! stack, and module sources) are loaded through [`include`], which
//! resolves `!include PATH[#FRAGMENT]` tags before Jinja rendering ever
//! sees the text.

pub mod environment;
pub mod error;
pub mod include;

pub use environment::{build_environment, render_str};
pub use error::{TemplateError, TemplateResult};
pub use include::{load_with_includes, resolve_includes};
