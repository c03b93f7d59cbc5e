//! Leadtrail funnel tables
//!
//! Static, declarative descriptions of the journeys a visitor can take toward
//! a conversion. Each funnel is an ordered list of stages; a stage is satisfied
//! by any one of its raw event names.
//!
//! # Architecture
//!
//! 1. **Types** (`types`): funnel and stage records in the JSON authoring format
//! 2. **Validator** (`validator`): structural checks run before a table is used
//! 3. **Registry** (`registry`): read-only lookup, including the embedded built-ins
//! 4. **Formatter** (`formatter`): table and JSON renderings for the CLI
//!
//! # Quick Start
//!
//! ```ignore
//! use leadtrail_funnels::{builtin_registry, get_funnel_by_id};
//!
//! let registry = builtin_registry().expect("embedded funnels are valid");
//! let stage = registry.stage_for_event("rfi_form_completion", "form_start");
//! assert_eq!(stage.map(|s| s.stage), Some(4));
//!
//! let funnel = get_funnel_by_id("rfi_form_completion").unwrap();
//! assert_eq!(funnel.stages.len(), 8);
//! ```

pub mod error;
pub mod formatter;
pub mod registry;
pub mod types;
pub mod validator;

pub use error::{FunnelError, Result};
pub use formatter::{
    format_funnel_json, format_funnel_table, format_funnels_json, format_funnels_table,
};
pub use registry::{builtin_registry, get_funnel_by_id, FunnelRegistry};
pub use types::{benchmark_key, parse_benchmark_key, Funnel, Stage};
pub use validator::FunnelValidator;
