//! Funnel registry
//!
//! A registry is built once from validated tables and never changes after
//! that. The built-in registry comes from `data/funnels.json`, embedded at
//! compile time.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{FunnelError, Result};
use crate::types::{Funnel, Stage};
use crate::validator::FunnelValidator;

const BUILTIN_FUNNELS: &str = include_str!("../data/funnels.json");

static BUILTIN: Lazy<Result<FunnelRegistry>> = Lazy::new(|| FunnelRegistry::from_json(BUILTIN_FUNNELS));

/// Authoring file layout: `{ "funnels": [ ... ] }`
#[derive(Debug, Deserialize)]
struct FunnelFile {
    funnels: Vec<Funnel>,
}

/// Read-only lookup over validated funnels
#[derive(Debug, Clone, Default)]
pub struct FunnelRegistry {
    funnels: BTreeMap<String, Funnel>,
}

impl FunnelRegistry {
    /// Validate `funnels` and build a registry
    pub fn from_funnels(funnels: Vec<Funnel>) -> Result<Self> {
        FunnelValidator::validate_all(&funnels)?;

        let funnels: BTreeMap<String, Funnel> =
            funnels.into_iter().map(|f| (f.id.clone(), f)).collect();
        debug!(count = funnels.len(), "Built funnel registry");

        Ok(Self { funnels })
    }

    /// Parse and validate the JSON authoring format
    pub fn from_json(content: &str) -> Result<Self> {
        let file: FunnelFile = serde_json::from_str(content)?;
        Self::from_funnels(file.funnels)
    }

    /// Load and validate an authoring file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let registry = Self::from_json(&content)?;
        info!(path = %path.display(), count = registry.len(), "Loaded funnel tables");
        Ok(registry)
    }

    /// Funnel by id
    pub fn get(&self, id: &str) -> Option<&Funnel> {
        self.funnels.get(id)
    }

    /// Funnel by id, as an error when missing
    pub fn require(&self, id: &str) -> Result<&Funnel> {
        self.get(id).ok_or_else(|| FunnelError::NotFound(id.to_string()))
    }

    /// All funnel ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        self.funnels.keys().map(String::as_str).collect()
    }

    /// All funnels, sorted by id
    pub fn funnels(&self) -> impl Iterator<Item = &Funnel> {
        self.funnels.values()
    }

    /// Stage of `funnel_id` satisfied by `event`
    pub fn stage_for_event(&self, funnel_id: &str, event: &str) -> Option<&Stage> {
        self.get(funnel_id)?.stage_for_event(event)
    }

    /// Conversion stages of `funnel_id`
    pub fn conversion_stages(&self, funnel_id: &str) -> Vec<&Stage> {
        self.get(funnel_id)
            .map(|f| f.conversion_stages().collect())
            .unwrap_or_default()
    }

    /// Funnels in which `event` satisfies some stage, with that stage
    pub fn funnels_for_event(&self, event: &str) -> Vec<(&Funnel, &Stage)> {
        self.funnels
            .values()
            .filter_map(|f| f.stage_for_event(event).map(|s| (f, s)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.funnels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funnels.is_empty()
    }
}

/// Registry of the embedded funnel tables
///
/// Built and validated on first use. Call this at startup to fail fast on a
/// bad table.
pub fn builtin_registry() -> std::result::Result<&'static FunnelRegistry, &'static FunnelError> {
    Lazy::force(&BUILTIN).as_ref()
}

/// Look up a built-in funnel by id
pub fn get_funnel_by_id(id: &str) -> Option<&'static Funnel> {
    builtin_registry().ok()?.get(id)
}
