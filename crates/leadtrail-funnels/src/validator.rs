//! Funnel table validation
//!
//! Stage tables feed every downstream funnel report, so a silently
//! misassigned event corrupts all of them. Tables are checked when a
//! registry is built and the first problem found is returned.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{FunnelError, Result};
use crate::types::{parse_benchmark_key, Funnel, Stage};

static EVENT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(_[a-z0-9]+)*$").expect("valid event name pattern"));

/// Validator for funnel tables
///
/// Rules:
/// - funnel ids are non-empty and unique
/// - every funnel has at least one stage
/// - ordinals run 1..=N with no gaps, duplicates or reordering
/// - every stage has a name and at least one snake_case event name
/// - no event name satisfies two stages of the same funnel
/// - a conversion value only appears on a conversion stage
/// - benchmarks are keyed `<from>_to_<to>` over existing stages, `from < to`,
///   with rates in `[0, 1]`
pub struct FunnelValidator;

impl FunnelValidator {
    /// Validate a full set of funnels
    pub fn validate_all(funnels: &[Funnel]) -> Result<()> {
        let mut seen = HashSet::new();
        for funnel in funnels {
            if !seen.insert(funnel.id.as_str()) {
                return Err(FunnelError::DuplicateFunnel(funnel.id.clone()));
            }
            Self::validate_funnel(funnel)?;
        }
        Ok(())
    }

    /// Validate one funnel
    pub fn validate_funnel(funnel: &Funnel) -> Result<()> {
        if funnel.id.trim().is_empty() || funnel.stages.is_empty() {
            return Err(FunnelError::EmptyFunnel(funnel.id.clone()));
        }

        Self::validate_ordinals(funnel)?;

        // event name -> ordinal of the stage that claimed it
        let mut owners: HashMap<&str, u32> = HashMap::new();
        for stage in &funnel.stages {
            Self::validate_stage(&funnel.id, stage)?;
            for event in &stage.events {
                if let Some(first) = owners.insert(event.as_str(), stage.stage) {
                    return Err(FunnelError::DuplicateEvent {
                        funnel: funnel.id.clone(),
                        event: event.clone(),
                        first,
                        second: stage.stage,
                    });
                }
            }
        }

        Self::validate_benchmarks(funnel)
    }

    /// Check whether a string is a valid raw event name
    pub fn is_valid_event_name(name: &str) -> bool {
        EVENT_NAME.is_match(name)
    }

    fn validate_ordinals(funnel: &Funnel) -> Result<()> {
        for (index, stage) in funnel.stages.iter().enumerate() {
            let expected = index as u32 + 1;
            if stage.stage != expected {
                return Err(FunnelError::StageOrdinal {
                    funnel: funnel.id.clone(),
                    expected,
                    found: stage.stage,
                });
            }
        }
        Ok(())
    }

    fn validate_stage(funnel_id: &str, stage: &Stage) -> Result<()> {
        if stage.name.trim().is_empty() {
            return Err(FunnelError::InvalidStage {
                funnel: funnel_id.to_string(),
                stage: stage.stage,
                message: "stage name cannot be empty".to_string(),
            });
        }

        if stage.events.is_empty() {
            return Err(FunnelError::InvalidStage {
                funnel: funnel_id.to_string(),
                stage: stage.stage,
                message: "stage must list at least one event".to_string(),
            });
        }

        if let Some(event) = stage.events.iter().find(|e| !Self::is_valid_event_name(e)) {
            return Err(FunnelError::InvalidEventName {
                funnel: funnel_id.to_string(),
                stage: stage.stage,
                event: event.clone(),
            });
        }

        if stage.conversion_value.is_some() && !stage.is_conversion {
            return Err(FunnelError::InvalidConversion {
                funnel: funnel_id.to_string(),
                stage: stage.stage,
                message: "conversionValue set on a stage that is not a conversion".to_string(),
            });
        }

        if matches!(stage.conversion_value.as_deref(), Some(v) if v.trim().is_empty()) {
            return Err(FunnelError::InvalidConversion {
                funnel: funnel_id.to_string(),
                stage: stage.stage,
                message: "conversionValue cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    fn validate_benchmarks(funnel: &Funnel) -> Result<()> {
        let stage_count = funnel.stages.len() as u32;

        for (key, rate) in &funnel.benchmarks {
            let invalid = |message: &str| FunnelError::InvalidBenchmark {
                funnel: funnel.id.clone(),
                key: key.clone(),
                message: message.to_string(),
            };

            let (from, to) =
                parse_benchmark_key(key).ok_or_else(|| invalid("expected '<from>_to_<to>'"))?;

            if from == 0 || to > stage_count {
                return Err(invalid("refers to a stage that does not exist"));
            }
            if from >= to {
                return Err(invalid("from stage must come before to stage"));
            }
            if !(0.0..=1.0).contains(rate) {
                return Err(invalid("rate must be between 0.0 and 1.0"));
            }
        }

        Ok(())
    }
}
