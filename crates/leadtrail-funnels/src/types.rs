//! Funnel and stage records
//!
//! These are plain data. The JSON authoring format uses camelCase keys so the
//! tables can be edited without touching Rust code:
//!
//! ```json
//! {
//!   "id": "rfi_form_completion",
//!   "name": "RFI Form Completion",
//!   "description": "...",
//!   "stages": [
//!     {
//!       "stage": 1,
//!       "name": "Program Page View",
//!       "events": ["program_page_view"],
//!       "description": "...",
//!       "expectedDuration": 45,
//!       "exitActions": ["navigate_away"]
//!     }
//!   ],
//!   "benchmarks": { "1_to_2": 0.6 }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One step of a funnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    /// 1-based ordinal
    pub stage: u32,
    pub name: String,
    /// Raw event names; any one satisfies the stage
    pub events: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Benchmark dwell time in seconds, never enforced
    #[serde(default)]
    pub expected_duration: u32,
    /// Ways a visitor can leave without progressing
    #[serde(default)]
    pub exit_actions: Vec<String>,
    #[serde(default)]
    pub is_conversion: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_value: Option<String>,
    #[serde(default)]
    pub is_final_goal: bool,
}

impl Stage {
    /// True if `event` satisfies this stage
    pub fn matches(&self, event: &str) -> bool {
        self.events.iter().any(|e| e == event)
    }
}

/// Ordered sequence of stages toward a conversion goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funnel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub stages: Vec<Stage>,
    /// Target conversion rates keyed `"<from>_to_<to>"`, reporting only
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub benchmarks: BTreeMap<String, f64>,
}

impl Funnel {
    /// Stage by 1-based ordinal
    pub fn stage(&self, ordinal: u32) -> Option<&Stage> {
        let index = usize::try_from(ordinal.checked_sub(1)?).ok()?;
        self.stages.get(index)
    }

    /// Stage satisfied by `event`, if any
    pub fn stage_for_event(&self, event: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.matches(event))
    }

    /// Stages flagged as conversions
    pub fn conversion_stages(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter().filter(|s| s.is_conversion)
    }

    /// Stage flagged as the final goal, if any
    pub fn final_goal(&self) -> Option<&Stage> {
        self.stages.iter().find(|s| s.is_final_goal)
    }

    /// Target conversion rate from one stage to another
    pub fn benchmark(&self, from: u32, to: u32) -> Option<f64> {
        self.benchmarks.get(&benchmark_key(from, to)).copied()
    }

    /// Sum of expected stage durations, in seconds
    pub fn expected_duration(&self) -> u64 {
        self.stages.iter().map(|s| u64::from(s.expected_duration)).sum()
    }

    /// Every event name referenced by the funnel, in stage order
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.stages
            .iter()
            .flat_map(|s| s.events.iter().map(String::as_str))
    }
}

/// Benchmark map key for a stage transition
pub fn benchmark_key(from: u32, to: u32) -> String {
    format!("{}_to_{}", from, to)
}

/// Parse a benchmark key back into its stage ordinals
pub fn parse_benchmark_key(key: &str) -> Option<(u32, u32)> {
    let (from, to) = key.split_once("_to_")?;
    Some((from.parse().ok()?, to.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(ordinal: u32, events: &[&str]) -> Stage {
        Stage {
            stage: ordinal,
            name: format!("Stage {}", ordinal),
            events: events.iter().map(|e| e.to_string()).collect(),
            description: String::new(),
            expected_duration: 30,
            exit_actions: vec![],
            is_conversion: false,
            conversion_value: None,
            is_final_goal: false,
        }
    }

    #[test]
    fn test_stage_lookup_by_ordinal() {
        let funnel = Funnel {
            id: "f".to_string(),
            name: "F".to_string(),
            description: String::new(),
            stages: vec![stage(1, &["a"]), stage(2, &["b", "c"])],
            benchmarks: BTreeMap::new(),
        };
        assert_eq!(funnel.stage(2).map(|s| s.stage), Some(2));
        assert!(funnel.stage(0).is_none());
        assert!(funnel.stage(3).is_none());
        assert_eq!(funnel.stage_for_event("c").map(|s| s.stage), Some(2));
        assert!(funnel.stage_for_event("z").is_none());
        assert_eq!(funnel.expected_duration(), 60);
        assert_eq!(funnel.event_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_benchmark_keys() {
        assert_eq!(benchmark_key(3, 4), "3_to_4");
        assert_eq!(parse_benchmark_key("3_to_4"), Some((3, 4)));
        assert_eq!(parse_benchmark_key("10_to_12"), Some((10, 12)));
        assert_eq!(parse_benchmark_key("three_to_4"), None);
        assert_eq!(parse_benchmark_key("3-4"), None);
    }

    #[test]
    fn test_camel_case_authoring_format() {
        let json = r#"{
            "stage": 7,
            "name": "Form Submitted",
            "events": ["form_submit"],
            "expectedDuration": 5,
            "exitActions": ["validation_error"],
            "isConversion": true,
            "conversionValue": "rfi_lead"
        }"#;
        let stage: Stage = serde_json::from_str(json).unwrap();
        assert!(stage.is_conversion);
        assert!(!stage.is_final_goal);
        assert_eq!(stage.conversion_value.as_deref(), Some("rfi_lead"));
        assert_eq!(stage.expected_duration, 5);

        let back = serde_json::to_value(&stage).unwrap();
        assert_eq!(back["isConversion"], true);
        assert_eq!(back["exitActions"][0], "validation_error");
    }
}
