//! Program and page identity for event enrichment
//!
//! A [`TrackingScope`] is passed explicitly to every tracking call site. A
//! child scope derived with [`TrackingScope::with_program`] or
//! [`TrackingScope::with_page`] shadows the parent's value for its own use
//! only; the parent is never mutated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::{Properties, PropertyValue};
use crate::names::props;

/// Kind of academic offering a program page describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    Degree,
    Certificate,
    Bootcamp,
    Course,
}

impl ProgramType {
    /// Wire name used in event properties
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramType::Degree => "degree",
            ProgramType::Certificate => "certificate",
            ProgramType::Bootcamp => "bootcamp",
            ProgramType::Course => "course",
        }
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the program a page is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramContext {
    pub program_code: String,
    pub program_name: String,
    pub program_type: ProgramType,
}

impl ProgramContext {
    pub fn new(
        program_code: impl Into<String>,
        program_name: impl Into<String>,
        program_type: ProgramType,
    ) -> Self {
        Self {
            program_code: program_code.into(),
            program_name: program_name.into(),
            program_type,
        }
    }
}

/// Identity of the page being viewed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub page_type: String,
    pub page_name: String,
}

impl PageContext {
    pub fn new(page_type: impl Into<String>, page_name: impl Into<String>) -> Self {
        Self {
            page_type: page_type.into(),
            page_name: page_name.into(),
        }
    }
}

/// Render-scoped context handed to tracking call sites
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingScope {
    program: Option<ProgramContext>,
    page: Option<PageContext>,
}

impl TrackingScope {
    /// Empty scope: no program, no page
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a child scope with the given program context
    pub fn with_program(&self, program: ProgramContext) -> Self {
        Self {
            program: Some(program),
            page: self.page.clone(),
        }
    }

    /// Derive a child scope with the given page context
    pub fn with_page(&self, page: PageContext) -> Self {
        Self {
            program: self.program.clone(),
            page: Some(page),
        }
    }

    /// Nearest program context, if any
    pub fn program(&self) -> Option<&ProgramContext> {
        self.program.as_ref()
    }

    /// Nearest page context, if any
    pub fn page(&self) -> Option<&PageContext> {
        self.page.as_ref()
    }

    /// Add the scope's dimensions to `properties`
    ///
    /// Absent contexts contribute nothing. Keys already present are kept.
    pub fn enrich(&self, properties: &mut Properties) {
        let mut insert = |key: &str, value: &str| {
            properties
                .entry(key.to_string())
                .or_insert_with(|| PropertyValue::from(value));
        };

        if let Some(program) = &self.program {
            insert(props::PROGRAM_CODE, &program.program_code);
            insert(props::PROGRAM_NAME, &program.program_name);
            insert(props::PROGRAM_TYPE, program.program_type.as_str());
        }

        if let Some(page) = &self.page {
            insert(props::PAGE_TYPE, &page.page_type);
            insert(props::PAGE_NAME, &page.page_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;

    fn data_science() -> ProgramContext {
        ProgramContext::new("MSDS", "MS in Data Science", ProgramType::Degree)
    }

    #[test]
    fn test_empty_scope_adds_nothing() {
        let mut properties = Properties::new();
        TrackingScope::new().enrich(&mut properties);
        assert!(properties.is_empty());
    }

    #[test]
    fn test_enrich_adds_program_and_page() {
        let scope = TrackingScope::new()
            .with_program(data_science())
            .with_page(PageContext::new("program_page", "Data Science"));
        let mut properties = Properties::new();
        scope.enrich(&mut properties);

        assert_eq!(properties["program_code"], PropertyValue::from("MSDS"));
        assert_eq!(properties["program_type"], PropertyValue::from("degree"));
        assert_eq!(properties["page_type"], PropertyValue::from("program_page"));
        assert_eq!(properties["page_name"], PropertyValue::from("Data Science"));
    }

    #[test]
    fn test_enrich_keeps_caller_values() {
        let scope = TrackingScope::new().with_program(data_science());
        let mut properties = props! { "program_code" => "OVERRIDE" };
        scope.enrich(&mut properties);
        assert_eq!(properties["program_code"], PropertyValue::from("OVERRIDE"));
        assert_eq!(properties["program_name"], PropertyValue::from("MS in Data Science"));
    }

    #[test]
    fn test_inner_scope_shadows_without_touching_outer() {
        let outer = TrackingScope::new().with_program(data_science());
        let inner = outer.with_program(ProgramContext::new(
            "CYBER-CERT",
            "Cybersecurity Certificate",
            ProgramType::Certificate,
        ));

        assert_eq!(inner.program().map(|p| p.program_code.as_str()), Some("CYBER-CERT"));
        assert_eq!(outer.program().map(|p| p.program_code.as_str()), Some("MSDS"));
        assert!(inner.page().is_none());
    }

    #[test]
    fn test_program_type_wire_names() {
        let json = serde_json::to_string(&ProgramType::Certificate).unwrap();
        assert_eq!(json, "\"certificate\"");
        assert_eq!(ProgramType::Bootcamp.to_string(), "bootcamp");
    }
}
