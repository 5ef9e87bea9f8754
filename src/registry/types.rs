//! Registry data types

use crate::error::{CompkitError, CompkitResult};
use serde::{Deserialize, Serialize};

/// A component as listed in the registry index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    /// Frameworks the component supports; empty means framework-agnostic
    #[serde(default)]
    pub frameworks: Vec<String>,

    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// One file of a component payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentFile {
    /// Path relative to the install target directory
    pub path: String,
    pub content: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// File payload for a component, with its cache provenance
#[derive(Debug, Clone)]
pub struct FetchedFiles {
    pub files: Vec<ComponentFile>,
    pub from_cache: bool,
}

/// Search criteria; all present fields must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchFilter {
    pub query: Option<String>,
    pub category: Option<String>,
    pub framework: Option<String>,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.category.is_none() && self.framework.is_none()
    }

    /// Case-insensitive match on name/description, category and framework
    pub fn matches(&self, component: &Component) -> bool {
        if let Some(query) = &self.query {
            let query = query.to_lowercase();
            let in_name = component.name.to_lowercase().contains(&query);
            let in_description = component
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query));
            if !in_name && !in_description {
                return false;
            }
        }

        if let Some(category) = &self.category {
            let same = component
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category));
            if !same {
                return false;
            }
        }

        if let Some(framework) = &self.framework {
            let supported = component.frameworks.is_empty()
                || component
                    .frameworks
                    .iter()
                    .any(|f| f.eq_ignore_ascii_case(framework));
            if !supported {
                return false;
            }
        }

        true
    }
}

/// Reject names that are empty or could escape a URL path segment or file name
pub fn validate_name(name: &str) -> CompkitResult<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(CompkitError::InvalidOption(format!(
            "invalid component name '{}'",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str, category: Option<&str>, frameworks: &[&str]) -> Component {
        Component {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            description: Some(format!("A {} component", name)),
            category: category.map(str::to_string),
            frameworks: frameworks.iter().map(|f| f.to_string()).collect(),
            dependencies: Vec::new(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = SearchFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&component("button", None, &[])));
    }

    #[test]
    fn query_matches_name_or_description() {
        let filter = SearchFilter {
            query: Some("BUT".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&component("button", None, &[])));
        assert!(!filter.matches(&component("table", None, &[])));

        let filter = SearchFilter {
            query: Some("table component".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&component("table", None, &[])));
    }

    #[test]
    fn category_and_framework() {
        let c = component("button", Some("Forms"), &["react"]);
        let filter = SearchFilter {
            category: Some("forms".to_string()),
            framework: Some("React".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&c));

        let vue = SearchFilter {
            framework: Some("vue".to_string()),
            ..Default::default()
        };
        assert!(!vue.matches(&c));
        assert!(vue.matches(&component("icon", None, &[])));
    }

    #[test]
    fn file_kind_uses_type_field() {
        let file: ComponentFile =
            serde_json::from_str(r#"{"path": "button.tsx", "content": "x", "type": "ui"}"#).unwrap();
        assert_eq!(file.kind.as_deref(), Some("ui"));
    }

    #[test]
    fn name_validation() {
        assert!(validate_name("date-picker").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("../etc").is_err());
        assert!(validate_name("a/b").is_err());
    }
}
