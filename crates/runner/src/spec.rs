//! Declarative YAML layout specification

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{RunnerError, RunnerResult};
use crate::rule::{Range, Rule};

/// A complete layout spec parsed from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSpec {
    /// Object aliases mapped to page locators (`#id`, CSS selectors)
    #[serde(default)]
    pub objects: BTreeMap<String, String>,

    /// Sections in document order
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A named, independently reported group of checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    pub name: String,

    /// Tags for include/exclude filtering
    #[serde(default)]
    pub tags: BTreeSet<String>,

    #[serde(default)]
    pub checks: Vec<Check>,
}

impl Section {
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }
}

/// One layout rule applied to one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CheckDocument", into = "CheckDocument")]
pub struct Check {
    /// Object alias from [`LayoutSpec::objects`]
    pub object: String,

    pub rule: Rule,
}

/// A check as written in YAML: the object plus exactly one rule key
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckDocument {
    object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    left: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    visible: Option<bool>,
}

impl TryFrom<CheckDocument> for Check {
    type Error = String;

    fn try_from(doc: CheckDocument) -> Result<Self, Self::Error> {
        let rules: Vec<Rule> = [
            doc.width.map(Rule::Width),
            doc.height.map(Rule::Height),
            doc.left.map(Rule::Left),
            doc.top.map(Rule::Top),
            doc.visible.map(Rule::Visible),
        ]
        .into_iter()
        .flatten()
        .collect();

        match <[Rule; 1]>::try_from(rules) {
            Ok([rule]) => Ok(Check {
                object: doc.object,
                rule,
            }),
            Err(rules) if rules.is_empty() => Err(format!(
                "check on \"{}\" has no rule (width, height, left, top or visible)",
                doc.object
            )),
            Err(rules) => Err(format!(
                "check on \"{}\" has {} rules; write one check per rule",
                doc.object,
                rules.len()
            )),
        }
    }
}

impl From<Check> for CheckDocument {
    fn from(check: Check) -> Self {
        let mut doc = CheckDocument {
            object: check.object,
            ..Default::default()
        };
        match check.rule {
            Rule::Width(range) => doc.width = Some(range),
            Rule::Height(range) => doc.height = Some(range),
            Rule::Left(range) => doc.left = Some(range),
            Rule::Top(range) => doc.top = Some(range),
            Rule::Visible(visible) => doc.visible = Some(visible),
        }
        doc
    }
}

impl LayoutSpec {
    /// Parse a spec from a YAML string
    pub fn from_yaml(yaml: &str) -> RunnerResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parse a spec from a YAML file
    pub fn from_file(path: &Path) -> RunnerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RunnerError::SpecParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            RunnerError::SpecParse { reason, .. } => RunnerError::SpecParse {
                path: path.display().to_string(),
                reason,
            },
            other => RunnerError::SpecParse {
                path: path.display().to_string(),
                reason: other.to_string(),
            },
        })
    }

    fn validate(&self) -> RunnerResult<()> {
        if let Some(pos) = self.sections.iter().position(|s| s.name.trim().is_empty()) {
            return Err(RunnerError::SpecParse {
                path: "<inline>".to_string(),
                reason: format!("section #{} has an empty name", pos + 1),
            });
        }
        Ok(())
    }

    /// Locators referenced by the given sections, deduplicated, first use first.
    ///
    /// Aliases missing from `objects` are skipped; they fail when checked.
    pub fn locators(&self, sections: &[&Section]) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut locators = Vec::new();
        for check in sections.iter().flat_map(|s| s.checks.iter()) {
            if let Some(locator) = self.objects.get(&check.object) {
                if seen.insert(locator.clone()) {
                    locators.push(locator.clone());
                }
            }
        }
        locators
    }
}

/// Load a layout spec document
pub fn load_spec(path: &Path) -> RunnerResult<LayoutSpec> {
    LayoutSpec::from_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const HOMEPAGE: &str = r##"
objects:
  first_paragraph: "#p1"
  second_paragraph: "#p2"
sections:
  - name: First paragraph
    tags: [desktop]
    checks:
      - object: first_paragraph
        width: 400px
      - object: first_paragraph
        visible: true
  - name: Second paragraph
    checks:
      - object: second_paragraph
        height: ">= 0px"
  - name: Empty
"##;

    #[test]
    fn test_parse_spec() {
        let spec = LayoutSpec::from_yaml(HOMEPAGE).unwrap();
        assert_eq!(spec.objects.len(), 2);
        assert_eq!(spec.sections.len(), 3);
        assert_eq!(spec.sections[0].name, "First paragraph");
        assert!(spec.sections[0].tags().contains("desktop"));
        assert_eq!(
            spec.sections[0].checks[0].rule,
            Rule::Width(Range::Exact(400.0))
        );
        assert_eq!(spec.sections[0].checks[1].rule, Rule::Visible(true));
        assert_eq!(
            spec.sections[1].checks[0].rule,
            Rule::Height(Range::AtLeast(0.0))
        );
        assert!(spec.sections[2].checks.is_empty());
        assert!(spec.sections[2].tags().is_empty());
    }

    #[test]
    fn test_locators_are_deduplicated() {
        let spec = LayoutSpec::from_yaml(HOMEPAGE).unwrap();
        let sections: Vec<&Section> = spec.sections.iter().collect();
        assert_eq!(spec.locators(&sections), vec!["#p1", "#p2"]);
        assert_eq!(spec.locators(&sections[1..]), vec!["#p2"]);
    }

    #[test]
    fn test_check_without_rule_is_rejected() {
        let yaml = "sections:\n  - name: Broken\n    checks:\n      - object: a\n";
        assert!(LayoutSpec::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_malformed_range_is_rejected() {
        let yaml =
            "sections:\n  - name: Broken\n    checks:\n      - object: a\n        width: wide\n";
        assert!(LayoutSpec::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_check_with_two_rules_is_rejected() {
        let yaml = r#"
sections:
  - name: Crowded
    checks:
      - object: a
        width: "< 10px"
        height: "> 100px"
"#;
        let err = LayoutSpec::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("has 2 rules"), "{err}");
    }

    #[test_case("objekts: {}\n" ; "top level")]
    #[test_case("sections:\n  - name: Typo\n    check: []\n" ; "section")]
    #[test_case("sections:\n  - name: Typo\n    checks: [{object: a, widht: 1px}]\n" ; "check")]
    fn test_unknown_keys_are_rejected(yaml: &str) {
        assert!(LayoutSpec::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_check_serializes_as_single_rule_key() {
        let spec = LayoutSpec::from_yaml(HOMEPAGE).unwrap();
        let yaml = serde_yaml::to_string(&spec.sections[0].checks[0]).unwrap();
        assert_eq!(yaml, "object: first_paragraph\nwidth: 400px\n");
    }

    #[test]
    fn test_empty_section_name_is_rejected() {
        let yaml = "sections:\n  - name: \"\"\n";
        let err = LayoutSpec::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, RunnerError::SpecParse { .. }));
    }

    #[test]
    fn test_missing_file_is_parse_error_with_path() {
        let err = load_spec(Path::new("/nonexistent/spec.yaml")).unwrap_err();
        match err {
            RunnerError::SpecParse { path, .. } => assert_eq!(path, "/nonexistent/spec.yaml"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
