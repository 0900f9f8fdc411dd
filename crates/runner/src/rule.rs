//! Layout rules and their evaluation against a rendered page

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::error::{RunnerError, RunnerResult};
use crate::page::{ElementBox, RenderedPage};
use crate::spec::Check;

/// Pixel range a measured property must fall into.
///
/// Written in specs as `"400px"`, `"< 10px"`, `"<= 10px"`, `"> 10px"`,
/// `">= 10px"` or `"100 to 200px"`. Bounds of `to` are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Range {
    Exact(f64),
    LessThan(f64),
    AtMost(f64),
    GreaterThan(f64),
    AtLeast(f64),
    Between(f64, f64),
}

impl Range {
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if let Some((low, high)) = text.split_once(" to ") {
            let low = parse_px(low)?;
            let high = parse_px(high)?;
            if low > high {
                return Err(format!("range \"{}\" has its bounds reversed", text));
            }
            return Ok(Range::Between(low, high));
        }

        if let Some(rest) = text.strip_prefix("<=") {
            Ok(Range::AtMost(parse_px(rest)?))
        } else if let Some(rest) = text.strip_prefix(">=") {
            Ok(Range::AtLeast(parse_px(rest)?))
        } else if let Some(rest) = text.strip_prefix('<') {
            Ok(Range::LessThan(parse_px(rest)?))
        } else if let Some(rest) = text.strip_prefix('>') {
            Ok(Range::GreaterThan(parse_px(rest)?))
        } else {
            Ok(Range::Exact(parse_px(text)?))
        }
    }

    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Range::Exact(n) => (value - n).abs() < f64::EPSILON,
            Range::LessThan(n) => value < n,
            Range::AtMost(n) => value <= n,
            Range::GreaterThan(n) => value > n,
            Range::AtLeast(n) => value >= n,
            Range::Between(low, high) => value >= low && value <= high,
        }
    }

    /// Failure message for `"<object>" <property>` measured at `actual`
    fn violation(&self, object: &str, property: &str, actual: f64) -> String {
        let expectation = match *self {
            Range::Exact(n) => {
                return format!(
                    "\"{}\" {} is {} instead of {}",
                    object,
                    property,
                    px(actual),
                    px(n)
                );
            }
            Range::LessThan(n) => format!("less than {}", px(n)),
            Range::AtMost(n) => format!("less than or equal to {}", px(n)),
            Range::GreaterThan(n) => format!("greater than {}", px(n)),
            Range::AtLeast(n) => format!("greater than or equal to {}", px(n)),
            Range::Between(low, high) => format!("between {} and {}", low, px(high)),
        };
        format!(
            "\"{}\" {} is {} but it should be {}",
            object,
            property,
            px(actual),
            expectation
        )
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Range::Exact(n) => write!(f, "{}", px(n)),
            Range::LessThan(n) => write!(f, "< {}", px(n)),
            Range::AtMost(n) => write!(f, "<= {}", px(n)),
            Range::GreaterThan(n) => write!(f, "> {}", px(n)),
            Range::AtLeast(n) => write!(f, ">= {}", px(n)),
            Range::Between(low, high) => write!(f, "{} to {}", low, px(high)),
        }
    }
}

impl TryFrom<String> for Range {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Range::parse(&value)
    }
}

impl From<Range> for String {
    fn from(range: Range) -> Self {
        range.to_string()
    }
}

fn parse_px(text: &str) -> Result<f64, String> {
    let text = text.trim();
    let number = text.strip_suffix("px").unwrap_or(text).trim();
    number
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("\"{}\" is not a pixel value", text))
}

fn px(value: f64) -> String {
    format!("{}px", value)
}

/// A single layout rule
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Width(Range),
    Height(Range),
    Left(Range),
    Top(Range),
    /// `true`: the element must be shown; `false`: hidden or absent
    Visible(bool),
}

/// Result of evaluating one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Passed,
    Failed(String),
}

impl Rule {
    fn evaluate(&self, object: &str, element: Option<&ElementBox>) -> CheckResult {
        let element = match (self, element) {
            (Rule::Visible(false), None) => return CheckResult::Passed,
            (_, None) => {
                return CheckResult::Failed(format!("\"{}\" is absent on page", object));
            }
            (_, Some(element)) => element,
        };

        let (property, range, actual) = match self {
            Rule::Visible(true) if !element.visible => {
                return CheckResult::Failed(format!("\"{}\" is not visible", object));
            }
            Rule::Visible(false) if element.visible => {
                return CheckResult::Failed(format!("\"{}\" should not be visible", object));
            }
            Rule::Visible(_) => return CheckResult::Passed,
            Rule::Width(range) => ("width", range, element.width),
            Rule::Height(range) => ("height", range, element.height),
            Rule::Left(range) => ("left", range, element.left),
            Rule::Top(range) => ("top", range, element.top),
        };

        if range.matches(actual) {
            CheckResult::Passed
        } else {
            CheckResult::Failed(range.violation(object, property, actual))
        }
    }
}

impl Check {
    /// Evaluate this check against a rendered page.
    ///
    /// `Err` means the check could not be evaluated at all (unknown object,
    /// locator the backend did not measure); a rule that does not hold is
    /// `Ok(CheckResult::Failed)`.
    pub fn evaluate(
        &self,
        objects: &BTreeMap<String, String>,
        page: &RenderedPage,
    ) -> RunnerResult<CheckResult> {
        let locator = objects
            .get(&self.object)
            .ok_or_else(|| RunnerError::UnknownObject(self.object.clone()))?;
        let element = page.element(locator)?;
        let result = self.rule.evaluate(&self.object, element);
        debug!("check {} {:?} -> {:?}", self.object, self.rule, result);
        Ok(result)
    }
}
