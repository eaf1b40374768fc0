use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::features::FeatureVector;
use crate::error::PlanError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleRow {
    #[serde(rename = "LeftHand")]
    pub left_hand: String,
    #[serde(rename = "RightHand")]
    pub right_hand: String,
}

impl RuleRow {
    pub fn new(left_hand: impl Into<String>, right_hand: impl Into<String>) -> Self {
        Self {
            left_hand: left_hand.into(),
            right_hand: right_hand.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RangeCondition {
    pub feature: String,
    pub min: f64,
    pub max: f64,
}

impl RangeCondition {
    pub fn holds(&self, features: &FeatureVector) -> bool {
        match features.get(&self.feature) {
            Some(value) => self.min <= value && value <= self.max,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub class: String,
    pub conditions: Vec<RangeCondition>,
}

impl Rule {
    pub fn parse(row: &RuleRow) -> Result<Self, PlanError> {
        let class = parse_class(&row.left_hand).ok_or_else(|| {
            PlanError::lookup(format!(
                "rule has no class label in left hand side: {}",
                row.left_hand
            ))
        })?;
        Ok(Self {
            class,
            conditions: parse_conditions(&row.right_hand),
        })
    }

    pub fn matches(&self, features: &FeatureVector) -> bool {
        self.conditions.iter().all(|c| c.holds(features))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn from_rows(rows: &[RuleRow]) -> Result<Self, PlanError> {
        let rules = rows.iter().map(Rule::parse).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn class_counts(&self, features: &FeatureVector) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for rule in self.rules.iter().filter(|r| r.matches(features)) {
            match counts.iter_mut().find(|(class, _)| *class == rule.class) {
                Some((_, count)) => *count += 1,
                None => counts.push((rule.class.clone(), 1)),
            }
        }
        counts
    }

    pub fn classify(&self, features: &FeatureVector) -> Result<String, PlanError> {
        let counts = self.class_counts(features);
        debug!(?counts, "rule matches per class");
        let mut best: Option<&(String, usize)> = None;
        for entry in &counts {
            if best.map_or(true, |(_, count)| entry.1 > *count) {
                best = Some(entry);
            }
        }
        best.map(|(class, _)| class.clone())
            .ok_or_else(|| PlanError::calc("No matching class found."))
    }
}

fn parse_class(left_hand: &str) -> Option<String> {
    let segment = left_hand.split(" / ").nth(1)?;
    let class = segment.trim_matches(|c| matches!(c, '\'' | ',' | '(' | ')'));
    if class.is_empty() {
        None
    } else {
        Some(class.to_string())
    }
}

fn parse_conditions(right_hand: &str) -> Vec<RangeCondition> {
    right_hand
        .trim()
        .trim_matches(|c| c == '(' || c == ')')
        .split(", ")
        .filter_map(parse_condition)
        .collect()
}

fn parse_condition(item: &str) -> Option<RangeCondition> {
    if !item.contains('/') {
        return None;
    }
    let item = item.trim_matches(|c: char| c == '\'' || c == ',' || c.is_whitespace());
    let mut parts = item.split('/');
    let (feature, range) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let (min, max) = parse_range(range)?;
    Some(RangeCondition {
        feature: feature.trim().to_string(),
        min,
        max,
    })
}

fn parse_range(range: &str) -> Option<(f64, f64)> {
    let range = range.trim();
    let bytes = range.as_bytes();
    let split_at = (1..bytes.len())
        .find(|&i| bytes[i] == b'-' && !matches!(bytes[i - 1], b'e' | b'E' | b'-'))?;
    let min = range[..split_at].trim().parse::<f64>().ok()?;
    let max = range[split_at + 1..].trim().parse::<f64>().ok()?;
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_profile, sample_rule_rows};

    #[test]
    fn parses_class_and_range_conditions() {
        let rule = Rule::parse(&RuleRow::new(
            "('income/2000-4000',) / '1'",
            "('food/200-700', 'housing/500-1200', 'student')",
        ))
        .expect("parse rule");
        assert_eq!(rule.class, "1");
        assert_eq!(rule.conditions.len(), 2);
        assert_eq!(rule.conditions[1].feature, "housing");
        assert_eq!(rule.conditions[1].min, 500.0);
        assert_eq!(rule.conditions[1].max, 1200.0);
    }

    #[test]
    fn skips_unrecognized_conditions() {
        let conditions = parse_conditions("('food/abc-def', 'a/b/c', 'health', 'university/0-150',)");
        assert_eq!(
            conditions,
            vec![RangeCondition {
                feature: "university".to_string(),
                min: 0.0,
                max: 150.0,
            }]
        );
    }

    #[test]
    fn parses_negative_and_exponent_bounds() {
        assert_eq!(parse_range("-50-1e3"), Some((-50.0, 1000.0)));
        assert_eq!(parse_range("1.5e-2-2"), Some((0.015, 2.0)));
        assert_eq!(parse_range("100"), None);
    }

    #[test]
    fn missing_class_is_a_lookup_error() {
        let err = Rule::parse(&RuleRow::new("income/0-10", "()")).expect_err("must fail");
        assert_eq!(err.status().as_tag(), "lookup_error");
    }

    #[test]
    fn tie_goes_to_first_encountered_class() {
        let table = RuleTable::from_rows(&[
            RuleRow::new("x / 'A'", "('income/0-5000')"),
            RuleRow::new("x / 'B'", "('food/0-1000')"),
        ])
        .expect("rules");
        let features = FeatureVector::from_profile(&sample_profile()).expect("features");
        assert_eq!(
            table.class_counts(&features),
            vec![("A".to_string(), 1), ("B".to_string(), 1)]
        );
        assert_eq!(table.classify(&features).expect("class"), "A");
    }

    #[test]
    fn majority_class_wins() {
        let table = RuleTable::from_rows(&sample_rule_rows()).expect("rules");
        let features = FeatureVector::from_profile(&sample_profile()).expect("features");
        assert_eq!(table.classify(&features).expect("class"), "1");
    }

    #[test]
    fn conditions_on_absent_features_are_ignored() {
        let table = RuleTable::from_rows(&[RuleRow::new("x / 'C'", "('pets/0-1')")])
            .expect("rules");
        let features = FeatureVector::from_profile(&sample_profile()).expect("features");
        assert_eq!(table.classify(&features).expect("class"), "C");
    }

    #[test]
    fn no_match_is_a_calc_error() {
        let table = RuleTable::from_rows(&[RuleRow::new("x / 'A'", "('income/0-10')")])
            .expect("rules");
        let features = FeatureVector::from_profile(&sample_profile()).expect("features");
        let err = table.classify(&features).expect_err("must fail");
        assert_eq!(err.status().as_tag(), "calc_error");
    }
}
