use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::classifier::rules::{RuleRow, RuleTable};
use crate::classifier::tree::DecisionTree;
use crate::classifier::ClassifierBundle;
use crate::config::DataConfig;
use crate::error::PlanError;
use crate::reference::ReferenceData;
use crate::types::{MinimumsTable, TemplateTable};

pub fn load_templates(path: &Path) -> Result<TemplateTable> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading plan templates: {}", path.display()))?;
    let templates: TemplateTable = serde_json::from_str(&data)
        .with_context(|| format!("failed parsing plan templates: {}", path.display()))?;
    Ok(templates)
}

pub fn load_minimums(path: &Path) -> Result<MinimumsTable> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading minimums: {}", path.display()))?;
    let minimums: MinimumsTable = serde_json::from_str(&data)
        .with_context(|| format!("failed parsing minimums: {}", path.display()))?;
    Ok(minimums)
}

pub fn load_rules(path: &Path) -> Result<RuleTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed opening rules file: {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<RuleRow>() {
        let row =
            record.with_context(|| format!("failed parsing rules file: {}", path.display()))?;
        rows.push(row);
    }
    if rows.is_empty() {
        bail!("rules file is empty: {}", path.display());
    }
    Ok(RuleTable::from_rows(&rows)?)
}

pub fn load_tree(path: &Path) -> Result<DecisionTree> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading model: {}", path.display()))?;
    let tree: DecisionTree = serde_json::from_str(&data)
        .with_context(|| format!("failed parsing model: {}", path.display()))?;
    if tree.nodes.is_empty() {
        bail!("model has no nodes: {}", path.display());
    }
    Ok(tree)
}

pub fn load_reference(paths: &DataConfig) -> Result<ReferenceData, PlanError> {
    let load = || -> Result<ReferenceData> {
        let templates = load_templates(&paths.resolved_templates_path())?;
        let minimums = load_minimums(&paths.resolved_minimums_path())?;
        let rules = load_rules(&paths.resolved_rules_path())?;
        let tree = load_tree(&paths.resolved_model_path())?;
        info!(
            templates = templates.len(),
            rules = rules.len(),
            nodes = tree.nodes.len(),
            "reference data loaded"
        );
        Ok(ReferenceData::new(
            templates,
            minimums,
            ClassifierBundle::new(Box::new(tree), rules),
        ))
    };
    load().map_err(|e| {
        warn!("reference data unavailable: {e:#}");
        PlanError::lookup(format!("{e:#}"))
    })
}
