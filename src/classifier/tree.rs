use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::classifier::features::FEATURE_COUNT;
use crate::classifier::FeatureModel;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    // row[feature] <= threshold goes left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: String,
    },
}

impl FeatureModel for DecisionTree {
    fn predict(&self, row: &[f64; FEATURE_COUNT]) -> Result<String> {
        let mut index = 0usize;
        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| anyhow!("node index {index} out of range"))?;
            match node {
                TreeNode::Leaf { class } => return Ok(class.clone()),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row
                        .get(*feature)
                        .ok_or_else(|| anyhow!("feature index {feature} out of range"))?;
                    index = if value <= threshold { *left } else { *right };
                }
            }
        }
        Err(anyhow!("decision tree does not terminate"))
    }
}
