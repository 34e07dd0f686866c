use std::fmt;

use propedit_core::text::format_number;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleError};
use crate::matrix::{node_size_slots, pair_count, rule_index};

/// Value of a rule that is not configured.
pub const NO_RULE: f64 = -1.0;

/// The seven spacing tables kept per layer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleCategory {
    ConnectedNormal,
    UnconnectedNormal,
    ConnectedWide,
    UnconnectedWide,
    ConnectedMultiCut,
    UnconnectedMultiCut,
    Edge,
}

impl RuleCategory {
    pub const ALL: [RuleCategory; 7] = [
        RuleCategory::ConnectedNormal,
        RuleCategory::UnconnectedNormal,
        RuleCategory::ConnectedWide,
        RuleCategory::UnconnectedWide,
        RuleCategory::ConnectedMultiCut,
        RuleCategory::UnconnectedMultiCut,
        RuleCategory::Edge,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn is_unconnected(self) -> bool {
        matches!(
            self,
            RuleCategory::UnconnectedNormal
                | RuleCategory::UnconnectedWide
                | RuleCategory::UnconnectedMultiCut
        )
    }

    /// Short tag used in row summaries.
    pub fn tag(self) -> &'static str {
        match self {
            RuleCategory::ConnectedNormal => "C",
            RuleCategory::UnconnectedNormal => "U",
            RuleCategory::ConnectedWide => "CW",
            RuleCategory::UnconnectedWide => "UW",
            RuleCategory::ConnectedMultiCut => "CM",
            RuleCategory::UnconnectedMultiCut => "UM",
            RuleCategory::Edge => "E",
        }
    }
}

/// A rule distance and the name it is reported under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleValue {
    pub value: f64,
    pub name: String,
}

impl RuleValue {
    pub fn unset() -> Self {
        Self {
            value: NO_RULE,
            name: String::new(),
        }
    }

    pub fn new(value: f64, name: &str) -> Self {
        Self {
            value,
            name: name.to_string(),
        }
    }

    /// Negative values mean "no constraint".
    pub fn is_set(&self) -> bool {
        self.value >= 0.0
    }

    /// Field text: the value, or nothing when unset.
    pub fn display_value(&self) -> String {
        if self.is_set() {
            format_number(self.value)
        } else {
            String::new()
        }
    }
}

impl Default for RuleValue {
    fn default() -> Self {
        Self::unset()
    }
}

/// One line of the per-layer rule list: the selected layer against `layer`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleRow {
    pub layer: usize,
    pub layer_name: String,
    pub values: [f64; 7],
}

impl RuleRow {
    pub fn is_configured(&self) -> bool {
        self.values.iter().any(|v| *v >= 0.0)
    }
}

impl fmt::Display for RuleRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.layer_name)?;
        for (category, value) in RuleCategory::ALL.iter().zip(self.values) {
            if value >= 0.0 {
                write!(f, " {}={}", category.tag(), format_number(value))?;
            } else {
                write!(f, " {}=-", category.tag())?;
            }
        }
        Ok(())
    }
}

/// Design rules of one technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRuleSet {
    pub technology: String,
    layer_names: Vec<String>,
    node_names: Vec<String>,
    /// Features wider than this use the wide spacing tables.
    pub wide_limit: f64,
    /// One packed table per [`RuleCategory`].
    spacing: Vec<Vec<RuleValue>>,
    min_width: Vec<RuleValue>,
    min_area: Vec<RuleValue>,
    /// Width and height of each node in adjacent slots.
    node_sizes: Vec<RuleValue>,
}

impl DesignRuleSet {
    pub fn new(technology: &str, layer_names: Vec<String>, node_names: Vec<String>) -> Self {
        let layers = layer_names.len();
        let nodes = node_names.len();
        Self {
            technology: technology.to_string(),
            spacing: vec![vec![RuleValue::unset(); pair_count(layers)]; RuleCategory::ALL.len()],
            min_width: vec![RuleValue::unset(); layers],
            min_area: vec![RuleValue::unset(); layers],
            node_sizes: vec![RuleValue::unset(); 2 * nodes],
            layer_names,
            node_names,
            wide_limit: 0.0,
        }
    }

    pub fn layer_count(&self) -> usize {
        self.layer_names.len()
    }

    pub fn node_count(&self) -> usize {
        self.node_names.len()
    }

    pub fn layer_names(&self) -> &[String] {
        &self.layer_names
    }

    pub fn node_names(&self) -> &[String] {
        &self.node_names
    }

    fn check_layer(&self, layer: usize) -> Result<()> {
        if layer < self.layer_count() {
            Ok(())
        } else {
            Err(RuleError::LayerOutOfRange {
                layer,
                count: self.layer_count(),
            })
        }
    }

    fn pair_slot(&self, a: usize, b: usize) -> Result<usize> {
        self.check_layer(a)?;
        self.check_layer(b)?;
        rule_index(a, b, self.layer_count()).ok_or(RuleError::LayerOutOfRange {
            layer: a.max(b),
            count: self.layer_count(),
        })
    }

    // ── Layer pairs ──────────────────────────────────────────────────

    pub fn spacing(&self, a: usize, b: usize, category: RuleCategory) -> Option<&RuleValue> {
        let slot = rule_index(a, b, self.layer_count())?;
        self.spacing[category.slot()].get(slot)
    }

    pub fn set_spacing(
        &mut self,
        a: usize,
        b: usize,
        category: RuleCategory,
        rule: RuleValue,
    ) -> Result<()> {
        let slot = self.pair_slot(a, b)?;
        self.spacing[category.slot()][slot] = rule;
        Ok(())
    }

    /// All seven values between two layers.
    pub fn row(&self, from: usize, to: usize) -> Option<RuleRow> {
        let slot = rule_index(from, to, self.layer_count())?;
        let mut values = [NO_RULE; 7];
        for category in RuleCategory::ALL {
            values[category.slot()] = self.spacing[category.slot()][slot].value;
        }
        Some(RuleRow {
            layer: to,
            layer_name: self.layer_names[to].clone(),
            values,
        })
    }

    /// One row per layer paired with `from`, optionally leaving out pairs
    /// without any configured rule.
    pub fn rows(&self, from: usize, only_configured: bool) -> Vec<RuleRow> {
        (0..self.layer_count())
            .filter_map(|to| self.row(from, to))
            .filter(|row| !only_configured || row.is_configured())
            .collect()
    }

    // ── Single layers ────────────────────────────────────────────────

    pub fn min_width(&self, layer: usize) -> Option<&RuleValue> {
        self.min_width.get(layer)
    }

    pub fn set_min_width(&mut self, layer: usize, rule: RuleValue) -> Result<()> {
        self.check_layer(layer)?;
        self.min_width[layer] = rule;
        Ok(())
    }

    pub fn min_area(&self, layer: usize) -> Option<&RuleValue> {
        self.min_area.get(layer)
    }

    pub fn set_min_area(&mut self, layer: usize, rule: RuleValue) -> Result<()> {
        self.check_layer(layer)?;
        self.min_area[layer] = rule;
        Ok(())
    }

    // ── Nodes ────────────────────────────────────────────────────────

    /// Minimum (width, height) of a node.
    pub fn node_min_size(&self, node: usize) -> Option<(&RuleValue, &RuleValue)> {
        let (w, h) = node_size_slots(node);
        Some((self.node_sizes.get(w)?, self.node_sizes.get(h)?))
    }

    pub fn set_node_min_size(&mut self, node: usize, width: f64, height: f64, name: &str) -> Result<()> {
        if node >= self.node_count() {
            return Err(RuleError::NodeOutOfRange {
                node,
                count: self.node_count(),
            });
        }
        let (w, h) = node_size_slots(node);
        self.node_sizes[w] = RuleValue::new(width, name);
        self.node_sizes[h] = RuleValue::new(height, name);
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Largest unconnected spacing anywhere; how far apart two unrelated
    /// objects must be examined. Zero when nothing is configured.
    pub fn worst_spacing(&self) -> f64 {
        RuleCategory::ALL
            .iter()
            .filter(|c| c.is_unconnected())
            .flat_map(|c| self.spacing[c.slot()].iter())
            .map(|r| r.value)
            .fold(0.0, f64::max)
    }

    /// Largest unconnected spacing around `layer` for an object no larger
    /// than `max_size`. Wide rules only count past the wide limit.
    pub fn max_surround(&self, layer: usize, max_size: f64) -> Option<f64> {
        let n = self.layer_count();
        if layer >= n {
            return None;
        }
        let mut worst = NO_RULE;
        for other in 0..n {
            let slot = rule_index(layer, other, n)?;
            worst = worst.max(self.spacing[RuleCategory::UnconnectedNormal.slot()][slot].value);
            if max_size > self.wide_limit {
                worst = worst.max(self.spacing[RuleCategory::UnconnectedWide.slot()][slot].value);
            }
        }
        (worst >= 0.0).then_some(worst)
    }

    /// Check that every table has the size its layer and node counts call
    /// for. Deserialized rule sets are not trusted until this passes.
    pub fn validate(&self) -> Result<()> {
        let reject = |reason: String| RuleError::Rejected {
            technology: self.technology.clone(),
            reason,
        };
        let pairs = pair_count(self.layer_count());
        if self.spacing.len() != RuleCategory::ALL.len() {
            return Err(reject(format!("{} spacing tables", self.spacing.len())));
        }
        if let Some(t) = self.spacing.iter().find(|t| t.len() != pairs) {
            return Err(reject(format!("spacing table of {} entries, expected {pairs}", t.len())));
        }
        if self.min_width.len() != self.layer_count() || self.min_area.len() != self.layer_count() {
            return Err(reject("per-layer tables do not match the layer list".to_string()));
        }
        if self.node_sizes.len() != 2 * self.node_count() {
            return Err(reject("node size table does not match the node list".to_string()));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_layers() -> DesignRuleSet {
        DesignRuleSet::new(
            "mocmos",
            vec!["metal-1".into(), "metal-2".into(), "poly".into()],
            vec!["contact".into()],
        )
    }

    #[test]
    fn test_write_read_symmetric() {
        let mut rules = three_layers();
        rules
            .set_spacing(0, 2, RuleCategory::ConnectedNormal, RuleValue::new(3.0, "6.2"))
            .unwrap();
        let back = rules.spacing(2, 0, RuleCategory::ConnectedNormal).unwrap();
        assert_eq!(back.value, 3.0);
        assert_eq!(back.name, "6.2");
        assert!(!rules.spacing(0, 2, RuleCategory::Edge).unwrap().is_set());
    }

    #[test]
    fn test_out_of_range_layer() {
        let mut rules = three_layers();
        assert!(rules.spacing(0, 3, RuleCategory::Edge).is_none());
        let err = rules
            .set_spacing(3, 0, RuleCategory::Edge, RuleValue::new(1.0, ""))
            .unwrap_err();
        assert!(matches!(err, RuleError::LayerOutOfRange { layer: 3, count: 3 }));
    }

    #[test]
    fn test_rows_filter_unconfigured() {
        let mut rules = three_layers();
        rules
            .set_spacing(1, 0, RuleCategory::UnconnectedWide, RuleValue::new(4.5, ""))
            .unwrap();
        assert_eq!(rules.rows(0, false).len(), 3);
        let rows = rules.rows(0, true);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].layer, 1);
        assert_eq!(rows[0].to_string(), "metal-2: C=- U=- CW=- UW=4.5 CM=- UM=- E=-");
    }

    #[test]
    fn test_worst_spacing_ignores_connected() {
        let mut rules = three_layers();
        assert_eq!(rules.worst_spacing(), 0.0);
        rules
            .set_spacing(0, 0, RuleCategory::ConnectedNormal, RuleValue::new(9.0, ""))
            .unwrap();
        rules
            .set_spacing(1, 2, RuleCategory::UnconnectedMultiCut, RuleValue::new(2.0, ""))
            .unwrap();
        assert_eq!(rules.worst_spacing(), 2.0);
    }

    #[test]
    fn test_max_surround_honours_wide_limit() {
        let mut rules = three_layers();
        rules.wide_limit = 10.0;
        assert_eq!(rules.max_surround(0, 1.0), None);
        rules
            .set_spacing(0, 1, RuleCategory::UnconnectedNormal, RuleValue::new(3.0, ""))
            .unwrap();
        rules
            .set_spacing(0, 2, RuleCategory::UnconnectedWide, RuleValue::new(5.0, ""))
            .unwrap();
        assert_eq!(rules.max_surround(0, 1.0), Some(3.0));
        assert_eq!(rules.max_surround(0, 20.0), Some(5.0));
        assert_eq!(rules.max_surround(7, 20.0), None);
    }

    #[test]
    fn test_node_sizes() {
        let mut rules = three_layers();
        rules.set_node_min_size(0, 4.0, 5.0, "7.1").unwrap();
        let (w, h) = rules.node_min_size(0).unwrap();
        assert_eq!((w.value, h.value), (4.0, 5.0));
        assert!(rules.set_node_min_size(1, 1.0, 1.0, "").is_err());
        assert!(rules.node_min_size(1).is_none());
    }

    #[test]
    fn test_json_rejects_truncated_tables() {
        let rules = three_layers();
        let json = rules.to_json().unwrap();
        assert_eq!(DesignRuleSet::from_json(&json).unwrap(), rules);

        let mut broken = rules.clone();
        broken.min_area.pop();
        let json = serde_json::to_string(&broken).unwrap();
        assert!(matches!(
            DesignRuleSet::from_json(&json),
            Err(RuleError::Rejected { .. })
        ));
    }
}
