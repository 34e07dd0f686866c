use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleError};
use crate::rules::DesignRuleSet;

/// The technology collaborator: hands out rule sets and takes back whole
/// replacements.
pub trait RuleStore {
    fn rules(&self, technology: &str) -> Result<DesignRuleSet>;

    /// Replace the technology's rules in one step.
    fn replace_rules(&mut self, technology: &str, rules: DesignRuleSet) -> Result<()>;
}

/// In-memory rule sets keyed by technology name.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TechnologyStore {
    technologies: BTreeMap<String, DesignRuleSet>,
}

impl TechnologyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rules: DesignRuleSet) {
        self.technologies.insert(rules.technology.clone(), rules);
    }

    pub fn technology_names(&self) -> impl Iterator<Item = &str> {
        self.technologies.keys().map(String::as_str)
    }

    pub fn get(&self, technology: &str) -> Option<&DesignRuleSet> {
        self.technologies.get(technology)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let store: Self = serde_json::from_str(json)?;
        for rules in store.technologies.values() {
            rules.validate()?;
        }
        Ok(store)
    }
}

impl RuleStore for TechnologyStore {
    fn rules(&self, technology: &str) -> Result<DesignRuleSet> {
        self.get(technology)
            .cloned()
            .ok_or_else(|| RuleError::UnknownTechnology(technology.to_string()))
    }

    fn replace_rules(&mut self, technology: &str, rules: DesignRuleSet) -> Result<()> {
        let current = self
            .technologies
            .get_mut(technology)
            .ok_or_else(|| RuleError::UnknownTechnology(technology.to_string()))?;
        let reject = |reason: &str| RuleError::Rejected {
            technology: technology.to_string(),
            reason: reason.to_string(),
        };
        if rules.technology != technology {
            return Err(reject("rule set belongs to another technology"));
        }
        if rules.layer_names() != current.layer_names() || rules.node_names() != current.node_names()
        {
            return Err(reject("layer or node list differs from the technology"));
        }
        rules.validate()?;
        *current = rules;
        log::info!("replaced design rules of {technology}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleCategory, RuleValue};

    fn store() -> TechnologyStore {
        let mut store = TechnologyStore::new();
        store.add(DesignRuleSet::new(
            "mocmos",
            vec!["metal-1".into(), "metal-2".into()],
            Vec::new(),
        ));
        store
    }

    #[test]
    fn test_replace_whole_set() {
        let mut store = store();
        let mut rules = store.rules("mocmos").unwrap();
        rules
            .set_spacing(0, 1, RuleCategory::Edge, RuleValue::new(1.5, "e"))
            .unwrap();
        store.replace_rules("mocmos", rules.clone()).unwrap();
        assert_eq!(store.rules("mocmos").unwrap(), rules);
    }

    #[test]
    fn test_unknown_technology() {
        let mut store = store();
        assert!(matches!(store.rules("bicmos"), Err(RuleError::UnknownTechnology(_))));
        let rules = DesignRuleSet::new("bicmos", Vec::new(), Vec::new());
        assert!(store.replace_rules("bicmos", rules).is_err());
    }

    #[test]
    fn test_mismatched_layers_rejected() {
        let mut store = store();
        let rules = DesignRuleSet::new("mocmos", vec!["poly".into()], Vec::new());
        assert!(matches!(
            store.replace_rules("mocmos", rules),
            Err(RuleError::Rejected { .. })
        ));
        assert_eq!(store.rules("mocmos").unwrap().layer_count(), 2);
    }

    #[test]
    fn test_json_snapshot() {
        let store = store();
        let json = store.to_json().unwrap();
        let restored = TechnologyStore::from_json(&json).unwrap();
        assert_eq!(restored.technology_names().collect::<Vec<_>>(), vec!["mocmos"]);
    }
}
