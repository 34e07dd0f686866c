use serde::{Deserialize, Serialize};

/// Options of the rule editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    /// Leave layer pairs without any configured rule out of the row list.
    pub show_only_configured: bool,
}

impl RuleSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert!(!RuleSettings::default().show_only_configured);
        assert!(RuleSettings::from_json("{}").unwrap() == RuleSettings::default());
        assert!(
            RuleSettings::from_json(r#"{"show_only_configured": true}"#)
                .unwrap()
                .show_only_configured
        );
    }
}
