use serde::{Deserialize, Serialize};

/// Tunables shared by the node editing kernels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Two coordinates closer than this are considered equal.
    pub epsilon: f64,
    /// Grid that emitted deltas are rounded to (database units).
    pub precision: f64,
    /// Field text that restores a variable's factory behavior.
    pub default_sentinel: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            precision: 0.001,
            default_sentinel: "DEFAULT".to_string(),
        }
    }
}

impl EditorSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn nearly_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.epsilon
    }

    /// Snap a value onto the database grid.
    pub fn round(&self, value: f64) -> f64 {
        if self.precision <= 0.0 {
            return value;
        }
        let snapped = (value / self.precision).round() * self.precision;
        // avoid emitting -0.0
        if snapped == 0.0 {
            0.0
        } else {
            snapped
        }
    }

    /// True when the text asks for the factory value (empty or the sentinel).
    pub fn is_default_text(&self, text: &str) -> bool {
        let text = text.trim();
        text.is_empty() || text.eq_ignore_ascii_case(&self.default_sentinel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = EditorSettings::from_json(r#"{ "precision": 0.5 }"#).unwrap();
        assert!((s.precision - 0.5).abs() < 1e-10);
        assert_eq!(s.default_sentinel, "DEFAULT");
    }

    #[test]
    fn test_round_to_grid() {
        let s = EditorSettings::default();
        assert!((s.round(1.23456) - 1.235).abs() < 1e-10);
        assert_eq!(s.round(-0.0001), 0.0);
    }

    #[test]
    fn test_default_text() {
        let s = EditorSettings::default();
        assert!(s.is_default_text(""));
        assert!(s.is_default_text("  default "));
        assert!(!s.is_default_text("2.5"));
    }
}
