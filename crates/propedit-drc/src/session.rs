//! Edit session over one technology's design rules.
//!
//! The session works on a private copy of the rule set. Field edits land in
//! that copy as soon as the current selection makes them meaningful; commit
//! hands the whole copy back to the store in one call.

use std::collections::BTreeMap;

use propedit_core::text::{format_number, parse_or};
use propedit_core::SettingsDiff;

use crate::error::{Result, RuleError};
use crate::rules::{DesignRuleSet, RuleCategory, RuleRow, RuleValue, NO_RULE};
use crate::settings::RuleSettings;
use crate::store::RuleStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleField {
    /// Distance between the "from" and "to" layers.
    Spacing(RuleCategory),
    SpacingName(RuleCategory),
    MinWidth,
    MinWidthName,
    MinArea,
    MinAreaName,
    NodeWidth,
    NodeHeight,
    NodeRuleName,
    WideLimit,
}

impl RuleField {
    fn all() -> Vec<RuleField> {
        let mut fields: Vec<RuleField> = RuleCategory::ALL
            .iter()
            .flat_map(|c| [RuleField::Spacing(*c), RuleField::SpacingName(*c)])
            .collect();
        fields.extend([
            RuleField::MinWidth,
            RuleField::MinWidthName,
            RuleField::MinArea,
            RuleField::MinAreaName,
            RuleField::NodeWidth,
            RuleField::NodeHeight,
            RuleField::NodeRuleName,
            RuleField::WideLimit,
        ]);
        fields
    }
}

/// Rule value typed into a field: empty clears the rule.
fn rule_value(text: &str, previous: f64) -> f64 {
    if text.trim().is_empty() {
        NO_RULE
    } else {
        parse_or(text, previous)
    }
}

/// The stored value, unless `edited` says the value's own field was typed.
fn edited_value(edited: bool, text: &str, previous: f64) -> f64 {
    if edited {
        rule_value(text, previous)
    } else {
        previous
    }
}

#[derive(Debug, Clone)]
pub struct RuleEditSession {
    technology: String,
    settings: RuleSettings,
    original: DesignRuleSet,
    rules: DesignRuleSet,
    from_layer: Option<usize>,
    to_layer: Option<usize>,
    node: Option<usize>,
    fields: BTreeMap<RuleField, SettingsDiff<String>>,
    /// Set while fields are refreshed from the rule set.
    updating: bool,
}

impl RuleEditSession {
    pub fn load<S: RuleStore + ?Sized>(
        store: &S,
        technology: &str,
        settings: RuleSettings,
    ) -> Result<Self> {
        let rules = store.rules(technology)?;
        let mut session = Self {
            technology: technology.to_string(),
            settings,
            from_layer: (rules.layer_count() > 0).then_some(0),
            to_layer: None,
            node: (rules.node_count() > 0).then_some(0),
            original: rules.clone(),
            rules,
            fields: RuleField::all()
                .into_iter()
                .map(|f| (f, SettingsDiff::new(String::new())))
                .collect(),
            updating: false,
        };
        session.refresh_fields();
        log::debug!("editing design rules of {technology}");
        Ok(session)
    }

    pub fn technology(&self) -> &str {
        &self.technology
    }

    /// The working copy, including uncommitted edits.
    pub fn rules(&self) -> &DesignRuleSet {
        &self.rules
    }

    pub fn from_layer(&self) -> Option<usize> {
        self.from_layer
    }

    pub fn to_layer(&self) -> Option<usize> {
        self.to_layer
    }

    pub fn text(&self, field: RuleField) -> &str {
        self.fields
            .get(&field)
            .map(|f| f.current().as_str())
            .unwrap_or_default()
    }

    pub fn is_changed(&self) -> bool {
        self.rules != self.original
    }

    pub fn set_show_only_configured(&mut self, on: bool) {
        self.settings.show_only_configured = on;
    }

    /// Rows for the "from" layer against every layer, honouring the
    /// show-only-configured setting.
    pub fn rows(&self) -> Vec<RuleRow> {
        self.from_layer
            .map(|from| self.rules.rows(from, self.settings.show_only_configured))
            .unwrap_or_default()
    }

    pub fn select_from(&mut self, layer: usize) -> Result<()> {
        self.check_layer(layer)?;
        self.from_layer = Some(layer);
        self.refresh_fields();
        Ok(())
    }

    pub fn select_to(&mut self, layer: Option<usize>) -> Result<()> {
        if let Some(layer) = layer {
            self.check_layer(layer)?;
        }
        self.to_layer = layer;
        self.refresh_fields();
        Ok(())
    }

    pub fn select_node(&mut self, node: Option<usize>) -> Result<()> {
        if let Some(node) = node {
            if node >= self.rules.node_count() {
                return Err(RuleError::NodeOutOfRange {
                    node,
                    count: self.rules.node_count(),
                });
            }
        }
        self.node = node;
        self.refresh_fields();
        Ok(())
    }

    fn check_layer(&self, layer: usize) -> Result<()> {
        if layer < self.rules.layer_count() {
            Ok(())
        } else {
            Err(RuleError::LayerOutOfRange {
                layer,
                count: self.rules.layer_count(),
            })
        }
    }

    /// Value of `field` under the current selection.
    fn field_text(&self, field: RuleField) -> String {
        let rules = &self.rules;
        let pair = self.from_layer.zip(self.to_layer);
        let node = self.node.and_then(|n| rules.node_min_size(n));
        let text = match field {
            RuleField::Spacing(c) => pair
                .and_then(|(f, t)| rules.spacing(f, t, c))
                .map(RuleValue::display_value),
            RuleField::SpacingName(c) => pair
                .and_then(|(f, t)| rules.spacing(f, t, c))
                .map(|r| r.name.clone()),
            RuleField::MinWidth => self
                .from_layer
                .and_then(|l| rules.min_width(l))
                .map(RuleValue::display_value),
            RuleField::MinWidthName => self
                .from_layer
                .and_then(|l| rules.min_width(l))
                .map(|r| r.name.clone()),
            RuleField::MinArea => self
                .from_layer
                .and_then(|l| rules.min_area(l))
                .map(RuleValue::display_value),
            RuleField::MinAreaName => self
                .from_layer
                .and_then(|l| rules.min_area(l))
                .map(|r| r.name.clone()),
            RuleField::NodeWidth => node.map(|(w, _)| w.display_value()),
            RuleField::NodeHeight => node.map(|(_, h)| h.display_value()),
            RuleField::NodeRuleName => node.map(|(w, _)| w.name.clone()),
            RuleField::WideLimit => Some(format_number(rules.wide_limit)),
        };
        text.unwrap_or_default()
    }

    /// Reload every field from the working copy; returns the fields whose
    /// text changed.
    fn refresh_fields(&mut self) -> Vec<RuleField> {
        self.updating = true;
        let mut changed = Vec::new();
        for field in RuleField::all() {
            let text = self.field_text(field);
            let slot = self
                .fields
                .entry(field)
                .or_insert_with(|| SettingsDiff::new(String::new()));
            if slot.original() != &text {
                changed.push(field);
            }
            slot.reload(text);
        }
        self.updating = false;
        changed
    }

    /// Whether the current selection gives `field` something to edit.
    fn is_applicable(&self, field: RuleField) -> bool {
        match field {
            RuleField::Spacing(_) | RuleField::SpacingName(_) => {
                self.from_layer.is_some() && self.to_layer.is_some()
            }
            RuleField::MinWidth
            | RuleField::MinWidthName
            | RuleField::MinArea
            | RuleField::MinAreaName => self.from_layer.is_some(),
            RuleField::NodeWidth | RuleField::NodeHeight | RuleField::NodeRuleName => {
                self.node.is_some()
            }
            RuleField::WideLimit => true,
        }
    }

    /// Record one edit and fold it into the working copy. Edits that need a
    /// selection that is not there are ignored. Only the edited field is
    /// parsed; the other half of a rule keeps its stored value.
    pub fn edit_field(&mut self, field: RuleField, text: &str) -> Result<()> {
        if self.updating {
            log::debug!("ignoring {field:?} during reload");
            return Ok(());
        }
        if !self.is_applicable(field) {
            log::debug!("nothing selected for {field:?}, edit not applied");
            return Ok(());
        }
        if let Some(slot) = self.fields.get_mut(&field) {
            slot.set(text.to_string());
        }

        let (from, to, node) = (
            self.from_layer.unwrap_or_default(),
            self.to_layer.unwrap_or_default(),
            self.node.unwrap_or_default(),
        );
        match field {
            RuleField::Spacing(c) | RuleField::SpacingName(c) => {
                let previous = self.rules.spacing(from, to, c).map_or(NO_RULE, |r| r.value);
                let rule = RuleValue::new(
                    edited_value(field == RuleField::Spacing(c), text, previous),
                    self.text(RuleField::SpacingName(c)).trim(),
                );
                self.rules.set_spacing(from, to, c, rule)
            }
            RuleField::MinWidth | RuleField::MinWidthName => {
                let previous = self.rules.min_width(from).map_or(NO_RULE, |r| r.value);
                let rule = RuleValue::new(
                    edited_value(field == RuleField::MinWidth, text, previous),
                    self.text(RuleField::MinWidthName).trim(),
                );
                self.rules.set_min_width(from, rule)
            }
            RuleField::MinArea | RuleField::MinAreaName => {
                let previous = self.rules.min_area(from).map_or(NO_RULE, |r| r.value);
                let rule = RuleValue::new(
                    edited_value(field == RuleField::MinArea, text, previous),
                    self.text(RuleField::MinAreaName).trim(),
                );
                self.rules.set_min_area(from, rule)
            }
            RuleField::NodeWidth | RuleField::NodeHeight | RuleField::NodeRuleName => {
                let (old_w, old_h) = self
                    .rules
                    .node_min_size(node)
                    .map_or((NO_RULE, NO_RULE), |(w, h)| (w.value, h.value));
                let w_text = self.text(RuleField::NodeWidth).trim();
                let h_text = self.text(RuleField::NodeHeight).trim();
                // both empty clears the rule
                let (w, h) = if field != RuleField::NodeRuleName
                    && w_text.is_empty()
                    && h_text.is_empty()
                {
                    (NO_RULE, NO_RULE)
                } else {
                    (
                        if field == RuleField::NodeWidth { parse_or(w_text, old_w) } else { old_w },
                        if field == RuleField::NodeHeight { parse_or(h_text, old_h) } else { old_h },
                    )
                };
                let name = self.text(RuleField::NodeRuleName).trim().to_string();
                self.rules.set_node_min_size(node, w, h, &name)
            }
            RuleField::WideLimit => {
                self.rules.wide_limit = parse_or(text, self.rules.wide_limit);
                Ok(())
            }
        }
    }

    /// Drop all uncommitted edits.
    pub fn revert(&mut self) {
        self.rules = self.original.clone();
        self.refresh_fields();
    }

    /// Replace the technology's rules with the working copy. Returns `false`
    /// when nothing changed. On error the working copy is kept.
    pub fn commit<S: RuleStore + ?Sized>(&mut self, store: &mut S) -> Result<bool> {
        if !self.is_changed() {
            log::debug!("{}: no rule changes to commit", self.technology);
            return Ok(false);
        }
        if let Err(e) = store.replace_rules(&self.technology, self.rules.clone()) {
            log::warn!("design rules of {} not saved: {e}", self.technology);
            return Err(e);
        }
        log::info!("committed design rules of {}", self.technology);
        self.reload(&*store)?;
        Ok(true)
    }

    pub fn reload<S: RuleStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        self.reload_with(store, |_, _| {})
    }

    /// Replace the working copy with the store's rules. `notify` is called
    /// for every field whose text changed; edits it makes are ignored.
    pub fn reload_with<S, F>(&mut self, store: &S, mut notify: F) -> Result<()>
    where
        S: RuleStore + ?Sized,
        F: FnMut(&mut Self, RuleField),
    {
        let rules = store.rules(&self.technology)?;
        let layers = rules.layer_count();
        self.from_layer = self.from_layer.filter(|l| *l < layers);
        self.to_layer = self.to_layer.filter(|l| *l < layers);
        self.node = self.node.filter(|n| *n < rules.node_count());
        self.original = rules.clone();
        self.rules = rules;

        let changed = self.refresh_fields();
        self.updating = true;
        for field in changed {
            notify(self, field);
        }
        self.updating = false;
        Ok(())
    }
}
