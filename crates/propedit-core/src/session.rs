//! Edit session over one node's property fields.
//!
//! A session is loaded from the store, collects field edits, and on commit
//! turns them into one [`NodeEdit`] applied through [`InstanceStore::apply_edit`].
//! Dropping the session cancels it.

use crate::attributes::{NodeFunction, SpecialEdits, SpecialFields};
use crate::database::{InstanceStore, NodeEdit};
use crate::diff::SettingsDiff;
use crate::error::Result;
use crate::node::{NodeId, NodeInstance};
use crate::settings::EditorSettings;
use crate::text::{format_number, parse_or};
use crate::transform::{Placement, TransformReconciler};

/// Every field of the node property editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeField {
    X,
    Y,
    /// Displayed X size, or the width for nodes with a size model.
    XSize,
    /// Displayed Y size, or the length for nodes with a size model.
    YSize,
    /// Degrees.
    Rotation,
    MirrorX,
    MirrorY,
    Primary,
    Secondary,
    Selector,
}

/// One user edit.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Text(NodeField, String),
    Flag(NodeField, bool),
    Choice(usize),
}

/// Field values as loaded from a node.
struct Loaded {
    placement: Placement,
    texts: [String; 5],
    special: SpecialFields,
}

const TEXT_FIELDS: [NodeField; 5] = [
    NodeField::X,
    NodeField::Y,
    NodeField::XSize,
    NodeField::YSize,
    NodeField::Rotation,
];

fn load_values(node: &NodeInstance, settings: &EditorSettings) -> Loaded {
    let placement = Placement::of(node);
    let (w, h) = match node.function().size_model() {
        Some(model) => model.load(node),
        None => (
            format_number(placement.x_size),
            format_number(placement.y_size),
        ),
    };
    Loaded {
        placement,
        texts: [
            format_number(placement.x),
            format_number(placement.y),
            w,
            h,
            format_number(placement.rotation as f64 / 10.0),
        ],
        special: node.function().load(node, settings),
    }
}

#[derive(Debug, Clone)]
pub struct NodeEditSession {
    node_id: NodeId,
    function: NodeFunction,
    settings: EditorSettings,
    initial: Placement,
    texts: [SettingsDiff<String>; 5],
    mirror_x: SettingsDiff<bool>,
    mirror_y: SettingsDiff<bool>,
    special_fields: SpecialFields,
    special: SpecialEdits,
    /// Set while field values are being refreshed from the store.
    updating: bool,
}

impl NodeEditSession {
    pub fn load<S: InstanceStore + ?Sized>(
        store: &S,
        id: &NodeId,
        settings: EditorSettings,
    ) -> Result<Self> {
        let node = store.instance(id)?;
        let loaded = load_values(&node, &settings);
        log::debug!("editing node {} ({})", node.name, node.proto.name);
        Ok(Self {
            node_id: *id,
            function: node.function().clone(),
            initial: loaded.placement,
            texts: loaded.texts.map(SettingsDiff::new),
            mirror_x: SettingsDiff::new(loaded.placement.mirror_x),
            mirror_y: SettingsDiff::new(loaded.placement.mirror_y),
            special: SpecialEdits::from_fields(&loaded.special),
            special_fields: loaded.special,
            settings,
            updating: false,
        })
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn function(&self) -> &NodeFunction {
        &self.function
    }

    /// Labels, choices and loaded values of the specialized fields.
    pub fn special_fields(&self) -> &SpecialFields {
        &self.special_fields
    }

    fn text_slot(field: NodeField) -> Option<usize> {
        TEXT_FIELDS.iter().position(|f| *f == field)
    }

    /// Current text of a text field.
    pub fn text(&self, field: NodeField) -> Option<&str> {
        match field {
            NodeField::Primary => self.special.primary.as_ref().map(|f| f.current().as_str()),
            NodeField::Secondary => self.special.secondary.as_ref().map(|f| f.current().as_str()),
            _ => Self::text_slot(field).map(|i| self.texts[i].current().as_str()),
        }
    }

    pub fn flag(&self, field: NodeField) -> Option<bool> {
        match field {
            NodeField::MirrorX => Some(*self.mirror_x.current()),
            NodeField::MirrorY => Some(*self.mirror_y.current()),
            _ => None,
        }
    }

    pub fn choice(&self) -> Option<usize> {
        self.special.selector.as_ref().map(|s| *s.current())
    }

    pub fn is_changed(&self) -> bool {
        self.texts.iter().any(SettingsDiff::is_changed)
            || self.mirror_x.is_changed()
            || self.mirror_y.is_changed()
            || self.special.is_changed()
    }

    fn editable(&self, field: NodeField) -> bool {
        match field {
            NodeField::XSize => self
                .function
                .size_model()
                .map_or(true, |m| m.width_editable()),
            NodeField::Selector => self
                .special_fields
                .selector
                .as_ref()
                .is_some_and(|s| s.editable),
            _ => true,
        }
    }

    /// `index` names an entry of an editable selector.
    fn has_choice(&self, index: usize) -> bool {
        self.editable(NodeField::Selector)
            && self
                .special_fields
                .selector
                .as_ref()
                .is_some_and(|s| index < s.choices.len())
    }

    /// Record one edit. Edits arriving while the session is refreshing from
    /// the store, or aimed at a field this node does not have, are ignored.
    pub fn edit_field(&mut self, edit: FieldEdit) {
        if self.updating {
            log::debug!("ignoring {edit:?} during reload");
            return;
        }
        let applied = match edit {
            FieldEdit::Text(field, text) if self.editable(field) => match field {
                NodeField::Primary => self.special.primary.as_mut().map(|f| f.set(text)),
                NodeField::Secondary => self.special.secondary.as_mut().map(|f| f.set(text)),
                _ => Self::text_slot(field).map(|i| self.texts[i].set(text)),
            },
            FieldEdit::Flag(NodeField::MirrorX, on) => {
                self.mirror_x.set(on);
                Some(())
            }
            FieldEdit::Flag(NodeField::MirrorY, on) => {
                self.mirror_y.set(on);
                Some(())
            }
            FieldEdit::Choice(index) if self.has_choice(index) => {
                self.special.selector.as_mut().map(|s| s.set(index))
            }
            _ => None,
        };
        if applied.is_none() {
            log::debug!("node {}: field not editable", self.node_id);
        }
    }

    fn changed_text(&self, field: NodeField) -> Option<&str> {
        let slot = &self.texts[Self::text_slot(field)?];
        slot.is_changed().then(|| slot.current().as_str())
    }

    /// Placement as currently typed. Fields the user did not touch keep the
    /// loaded numbers exactly.
    pub fn current_placement(&self) -> Placement {
        let init = &self.initial;
        let number = |field: NodeField, loaded: f64| {
            self.changed_text(field)
                .map_or(loaded, |text| parse_or(text, loaded))
        };
        let model_sized = self.function.size_model().is_some();
        Placement {
            x: number(NodeField::X, init.x),
            y: number(NodeField::Y, init.y),
            x_size: if model_sized {
                init.x_size
            } else {
                number(NodeField::XSize, init.x_size)
            },
            y_size: if model_sized {
                init.y_size
            } else {
                number(NodeField::YSize, init.y_size)
            },
            rotation: self.changed_text(NodeField::Rotation).map_or(init.rotation, |text| {
                (parse_or(text, init.rotation as f64 / 10.0) * 10.0).round() as i32
            }),
            mirror_x: *self.mirror_x.current(),
            mirror_y: *self.mirror_y.current(),
        }
    }

    /// The edit a commit would apply to `node`.
    pub fn build_edit(&self, node: &NodeInstance) -> NodeEdit {
        let model = self.function.size_model().map(|m| {
            m.resolve(
                node,
                self.changed_text(NodeField::XSize),
                self.changed_text(NodeField::YSize),
                &self.settings,
            )
        });
        let current = self.current_placement();
        let outcome = TransformReconciler::new(&self.settings).reconcile(
            node,
            &self.initial,
            &current,
            model.as_ref(),
        );
        let mut attributes = model.map(|m| m.attributes).unwrap_or_default();
        attributes.extend(self.function.reconcile(&self.special, node, &self.settings));
        NodeEdit {
            delta: outcome.delta,
            outline: outcome.outline,
            attributes,
        }
    }

    /// Apply the session's edits in one transaction. Returns `false` when
    /// nothing had changed and the store was not touched. On error the
    /// session keeps its edits.
    pub fn commit<S: InstanceStore + ?Sized>(&mut self, store: &mut S) -> Result<bool> {
        let node = store.instance(&self.node_id)?;
        let edit = self.build_edit(&node);
        if edit.is_empty() {
            log::debug!("node {}: nothing to commit", node.name);
            return Ok(false);
        }
        store.apply_edit(&self.node_id, edit)?;
        log::info!("committed property edits to node {}", node.name);
        self.reload(&*store)?;
        Ok(true)
    }

    pub fn reload<S: InstanceStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        self.reload_with(store, |_, _| {})
    }

    /// Refresh every field from the store. `notify` is called for each field
    /// whose value changed; edits it makes are ignored.
    pub fn reload_with<S, F>(&mut self, store: &S, mut notify: F) -> Result<()>
    where
        S: InstanceStore + ?Sized,
        F: FnMut(&mut Self, NodeField),
    {
        let node = store.instance(&self.node_id)?;
        let loaded = load_values(&node, &self.settings);

        self.updating = true;
        let mut changed = Vec::new();
        for (i, text) in loaded.texts.into_iter().enumerate() {
            if self.texts[i].original() != &text {
                changed.push(TEXT_FIELDS[i]);
            }
            self.texts[i].reload(text);
        }
        if *self.mirror_x.original() != loaded.placement.mirror_x {
            changed.push(NodeField::MirrorX);
        }
        self.mirror_x.reload(loaded.placement.mirror_x);
        if *self.mirror_y.original() != loaded.placement.mirror_y {
            changed.push(NodeField::MirrorY);
        }
        self.mirror_y.reload(loaded.placement.mirror_y);

        let special = SpecialEdits::from_fields(&loaded.special);
        if self.special.primary.as_ref().map(SettingsDiff::original)
            != special.primary.as_ref().map(SettingsDiff::original)
        {
            changed.push(NodeField::Primary);
        }
        if self.special.secondary.as_ref().map(SettingsDiff::original)
            != special.secondary.as_ref().map(SettingsDiff::original)
        {
            changed.push(NodeField::Secondary);
        }
        if self.special.selector.as_ref().map(SettingsDiff::original)
            != special.selector.as_ref().map(SettingsDiff::original)
        {
            changed.push(NodeField::Selector);
        }
        self.special = special;
        self.special_fields = loaded.special;
        self.initial = loaded.placement;

        for field in changed {
            notify(self, field);
        }
        self.updating = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::NodeFunction;
    use crate::database::LayoutDatabase;
    use crate::geometry::Point;
    use crate::node::NodeProto;

    fn setup() -> (LayoutDatabase, NodeId) {
        let mut db = LayoutDatabase::new("lib");
        let id = db.add_node(NodeInstance::new(
            "n1",
            NodeProto::new("box", NodeFunction::Plain),
            Point::new(0.0, 0.0),
            10.0,
            10.0,
        ));
        (db, id)
    }

    #[test]
    fn test_load_formats_fields() {
        let (db, id) = setup();
        let session = NodeEditSession::load(&db, &id, EditorSettings::default()).unwrap();
        assert_eq!(session.text(NodeField::XSize), Some("10"));
        assert_eq!(session.text(NodeField::Rotation), Some("0"));
        assert_eq!(session.text(NodeField::Primary), None);
        assert!(!session.is_changed());
    }

    #[test]
    fn test_noop_commit_leaves_store_alone() {
        let (mut db, id) = setup();
        let mut session = NodeEditSession::load(&db, &id, EditorSettings::default()).unwrap();
        assert!(!session.commit(&mut db).unwrap());
        assert!(!db.can_undo());
    }

    #[test]
    fn test_edit_ignored_while_updating() {
        let (mut db, id) = setup();
        let mut session = NodeEditSession::load(&db, &id, EditorSettings::default()).unwrap();
        let delta = crate::transform::InstanceDelta {
            dx: 2.0,
            ..crate::transform::InstanceDelta::none()
        };
        db.modify_instance(&id, &delta).unwrap();

        let mut seen = Vec::new();
        session
            .reload_with(&db, |s, field| {
                seen.push(field);
                s.edit_field(FieldEdit::Text(NodeField::Y, "99".into()));
            })
            .unwrap();
        assert_eq!(seen, vec![NodeField::X]);
        assert_eq!(session.text(NodeField::X), Some("2"));
        assert_eq!(session.text(NodeField::Y), Some("0"));
        assert!(!session.is_changed());
    }

    #[test]
    fn test_rotation_in_degrees() {
        let (mut db, id) = setup();
        let mut session = NodeEditSession::load(&db, &id, EditorSettings::default()).unwrap();
        session.edit_field(FieldEdit::Text(NodeField::Rotation, "90".into()));
        assert_eq!(session.current_placement().rotation, 900);
        assert!(session.commit(&mut db).unwrap());
        assert_eq!(db.get_node(&id).unwrap().orientation.angle(), 900);
        assert_eq!(session.text(NodeField::Rotation), Some("90"));
    }
}
