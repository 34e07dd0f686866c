use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attributes::AttributeEdit;
use crate::commands::{Command, CommandHistory, EditNodeCommand};
use crate::error::{EditError, Result};
use crate::geometry::Point;
use crate::node::{NodeId, NodeInstance};
use crate::transform::InstanceDelta;

/// Everything one property commit changes on a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeEdit {
    pub delta: InstanceDelta,
    /// Replaces the outline after the delta has been applied.
    pub outline: Option<Vec<Point>>,
    pub attributes: Vec<AttributeEdit>,
}

impl NodeEdit {
    pub fn is_empty(&self) -> bool {
        self.delta.is_noop() && self.outline.is_none() && self.attributes.is_empty()
    }
}

/// The design database as seen by the property editor.
pub trait InstanceStore {
    /// A snapshot of the node.
    fn instance(&self, id: &NodeId) -> Result<NodeInstance>;

    fn modify_instance(&mut self, id: &NodeId, delta: &InstanceDelta) -> Result<()>;

    fn replace_outline(&mut self, id: &NodeId, outline: Vec<Point>) -> Result<()>;

    /// Apply delta, outline and variable edits as one transaction: either
    /// all of it lands or none of it does.
    fn apply_edit(&mut self, id: &NodeId, edit: NodeEdit) -> Result<()>;
}

/// In-memory design database holding placed nodes, with an undo journal.
#[derive(Debug, Serialize, Deserialize)]
pub struct LayoutDatabase {
    /// Database identifier.
    pub id: Uuid,
    /// Library name.
    pub name: String,
    /// All nodes indexed by ID.
    nodes: HashMap<NodeId, NodeInstance>,
    /// Command history for undo/redo.
    #[serde(skip)]
    command_history: CommandHistory,
}

impl LayoutDatabase {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            nodes: HashMap::new(),
            command_history: CommandHistory::new(),
        }
    }

    // ── Node management ──────────────────────────────────────────────

    pub fn add_node(&mut self, node: NodeInstance) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&NodeInstance> {
        self.nodes.get(id)
    }

    pub fn get_node_mut(&mut self, id: &NodeId) -> Option<&mut NodeInstance> {
        self.nodes.get_mut(id)
    }

    pub fn find_node_by_name(&self, name: &str) -> Option<&NodeInstance> {
        self.nodes.values().find(|n| n.name == name)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ── Undo / Redo ──────────────────────────────────────────────────

    pub fn execute_command(&mut self, command: Box<dyn Command>) -> Result<()> {
        let mut history = std::mem::take(&mut self.command_history);
        let result = history.execute(command, self);
        self.command_history = history;
        result
    }

    pub fn undo(&mut self) -> bool {
        let mut history = std::mem::take(&mut self.command_history);
        let undone = history.undo(self);
        self.command_history = history;
        undone
    }

    pub fn redo(&mut self) -> bool {
        let mut history = std::mem::take(&mut self.command_history);
        let redone = history.redo(self);
        self.command_history = history;
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.command_history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.command_history.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.command_history.undo_description()
    }

    // ── Serialization ────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl InstanceStore for LayoutDatabase {
    fn instance(&self, id: &NodeId) -> Result<NodeInstance> {
        self.get_node(id).cloned().ok_or(EditError::NodeNotFound(*id))
    }

    fn modify_instance(&mut self, id: &NodeId, delta: &InstanceDelta) -> Result<()> {
        self.apply_edit(
            id,
            NodeEdit {
                delta: *delta,
                ..NodeEdit::default()
            },
        )
    }

    fn replace_outline(&mut self, id: &NodeId, outline: Vec<Point>) -> Result<()> {
        self.apply_edit(
            id,
            NodeEdit {
                outline: Some(outline),
                ..NodeEdit::default()
            },
        )
    }

    fn apply_edit(&mut self, id: &NodeId, edit: NodeEdit) -> Result<()> {
        match self.execute_command(Box::new(EditNodeCommand::new(*id, edit))) {
            Ok(()) => {
                log::info!("node {id} edited");
                Ok(())
            }
            Err(e) => {
                log::warn!("edit of node {id} refused: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{keys, NodeFunction};
    use crate::node::{NodeProto, VarValue};

    fn db_with_node() -> (LayoutDatabase, NodeId) {
        let mut db = LayoutDatabase::new("test");
        let node = NodeInstance::new(
            "r1",
            NodeProto::new("resistor", NodeFunction::Inductor),
            Point::new(0.0, 0.0),
            4.0,
            2.0,
        );
        let id = db.add_node(node);
        (db, id)
    }

    #[test]
    fn test_database_create() {
        let db = LayoutDatabase::new("test_project");
        assert_eq!(db.name, "test_project");
        assert_eq!(db.node_count(), 0);
    }

    #[test]
    fn test_add_and_find_node() {
        let (db, id) = db_with_node();
        assert_eq!(db.node_count(), 1);
        assert!(db.get_node(&id).is_some());
        assert_eq!(db.find_node_by_name("r1").unwrap().id, id);
    }

    #[test]
    fn test_edit_undo_redo() {
        let (mut db, id) = db_with_node();
        let edit = NodeEdit {
            delta: InstanceDelta {
                dx: 3.0,
                d_width: 1.0,
                ..InstanceDelta::none()
            },
            outline: None,
            attributes: vec![AttributeEdit::set(keys::INDUCTANCE, VarValue::Text("2nH".into()))],
        };
        db.apply_edit(&id, edit).unwrap();
        let node = db.get_node(&id).unwrap();
        assert_eq!(node.anchor, Point::new(3.0, 0.0));
        assert_eq!(node.x_size, 5.0);
        assert!(node.var(keys::INDUCTANCE).is_some());
        assert_eq!(db.undo_description(), Some("Edit node properties"));

        assert!(db.undo());
        let node = db.get_node(&id).unwrap();
        assert_eq!(node.anchor, Point::new(0.0, 0.0));
        assert!(node.var(keys::INDUCTANCE).is_none());

        assert!(db.redo());
        assert_eq!(db.get_node(&id).unwrap().x_size, 5.0);
    }

    #[test]
    fn test_locked_node_rejects_edit() {
        let (mut db, id) = db_with_node();
        db.get_node_mut(&id).unwrap().locked = true;
        let delta = InstanceDelta {
            dy: 1.0,
            ..InstanceDelta::none()
        };
        let err = db.modify_instance(&id, &delta).unwrap_err();
        assert!(matches!(err, EditError::Rejected { .. }));
        assert!(!db.can_undo());
        assert_eq!(db.get_node(&id).unwrap().anchor, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_negative_size_rejected() {
        let (mut db, id) = db_with_node();
        let delta = InstanceDelta {
            d_height: -3.0,
            ..InstanceDelta::none()
        };
        assert!(db.modify_instance(&id, &delta).is_err());
        assert_eq!(db.get_node(&id).unwrap().y_size, 2.0);
    }

    #[test]
    fn test_missing_node() {
        let (mut db, _) = db_with_node();
        let other = Uuid::new_v4();
        assert!(matches!(
            db.instance(&other),
            Err(EditError::NodeNotFound(id)) if id == other
        ));
        assert!(db.replace_outline(&other, vec![Point::new(0.0, 0.0)]).is_err());
    }

    #[test]
    fn test_json_snapshot() {
        let (db, id) = db_with_node();
        let json = db.to_json().unwrap();
        let restored = LayoutDatabase::from_json(&json).unwrap();
        assert_eq!(restored.get_node(&id), db.get_node(&id));
        assert!(!restored.can_undo());
    }
}
