use crate::database::{LayoutDatabase, NodeEdit};
use crate::error::{EditError, Result};
use crate::node::{NodeId, NodeInstance};

/// A reversible command for the undo/redo system.
pub trait Command: std::fmt::Debug + Send {
    /// Execute the command (apply changes to the database).
    fn execute(&mut self, db: &mut LayoutDatabase) -> Result<()>;
    /// Reverse the command (undo changes).
    fn undo(&mut self, db: &mut LayoutDatabase);
    /// Human-readable description for the undo/redo history.
    fn description(&self) -> &str;
}

// ══════════════════════════════════════════════════════════════════════
// Concrete Commands
// ══════════════════════════════════════════════════════════════════════

/// Apply a property edit to one node as a single step.
#[derive(Debug)]
pub struct EditNodeCommand {
    pub node_id: NodeId,
    pub edit: NodeEdit,
    /// The node as it was before execution (saved for undo).
    before: Option<NodeInstance>,
}

impl EditNodeCommand {
    pub fn new(node_id: NodeId, edit: NodeEdit) -> Self {
        Self {
            node_id,
            edit,
            before: None,
        }
    }
}

/// The node after `edit`, or the reason it cannot take it.
fn edited(node: &NodeInstance, edit: &NodeEdit) -> std::result::Result<NodeInstance, String> {
    if node.locked {
        return Err("node is locked".to_string());
    }
    let mut next = node.clone();
    next.modify(&edit.delta);
    if let Some(outline) = &edit.outline {
        if outline.is_empty() {
            return Err("outline has no points".to_string());
        }
        next.replace_outline(outline.clone());
    }
    for attribute in &edit.attributes {
        next.apply_attribute(attribute);
    }
    if next.x_size < 0.0 || next.y_size < 0.0 {
        return Err(format!(
            "size would become negative ({} x {})",
            next.x_size, next.y_size
        ));
    }
    Ok(next)
}

impl Command for EditNodeCommand {
    fn execute(&mut self, db: &mut LayoutDatabase) -> Result<()> {
        let node = db
            .get_node_mut(&self.node_id)
            .ok_or(EditError::NodeNotFound(self.node_id))?;
        let next = edited(node, &self.edit).map_err(|reason| EditError::Rejected {
            node: self.node_id,
            reason,
        })?;
        self.before = Some(std::mem::replace(node, next));
        Ok(())
    }

    fn undo(&mut self, db: &mut LayoutDatabase) {
        if let Some(before) = self.before.take() {
            if let Some(node) = db.get_node_mut(&self.node_id) {
                *node = before;
            }
        }
    }

    fn description(&self) -> &str {
        "Edit node properties"
    }
}

/// Manages the undo/redo history stack.
#[derive(Debug, Default)]
pub struct CommandHistory {
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Run a command; a failed command leaves both stacks untouched.
    pub fn execute(&mut self, mut command: Box<dyn Command>, db: &mut LayoutDatabase) -> Result<()> {
        command.execute(db)?;
        self.undo_stack.push(command);
        // Executing a new command clears the redo stack.
        self.redo_stack.clear();
        Ok(())
    }

    pub fn undo(&mut self, db: &mut LayoutDatabase) -> bool {
        if let Some(mut command) = self.undo_stack.pop() {
            command.undo(db);
            self.redo_stack.push(command);
            true
        } else {
            false
        }
    }

    pub fn redo(&mut self, db: &mut LayoutDatabase) -> bool {
        if let Some(mut command) = self.redo_stack.pop() {
            match command.execute(db) {
                Ok(()) => {
                    self.undo_stack.push(command);
                    true
                }
                Err(e) => {
                    log::warn!("redo of '{}' failed: {e}", command.description());
                    false
                }
            }
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description())
    }
}
