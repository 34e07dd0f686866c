//! # propedit core
//!
//! Headless kernel of a node property editor: an in-memory design database
//! with an undo journal, the node model, and the reconcilers that turn edited
//! property fields into one atomic geometric delta plus variable edits.

pub mod attributes;
pub mod commands;
pub mod database;
pub mod diff;
pub mod error;
pub mod geometry;
pub mod node;
pub mod orientation;
pub mod session;
pub mod settings;
pub mod sizing;
pub mod text;
pub mod transform;

pub use attributes::{AttributeEdit, NodeFunction, SpecialFields};
pub use database::{InstanceStore, LayoutDatabase, NodeEdit};
pub use diff::SettingsDiff;
pub use error::{EditError, Result};
pub use geometry::{BBox, Point};
pub use node::{NodeId, NodeInstance, NodeProto, VarValue};
pub use orientation::Orientation;
pub use session::{FieldEdit, NodeEditSession, NodeField};
pub use settings::EditorSettings;
pub use sizing::SizeModel;
pub use transform::{InstanceDelta, Placement, TransformReconciler};
