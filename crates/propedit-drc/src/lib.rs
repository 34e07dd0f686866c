//! # propedit DRC
//!
//! Design rules of a technology kept per unordered layer pair in packed
//! tables, with an edit session that changes a private copy and hands the
//! whole rule set back to the technology store on commit.

pub mod error;
pub mod matrix;
pub mod rules;
pub mod session;
pub mod settings;
pub mod store;

pub use error::{Result, RuleError};
pub use matrix::{node_size_slots, pair_count, rule_index};
pub use rules::{DesignRuleSet, RuleCategory, RuleRow, RuleValue, NO_RULE};
pub use session::{RuleEditSession, RuleField};
pub use settings::RuleSettings;
pub use store::{RuleStore, TechnologyStore};
