//! Turning a selected source range into syntax nodes.
//!
//! - [`select_node`]: the single node a selection denotes.
//! - [`select_statements`]: the run of sibling statements a selection covers,
//!   with a rejection reason when the run is not refactorable.
//! - [`locate_units`]: declarations by name and kind.

pub mod node;
pub mod statements;
pub mod unit;

pub use node::{select_node, NodeSelection};
pub use statements::{select_statements, SelectionRejection, StatementSelection};
pub use unit::{locate_units, UnitKind};
