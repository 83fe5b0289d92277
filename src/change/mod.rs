//! Causes, changers and the changes between them.
//!
//! A [`Cause`] (detected issue or user intent) is handed to the first
//! [`Changer`] that accepts it, giving a [`Change`]. The change is validated,
//! performed into [`Delta`]s and, if still valid, committed by the engine.

pub mod cause;
pub mod change;
pub mod changer;
pub mod detector;
pub mod errors;

pub use cause::{Cause, CauseName, EditIntent, Issue};
pub use change::{Change, ChangeState, Delta};
pub use changer::{Changer, Parameters, Rewrite};
pub use detector::IssueDetector;
pub use errors::ChangeError;
