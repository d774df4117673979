//! Pure in-memory domain logic for the back-office tree editors.
//!
//! This crate has **zero I/O**: every function operates on values handed
//! in by the session layer and returns new or mutated values. The two
//! centerpieces are:
//!
//! - [`reconcile`] — drag-and-drop reconciliation over the arena-backed
//!   menu forest (extract, insert, cycle-checked move).
//! - [`permission`] — the role permission propagator (cascade a flag
//!   down a subtree, re-aggregate ancestors as the OR of their children).
//!
//! [`tree_diff`] turns an edited forest plus its baseline snapshot into
//! the minimal change-set the persistence sink accepts, and [`role`]
//! carries the role editor's categories, grant shapes, and changed-only
//! submit collection.

pub mod error;
pub mod forest;
pub mod menu;
pub mod permission;
pub mod reconcile;
pub mod role;
pub mod tree_diff;
pub mod types;

pub use error::CoreError;
pub use types::{DbId, Timestamp};
