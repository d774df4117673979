//! Session-scoped state for the back-office tree editors.
//!
//! Two editors live here, one per screen:
//!
//! - [`MenuEditor`] — the drag-and-drop menu tree screen: baseline +
//!   working forest, expansion set, pending delete marks, and the
//!   load → edit → save lifecycle.
//! - [`RoleEditor`] — the role screen: form fields plus the service and
//!   menu permission trees, with changed-only submission.
//!
//! All I/O goes through the collaborator traits in [`source`]; the
//! editors themselves only orchestrate `backoffice_core` operations over
//! in-memory values. [`mode`] is the one sliver of state a host may
//! persist across sessions.

pub mod menus;
pub mod mode;
pub mod roles;
pub mod source;

pub use menus::{MenuEditor, SaveOutcome};
pub use mode::EditorMode;
pub use roles::RoleEditor;
pub use source::{ChangeSink, MenuQuery, MenuSource, RoleSink, RoleSource};
