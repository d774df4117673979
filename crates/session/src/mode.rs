//! Editor mode, the single piece of session state that survives a
//! session.
//!
//! The serialization boundary is deliberately this narrow: the host
//! stores the bare mode string and nothing else. Bulk tree data is
//! always refetched from the source on mount, so a stale persisted copy
//! can never shadow the remote state.

use serde::{Deserialize, Serialize};

/// How the next detail page opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    View,
    Edit,
}

impl EditorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
        }
    }
}

/// Serialize the mode for the host's small-value store.
pub fn persist_mode(mode: EditorMode) -> String {
    mode.as_str().to_owned()
}

/// Restore a persisted mode string. Unknown values (including anything
/// written by an older build) restore to `None` rather than guessing.
pub fn restore_mode(raw: &str) -> Option<EditorMode> {
    match raw {
        "view" => Some(EditorMode::View),
        "edit" => Some(EditorMode::Edit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_round_trips() {
        for mode in [EditorMode::View, EditorMode::Edit] {
            assert_eq!(restore_mode(&persist_mode(mode)), Some(mode));
        }
    }

    #[test]
    fn unknown_persisted_value_restores_to_none() {
        assert_eq!(restore_mode(""), None);
        assert_eq!(restore_mode("reorder"), None);
        assert_eq!(restore_mode("VIEW"), None);
    }

    #[test]
    fn serde_matches_persisted_strings() {
        let json = serde_json::to_string(&EditorMode::Edit).unwrap();
        assert_eq!(json, "\"edit\"");
    }
}
