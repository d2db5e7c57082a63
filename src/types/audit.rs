use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// What happened, with a payload shaped per action.
///
/// Serialized adjacently tagged so the wire and storage form is
/// `{"action": "CARD_MOVED", "details": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "action",
    content = "details",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum AuditEvent {
    BoardCreated {
        title: String,
    },
    BoardDeleted {
        title: String,
    },
    MemberAdded {
        email: String,
    },
    ListCreated {
        title: String,
    },
    ListUpdated {
        title: String,
        wip_limit: i64,
    },
    ListDeleted {
        title: String,
        cards_removed: usize,
    },
    CardCreated {
        title: String,
        list_id: String,
    },
    CardUpdated {
        title: String,
        changed: Vec<String>,
    },
    CardDeleted {
        title: String,
    },
    CardMoved {
        from_list_id: String,
        target_list_id: String,
        position: i64,
    },
    CommentAdded {
        text: String,
    },
    CardAssigned {
        member_id: String,
        already_assigned: bool,
    },
}

impl AuditEvent {
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            AuditEvent::BoardCreated { .. } => "BOARD_CREATED",
            AuditEvent::BoardDeleted { .. } => "BOARD_DELETED",
            AuditEvent::MemberAdded { .. } => "MEMBER_ADDED",
            AuditEvent::ListCreated { .. } => "LIST_CREATED",
            AuditEvent::ListUpdated { .. } => "LIST_UPDATED",
            AuditEvent::ListDeleted { .. } => "LIST_DELETED",
            AuditEvent::CardCreated { .. } => "CARD_CREATED",
            AuditEvent::CardUpdated { .. } => "CARD_UPDATED",
            AuditEvent::CardDeleted { .. } => "CARD_DELETED",
            AuditEvent::CardMoved { .. } => "CARD_MOVED",
            AuditEvent::CommentAdded { .. } => "COMMENT_ADDED",
            AuditEvent::CardAssigned { .. } => "CARD_ASSIGNED",
        }
    }

    /// Splits the event into its stored columns: the action tag and the
    /// JSON-encoded details object.
    pub fn to_columns(&self) -> Result<(&'static str, String)> {
        let mut value = serde_json::to_value(self)?;
        let details = value
            .get_mut("details")
            .map(Value::take)
            .unwrap_or(Value::Null);
        Ok((self.action(), serde_json::to_string(&details)?))
    }

    /// Rebuilds an event from its stored columns.
    pub fn from_columns(action: &str, details: &str) -> Result<Self> {
        let details: Value = serde_json::from_str(details)?;
        let value = serde_json::json!({ "action": action, "details": details });
        Ok(serde_json::from_value(value)?)
    }
}
