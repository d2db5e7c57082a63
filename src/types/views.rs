//! Read models: records with their user references resolved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AuditLog, List, Role, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_pic: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            profile_pic: user.profile_pic.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    #[serde(flatten)]
    pub user: UserSummary,
    pub role: Role,
}

/// A board as shown on the dashboard: no lists, members resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub id: String,
    pub title: String,
    pub background: String,
    pub owner_id: String,
    pub members: Vec<MemberView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The full board aggregate: board, ordered lists, ordered cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub id: String,
    pub title: String,
    pub background: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserSummary>,
    pub members: Vec<MemberView>,
    pub lists: Vec<ListView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoardView {
    #[must_use]
    pub fn list(&self, list_id: &str) -> Option<&ListView> {
        self.lists.iter().find(|l| l.list.id == list_id)
    }

    /// Returns the list holding `card_id` together with the card.
    #[must_use]
    pub fn find_card(&self, card_id: &str) -> Option<(&ListView, &CardView)> {
        self.lists.iter().find_map(|list| {
            list.cards
                .iter()
                .find(|c| c.id == card_id)
                .map(|card| (list, card))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    #[serde(flatten)]
    pub list: List,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: String,
    pub list_id: String,
    pub board_id: String,
    pub title: String,
    pub description: String,
    pub position: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
    pub assigned_users: Vec<UserSummary>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    /// `None` when the author no longer exists.
    pub user: Option<UserSummary>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogView {
    #[serde(flatten)]
    pub log: AuditLog,
    pub user: Option<UserSummary>,
}
