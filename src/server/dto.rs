use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::service::card::{CardPatch, NewCard};
use crate::service::list::ListPatch;
use crate::types::{Board, List, Token};

// Required string fields default to empty so that a missing field is
// reported by validation with the field name instead of as a parse error.

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_pic: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserTokenRequest {
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateTokenResponse {
    pub token: String,
    pub metadata: Token,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub background: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateBoardResponse {
    pub board: Board,
    pub lists: Vec<List>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    #[serde(default)]
    pub board_id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub wip_limit: Option<i64>,
}

impl From<UpdateListRequest> for ListPatch {
    fn from(req: UpdateListRequest) -> Self {
        Self {
            title: req.title,
            wip_limit: req.wip_limit,
        }
    }
}

/// A `board` field may be sent by older clients; it is ignored in favour of
/// the list's own board.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    #[serde(default)]
    pub list_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

impl From<CreateCardRequest> for NewCard {
    fn from(req: CreateCardRequest) -> Self {
        Self {
            list_id: req.list_id,
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            labels: req.labels,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Absent keeps the due date, `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub list_id: Option<String>,
}

impl From<UpdateCardRequest> for CardPatch {
    fn from(req: UpdateCardRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            labels: req.labels,
            list_id: req.list_id,
        }
    }
}

// Only runs when the field is present, so a `null` becomes `Some(None)`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    #[serde(default)]
    pub target_list_id: String,
    /// Missing is treated as invalid rather than as the top of the list.
    #[serde(default = "missing_position")]
    pub position: i64,
}

fn missing_position() -> i64 {
    -1
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignMemberRequest {
    #[serde(default)]
    pub member_id: String,
}
