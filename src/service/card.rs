use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::audit;
use super::validation::Violations;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Actor, AuditEvent, Card, Comment, List};

#[derive(Debug, Default, Clone)]
pub struct NewCard {
    pub list_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Option<Vec<String>>,
}

/// Fields a card update may change. `None` leaves the field as is.
#[derive(Debug, Default, Clone)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub labels: Option<Vec<String>>,
    pub list_id: Option<String>,
}

fn require_list(store: &dyn Store, list_id: &str) -> Result<List> {
    store.get_list(list_id)?.ok_or(Error::NotFound("List"))
}

fn require_card(store: &dyn Store, card_id: &str) -> Result<Card> {
    store.get_card(card_id)?.ok_or(Error::NotFound("Card"))
}

/// Creates a card in the given list. The card's board is the list's board.
pub fn create(store: &dyn Store, actor: &Actor, new: NewCard) -> Result<Card> {
    Violations::new()
        .require_text("listId", &new.list_id)
        .require_text("title", &new.title)
        .finish()?;

    let list = require_list(store, &new.list_id)?;

    let now = Utc::now();
    let card = Card {
        id: Uuid::new_v4().to_string(),
        list_id: list.id,
        board_id: list.board_id,
        title: new.title.trim().to_string(),
        description: new.description.unwrap_or_default(),
        position: 0,
        due_date: new.due_date,
        labels: new.labels.unwrap_or_default(),
        assigned_users: Vec::new(),
        comments: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    store.create_card(&card)?;

    audit::record(
        store,
        actor,
        Some(&card.board_id),
        Some(&card.id),
        AuditEvent::CardCreated {
            title: card.title.clone(),
            list_id: card.list_id.clone(),
        },
    );

    Ok(card)
}

pub fn update(store: &dyn Store, actor: &Actor, card_id: &str, patch: CardPatch) -> Result<Card> {
    Violations::new()
        .optional_text("title", patch.title.as_deref())
        .optional_text("listId", patch.list_id.as_deref())
        .finish()?;

    let mut card = require_card(store, card_id)?;
    let mut changed = Vec::new();

    if let Some(list_id) = patch.list_id {
        let list = require_list(store, &list_id)?;
        card.list_id = list.id;
        card.board_id = list.board_id;
        changed.push("listId");
    }
    if let Some(title) = patch.title {
        card.title = title.trim().to_string();
        changed.push("title");
    }
    if let Some(description) = patch.description {
        card.description = description;
        changed.push("description");
    }
    if let Some(due_date) = patch.due_date {
        card.due_date = due_date;
        changed.push("dueDate");
    }
    if let Some(labels) = patch.labels {
        card.labels = labels;
        changed.push("labels");
    }

    card.updated_at = Utc::now();
    store.update_card(&card)?;

    audit::record(
        store,
        actor,
        Some(&card.board_id),
        Some(&card.id),
        AuditEvent::CardUpdated {
            title: card.title.clone(),
            changed: changed.into_iter().map(str::to_string).collect(),
        },
    );

    Ok(card)
}

pub fn delete(store: &dyn Store, actor: &Actor, card_id: &str) -> Result<()> {
    let card = require_card(store, card_id)?;

    if !store.delete_card(&card.id)? {
        return Err(Error::NotFound("Card"));
    }

    audit::record(
        store,
        actor,
        Some(&card.board_id),
        Some(&card.id),
        AuditEvent::CardDeleted { title: card.title },
    );

    Ok(())
}

/// Places the card in `target_list_id` at `position`. Lists on other boards
/// are accepted and WIP limits are not enforced.
pub fn move_card(
    store: &dyn Store,
    actor: &Actor,
    card_id: &str,
    target_list_id: &str,
    position: i64,
) -> Result<Card> {
    Violations::new()
        .require_text("targetListId", target_list_id)
        .check(position >= 0, "position", "position must be a non-negative integer")
        .finish()?;

    let mut card = require_card(store, card_id)?;
    let target = require_list(store, target_list_id)?;
    let from_list_id = std::mem::replace(&mut card.list_id, target.id);

    card.board_id = target.board_id;
    card.position = position;
    card.updated_at = Utc::now();
    store.update_card(&card)?;

    tracing::debug!(card_id = %card.id, from = %from_list_id, to = %card.list_id, position, "Moved card");
    audit::record(
        store,
        actor,
        Some(&card.board_id),
        Some(&card.id),
        AuditEvent::CardMoved {
            from_list_id,
            target_list_id: card.list_id.clone(),
            position,
        },
    );

    Ok(card)
}

pub fn add_comment(store: &dyn Store, actor: &Actor, card_id: &str, text: &str) -> Result<Comment> {
    Violations::new().require_text("text", text).finish()?;

    let comment = Comment {
        user_id: actor.user_id.clone(),
        text: text.to_string(),
        created_at: Utc::now(),
    };
    let card = store
        .append_card_comment(card_id, &comment)?
        .ok_or(Error::NotFound("Card"))?;

    audit::record(
        store,
        actor,
        Some(&card.board_id),
        Some(&card.id),
        AuditEvent::CommentAdded {
            text: comment.text.clone(),
        },
    );

    Ok(comment)
}

/// Adds `member_id` to the card's assignees. Repeating the call leaves the
/// card unchanged but is still recorded.
pub fn assign_member(
    store: &dyn Store,
    actor: &Actor,
    card_id: &str,
    member_id: &str,
) -> Result<Card> {
    Violations::new().require_text("memberId", member_id).finish()?;

    let (card, added) = store
        .add_card_assignee(card_id, member_id)?
        .ok_or(Error::NotFound("Card"))?;

    audit::record(
        store,
        actor,
        Some(&card.board_id),
        Some(&card.id),
        AuditEvent::CardAssigned {
            member_id: member_id.to_string(),
            already_assigned: !added,
        },
    );

    Ok(card)
}
