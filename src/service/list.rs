use chrono::Utc;
use uuid::Uuid;

use super::audit;
use super::board::DEFAULT_WIP_LIMIT;
use super::validation::Violations;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Actor, AuditEvent, List};

/// Fields a list update may change. `None` leaves the field as is.
#[derive(Debug, Default, Clone)]
pub struct ListPatch {
    pub title: Option<String>,
    pub wip_limit: Option<i64>,
}

pub fn create(store: &dyn Store, actor: &Actor, board_id: &str, title: &str) -> Result<List> {
    Violations::new()
        .require_text("boardId", board_id)
        .require_text("title", title)
        .finish()?;

    let board = store.get_board(board_id)?.ok_or(Error::NotFound("Board"))?;

    let now = Utc::now();
    let list = List {
        id: Uuid::new_v4().to_string(),
        board_id: board.id,
        title: title.trim().to_string(),
        position: 0,
        wip_limit: DEFAULT_WIP_LIMIT,
        created_at: now,
        updated_at: now,
    };
    store.create_list(&list)?;

    audit::record(
        store,
        actor,
        Some(&list.board_id),
        Some(&list.id),
        AuditEvent::ListCreated {
            title: list.title.clone(),
        },
    );

    Ok(list)
}

pub fn update(store: &dyn Store, actor: &Actor, list_id: &str, patch: ListPatch) -> Result<List> {
    Violations::new()
        .optional_text("title", patch.title.as_deref())
        .check(
            patch.wip_limit.is_none_or(|limit| limit > 0),
            "wipLimit",
            "wipLimit must be a positive integer",
        )
        .finish()?;

    let mut list = store.get_list(list_id)?.ok_or(Error::NotFound("List"))?;

    if let Some(title) = patch.title {
        list.title = title.trim().to_string();
    }
    if let Some(wip_limit) = patch.wip_limit {
        list.wip_limit = wip_limit;
    }
    list.updated_at = Utc::now();
    store.update_list(&list)?;

    audit::record(
        store,
        actor,
        Some(&list.board_id),
        Some(&list.id),
        AuditEvent::ListUpdated {
            title: list.title.clone(),
            wip_limit: list.wip_limit,
        },
    );

    Ok(list)
}

/// Deletes the list and every card in it.
pub fn delete(store: &dyn Store, actor: &Actor, list_id: &str) -> Result<()> {
    let list = store.get_list(list_id)?.ok_or(Error::NotFound("List"))?;
    let cards_removed = store.delete_list(&list.id)?.ok_or(Error::NotFound("List"))?;

    audit::record(
        store,
        actor,
        Some(&list.board_id),
        Some(&list.id),
        AuditEvent::ListDeleted {
            title: list.title,
            cards_removed,
        },
    );

    Ok(())
}
