use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use super::Directory;
use crate::error::Result;
use crate::store::Store;
use crate::types::{Actor, AuditEvent, AuditLog, AuditLogView};

/// Appends one audit entry. Failures are logged and swallowed so the
/// mutation that triggered them still succeeds.
pub fn record(
    store: &dyn Store,
    actor: &Actor,
    board_id: Option<&str>,
    target_id: Option<&str>,
    event: AuditEvent,
) {
    let log = AuditLog {
        id: Uuid::new_v4().to_string(),
        user_id: actor.user_id.clone(),
        user_name: actor.user_name.clone(),
        board_id: board_id.map(str::to_string),
        target_id: target_id.map(str::to_string),
        event,
        timestamp: Utc::now(),
    };

    if let Err(e) = store.append_audit_log(&log) {
        tracing::warn!(
            action = log.event.action(),
            board_id = ?log.board_id,
            "Failed to record audit entry: {e}"
        );
    }
}

fn resolve(store: &dyn Store, logs: Vec<AuditLog>) -> Result<Vec<AuditLogView>> {
    let directory = Directory::load(store, logs.iter().map(|l| l.user_id.as_str()))?;

    Ok(logs
        .into_iter()
        .map(|log| AuditLogView {
            user: directory.summary(&log.user_id),
            log,
        })
        .collect())
}

/// Every entry for a board, newest first. Entries outlive the board.
pub fn board_history(store: &dyn Store, board_id: &str) -> Result<Vec<AuditLogView>> {
    let logs = store.list_board_audit_logs(board_id, None)?;
    resolve(store, logs)
}

/// The `per_board` newest entries of every board the user owns or belongs to,
/// keyed by board id.
pub fn recent_activity(
    store: &dyn Store,
    user_id: &str,
    per_board: usize,
) -> Result<BTreeMap<String, Vec<AuditLogView>>> {
    let limit = i32::try_from(per_board).unwrap_or(i32::MAX);
    let mut activity = BTreeMap::new();

    for board in store.list_visible_boards(user_id)? {
        let logs = store.list_board_audit_logs(&board.id, Some(limit))?;
        activity.insert(board.id, resolve(store, logs)?);
    }

    Ok(activity)
}
