use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use serde::de::DeserializeOwned;

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

const USER_COLUMNS: &str = "id, email, name, profile_pic, created_at, updated_at";
const TOKEN_COLUMNS: &str =
    "id, token_hash, token_lookup, is_admin, user_id, created_at, expires_at, last_used_at";
const BOARD_COLUMNS: &str = "id, title, background, owner_id, created_at, updated_at";
const LIST_COLUMNS: &str = "id, board_id, title, position, wip_limit, created_at, updated_at";
const CARD_COLUMNS: &str = "id, list_id, board_id, title, description, position, due_date, \
                            labels, assigned_users, comments, created_at, updated_at";
const AUDIT_COLUMNS: &str = "id, action, user_id, user_name, board_id, target_id, details, timestamp";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

/// Fixed-width so that lexical order in SQL matches chronological order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        profile_pic: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn row_to_token(row: &Row<'_>) -> rusqlite::Result<Token> {
    Ok(Token {
        id: row.get(0)?,
        token_hash: row.get(1)?,
        token_lookup: row.get(2)?,
        is_admin: row.get(3)?,
        user_id: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        expires_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
        last_used_at: row.get::<_, Option<String>>(7)?.map(|s| parse_datetime(&s)),
    })
}

/// Members are filled in separately by `load_members`.
fn row_to_board(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        title: row.get(1)?,
        background: row.get(2)?,
        owner_id: row.get(3)?,
        members: Vec::new(),
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn row_to_list(row: &Row<'_>) -> rusqlite::Result<List> {
    Ok(List {
        id: row.get(0)?,
        board_id: row.get(1)?,
        title: row.get(2)?,
        position: row.get(3)?,
        wip_limit: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn row_to_card(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        list_id: row.get(1)?,
        board_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        position: row.get(5)?,
        due_date: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
        labels: json_column(row, 7)?,
        assigned_users: json_column(row, 8)?,
        comments: json_column(row, 9)?,
        created_at: parse_datetime(&row.get::<_, String>(10)?),
        updated_at: parse_datetime(&row.get::<_, String>(11)?),
    })
}

fn row_to_audit_log(row: &Row<'_>) -> rusqlite::Result<AuditLog> {
    let action: String = row.get(1)?;
    let details: String = row.get(6)?;
    let event = AuditEvent::from_columns(&action, &details)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    Ok(AuditLog {
        id: row.get(0)?,
        user_id: row.get(2)?,
        user_name: row.get(3)?,
        board_id: row.get(4)?,
        target_id: row.get(5)?,
        event,
        timestamp: parse_datetime(&row.get::<_, String>(7)?),
    })
}

fn get_card_in(conn: &Connection, id: &str) -> Result<Option<Card>> {
    conn.query_row(
        &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"),
        params![id],
        row_to_card,
    )
    .optional()
    .map_err(Error::from)
}

fn load_members(conn: &Connection, board_id: &str) -> Result<Vec<BoardMember>> {
    let mut stmt =
        conn.prepare("SELECT user_id, role FROM board_members WHERE board_id = ?1 ORDER BY rowid")?;

    let rows = stmt.query_map(params![board_id], |row| {
        let role: String = row.get(1)?;
        Ok(BoardMember {
            user_id: row.get(0)?,
            role: role
                .parse()
                .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into()))?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

fn query_boards(conn: &Connection, sql: &str, user_id: &str) -> Result<Vec<Board>> {
    let mut stmt = conn.prepare(sql)?;
    let boards = stmt
        .query_map(params![user_id], row_to_board)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    boards
        .into_iter()
        .map(|mut board| {
            board.members = load_members(conn, &board.id)?;
            Ok(board)
        })
        .collect()
}

fn insert_list(conn: &Connection, list: &List) -> Result<()> {
    conn.execute(
        "INSERT INTO lists (id, board_id, title, position, wip_limit, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            list.id,
            list.board_id,
            list.title,
            list.position,
            list.wip_limit,
            format_datetime(&list.created_at),
            format_datetime(&list.updated_at),
        ],
    )?;
    Ok(())
}

fn write_card_documents(conn: &Connection, card: &Card) -> Result<()> {
    conn.execute(
        "UPDATE cards SET assigned_users = ?1, comments = ?2, updated_at = ?3 WHERE id = ?4",
        params![
            serde_json::to_string(&card.assigned_users)?,
            serde_json::to_string(&card.comments)?,
            format_datetime(&card.updated_at),
            card.id,
        ],
    )?;
    Ok(())
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (id, email, name, profile_pic, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.email,
                user.name,
                user.profile_pic,
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                row_to_user,
            )
            .optional()
            .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                row_to_user,
            )
            .optional()
            .map_err(Error::from)
    }

    fn get_users(&self, ids: &[String]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id IN ({placeholders})"
        ))?;

        let rows = stmt.query_map(params_from_iter(ids.iter()), row_to_user)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id > ?1 ORDER BY id LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], row_to_user)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn search_users(&self, query: &str, limit: i32) -> Result<Vec<User>> {
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE name LIKE ?1 ESCAPE '\\' OR email LIKE ?1 ESCAPE '\\'
             ORDER BY name LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![pattern, limit], row_to_user)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "UPDATE users SET email = ?1, name = ?2, profile_pic = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                user.email,
                user.name,
                user.profile_pic,
                format_datetime(&user.updated_at),
                user.id
            ],
        );

        match result {
            Ok(0) => Err(Error::NotFound("User")),
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, is_admin, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.is_admin,
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::TokenLookupCollision),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_id(&self, id: &str) -> Result<Option<Token>> {
        self.conn()
            .query_row(
                &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE id = ?1"),
                params![id],
                row_to_token,
            )
            .optional()
            .map_err(Error::from)
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        self.conn()
            .query_row(
                &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE token_lookup = ?1"),
                params![lookup],
                row_to_token,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_user_tokens(&self, user_id: &str) -> Result<Vec<Token>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens WHERE user_id = ?1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![user_id], row_to_token)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_token(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tokens WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    // Board operations

    fn create_board(&self, board: &Board, lists: &[List]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO boards (id, title, background, owner_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                board.id,
                board.title,
                board.background,
                board.owner_id,
                format_datetime(&board.created_at),
                format_datetime(&board.updated_at),
            ],
        )?;

        for member in &board.members {
            tx.execute(
                "INSERT INTO board_members (board_id, user_id, role) VALUES (?1, ?2, ?3)",
                params![board.id, member.user_id, member.role.as_str()],
            )?;
        }

        for list in lists {
            insert_list(&tx, list)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_board(&self, id: &str) -> Result<Option<Board>> {
        let conn = self.conn();
        let board = conn
            .query_row(
                &format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = ?1"),
                params![id],
                row_to_board,
            )
            .optional()?;

        match board {
            Some(mut board) => {
                board.members = load_members(&conn, &board.id)?;
                Ok(Some(board))
            }
            None => Ok(None),
        }
    }

    fn list_owned_boards(&self, owner_id: &str) -> Result<Vec<Board>> {
        query_boards(
            &self.conn(),
            &format!("SELECT {BOARD_COLUMNS} FROM boards WHERE owner_id = ?1 ORDER BY created_at"),
            owner_id,
        )
    }

    fn list_shared_boards(&self, user_id: &str) -> Result<Vec<Board>> {
        query_boards(
            &self.conn(),
            &format!(
                "SELECT {BOARD_COLUMNS} FROM boards
                 WHERE owner_id != ?1
                   AND id IN (SELECT board_id FROM board_members WHERE user_id = ?1)
                 ORDER BY created_at"
            ),
            user_id,
        )
    }

    fn list_visible_boards(&self, user_id: &str) -> Result<Vec<Board>> {
        query_boards(
            &self.conn(),
            &format!(
                "SELECT {BOARD_COLUMNS} FROM boards
                 WHERE owner_id = ?1
                    OR id IN (SELECT board_id FROM board_members WHERE user_id = ?1)
                 ORDER BY created_at"
            ),
            user_id,
        )
    }

    fn add_board_member(&self, board_id: &str, member: &BoardMember) -> Result<()> {
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO board_members (board_id, user_id, role) VALUES (?1, ?2, ?3)",
            params![board_id, member.user_id, member.role.as_str()],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => return Err(Error::AlreadyExists),
            Err(e) => return Err(Error::from(e)),
        }

        conn.execute(
            "UPDATE boards SET updated_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), board_id],
        )?;
        Ok(())
    }

    fn delete_board(&self, id: &str) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM cards
             WHERE board_id = ?1 OR list_id IN (SELECT id FROM lists WHERE board_id = ?1)",
            params![id],
        )?;
        tx.execute("DELETE FROM lists WHERE board_id = ?1", params![id])?;
        tx.execute("DELETE FROM board_members WHERE board_id = ?1", params![id])?;
        let rows = tx.execute("DELETE FROM boards WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(rows > 0)
    }

    // List operations

    fn create_list(&self, list: &List) -> Result<()> {
        insert_list(&self.conn(), list)
    }

    fn get_list(&self, id: &str) -> Result<Option<List>> {
        self.conn()
            .query_row(
                &format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ?1"),
                params![id],
                row_to_list,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_board_lists(&self, board_id: &str) -> Result<Vec<List>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {LIST_COLUMNS} FROM lists WHERE board_id = ?1 ORDER BY position, rowid"
        ))?;

        let rows = stmt.query_map(params![board_id], row_to_list)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_list(&self, list: &List) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE lists SET title = ?1, position = ?2, wip_limit = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                list.title,
                list.position,
                list.wip_limit,
                format_datetime(&list.updated_at),
                list.id
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound("List"));
        }
        Ok(())
    }

    fn delete_list(&self, id: &str) -> Result<Option<usize>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let cards = tx.execute("DELETE FROM cards WHERE list_id = ?1", params![id])?;
        let rows = tx.execute("DELETE FROM lists WHERE id = ?1", params![id])?;

        if rows == 0 {
            // Nothing to cascade from; leave any stray cards untouched.
            tx.rollback()?;
            return Ok(None);
        }

        tx.commit()?;
        Ok(Some(cards))
    }

    // Card operations

    fn create_card(&self, card: &Card) -> Result<()> {
        self.conn().execute(
            "INSERT INTO cards (id, list_id, board_id, title, description, position, due_date,
                                labels, assigned_users, comments, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                card.id,
                card.list_id,
                card.board_id,
                card.title,
                card.description,
                card.position,
                card.due_date.as_ref().map(format_datetime),
                serde_json::to_string(&card.labels)?,
                serde_json::to_string(&card.assigned_users)?,
                serde_json::to_string(&card.comments)?,
                format_datetime(&card.created_at),
                format_datetime(&card.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_card(&self, id: &str) -> Result<Option<Card>> {
        get_card_in(&self.conn(), id)
    }

    fn list_list_cards(&self, list_id: &str) -> Result<Vec<Card>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE list_id = ?1 ORDER BY position, rowid"
        ))?;

        let rows = stmt.query_map(params![list_id], row_to_card)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_card(&self, card: &Card) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE cards SET list_id = ?1, board_id = ?2, title = ?3, description = ?4,
                              position = ?5, due_date = ?6, labels = ?7, assigned_users = ?8,
                              comments = ?9, updated_at = ?10
             WHERE id = ?11",
            params![
                card.list_id,
                card.board_id,
                card.title,
                card.description,
                card.position,
                card.due_date.as_ref().map(format_datetime),
                serde_json::to_string(&card.labels)?,
                serde_json::to_string(&card.assigned_users)?,
                serde_json::to_string(&card.comments)?,
                format_datetime(&card.updated_at),
                card.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound("Card"));
        }
        Ok(())
    }

    fn delete_card(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM cards WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn append_card_comment(&self, card_id: &str, comment: &Comment) -> Result<Option<Card>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let Some(mut card) = get_card_in(&tx, card_id)? else {
            return Ok(None);
        };

        card.comments.push(comment.clone());
        card.updated_at = Utc::now();
        write_card_documents(&tx, &card)?;

        tx.commit()?;
        Ok(Some(card))
    }

    fn add_card_assignee(&self, card_id: &str, user_id: &str) -> Result<Option<(Card, bool)>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let Some(mut card) = get_card_in(&tx, card_id)? else {
            return Ok(None);
        };

        if card.assigned_users.iter().any(|u| u == user_id) {
            return Ok(Some((card, false)));
        }

        card.assigned_users.push(user_id.to_string());
        card.updated_at = Utc::now();
        write_card_documents(&tx, &card)?;

        tx.commit()?;
        Ok(Some((card, true)))
    }

    // Audit operations

    fn append_audit_log(&self, log: &AuditLog) -> Result<()> {
        let (action, details) = log.event.to_columns()?;

        self.conn().execute(
            "INSERT INTO audit_logs (id, action, user_id, user_name, board_id, target_id, details, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                log.id,
                action,
                log.user_id,
                log.user_name,
                log.board_id,
                log.target_id,
                details,
                format_datetime(&log.timestamp),
            ],
        )?;
        Ok(())
    }

    fn list_board_audit_logs(&self, board_id: &str, limit: Option<i32>) -> Result<Vec<AuditLog>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs
             WHERE board_id = ?1
             ORDER BY timestamp DESC, rowid DESC
             LIMIT ?2"
        ))?;

        // SQLite treats a negative LIMIT as unbounded.
        let rows = stmt.query_map(params![board_id, limit.unwrap_or(-1)], row_to_audit_log)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn has_admin_token(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM tokens WHERE is_admin = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn user(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
            name: id.to_uppercase(),
            profile_pic: DEFAULT_IMAGE.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn board(id: &str, owner: &str) -> Board {
        Board {
            id: id.to_string(),
            title: format!("Board {id}"),
            background: DEFAULT_IMAGE.to_string(),
            owner_id: owner.to_string(),
            members: vec![BoardMember {
                user_id: owner.to_string(),
                role: Role::Admin,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn list(id: &str, board_id: &str, position: i64) -> List {
        List {
            id: id.to_string(),
            board_id: board_id.to_string(),
            title: id.to_string(),
            position,
            wip_limit: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn card(id: &str, list_id: &str, board_id: &str, position: i64) -> Card {
        Card {
            id: id.to_string(),
            list_id: list_id.to_string(),
            board_id: board_id.to_string(),
            title: id.to_string(),
            description: String::new(),
            position,
            due_date: None,
            labels: vec!["bug".to_string()],
            assigned_users: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_initialize_creates_tables() {
        let (_temp, store) = open_store();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for table in [
            "users",
            "tokens",
            "boards",
            "board_members",
            "lists",
            "cards",
            "audit_logs",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    #[test]
    fn test_user_email_is_unique() {
        let (_temp, store) = open_store();

        store.create_user(&user("u1", "a@example.com")).unwrap();
        let result = store.create_user(&user("u2", "a@example.com"));
        assert!(matches!(result, Err(Error::AlreadyExists)));

        let fetched = store.get_user_by_email("a@example.com").unwrap().unwrap();
        assert_eq!(fetched.id, "u1");
    }

    #[test]
    fn test_search_users_matches_name_and_email() {
        let (_temp, store) = open_store();
        store.create_user(&user("alice", "alice@example.com")).unwrap();
        store.create_user(&user("bob", "bob@corp.test")).unwrap();

        let hits = store.search_users("CORP", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "bob");

        let hits = store.search_users("ali", 10).unwrap();
        assert_eq!(hits.len(), 1);

        assert!(store.search_users("%", 10).unwrap().is_empty());
    }

    #[test]
    fn test_create_board_writes_members_and_lists() {
        let (_temp, store) = open_store();

        let b = board("b1", "u1");
        let lists = [list("l0", "b1", 0), list("l1", "b1", 1), list("l2", "b1", 2)];
        store.create_board(&b, &lists).unwrap();

        let fetched = store.get_board("b1").unwrap().unwrap();
        assert_eq!(fetched.members.len(), 1);
        assert_eq!(fetched.members[0].role, Role::Admin);

        let ids: Vec<_> = store
            .list_board_lists("b1")
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["l0", "l1", "l2"]);
    }

    #[test]
    fn test_create_board_is_atomic() {
        let (_temp, store) = open_store();

        // Duplicate list ids make the third insert fail.
        let b = board("b1", "u1");
        let lists = [list("l0", "b1", 0), list("l1", "b1", 1), list("l0", "b1", 2)];
        assert!(store.create_board(&b, &lists).is_err());

        assert!(store.get_board("b1").unwrap().is_none());
        assert!(store.list_board_lists("b1").unwrap().is_empty());
    }

    #[test]
    fn test_add_board_member_rejects_duplicates() {
        let (_temp, store) = open_store();
        store.create_board(&board("b1", "u1"), &[]).unwrap();

        let member = BoardMember {
            user_id: "u2".to_string(),
            role: Role::Member,
        };
        store.add_board_member("b1", &member).unwrap();
        let result = store.add_board_member("b1", &member);
        assert!(matches!(result, Err(Error::AlreadyExists)));

        let fetched = store.get_board("b1").unwrap().unwrap();
        let ids: Vec<_> = fetched.members.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
    }

    #[test]
    fn test_owned_shared_and_visible_boards() {
        let (_temp, store) = open_store();
        store.create_board(&board("b1", "u1"), &[]).unwrap();
        store.create_board(&board("b2", "u2"), &[]).unwrap();
        store
            .add_board_member(
                "b2",
                &BoardMember {
                    user_id: "u1".to_string(),
                    role: Role::Member,
                },
            )
            .unwrap();

        let owned: Vec<_> = store.list_owned_boards("u1").unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, "b1");

        let shared = store.list_shared_boards("u1").unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].id, "b2");
        assert_eq!(shared[0].members.len(), 2);

        assert_eq!(store.list_visible_boards("u1").unwrap().len(), 2);
        assert_eq!(store.list_visible_boards("u2").unwrap().len(), 1);
    }

    #[test]
    fn test_delete_board_cascades() {
        let (_temp, store) = open_store();
        store
            .create_board(&board("b1", "u1"), &[list("l1", "b1", 0)])
            .unwrap();
        store
            .create_board(&board("b2", "u1"), &[list("l2", "b2", 0)])
            .unwrap();
        store.create_card(&card("c1", "l1", "b1", 0)).unwrap();
        // Stale board ref, but its list belongs to b1.
        store.create_card(&card("c2", "l1", "other", 1)).unwrap();
        store.create_card(&card("c3", "l2", "b2", 0)).unwrap();

        assert!(store.delete_board("b1").unwrap());

        assert!(store.get_board("b1").unwrap().is_none());
        assert!(store.get_list("l1").unwrap().is_none());
        assert!(store.get_card("c1").unwrap().is_none());
        assert!(store.get_card("c2").unwrap().is_none());
        assert!(store.get_card("c3").unwrap().is_some());
        assert!(!store.delete_board("b1").unwrap());
    }

    #[test]
    fn test_delete_list_cascades_to_its_cards_only() {
        let (_temp, store) = open_store();
        store
            .create_board(&board("b1", "u1"), &[list("l1", "b1", 0), list("l2", "b1", 1)])
            .unwrap();
        store.create_card(&card("c1", "l1", "b1", 0)).unwrap();
        store.create_card(&card("c2", "l1", "b1", 1)).unwrap();
        store.create_card(&card("c3", "l2", "b1", 0)).unwrap();

        assert_eq!(store.delete_list("l1").unwrap(), Some(2));
        assert!(store.list_list_cards("l1").unwrap().is_empty());
        assert_eq!(store.list_list_cards("l2").unwrap().len(), 1);
        assert_eq!(store.delete_list("l1").unwrap(), None);
    }

    #[test]
    fn test_card_documents_round_trip() {
        let (_temp, store) = open_store();
        let mut c = card("c1", "l1", "b1", 0);
        c.due_date = Some(Utc::now());
        store.create_card(&c).unwrap();

        let comment = Comment {
            user_id: "u1".to_string(),
            text: "looks good".to_string(),
            created_at: Utc::now(),
        };
        let updated = store.append_card_comment("c1", &comment).unwrap().unwrap();
        assert_eq!(updated.comments.len(), 1);

        let (_, changed) = store.add_card_assignee("c1", "u2").unwrap().unwrap();
        assert!(changed);
        let (_, changed) = store.add_card_assignee("c1", "u2").unwrap().unwrap();
        assert!(!changed);

        let fetched = store.get_card("c1").unwrap().unwrap();
        assert_eq!(fetched.labels, vec!["bug"]);
        assert_eq!(fetched.assigned_users, vec!["u2"]);
        assert_eq!(fetched.comments[0].text, "looks good");
        assert!(fetched.due_date.is_some());

        assert!(store.append_card_comment("missing", &comment).unwrap().is_none());
        assert!(store.add_card_assignee("missing", "u2").unwrap().is_none());
    }

    #[test]
    fn test_cards_order_by_position_then_insertion() {
        let (_temp, store) = open_store();
        store.create_card(&card("c-late", "l1", "b1", 1)).unwrap();
        store.create_card(&card("c-first", "l1", "b1", 0)).unwrap();
        store.create_card(&card("c-second", "l1", "b1", 0)).unwrap();

        let ids: Vec<_> = store
            .list_list_cards("l1")
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["c-first", "c-second", "c-late"]);
    }

    #[test]
    fn test_audit_logs_newest_first_with_limit() {
        let (_temp, store) = open_store();
        let base = Utc::now();

        for (i, title) in ["a", "b", "c"].iter().enumerate() {
            store
                .append_audit_log(&AuditLog {
                    id: format!("log-{i}"),
                    user_id: "u1".to_string(),
                    user_name: "U1".to_string(),
                    board_id: Some("b1".to_string()),
                    target_id: None,
                    event: AuditEvent::ListCreated {
                        title: title.to_string(),
                    },
                    timestamp: base + chrono::Duration::seconds(i as i64),
                })
                .unwrap();
        }

        let all = store.list_board_audit_logs("b1", None).unwrap();
        let ids: Vec<_> = all.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["log-2", "log-1", "log-0"]);

        let recent = store.list_board_audit_logs("b1", Some(2)).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(
            recent[0].event,
            AuditEvent::ListCreated {
                title: "c".to_string()
            }
        );

        assert!(store.list_board_audit_logs("b2", None).unwrap().is_empty());
    }

    #[test]
    fn test_token_lookup_collision() {
        let (_temp, store) = open_store();

        let token1 = Token {
            id: "token-1".to_string(),
            token_hash: "hash1".to_string(),
            token_lookup: "lookup12".to_string(),
            is_admin: true,
            user_id: None,
            created_at: Utc::now(),
            expires_at: None,
            last_used_at: None,
        };
        store.create_token(&token1).unwrap();

        let token2 = Token {
            id: "token-2".to_string(),
            token_hash: "hash2".to_string(),
            ..token1.clone()
        };

        let result = store.create_token(&token2);
        assert!(matches!(result, Err(Error::TokenLookupCollision)));
        assert!(store.has_admin_token().unwrap());
    }
}
