mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Every operation touches a single record unless documented otherwise.
/// Board creation and the cascading deletes run inside one transaction.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Fetches the users that exist among `ids`, in no particular order.
    fn get_users(&self, ids: &[String]) -> Result<Vec<User>>;
    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>>;
    /// Case-insensitive substring match on name or email.
    fn search_users(&self, query: &str, limit: i32) -> Result<Vec<User>>;
    fn update_user(&self, user: &User) -> Result<()>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_id(&self, id: &str) -> Result<Option<Token>>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn list_user_tokens(&self, user_id: &str) -> Result<Vec<Token>>;
    fn delete_token(&self, id: &str) -> Result<bool>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;

    // Board operations
    /// Writes the board, its members and its initial lists atomically.
    fn create_board(&self, board: &Board, lists: &[List]) -> Result<()>;
    fn get_board(&self, id: &str) -> Result<Option<Board>>;
    fn list_owned_boards(&self, owner_id: &str) -> Result<Vec<Board>>;
    /// Boards where the user is a member but not the owner.
    fn list_shared_boards(&self, user_id: &str) -> Result<Vec<Board>>;
    /// Boards where the user is the owner or a member.
    fn list_visible_boards(&self, user_id: &str) -> Result<Vec<Board>>;
    /// Fails with `AlreadyExists` if the user is already a member.
    fn add_board_member(&self, board_id: &str, member: &BoardMember) -> Result<()>;
    /// Deletes the board with its lists, cards and memberships.
    fn delete_board(&self, id: &str) -> Result<bool>;

    // List operations
    fn create_list(&self, list: &List) -> Result<()>;
    fn get_list(&self, id: &str) -> Result<Option<List>>;
    fn list_board_lists(&self, board_id: &str) -> Result<Vec<List>>;
    fn update_list(&self, list: &List) -> Result<()>;
    /// Deletes the list and its cards. Returns the number of cards removed,
    /// or `None` if the list did not exist.
    fn delete_list(&self, id: &str) -> Result<Option<usize>>;

    // Card operations
    fn create_card(&self, card: &Card) -> Result<()>;
    fn get_card(&self, id: &str) -> Result<Option<Card>>;
    fn list_list_cards(&self, list_id: &str) -> Result<Vec<Card>>;
    fn update_card(&self, card: &Card) -> Result<()>;
    fn delete_card(&self, id: &str) -> Result<bool>;
    /// Appends a comment in place. Returns the updated card, `None` if absent.
    fn append_card_comment(&self, card_id: &str, comment: &Comment) -> Result<Option<Card>>;
    /// Adds an assignee unless already present. Returns the card and whether
    /// it changed, `None` if absent.
    fn add_card_assignee(&self, card_id: &str, user_id: &str) -> Result<Option<(Card, bool)>>;

    // Audit operations
    fn append_audit_log(&self, log: &AuditLog) -> Result<()>;
    /// Newest first. `limit` of `None` returns every entry.
    fn list_board_audit_logs(&self, board_id: &str, limit: Option<i32>) -> Result<Vec<AuditLog>>;

    // Admin token check
    fn has_admin_token(&self) -> Result<bool>;
}
