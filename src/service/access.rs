use crate::error::{Error, Result};
use crate::types::{Board, Role};

/// Owner or a member holding the Admin role.
#[must_use]
pub fn can_administer(board: &Board, user_id: &str) -> bool {
    board.owner_id == user_id || board.member(user_id).is_some_and(|m| m.role == Role::Admin)
}

pub fn require_board_admin(board: &Board, user_id: &str) -> Result<()> {
    if !can_administer(board, user_id) {
        return Err(Error::Forbidden("Only the board owner or an admin can do this"));
    }
    Ok(())
}
