use crate::types::{BoardView, Card, CardView};

/// The two server calls a board session needs.
pub trait BoardApi {
    fn fetch_board(&self, board_id: &str) -> anyhow::Result<BoardView>;
    fn move_card(&self, card_id: &str, target_list_id: &str, position: i64) -> anyhow::Result<Card>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    /// Holds a copy of the whole card so an overlay can render it while the
    /// original stays in place.
    Dragging { card: CardView, from_list: String },
    /// Local state already shows the card at `position` in `target_list`;
    /// the move has not been sent yet.
    OptimisticApplied {
        card_id: String,
        target_list: String,
        position: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing changed and no request was made.
    NoOp,
    /// The server accepted the change.
    Confirmed,
    /// The server rejected the change; local edits were discarded.
    Reverted,
}

/// A cached board plus the drag-and-drop state machine over it.
///
/// Every change is applied locally first, then persisted. Success or
/// failure, the board is re-fetched afterwards so the server stays the
/// source of truth. If that re-fetch fails the session is marked stale
/// until [`BoardSession::resync`] succeeds.
pub struct BoardSession<A: BoardApi> {
    api: A,
    board_id: String,
    board: Option<BoardView>,
    drag: DragState,
    stale: bool,
}

impl<A: BoardApi> BoardSession<A> {
    pub fn new(api: A, board_id: impl Into<String>) -> Self {
        Self {
            api,
            board_id: board_id.into(),
            board: None,
            drag: DragState::Idle,
            stale: true,
        }
    }

    /// Fetches the board and returns it.
    pub fn load(&mut self) -> anyhow::Result<&BoardView> {
        self.resync()?;
        self.board
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Board was not loaded"))
    }

    #[must_use]
    pub fn board(&self) -> Option<&BoardView> {
        self.board.as_ref()
    }

    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Replaces the cached board with the server's copy.
    pub fn resync(&mut self) -> anyhow::Result<()> {
        match self.api.fetch_board(&self.board_id) {
            Ok(board) => {
                self.board = Some(board);
                self.stale = false;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(board_id = %self.board_id, "Failed to refresh board: {e}");
                self.stale = true;
                Err(e)
            }
        }
    }

    pub fn drag_start(&mut self, card_id: &str) -> anyhow::Result<()> {
        let board = self
            .board
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Board is not loaded"))?;

        let (list, card) = board
            .find_card(card_id)
            .ok_or_else(|| anyhow::anyhow!("Card not found on board: {card_id}"))?;

        self.drag = DragState::Dragging {
            card: card.clone(),
            from_list: list.list.id.clone(),
        };
        Ok(())
    }

    pub fn drag_cancel(&mut self) {
        self.drag = DragState::Idle;
    }

    /// The card being dragged, for overlay rendering.
    #[must_use]
    pub fn active_card(&self) -> Option<&CardView> {
        match &self.drag {
            DragState::Dragging { card, .. } => Some(card),
            _ => None,
        }
    }

    /// Drops the dragged card on `target`, or outside any list if `None`,
    /// and persists the move. Same as [`apply_drop`](Self::apply_drop)
    /// followed by [`persist_drop`](Self::persist_drop).
    pub fn drop_on(&mut self, target: Option<&str>) -> DropOutcome {
        if !self.apply_drop(target) {
            return DropOutcome::NoOp;
        }
        self.persist_drop()
    }

    /// Appends the dragged card to `target` in the cached board and leaves
    /// the session in [`DragState::OptimisticApplied`]. Returns `false`, and
    /// goes back to idle, when the drop changes nothing.
    pub fn apply_drop(&mut self, target: Option<&str>) -> bool {
        let DragState::Dragging { card, from_list } =
            std::mem::replace(&mut self.drag, DragState::Idle)
        else {
            return false;
        };

        let Some(target) = target.filter(|t| *t != from_list) else {
            return false;
        };
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(position) = board.list(target).map(|l| l.cards.len()) else {
            return false;
        };
        let position = i64::try_from(position).unwrap_or(i64::MAX);

        let card_id = card.id.clone();
        for list in &mut board.lists {
            list.cards.retain(|c| c.id != card_id);
        }
        if let Some(list) = board.lists.iter_mut().find(|l| l.list.id == target) {
            let mut moved = card;
            moved.list_id = target.to_string();
            moved.board_id = list.list.board_id.clone();
            moved.position = position;
            list.cards.push(moved);
        }

        self.drag = DragState::OptimisticApplied {
            card_id,
            target_list: target.to_string(),
            position,
        };
        true
    }

    /// Sends the move applied by [`apply_drop`](Self::apply_drop), then
    /// re-fetches the board whatever the answer.
    pub fn persist_drop(&mut self) -> DropOutcome {
        let DragState::OptimisticApplied {
            card_id,
            target_list,
            position,
        } = std::mem::replace(&mut self.drag, DragState::Idle)
        else {
            return DropOutcome::NoOp;
        };

        let result = self
            .api
            .move_card(&card_id, &target_list, position)
            .map(|_| ());
        self.settle(result)
    }

    /// Applies `patch` to the cached board, then runs `persist`.
    ///
    /// On success the board is re-fetched. On failure the local copy is
    /// thrown away and re-fetched.
    pub fn optimistic<F, P>(&mut self, patch: F, persist: P) -> DropOutcome
    where
        F: FnOnce(&mut BoardView),
        P: FnOnce(&A) -> anyhow::Result<()>,
    {
        let Some(board) = self.board.as_mut() else {
            self.drag = DragState::Idle;
            return DropOutcome::NoOp;
        };
        patch(board);

        let result = persist(&self.api);
        self.settle(result)
    }

    fn settle(&mut self, result: anyhow::Result<()>) -> DropOutcome {
        let outcome = match result {
            Ok(()) => DropOutcome::Confirmed,
            Err(e) => {
                tracing::warn!(board_id = %self.board_id, "Change rejected, reverting: {e}");
                self.board = None;
                DropOutcome::Reverted
            }
        };

        // Failure is recorded in `stale`; the caller may retry `resync`.
        let _ = self.resync();
        self.drag = DragState::Idle;
        outcome
    }
}
