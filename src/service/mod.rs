//! Board, list and card operations over a [`Store`](crate::store::Store).
//!
//! Handlers authenticate and decode; everything that decides whether a
//! mutation is allowed, and what it writes, lives here. Each mutation
//! records exactly one audit entry after it succeeds.

pub mod access;
pub mod audit;
pub mod board;
pub mod card;
pub mod list;
pub mod validation;

use std::collections::HashMap;

use crate::error::Result;
use crate::store::Store;
use crate::types::{User, UserSummary};

/// Users referenced by a read model, fetched in one query.
pub(crate) struct Directory(HashMap<String, User>);

impl Directory {
    pub(crate) fn load<'a, I>(store: &dyn Store, ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut wanted: Vec<String> = ids.into_iter().map(str::to_string).collect();
        wanted.sort();
        wanted.dedup();

        let users = store.get_users(&wanted)?;
        Ok(Self(users.into_iter().map(|u| (u.id.clone(), u)).collect()))
    }

    /// `None` for users that have since been removed.
    pub(crate) fn summary(&self, user_id: &str) -> Option<UserSummary> {
        self.0.get(user_id).map(UserSummary::from)
    }
}
