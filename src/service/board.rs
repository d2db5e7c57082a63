use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::validation::Violations;
use super::{Directory, access, audit};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::*;

/// Lists every new board starts with, left to right.
pub const DEFAULT_LISTS: [&str; 3] = ["To Do", "On Going", "Done"];

pub const DEFAULT_WIP_LIMIT: i64 = 2;

/// Creates a board owned by `actor`, who also becomes its only Admin member,
/// together with the default lists.
pub fn create(
    store: &dyn Store,
    actor: &Actor,
    title: &str,
    background: Option<&str>,
) -> Result<(Board, Vec<List>)> {
    Violations::new().require_text("title", title).finish()?;

    let now = Utc::now();
    let board = Board {
        id: Uuid::new_v4().to_string(),
        title: title.trim().to_string(),
        background: background
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(DEFAULT_IMAGE)
            .to_string(),
        owner_id: actor.user_id.clone(),
        members: vec![BoardMember {
            user_id: actor.user_id.clone(),
            role: Role::Admin,
        }],
        created_at: now,
        updated_at: now,
    };

    let lists: Vec<List> = DEFAULT_LISTS
        .iter()
        .zip(0..)
        .map(|(title, position)| List {
            id: Uuid::new_v4().to_string(),
            board_id: board.id.clone(),
            title: (*title).to_string(),
            position,
            wip_limit: DEFAULT_WIP_LIMIT,
            created_at: now,
            updated_at: now,
        })
        .collect();

    store.create_board(&board, &lists)?;

    tracing::info!(board_id = %board.id, owner = %actor.user_id, "Created board");
    audit::record(
        store,
        actor,
        Some(&board.id),
        Some(&board.id),
        AuditEvent::BoardCreated {
            title: board.title.clone(),
        },
    );

    Ok((board, lists))
}

/// The whole board with lists and cards in position order and every user
/// reference resolved. Any authenticated caller may read any board.
pub fn get_full(store: &dyn Store, board_id: &str) -> Result<BoardView> {
    let board = store.get_board(board_id)?.ok_or(Error::NotFound("Board"))?;

    let lists = store.list_board_lists(&board.id)?;
    let mut cards_by_list: HashMap<String, Vec<Card>> = HashMap::new();
    for list in &lists {
        cards_by_list.insert(list.id.clone(), store.list_list_cards(&list.id)?);
    }

    let referenced = std::iter::once(board.owner_id.as_str())
        .chain(board.members.iter().map(|m| m.user_id.as_str()))
        .chain(cards_by_list.values().flatten().flat_map(|c| {
            c.assigned_users
                .iter()
                .map(String::as_str)
                .chain(c.comments.iter().map(|cm| cm.user_id.as_str()))
        }));
    let directory = Directory::load(store, referenced)?;

    let lists = lists
        .into_iter()
        .map(|list| {
            let cards = cards_by_list
                .remove(&list.id)
                .unwrap_or_default()
                .into_iter()
                .map(|card| card_view(&directory, card))
                .collect();
            ListView { list, cards }
        })
        .collect();

    Ok(BoardView {
        owner: directory.summary(&board.owner_id),
        members: member_views(&directory, &board.members),
        lists,
        id: board.id,
        title: board.title,
        background: board.background,
        created_at: board.created_at,
        updated_at: board.updated_at,
    })
}

pub(crate) fn card_view(directory: &Directory, card: Card) -> CardView {
    CardView {
        assigned_users: card
            .assigned_users
            .iter()
            .filter_map(|id| directory.summary(id))
            .collect(),
        comments: card
            .comments
            .into_iter()
            .map(|c| CommentView {
                user: directory.summary(&c.user_id),
                text: c.text,
                created_at: c.created_at,
            })
            .collect(),
        id: card.id,
        list_id: card.list_id,
        board_id: card.board_id,
        title: card.title,
        description: card.description,
        position: card.position,
        due_date: card.due_date,
        labels: card.labels,
        created_at: card.created_at,
        updated_at: card.updated_at,
    }
}

fn member_views(directory: &Directory, members: &[BoardMember]) -> Vec<MemberView> {
    members
        .iter()
        .filter_map(|m| {
            directory.summary(&m.user_id).map(|user| MemberView {
                user,
                role: m.role,
            })
        })
        .collect()
}

fn summarize(store: &dyn Store, boards: Vec<Board>) -> Result<Vec<BoardSummary>> {
    let directory = Directory::load(
        store,
        boards
            .iter()
            .flat_map(|b| b.members.iter().map(|m| m.user_id.as_str())),
    )?;

    Ok(boards
        .into_iter()
        .map(|board| BoardSummary {
            members: member_views(&directory, &board.members),
            id: board.id,
            title: board.title,
            background: board.background,
            owner_id: board.owner_id,
            created_at: board.created_at,
            updated_at: board.updated_at,
        })
        .collect())
}

pub fn list_owned(store: &dyn Store, user_id: &str) -> Result<Vec<BoardSummary>> {
    let boards = store.list_owned_boards(user_id)?;
    summarize(store, boards)
}

pub fn list_shared(store: &dyn Store, user_id: &str) -> Result<Vec<BoardSummary>> {
    let boards = store.list_shared_boards(user_id)?;
    summarize(store, boards)
}

/// Deletes the board along with its lists and cards.
pub fn delete(store: &dyn Store, actor: &Actor, board_id: &str) -> Result<()> {
    let board = store.get_board(board_id)?.ok_or(Error::NotFound("Board"))?;
    access::require_board_admin(&board, &actor.user_id)?;

    if !store.delete_board(&board.id)? {
        return Err(Error::NotFound("Board"));
    }

    tracing::info!(board_id = %board.id, by = %actor.user_id, "Deleted board");
    audit::record(
        store,
        actor,
        Some(&board.id),
        Some(&board.id),
        AuditEvent::BoardDeleted { title: board.title },
    );

    Ok(())
}

/// Adds the user registered under `email` as a Member. The user lookup runs
/// first, so an unknown email is reported before the board is even read.
pub fn add_member(store: &dyn Store, actor: &Actor, board_id: &str, email: &str) -> Result<Board> {
    Violations::new().require_text("email", email).finish()?;

    let user = store
        .get_user_by_email(&email.trim().to_lowercase())?
        .ok_or(Error::NotFound("User"))?;
    let board = store.get_board(board_id)?.ok_or(Error::NotFound("Board"))?;
    access::require_board_admin(&board, &actor.user_id)?;

    if board.is_member(&user.id) {
        return Err(Error::Conflict("User already a member".to_string()));
    }

    let member = BoardMember {
        user_id: user.id.clone(),
        role: Role::Member,
    };
    match store.add_board_member(&board.id, &member) {
        Err(Error::AlreadyExists) => {
            return Err(Error::Conflict("User already a member".to_string()));
        }
        other => other?,
    }

    audit::record(
        store,
        actor,
        Some(&board.id),
        Some(&user.id),
        AuditEvent::MemberAdded { email: user.email },
    );

    store.get_board(&board.id)?.ok_or(Error::NotFound("Board"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::Fixture;
    use crate::service::{card, list};

    #[test]
    fn test_create_makes_default_lists() {
        let fx = Fixture::new();
        let alice = fx.user("alice");

        let (board, lists) = create(&fx.store, &alice, "Roadmap", None).unwrap();
        assert_eq!(board.background, DEFAULT_IMAGE);
        assert_eq!(board.members.len(), 1);
        assert_eq!(board.members[0].role, Role::Admin);

        let titles: Vec<_> = lists.iter().map(|l| (l.title.as_str(), l.position)).collect();
        assert_eq!(titles, vec![("To Do", 0), ("On Going", 1), ("Done", 2)]);
        assert!(lists.iter().all(|l| l.wip_limit == 2 && l.board_id == board.id));

        let history = audit::board_history(&fx.store, &board.id).unwrap();
        assert_eq!(history[0].log.event.action(), "BOARD_CREATED");
    }

    #[test]
    fn test_create_requires_title() {
        let fx = Fixture::new();
        let alice = fx.user("alice");

        let result = create(&fx.store, &alice, "   ", None);
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(fx.store.list_owned_boards("alice").unwrap().is_empty());
    }

    #[test]
    fn test_get_full_orders_and_resolves() {
        let fx = Fixture::new();
        let alice = fx.user("alice");
        let (board, lists) = create(&fx.store, &alice, "Roadmap", None).unwrap();

        let later = card::create(
            &fx.store,
            &alice,
            card::NewCard {
                list_id: lists[1].id.clone(),
                title: "second".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        card::move_card(&fx.store, &alice, &later.id, &lists[1].id, 5).unwrap();
        let first = card::create(
            &fx.store,
            &alice,
            card::NewCard {
                list_id: lists[1].id.clone(),
                title: "first".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        card::assign_member(&fx.store, &alice, &first.id, "alice").unwrap();
        card::add_comment(&fx.store, &alice, &first.id, "on it").unwrap();

        let view = get_full(&fx.store, &board.id).unwrap();
        assert_eq!(view.owner.as_ref().map(|o| o.name.as_str()), Some("User alice"));
        assert_eq!(view.members[0].role, Role::Admin);

        let titles: Vec<_> = view.lists.iter().map(|l| l.list.title.as_str()).collect();
        assert_eq!(titles, vec!["To Do", "On Going", "Done"]);

        let cards: Vec<_> = view.lists[1].cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(cards, vec!["first", "second"]);

        let (_, card) = view.find_card(&first.id).unwrap();
        assert_eq!(card.assigned_users[0].email, "alice@example.com");
        assert_eq!(card.comments[0].user.as_ref().map(|u| u.id.as_str()), Some("alice"));
    }

    #[test]
    fn test_get_full_missing_board() {
        let fx = Fixture::new();
        assert!(matches!(
            get_full(&fx.store, "nope"),
            Err(Error::NotFound("Board"))
        ));
    }

    #[test]
    fn test_delete_requires_owner_or_admin() {
        let fx = Fixture::new();
        let alice = fx.user("alice");
        let bob = fx.user("bob");
        let (board, _) = create(&fx.store, &alice, "Roadmap", None).unwrap();
        add_member(&fx.store, &alice, &board.id, "bob@example.com").unwrap();

        assert!(matches!(
            delete(&fx.store, &bob, &board.id),
            Err(Error::Forbidden(_))
        ));
        assert!(fx.store.get_board(&board.id).unwrap().is_some());
    }

    #[test]
    fn test_delete_cascades_and_keeps_history() {
        let fx = Fixture::new();
        let alice = fx.user("alice");
        let (board, lists) = create(&fx.store, &alice, "Roadmap", None).unwrap();
        let extra = list::create(&fx.store, &alice, &board.id, "Backlog").unwrap();
        let c = card::create(
            &fx.store,
            &alice,
            card::NewCard {
                list_id: extra.id.clone(),
                title: "ship".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

        delete(&fx.store, &alice, &board.id).unwrap();

        assert!(fx.store.get_board(&board.id).unwrap().is_none());
        assert!(fx.store.list_board_lists(&board.id).unwrap().is_empty());
        assert!(fx.store.get_list(&lists[0].id).unwrap().is_none());
        assert!(fx.store.get_card(&c.id).unwrap().is_none());

        let history = audit::board_history(&fx.store, &board.id).unwrap();
        assert_eq!(history[0].log.event.action(), "BOARD_DELETED");
        assert!(matches!(
            delete(&fx.store, &alice, &board.id),
            Err(Error::NotFound("Board"))
        ));
    }

    #[test]
    fn test_add_member_error_order() {
        let fx = Fixture::new();
        let alice = fx.user("alice");
        let bob = fx.user("bob");
        let carol = fx.user("carol");
        let (board, _) = create(&fx.store, &alice, "Roadmap", None).unwrap();

        // Unknown email wins over a missing board.
        assert!(matches!(
            add_member(&fx.store, &alice, "missing", "ghost@example.com"),
            Err(Error::NotFound("User"))
        ));
        assert!(matches!(
            add_member(&fx.store, &alice, "missing", "bob@example.com"),
            Err(Error::NotFound("Board"))
        ));
        assert!(matches!(
            add_member(&fx.store, &carol, &board.id, "bob@example.com"),
            Err(Error::Forbidden(_))
        ));

        let updated = add_member(&fx.store, &alice, &board.id, "bob@example.com").unwrap();
        assert_eq!(updated.member("bob").map(|m| m.role), Some(Role::Member));

        assert!(matches!(
            add_member(&fx.store, &alice, &board.id, "bob@example.com"),
            Err(Error::Conflict(_))
        ));

        // Members are not admins.
        assert!(matches!(
            add_member(&fx.store, &bob, &board.id, "carol@example.com"),
            Err(Error::Forbidden(_))
        ));

        let added: Vec<_> = audit::board_history(&fx.store, &board.id)
            .unwrap()
            .into_iter()
            .filter(|l| l.log.event.action() == "MEMBER_ADDED")
            .collect();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].log.target_id.as_deref(), Some("bob"));
    }

    #[test]
    fn test_owned_and_shared() {
        let fx = Fixture::new();
        let alice = fx.user("alice");
        let bob = fx.user("bob");
        let (mine, _) = create(&fx.store, &alice, "Mine", None).unwrap();
        let (theirs, _) = create(&fx.store, &bob, "Theirs", Some("sunset.png")).unwrap();
        add_member(&fx.store, &bob, &theirs.id, "alice@example.com").unwrap();

        let owned = list_owned(&fx.store, "alice").unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, mine.id);

        let shared = list_shared(&fx.store, "alice").unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].background, "sunset.png");
        let members: Vec<_> = shared[0].members.iter().map(|m| m.user.id.as_str()).collect();
        assert_eq!(members, vec!["bob", "alice"]);
    }
}
