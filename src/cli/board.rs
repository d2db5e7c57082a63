use crate::client::{BoardSession, DropOutcome};
use crate::types::BoardView;

use super::commands::RemoteArgs;
use super::http_client::ApiClient;

fn print_board(board: &BoardView) {
    println!();
    println!("{} ({})", board.title, board.id);
    if let Some(owner) = &board.owner {
        println!("  owner: {} <{}>", owner.name, owner.email);
    }

    for list in &board.lists {
        let over_limit = if list.cards.len() as i64 > list.list.wip_limit {
            "  [over WIP limit]"
        } else {
            ""
        };
        println!();
        println!(
            "  {} ({}/{}){}  {}",
            list.list.title,
            list.cards.len(),
            list.list.wip_limit,
            over_limit,
            list.list.id
        );

        if list.cards.is_empty() {
            println!("    (empty)");
        }
        for card in &list.cards {
            let assignees: Vec<&str> = card.assigned_users.iter().map(|u| u.name.as_str()).collect();
            let mut extra = Vec::new();
            if !card.labels.is_empty() {
                extra.push(format!("[{}]", card.labels.join(", ")));
            }
            if !assignees.is_empty() {
                extra.push(format!("@{}", assignees.join(" @")));
            }
            println!("    - {}  {}  {}", card.title, extra.join(" "), card.id);
        }
    }
    println!();
}

pub fn run_board_show(board_id: String, remote: RemoteArgs, json: bool) -> anyhow::Result<()> {
    let client = ApiClient::new(&remote)?;
    let mut session = BoardSession::new(client, board_id);
    let board = session.load()?;

    if json {
        println!("{}", serde_json::to_string_pretty(board)?);
    } else {
        print_board(board);
    }

    Ok(())
}

pub fn run_card_move(
    card_id: String,
    board_id: String,
    target_list: String,
    remote: RemoteArgs,
) -> anyhow::Result<()> {
    let client = ApiClient::new(&remote)?;
    let mut session = BoardSession::new(client, board_id);
    session.load()?;

    session.drag_start(&card_id)?;
    let outcome = session.drop_on(Some(target_list.as_str()));

    match outcome {
        DropOutcome::NoOp => {
            println!("Card is already in that list, or the list is not on this board.");
        }
        DropOutcome::Confirmed => println!("Moved card {card_id}."),
        DropOutcome::Reverted => {
            anyhow::bail!(
                "Server at {} rejected the move; the board was reloaded.",
                session.api().base_url()
            );
        }
    }

    if session.is_stale() {
        tracing::warn!("Could not reload the board after the move");
    } else if let Some(board) = session.board() {
        print_board(board);
    }

    Ok(())
}
