// src/board/transitions.rs
//! Card moves between columns.
//!
//! The pipeline is not ordered: every card can move to every column, and
//! `offer`/`rejected` are not terminal. The table is explicit so that a
//! stricter product rule only needs a table edit.

use serde::Serialize;

use crate::types::ApplicationStatus;

// Rows: from, columns: to, both in `ApplicationStatus::ALL` order.
const ALLOWED: [[bool; 4]; 4] = [
    [true, true, true, true],
    [true, true, true, true],
    [true, true, true, true],
    [true, true, true, true],
];

fn index(status: ApplicationStatus) -> usize {
    match status {
        ApplicationStatus::Applied => 0,
        ApplicationStatus::Interview => 1,
        ApplicationStatus::Offer => 2,
        ApplicationStatus::Rejected => 3,
    }
}

pub fn is_allowed(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    ALLOWED[index(from)][index(to)]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveOption {
    pub status: ApplicationStatus,
    pub title: &'static str,
    /// The card is already in this column; choosing it changes nothing.
    pub current: bool,
}

/// Context-menu entries for a card in `from`.
pub fn move_options(from: ApplicationStatus) -> Vec<MoveOption> {
    ApplicationStatus::ALL
        .iter()
        .filter(|to| is_allowed(from, **to))
        .map(|to| MoveOption {
            status: *to,
            title: to.title(),
            current: *to == from,
        })
        .collect()
}
