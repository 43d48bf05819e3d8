// src/board/mod.rs
pub mod builder;
pub mod controller;
pub mod transitions;

pub use builder::{build_board, Column, Priority, Task};
pub use controller::{BoardController, DeleteOutcome, DeleteResult, DeletionGate, PendingDeletion};
pub use transitions::{move_options, MoveOption};
