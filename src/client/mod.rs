//! Client-side board state for interactive front ends.

mod session;

pub use session::{BoardApi, BoardSession, DragState, DropOutcome};
