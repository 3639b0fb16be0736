//! Pointer input disambiguation for the Scrim editor
//!
//! [`StateMachine`] is a generic table-driven engine: the table is a `match`
//! on `(state, input)` and per-state callbacks run on entry. [`EditorMachine`]
//! specializes it with the editor's gesture table and tracks drag
//! coordinates.

mod editor;
mod machine;

pub use editor::*;
pub use machine::*;
