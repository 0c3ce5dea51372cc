// Adapters layer: concrete implementations of the domain ports.

pub mod checkpoint;
pub mod storage;

pub use checkpoint::{AutoConfirm, StdinCheckpoint};
pub use storage::{load_declaration, LocalStorage};
