mod types;

pub use types::{EventKind, GameEvent};
