pub mod session;
pub mod shortcuts;
pub mod storage;

pub use session::{EditorSession, GraphMutation, KeyOutcome, RunSummary, Selection};
pub use shortcuts::{Modifiers, ShortcutAction, ShortcutMap};
pub use storage::{FileSink, KeyValueStore, MemorySink, MemoryStore};
