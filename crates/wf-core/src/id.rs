use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for node and edge IDs: fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Counter backing generated node IDs. Starts above the id of the
/// initial `Start` node so fresh sessions don't probe a known collision.
static COUNTER: AtomicU64 = AtomicU64::new(2);

/// A lightweight, interned identifier for workflow nodes and edges.
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

/// Edges share the interner; the alias keeps signatures readable.
pub type EdgeId = NodeId;

impl NodeId {
    /// Intern a new string as a NodeId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Look up an already interned string without interning it.
    ///
    /// Host-supplied ids that may not exist go through here, so unknown
    /// strings never grow the process-wide interner.
    pub fn lookup(s: &str) -> Option<Self> {
        INTERNER.get(s).map(NodeId)
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate the next numeric ID that `is_taken` does not reject.
    ///
    /// Numbers come from a process-wide monotonic counter, so two calls
    /// never hand out the same value even within one event turn. The
    /// predicate covers IDs that entered the graph from a loaded document.
    /// Only the returned candidate is interned.
    pub fn generate(mut is_taken: impl FnMut(&str) -> bool) -> Self {
        loop {
            let candidate = COUNTER.fetch_add(1, Ordering::Relaxed).to_string();
            if !is_taken(&candidate) {
                return Self::intern(&candidate);
            }
        }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}
