//! Undo/redo history of document snapshots

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_limit() -> usize {
    50
}

/// Past/future stacks of serialized documents
///
/// `record` is called with the document as it stood *before* a change is
/// applied; `undo`/`redo` exchange the current document with the stacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    past: Vec<Value>,

    #[serde(default)]
    future: Vec<Value>,

    #[serde(default = "default_limit")]
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            past: vec![],
            future: vec![],
            limit: default_limit(),
        }
    }
}

impl History {
    /// Create a history bounded to the given depth
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Change the depth bound, trimming the past if it shrank
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.past.truncate(limit);
    }

    /// Record a snapshot taken before a change
    ///
    /// Recording a snapshot identical to the latest one is a no-op, so a
    /// page visit that changes nothing does not pollute the stack. Any
    /// recorded change invalidates the future.
    pub fn record(&mut self, snapshot: Value) {
        if self.past.first() == Some(&snapshot) {
            return;
        }

        self.past.insert(0, snapshot);
        self.past.truncate(self.limit);
        self.future.clear();
    }

    /// Step back, exchanging the current document for the latest snapshot
    pub fn undo(&mut self, current: Value) -> Option<Value> {
        if self.past.is_empty() {
            return None;
        }

        self.future.insert(0, current);
        Some(self.past.remove(0))
    }

    /// Step forward, exchanging the current document for the next one
    pub fn redo(&mut self, current: Value) -> Option<Value> {
        if self.future.is_empty() {
            return None;
        }

        self.past.insert(0, current);
        Some(self.future.remove(0))
    }

    /// Whether an undo step is available
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether a redo step is available
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn undo_redo_cycle() {
        let mut history = History::default();

        history.record(json!({"v": 1}));
        let current = json!({"v": 2});

        let previous = history.undo(current.clone()).unwrap();
        assert_eq!(previous, json!({"v": 1}));
        assert!(history.can_redo());

        let next = history.redo(previous).unwrap();
        assert_eq!(next, current);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn duplicate_snapshots_collapse() {
        let mut history = History::default();
        history.record(json!({"v": 1}));
        history.record(json!({"v": 1}));

        history.undo(json!({"v": 2})).unwrap();
        assert!(!history.can_undo());
    }

    #[test]
    fn recording_clears_the_future() {
        let mut history = History::default();
        history.record(json!({"v": 1}));
        history.undo(json!({"v": 2})).unwrap();
        assert!(history.can_redo());

        history.record(json!({"v": 1}));
        assert!(!history.can_redo());
    }

    #[test]
    fn depth_is_bounded() {
        let mut history = History::with_limit(2);
        for v in 0..5 {
            history.record(json!({ "v": v }));
        }

        assert_eq!(history.undo(json!({"v": 5})).unwrap(), json!({"v": 4}));
        assert_eq!(history.undo(json!({"v": 4})).unwrap(), json!({"v": 3}));
        assert!(!history.can_undo());
    }

    #[test]
    fn shrinking_the_limit_trims_the_past() {
        let mut history = History::default();
        for v in 0..5 {
            history.record(json!({ "v": v }));
        }

        history.set_limit(2);
        assert_eq!(history.undo(json!({})).unwrap(), json!({"v": 4}));
        assert_eq!(history.undo(json!({})).unwrap(), json!({"v": 3}));
        assert!(!history.can_undo());
    }

    #[test]
    fn empty_stacks_return_none() {
        let mut history = History::default();
        assert!(history.undo(json!({})).is_none());
        assert!(history.redo(json!({})).is_none());
    }
}
