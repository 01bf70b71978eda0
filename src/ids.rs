//! Identifier sources for defines and macros created while editing.

use uuid::Uuid;

/// Produces globally-unique opaque string ids.
pub trait IdSource {
    /// Returns a fresh id, never returned before in this session.
    fn new_id(&mut self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn new_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `{prefix}-{n}` ids, for tests and reproducible sessions.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    /// Creates a source yielding `{prefix}-1`, `{prefix}-2`, ...
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdSource for SequentialIds {
    fn new_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_source_unique() {
        let mut ids = UuidSource;
        let seen: HashSet<String> = (0..100).map(|_| ids.new_id()).collect();
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIds::new("m");
        assert_eq!(ids.new_id(), "m-1");
        assert_eq!(ids.new_id(), "m-2");
    }
}
