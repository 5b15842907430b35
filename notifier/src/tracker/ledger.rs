//! Ordered record of reported phases

#[derive(Debug, Clone, PartialEq, Eq)]
struct LedgerEntry {
    key: String,
    reported: bool,
}

/// Phase keys in discovery order, each with a reported flag.
///
/// A reported entry never goes back to unreported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseLedger {
    entries: Vec<LedgerEntry>,
}

impl PhaseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger seeded from a known phase list
    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut ledger = Self::new();
        for key in keys {
            ledger.insert(key);
        }
        ledger
    }

    /// Append `key` as unreported if it is not known yet; returns whether it was added
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.entries.push(LedgerEntry { key, reported: false });
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn is_reported(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key && e.reported)
    }

    /// Mark `key` reported; unknown keys are ignored
    pub fn mark_reported(&mut self, key: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.reported = true;
        }
    }

    /// Keys still waiting to be reported, in insertion order
    pub fn unreported(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.reported)
            .map(|e| e.key.clone())
            .collect()
    }

}
