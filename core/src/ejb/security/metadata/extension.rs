//! Vendor extension descriptor: per-method run-as modes.

use crate::ejb::security::signature::{best_matches, MethodPattern, MethodSignature};

/// Identity a method uses for the calls it makes to other beans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunAsMode {
    CallerIdentity,
    /// Run as the given role. `None` defers to the bean-level run-as role.
    SpecifiedIdentity(Option<String>),
    /// Recognized but not supported; selecting it is a configuration error.
    SystemIdentity,
}

impl RunAsMode {
    /// A specified identity. A blank role is treated as absent.
    pub fn specified(role: &str) -> Self {
        let role = role.trim();
        if role.is_empty() {
            RunAsMode::SpecifiedIdentity(None)
        } else {
            RunAsMode::SpecifiedIdentity(Some(role.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunAsModeEntry {
    pattern: MethodPattern,
    mode: RunAsMode,
}

impl RunAsModeEntry {
    pub fn get_pattern(&self) -> &MethodPattern {
        &self.pattern
    }

    pub fn get_mode(&self) -> &RunAsMode {
        &self.mode
    }
}

/// Extension layer of a bean. Empty when the bean has no extension file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionLayer {
    entries: Vec<RunAsModeEntry>,
}

impl ExtensionLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_as_mode(mut self, pattern: MethodPattern, mode: RunAsMode) -> Self {
        self.entries.push(RunAsModeEntry { pattern, mode });
        self
    }

    pub fn get_entries(&self) -> &[RunAsModeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The mode governing `method`: most specific entry, later entry on a tie.
    pub fn mode_for(&self, method: &MethodSignature) -> Option<&RunAsMode> {
        let entries = self.entries.iter().map(|e| (&e.pattern, &e.mode));
        best_matches(entries, method).and_then(|(_, modes)| modes.last().copied())
    }

    pub fn patterns(&self) -> impl Iterator<Item = &MethodPattern> {
        self.entries.iter().map(|e| &e.pattern)
    }
}
