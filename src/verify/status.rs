//! Violation accumulator
//!
//! `MatchStatus` collects one line per violation, each prefixed with the
//! `->` delimited path of the offending node. It is empty exactly when the
//! data matched.

/// Path-tracking, append-only violation list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStatus {
    path: Vec<String>,
    violations: Vec<String>,
}

impl MatchStatus {
    /// Creates an empty status rooted at `root`
    pub fn new(root: &str) -> Self {
        Self {
            path: vec![root.to_string()],
            violations: Vec::new(),
        }
    }

    /// Current path, e.g. `settings->menu->[1]->ssh`
    pub fn path(&self) -> String {
        self.path.join("->")
    }

    pub(crate) fn enter_field(&mut self, name: &str) {
        self.path.push(name.to_string());
    }

    pub(crate) fn enter_index(&mut self, index: usize) {
        self.path.push(format!("[{}]", index));
    }

    pub(crate) fn leave(&mut self) {
        // the root segment is never popped
        if self.path.len() > 1 {
            self.path.pop();
        }
    }

    /// Records one violation at the current path
    pub fn report(&mut self, message: impl AsRef<str>) {
        let line = format!("{}: {}", self.path(), message.as_ref());
        self.violations.push(line);
    }

    /// Empty status at the same path, for speculative matching
    pub(crate) fn scratch(&self) -> Self {
        Self {
            path: self.path.clone(),
            violations: Vec::new(),
        }
    }

    /// Appends the violations of a scratch status
    pub(crate) fn absorb(&mut self, other: MatchStatus) {
        self.violations.extend(other.violations);
    }

    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Newline separated violations; empty when valid
    pub fn into_text(self) -> String {
        self.violations.join("\n")
    }
}
