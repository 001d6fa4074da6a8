//! Pin conflict detection and reporting.

use std::fmt;

use vendo_core::dependency::abbrev;

/// A report of all pin conflicts encountered during resolution.
#[derive(Debug, Default)]
pub struct ConflictReport {
    pub conflicts: Vec<PinConflict>,
}

/// The same dependency name was declared with different pinned revisions by
/// different parents. The first-registered pin is kept; every later
/// divergent declaration is recorded here.
#[derive(Debug, Clone)]
pub struct PinConflict {
    pub name: String,
    /// Revision the graph keeps (first seen).
    pub kept: String,
    /// Revision the later parent asked for.
    pub requested: String,
    /// The parent that declared the losing pin.
    pub requested_by: String,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, conflict: PinConflict) {
        self.conflicts.push(conflict);
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No pin conflicts.");
        }
        writeln!(f, "Pin conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PinConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} requested {} but first-seen {} is kept",
            self.name,
            self.requested_by,
            abbrev(&self.requested),
            abbrev(&self.kept)
        )
    }
}
