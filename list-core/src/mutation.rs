//! In-flight tracking for remote writes.
//!
//! Each mutation kind has its own indicator and none of them block each
//! other. The indicators are observational, not locks: two overlapping
//! operations of the same kind are both allowed, so each kind keeps a
//! counter and reports busy until the last one finishes.

/// The three kinds of remote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// Insert a new record.
    Add,
    /// Update an existing record.
    Update,
    /// Delete a record.
    Delete,
}

impl MutationKind {
    /// Lowercase name, for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Per-kind in-flight counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationFlags {
    adding: u32,
    updating: u32,
    deleting: u32,
}

impl MutationFlags {
    /// Create flags with nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one operation of `kind` as started.
    pub fn begin(&mut self, kind: MutationKind) {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(1);
    }

    /// Mark one operation of `kind` as finished.
    pub fn end(&mut self, kind: MutationKind) {
        let slot = self.slot(kind);
        *slot = slot.saturating_sub(1);
    }

    /// Check if an operation of `kind` is in flight.
    pub fn is_active(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::Add => self.adding > 0,
            MutationKind::Update => self.updating > 0,
            MutationKind::Delete => self.deleting > 0,
        }
    }

    /// Check if an add is in flight.
    pub fn is_adding(&self) -> bool {
        self.is_active(MutationKind::Add)
    }

    /// Check if an update is in flight.
    pub fn is_updating(&self) -> bool {
        self.is_active(MutationKind::Update)
    }

    /// Check if a delete is in flight.
    pub fn is_deleting(&self) -> bool {
        self.is_active(MutationKind::Delete)
    }

    fn slot(&mut self, kind: MutationKind) -> &mut u32 {
        match kind {
            MutationKind::Add => &mut self.adding,
            MutationKind::Update => &mut self.updating,
            MutationKind::Delete => &mut self.deleting,
        }
    }
}
