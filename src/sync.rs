//! Two-source reconciliation of a record against live snapshots.

/// A remote copy (last applied snapshot) plus an optional local edit.
///
/// The displayed value is the local edit when one exists, otherwise the
/// remote copy. Applying a snapshot always discards the local edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<T> {
    remote: T,
    pending: Option<T>,
}

impl<T: Clone> Reconciled<T> {
    pub fn new(remote: T) -> Self {
        Self {
            remote,
            pending: None,
        }
    }

    pub fn displayed(&self) -> &T {
        self.pending.as_ref().unwrap_or(&self.remote)
    }

    pub fn remote(&self) -> &T {
        &self.remote
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Mutate the local copy, starting from what is displayed.
    pub fn edit_local<R>(&mut self, edit: impl FnOnce(&mut T) -> R) -> R {
        let pending = self.pending.get_or_insert_with(|| self.remote.clone());
        edit(pending)
    }

    /// Snapshot wins over any local edit.
    pub fn apply_remote(&mut self, remote: T) {
        self.remote = remote;
        self.pending = None;
    }
}
