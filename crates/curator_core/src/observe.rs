use std::collections::BTreeSet;

use crate::JobKind;

/// Local observer bookkeeping, reconciled against every status the server
/// reports.
///
/// `attached` mirrors the engine's poller registry: a kind is attached from
/// the moment `StartPolling` is emitted until the poller reports completion
/// or everything is stopped. `reporting` is the "this session is watching" flag that
/// gates completion UI. It is set when the session triggers or attaches, and
/// taken exactly once when completion is reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Observers {
    attached: BTreeSet<JobKind>,
    reporting: BTreeSet<JobKind>,
    degraded: BTreeSet<JobKind>,
}

/// What reconciling a status read asks the caller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// Job is running and nobody watches it: a poller was attached.
    Attached,
    /// Job is running and already observed.
    AlreadyAttached,
    /// Job is not running and no poller is attached; any stale reporting
    /// flag was dropped without reporting.
    Idle,
    /// Job is not running but a poller is still attached; its own terminal
    /// tick will report completion.
    AwaitingPoller,
}

impl Observers {
    pub fn is_attached(&self, kind: JobKind) -> bool {
        self.attached.contains(&kind)
    }

    pub fn is_reporting(&self, kind: JobKind) -> bool {
        self.reporting.contains(&kind)
    }

    pub fn is_degraded(&self, kind: JobKind) -> bool {
        self.degraded.contains(&kind)
    }

    /// Starts observing a job this session just triggered. Returns `true`
    /// when a new poller must be started.
    pub fn observe(&mut self, kind: JobKind) -> bool {
        self.reporting.insert(kind);
        self.attached.insert(kind)
    }

    pub fn reconcile(&mut self, kind: JobKind, running: bool) -> Reconcile {
        match (running, self.attached.contains(&kind)) {
            (true, false) => {
                self.attached.insert(kind);
                self.reporting.insert(kind);
                Reconcile::Attached
            }
            (true, true) => Reconcile::AlreadyAttached,
            (false, false) => {
                self.reporting.remove(&kind);
                Reconcile::Idle
            }
            (false, true) => Reconcile::AwaitingPoller,
        }
    }

    /// Called when the poller delivers the terminal status. Returns `true`
    /// exactly once per observation, and only if this session was watching.
    pub fn complete(&mut self, kind: JobKind) -> bool {
        self.attached.remove(&kind);
        self.degraded.remove(&kind);
        self.reporting.remove(&kind)
    }

    /// Marks a kind degraded. Returns `true` on the transition.
    pub fn mark_degraded(&mut self, kind: JobKind) -> bool {
        self.attached.contains(&kind) && self.degraded.insert(kind)
    }

    /// Clears the degraded mark. Returns `true` on the transition.
    pub fn mark_recovered(&mut self, kind: JobKind) -> bool {
        self.degraded.remove(&kind)
    }

    pub fn clear(&mut self) {
        self.attached.clear();
        self.reporting.clear();
        self.degraded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_status_attaches_once() {
        let mut observers = Observers::default();
        assert_eq!(
            observers.reconcile(JobKind::RefreshAll, true),
            Reconcile::Attached
        );
        assert_eq!(
            observers.reconcile(JobKind::RefreshAll, true),
            Reconcile::AlreadyAttached
        );
        assert!(observers.is_reporting(JobKind::RefreshAll));
    }

    #[test]
    fn completion_reports_exactly_once() {
        let mut observers = Observers::default();
        assert!(observers.observe(JobKind::Scan));
        assert!(!observers.observe(JobKind::Scan));
        assert!(observers.complete(JobKind::Scan));
        assert!(!observers.complete(JobKind::Scan));
    }

    #[test]
    fn idle_read_drops_stale_reporting_flag() {
        let mut observers = Observers::default();
        observers.observe(JobKind::LibraryImport);
        observers.attached.remove(&JobKind::LibraryImport);
        assert_eq!(
            observers.reconcile(JobKind::LibraryImport, false),
            Reconcile::Idle
        );
        assert!(!observers.complete(JobKind::LibraryImport));
    }

    #[test]
    fn degraded_requires_attached_poller() {
        let mut observers = Observers::default();
        assert!(!observers.mark_degraded(JobKind::Scan));
        observers.observe(JobKind::Scan);
        assert!(observers.mark_degraded(JobKind::Scan));
        assert!(!observers.mark_degraded(JobKind::Scan));
        assert!(observers.mark_recovered(JobKind::Scan));
    }
}
