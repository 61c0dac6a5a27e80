//! Pagination controller: decides when to ask the photo source for more rows.
//!
//! State machine: `Idle -> Loading -> Idle`, with `Exhausted` terminal once the
//! source reports no more data. A load is requested only from `Idle`, so at
//! most one request is ever outstanding. Failures return the controller to
//! `Idle`; it never retries on its own, the next scroll near the end does.

use tracing::{debug, info, trace, warn};

use crate::error::LoadError;

/// Rows from the end of the loaded data at which prefetching starts.
pub const PREFETCH_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Exhausted,
}

/// Snapshot of the pagination state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadCursor {
    pub loaded_count: usize,
    pub has_more: bool,
    pub is_loading: bool,
}

/// Flags reported by the host that owns the rows and the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProps {
    pub loaded_count: usize,
    pub has_more: bool,
    pub is_loading: bool,
}

/// Identifies one load-more request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    /// `None` when the host started the load on its own.
    ticket: Option<LoadTicket>,
    /// The host has reported `is_loading = true` for this load.
    seen_loading: bool,
}

#[derive(Debug, Clone)]
pub struct PaginationController {
    threshold: usize,
    phase: LoadPhase,
    loaded_count: usize,
    has_more: bool,
    in_flight: Option<InFlight>,
    next_ticket: u64,
}

impl PaginationController {
    pub fn new(threshold: usize, loaded_count: usize, has_more: bool) -> Self {
        Self {
            threshold,
            phase: if has_more {
                LoadPhase::Idle
            } else {
                LoadPhase::Exhausted
            },
            loaded_count,
            has_more,
            in_flight: None,
            next_ticket: 1,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded_count
    }

    pub fn cursor(&self) -> LoadCursor {
        LoadCursor {
            loaded_count: self.loaded_count,
            has_more: self.has_more,
            is_loading: self.is_loading(),
        }
    }

    /// Ticket of the outstanding request issued by this controller.
    pub fn in_flight(&self) -> Option<LoadTicket> {
        self.in_flight.and_then(|f| f.ticket)
    }

    fn set_phase(&mut self, phase: LoadPhase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, loaded = self.loaded_count, "Pagination phase changed");
            self.phase = phase;
        }
    }

    fn settle(&mut self) {
        self.in_flight = None;
        let next = if self.has_more {
            LoadPhase::Idle
        } else {
            LoadPhase::Exhausted
        };
        self.set_phase(next);
    }

    /// Runs the trigger check after a window recomputation.
    ///
    /// `frontier` is the last materialized row index. Returns a ticket when
    /// the caller must invoke the load-more collaborator; the controller is
    /// then `Loading` until `complete` or `fail` is called with that ticket.
    pub fn check(&mut self, frontier: Option<usize>, loaded_count: usize) -> Option<LoadTicket> {
        self.loaded_count = loaded_count;

        match self.phase {
            LoadPhase::Exhausted => return None,
            LoadPhase::Loading => {
                trace!(?frontier, "Load in flight, trigger suppressed");
                return None;
            }
            LoadPhase::Idle => {}
        }

        if !self.has_more {
            self.set_phase(LoadPhase::Exhausted);
            return None;
        }

        let near_end = match frontier {
            Some(last) => last >= loaded_count.saturating_sub(self.threshold),
            None => loaded_count == 0,
        };
        if !near_end {
            return None;
        }

        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(InFlight {
            ticket: Some(ticket),
            seen_loading: false,
        });
        self.set_phase(LoadPhase::Loading);
        info!(ticket = ticket.0, ?frontier, loaded = loaded_count, "Requesting more photos");
        Some(ticket)
    }

    /// Records a finished load that appended `appended` rows.
    ///
    /// Returns false for a ticket that is not the outstanding one.
    pub fn complete(&mut self, ticket: LoadTicket, appended: usize, has_more: bool) -> bool {
        if self.in_flight() != Some(ticket) {
            warn!(ticket = ticket.0, "Ignoring completion of a load that is not in flight");
            return false;
        }
        self.loaded_count += appended;
        self.has_more = has_more;
        info!(ticket = ticket.0, appended, has_more, loaded = self.loaded_count, "Load finished");
        self.settle();
        true
    }

    /// Records a failed load. Rows and `has_more` are left untouched.
    pub fn fail(&mut self, ticket: LoadTicket, error: &LoadError) -> bool {
        if self.in_flight() != Some(ticket) {
            warn!(ticket = ticket.0, "Ignoring failure of a load that is not in flight");
            return false;
        }
        warn!(ticket = ticket.0, error = ?error, "Load failed; will retry on next scroll");
        self.settle();
        true
    }

    /// Reconciles with flags reported by the host.
    ///
    /// A host-reported `is_loading` puts the controller into `Loading` without
    /// issuing a request; a load finishes from the host's side once it has
    /// been seen loading and then reports `is_loading = false`.
    pub fn observe(&mut self, props: LoadProps) {
        self.loaded_count = props.loaded_count;
        if self.phase == LoadPhase::Exhausted {
            return;
        }
        self.has_more = props.has_more;

        match self.phase {
            LoadPhase::Exhausted => {}
            LoadPhase::Idle => {
                if props.is_loading {
                    self.in_flight = Some(InFlight {
                        ticket: None,
                        seen_loading: true,
                    });
                    self.set_phase(LoadPhase::Loading);
                } else if !props.has_more {
                    self.set_phase(LoadPhase::Exhausted);
                }
            }
            LoadPhase::Loading => {
                let Some(flight) = self.in_flight.as_mut() else {
                    self.settle();
                    return;
                };
                if props.is_loading {
                    flight.seen_loading = true;
                } else if flight.seen_loading {
                    self.settle();
                }
            }
        }
    }

    /// Starts over with a new row set.
    pub fn reset(&mut self, loaded_count: usize, has_more: bool) {
        self.loaded_count = loaded_count;
        self.has_more = has_more;
        self.settle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers_near_end() {
        let mut pager = PaginationController::new(PREFETCH_THRESHOLD, 50, true);
        assert_eq!(pager.check(Some(20), 50), None);
        assert_eq!(pager.check(Some(39), 50), None);
        let ticket = pager.check(Some(40), 50);
        assert!(ticket.is_some());
        assert_eq!(pager.phase(), LoadPhase::Loading);
        assert!(pager.cursor().is_loading);
    }

    #[test]
    fn test_single_flight() {
        let mut pager = PaginationController::new(PREFETCH_THRESHOLD, 50, true);
        let first = pager.check(Some(49), 50);
        let second = pager.check(Some(49), 50);
        assert!(first.is_some());
        assert_eq!(second, None);
        assert_eq!(pager.in_flight(), first);
    }

    #[test]
    fn test_completion_returns_to_idle() {
        let mut pager = PaginationController::new(PREFETCH_THRESHOLD, 50, true);
        let ticket = pager.check(Some(49), 50).unwrap();
        assert!(pager.complete(ticket, 50, true));
        assert_eq!(pager.phase(), LoadPhase::Idle);
        assert_eq!(pager.loaded_count(), 100);
        assert_eq!(pager.in_flight(), None);
        // Frontier is now far from the end.
        assert_eq!(pager.check(Some(59), 100), None);
    }

    #[test]
    fn test_exhaustion_is_terminal() {
        let mut pager = PaginationController::new(PREFETCH_THRESHOLD, 950, true);
        let ticket = pager.check(Some(949), 950).unwrap();
        pager.complete(ticket, 50, false);
        assert_eq!(pager.phase(), LoadPhase::Exhausted);

        for frontier in [0usize, 990, 999, 5000] {
            assert_eq!(pager.check(Some(frontier), 1000), None);
        }
        pager.observe(LoadProps {
            loaded_count: 1000,
            has_more: true,
            is_loading: false,
        });
        assert_eq!(pager.check(Some(999), 1000), None);
        assert_eq!(
            pager.cursor(),
            LoadCursor {
                loaded_count: 1000,
                has_more: false,
                is_loading: false,
            }
        );
    }

    #[test]
    fn test_failure_returns_to_idle_and_allows_retry() {
        let mut pager = PaginationController::new(PREFETCH_THRESHOLD, 50, true);
        let ticket = pager.check(Some(49), 50).unwrap();
        assert!(pager.fail(ticket, &LoadError::Source("timeout".into())));
        assert_eq!(pager.phase(), LoadPhase::Idle);
        assert_eq!(pager.loaded_count(), 50);
        assert!(pager.cursor().has_more);

        let retry = pager.check(Some(49), 50).unwrap();
        assert_ne!(retry, ticket);
    }

    #[test]
    fn test_stale_ticket_ignored() {
        let mut pager = PaginationController::new(PREFETCH_THRESHOLD, 50, true);
        let first = pager.check(Some(49), 50).unwrap();
        pager.fail(first, &LoadError::Aborted);
        let second = pager.check(Some(49), 50).unwrap();

        assert!(!pager.complete(first, 50, true));
        assert_eq!(pager.phase(), LoadPhase::Loading);
        assert!(pager.complete(second, 50, true));
        assert_eq!(pager.loaded_count(), 100);
    }

    #[test]
    fn test_empty_table_requests_first_page() {
        let mut pager = PaginationController::new(PREFETCH_THRESHOLD, 0, true);
        assert!(pager.check(None, 0).is_some());

        let mut idle = PaginationController::new(PREFETCH_THRESHOLD, 50, true);
        assert_eq!(idle.check(None, 50), None);
    }

    #[test]
    fn test_no_more_from_start() {
        let mut pager = PaginationController::new(PREFETCH_THRESHOLD, 10, false);
        assert_eq!(pager.phase(), LoadPhase::Exhausted);
        assert_eq!(pager.check(Some(9), 10), None);
    }

    #[test]
    fn test_observe_external_loading() {
        let mut pager = PaginationController::new(PREFETCH_THRESHOLD, 50, true);

        // Host starts a load on its own; triggers are suppressed.
        pager.observe(LoadProps {
            loaded_count: 50,
            has_more: true,
            is_loading: true,
        });
        assert_eq!(pager.phase(), LoadPhase::Loading);
        assert_eq!(pager.check(Some(49), 50), None);

        // Host reports completion with more rows.
        pager.observe(LoadProps {
            loaded_count: 100,
            has_more: true,
            is_loading: false,
        });
        assert_eq!(pager.phase(), LoadPhase::Idle);
        assert_eq!(pager.loaded_count(), 100);
    }

    #[test]
    fn test_observe_waits_for_host_to_catch_up() {
        let mut pager = PaginationController::new(PREFETCH_THRESHOLD, 50, true);
        let ticket = pager.check(Some(49), 50).unwrap();

        // Props from before the host saw the request must not end the load.
        pager.observe(LoadProps {
            loaded_count: 50,
            has_more: true,
            is_loading: false,
        });
        assert_eq!(pager.phase(), LoadPhase::Loading);

        pager.observe(LoadProps {
            loaded_count: 50,
            has_more: true,
            is_loading: true,
        });
        pager.observe(LoadProps {
            loaded_count: 100,
            has_more: false,
            is_loading: false,
        });
        assert_eq!(pager.phase(), LoadPhase::Exhausted);
        assert!(!pager.complete(ticket, 0, false));
    }

    #[test]
    fn test_reset_reopens() {
        let mut pager = PaginationController::new(PREFETCH_THRESHOLD, 100, false);
        pager.reset(0, true);
        assert_eq!(pager.phase(), LoadPhase::Idle);
        assert!(pager.check(None, 0).is_some());
    }
}
