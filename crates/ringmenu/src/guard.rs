//! Mutual exclusion for everything that rewrites a ring's selection.
//!
//! One [`SelectionGuard`] is shared by the main ring and any submenu ring. A
//! lock is identified by a [`Generation`]; completions carrying an older
//! generation than the current holder are stale and cannot release or commit.

use crate::error::{Outcome, Rejection};
use crate::ring::RingId;
use derive_more::{Display, From, Into};
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("gen{_0}")]
pub struct Generation(u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, StrumDisplay)]
pub enum GuardState {
    #[default]
    Idle,
    Scrolling,
    Selecting,
    Transitioning,
}

/// The kind of lock an operation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    /// Superseding: a new scroll replaces a running one.
    Scrolling,
    Selecting,
    Transitioning,
}

impl From<LockKind> for GuardState {
    fn from(kind: LockKind) -> Self {
        match kind {
            LockKind::Scrolling => Self::Scrolling,
            LockKind::Selecting => Self::Selecting,
            LockKind::Transitioning => Self::Transitioning,
        }
    }
}

#[derive(Debug, Default)]
pub struct SelectionGuard {
    state: GuardState,
    held_by: Option<Generation>,
    locked_index: Option<usize>,
    locked_ring: Option<RingId>,
    issued: u64,
}

impl SelectionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn held_by(&self) -> Option<Generation> {
        self.held_by
    }

    pub fn locked_index(&self) -> Option<usize> {
        self.locked_index
    }

    pub fn locked_ring(&self) -> Option<RingId> {
        self.locked_ring
    }

    pub fn is_locked(&self) -> bool {
        self.held_by.is_some()
    }

    pub fn is_held_by(&self, generation: Generation) -> bool {
        self.held_by == Some(generation)
    }

    fn is_exclusive(&self) -> bool {
        matches!(self.state, GuardState::Selecting | GuardState::Transitioning)
    }

    pub fn can_scroll(&self) -> bool {
        !self.is_exclusive()
    }

    pub fn can_select(&self) -> bool {
        !self.is_locked()
    }

    /// Highlight writes are blocked during a selection or transition, except
    /// for the holder finalizing its own result.
    pub fn can_update_highlight(&self, finalizing: Option<Generation>) -> bool {
        !self.is_exclusive() || (finalizing.is_some() && finalizing == self.held_by)
    }

    /// Takes a Selecting lock on `index`. Fails silently while any lock is held.
    pub fn lock_selection(&mut self, ring: RingId, index: usize) -> Option<Generation> {
        self.acquire(LockKind::Selecting, ring, Some(index))
    }

    pub fn acquire(
        &mut self,
        kind: LockKind,
        ring: RingId,
        index: Option<usize>,
    ) -> Option<Generation> {
        let allowed = match kind {
            LockKind::Scrolling => matches!(self.state, GuardState::Idle | GuardState::Scrolling),
            LockKind::Selecting | LockKind::Transitioning => !self.is_locked(),
        };
        if !allowed {
            log::debug!(
                "guard busy: {:?} requested while {} held by {:?}",
                kind,
                self.state,
                self.held_by
            );
            return None;
        }

        self.issued += 1;
        let generation = Generation(self.issued);
        if let Some(previous) = self.held_by {
            log::trace!("{previous} superseded by {generation}");
        }
        self.state = kind.into();
        self.held_by = Some(generation);
        self.locked_index = index;
        self.locked_ring = Some(ring);
        Some(generation)
    }

    /// Clears the lock if `generation` still holds it.
    pub fn release(&mut self, generation: Generation) -> bool {
        if !self.is_held_by(generation) {
            log::trace!("ignoring release from stale {generation}");
            return false;
        }
        self.state = GuardState::Idle;
        self.held_by = None;
        self.locked_index = None;
        self.locked_ring = None;
        true
    }

    /// Releases whatever lock targets `ring`, used when the ring is disposed
    /// under an operation that can no longer finish.
    pub fn release_ring(&mut self, ring: RingId) -> Option<Generation> {
        let generation = self.held_by.filter(|_| self.locked_ring == Some(ring))?;
        self.release(generation);
        Some(generation)
    }

    pub(crate) fn busy(&self) -> Rejection {
        Rejection::Busy(self.state)
    }
}

/// Everything a selection commits once its work is truly done.
#[must_use = "a Finish must be run or parked, otherwise the lock is force-released"]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finish {
    pub generation: Generation,
    pub kind: LockKind,
    pub ring: RingId,
    pub index: usize,
    pub target_rotation: f64,
}

impl Finish {
    /// Commits and releases. Returns false for a stale finish, which touches
    /// nothing.
    pub fn run<H: LockHost + ?Sized>(self, host: &mut H) -> bool {
        if !host.guard().is_held_by(self.generation) {
            log::trace!("stale finish for {} on {}", self.generation, self.ring);
            return false;
        }
        host.commit(&self);
        host.guard_mut().release(self.generation);
        host.after_release(&self);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockRequest {
    pub kind: LockKind,
    pub ring: RingId,
    pub index: usize,
    pub target_rotation: f64,
}

/// Owner of a guard and of the state a [`Finish`] commits into.
pub trait LockHost {
    fn guard(&self) -> &SelectionGuard;

    fn guard_mut(&mut self) -> &mut SelectionGuard;

    /// Writes the final `current_index`, target rotation and highlight.
    fn commit(&mut self, finish: &Finish);

    /// Runs after the lock is gone, e.g. to notify content.
    fn after_release(&mut self, _finish: &Finish) {}

    /// Whether a finish for `generation` is stored and will run later.
    fn is_parked(&self, _generation: Generation) -> bool {
        false
    }
}

/// Acquires the lock described by `request` and hands the action a
/// [`Finish`] to run at the real end of its work, possibly frames later.
///
/// If the action fails, or returns without running or parking its finish,
/// the lock is released here so it can never leak.
pub fn with_selection_lock<H, F, E>(
    host: &mut H,
    request: LockRequest,
    action: F,
) -> Result<Outcome, E>
where
    H: LockHost + ?Sized,
    F: FnOnce(&mut H, Finish) -> Result<(), E>,
{
    let Some(generation) = host
        .guard_mut()
        .acquire(request.kind, request.ring, Some(request.index))
    else {
        return Ok(Outcome::Rejected(host.guard().busy()));
    };

    let finish = Finish {
        generation,
        kind: request.kind,
        ring: request.ring,
        index: request.index,
        target_rotation: request.target_rotation,
    };

    match action(host, finish) {
        Ok(()) => {
            if host.guard().is_held_by(generation) && !host.is_parked(generation) {
                log::warn!("{generation} returned without finishing; releasing");
                host.guard_mut().release(generation);
            }
            Ok(Outcome::Accepted)
        }
        Err(e) => {
            host.guard_mut().release(generation);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RING: RingId = RingId::MAIN;

    #[derive(Default)]
    struct Host {
        guard: SelectionGuard,
        committed: Vec<usize>,
        released: Vec<usize>,
        parked: Option<Finish>,
    }

    impl LockHost for Host {
        fn guard(&self) -> &SelectionGuard {
            &self.guard
        }

        fn guard_mut(&mut self) -> &mut SelectionGuard {
            &mut self.guard
        }

        fn commit(&mut self, finish: &Finish) {
            assert!(self.guard.can_update_highlight(Some(finish.generation)));
            self.committed.push(finish.index);
        }

        fn after_release(&mut self, finish: &Finish) {
            assert!(!self.guard.is_locked());
            self.released.push(finish.index);
        }

        fn is_parked(&self, generation: Generation) -> bool {
            self.parked.is_some_and(|f| f.generation == generation)
        }
    }

    fn request(index: usize) -> LockRequest {
        LockRequest {
            kind: LockKind::Selecting,
            ring: RING,
            index,
            target_rotation: 0.0,
        }
    }

    #[test]
    fn test_second_lock_fails_until_release() {
        let mut guard = SelectionGuard::new();
        let first = guard.lock_selection(RING, 1).unwrap();
        assert_eq!(guard.lock_selection(RING, 2), None);
        assert_eq!(guard.locked_index(), Some(1));
        assert!(guard.release(first));
        assert!(guard.lock_selection(RING, 2).is_some());
    }

    #[test]
    fn test_can_scroll_only_false_while_exclusive() {
        let mut guard = SelectionGuard::new();
        assert!(guard.can_scroll());

        let scroll = guard.acquire(LockKind::Scrolling, RING, None).unwrap();
        assert!(guard.can_scroll());
        assert!(!guard.can_select());
        guard.release(scroll);

        let select = guard.lock_selection(RING, 0).unwrap();
        assert!(!guard.can_scroll());
        guard.release(select);

        let transition = guard.acquire(LockKind::Transitioning, RING, None).unwrap();
        assert!(!guard.can_scroll());
        guard.release(transition);
        assert!(guard.can_scroll());
    }

    #[test]
    fn test_scroll_supersedes_scroll_but_not_selection() {
        let mut guard = SelectionGuard::new();
        let first = guard.acquire(LockKind::Scrolling, RING, None).unwrap();
        let second = guard.acquire(LockKind::Scrolling, RING, None).unwrap();
        assert_ne!(first, second);
        assert!(!guard.release(first));
        assert!(guard.is_held_by(second));
        guard.release(second);

        guard.lock_selection(RING, 0).unwrap();
        assert_eq!(guard.acquire(LockKind::Scrolling, RING, None), None);
    }

    #[test]
    fn test_stale_release_keeps_newer_lock() {
        let mut guard = SelectionGuard::new();
        let old = guard.lock_selection(RING, 0).unwrap();
        guard.release(old);
        let new = guard.lock_selection(RING, 3).unwrap();

        assert!(!guard.release(old));
        assert!(guard.is_held_by(new));
        assert_eq!(guard.state(), GuardState::Selecting);
    }

    #[test]
    fn test_highlight_blocked_except_for_holder() {
        let mut guard = SelectionGuard::new();
        assert!(guard.can_update_highlight(None));
        let held = guard.lock_selection(RING, 0).unwrap();
        assert!(!guard.can_update_highlight(None));
        assert!(guard.can_update_highlight(Some(held)));
        assert!(!guard.can_update_highlight(Some(Generation::from(999))));
    }

    #[test]
    fn test_release_ring_only_matches_locked_ring() {
        let mut guard = SelectionGuard::new();
        let child = RING.next();
        guard.lock_selection(child, 0).unwrap();
        assert_eq!(guard.release_ring(RING), None);
        assert!(guard.release_ring(child).is_some());
        assert!(!guard.is_locked());
    }

    #[test]
    fn test_synchronous_finish_commits_then_releases() {
        let mut host = Host::default();
        let outcome = with_selection_lock(&mut host, request(2), |host, finish| {
            assert!(finish.run(host));
            Ok::<_, ()>(())
        });
        assert_eq!(outcome, Ok(Outcome::Accepted));
        assert_eq!(host.committed, vec![2]);
        assert_eq!(host.released, vec![2]);
        assert!(!host.guard.is_locked());
    }

    #[test]
    fn test_failed_action_still_releases() {
        let mut host = Host::default();
        let outcome = with_selection_lock(&mut host, request(1), |host, _finish| {
            assert_eq!(host.guard.state(), GuardState::Selecting);
            Err("render backend gone")
        });
        assert_eq!(outcome, Err("render backend gone"));
        assert!(host.committed.is_empty());
        assert!(!host.guard.is_locked());
    }

    #[test]
    fn test_dropped_finish_is_released() {
        let mut host = Host::default();
        let outcome = with_selection_lock(&mut host, request(1), |_, _| Ok::<_, ()>(()));
        assert_eq!(outcome, Ok(Outcome::Accepted));
        assert!(!host.guard.is_locked());
    }

    #[test]
    fn test_parked_finish_holds_lock_until_run() {
        let mut host = Host::default();
        with_selection_lock(&mut host, request(4), |host, finish| {
            host.parked = Some(finish);
            Ok::<_, ()>(())
        })
        .unwrap();

        assert_eq!(host.guard.state(), GuardState::Selecting);
        let busy = with_selection_lock(&mut host, request(0), |_, _| Ok::<_, ()>(())).unwrap();
        assert_eq!(busy, Outcome::Rejected(Rejection::Busy(GuardState::Selecting)));

        let finish = host.parked.take().unwrap();
        assert!(finish.run(&mut host));
        assert_eq!(host.committed, vec![4]);
        assert!(!host.guard.is_locked());

        // running the same finish twice is a stale no-op
        assert!(!finish.run(&mut host));
        assert_eq!(host.committed, vec![4]);
    }
}
