//! Child ring lifecycle: `Closed → Spawning → Opening → Open → Closing → Closed`.
//!
//! At most one child ring exists at a time. Opening a submenu for another
//! parent closes and disposes the current child first; the replacement is
//! only constructed after disposal. A close requested while Opening is
//! queued and runs as soon as the show transition finishes.

use crate::animation::{AnimTarget, TweenFrame, TweenId, TweenRequest};
use crate::error::{Outcome, Rejection};
use crate::guard::{Generation, GuardState, LockKind};
use crate::ring::{Owner, Ring, RingId};
use crate::session::SessionContext;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, StrumDisplay)]
pub enum SubmenuPhase {
    #[default]
    Closed,
    /// Accepted, child ring not built yet.
    Spawning,
    Opening,
    Open,
    Closing,
}

/// What changed, for the session to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmenuEvent {
    Constructed(RingId),
    Opened(RingId),
    Disposed(RingId),
}

struct SpawnRequest<T> {
    parent: usize,
    items: Vec<T>,
}

pub struct SubmenuLifecycle<T> {
    host: RingId,
    phase: SubmenuPhase,
    parent: Option<usize>,
    child: Option<Ring<T>>,
    spawn: Option<SpawnRequest<T>>,
    queued_open: Option<SpawnRequest<T>>,
    close_queued: bool,
    spawning: bool,
    lock: Option<Generation>,
    transition: Option<TweenId>,
    last_ring: RingId,
    disposals: usize,
}

impl<T> SubmenuLifecycle<T> {
    pub fn new(host: RingId) -> Self {
        Self {
            host,
            phase: SubmenuPhase::Closed,
            parent: None,
            child: None,
            spawn: None,
            queued_open: None,
            close_queued: false,
            spawning: false,
            lock: None,
            transition: None,
            last_ring: host,
            disposals: 0,
        }
    }

    pub fn phase(&self) -> SubmenuPhase {
        self.phase
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn child(&self) -> Option<&Ring<T>> {
        self.child.as_ref()
    }

    pub fn child_mut(&mut self) -> Option<&mut Ring<T>> {
        self.child.as_mut()
    }

    /// Whether input must go to the child instead of the host ring.
    pub fn owns_input(&self) -> bool {
        self.child.is_some()
    }

    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    pub fn disposals(&self) -> usize {
        self.disposals
    }

    pub fn open(&mut self, ctx: &mut SessionContext<T>, parent: usize, items: Vec<T>) -> Outcome {
        if self.spawning {
            log::debug!("submenu spawn for parent {:?} still pending", self.parent);
            return Outcome::Rejected(Rejection::Busy(ctx.guard.state()));
        }
        if items.is_empty() {
            return Outcome::Rejected(Rejection::EmptyRing);
        }
        let request = SpawnRequest { parent, items };

        match self.phase {
            SubmenuPhase::Opening | SubmenuPhase::Open if self.parent == Some(parent) => {
                // the newest request wins over a close queued behind the show
                if self.close_queued {
                    log::debug!("queued close of parent {parent} cancelled by reopen");
                }
                self.close_queued = false;
                self.queued_open = None;
                log::debug!("submenu for parent {parent} already {}", self.phase);
            }
            SubmenuPhase::Closed | SubmenuPhase::Spawning => {
                let Some(generation) =
                    ctx.guard
                        .acquire(LockKind::Transitioning, self.host, Some(parent))
                else {
                    return Outcome::Rejected(ctx.guard.busy());
                };
                self.lock = Some(generation);
                self.begin_spawn(request);
            }
            SubmenuPhase::Opening => {
                log::debug!("parent {parent} queued behind opening submenu");
                self.close_queued = true;
                self.queued_open = Some(request);
            }
            SubmenuPhase::Open => {
                let Some(generation) = self.acquire_transition(ctx, Some(parent)) else {
                    return Outcome::Rejected(ctx.guard.busy());
                };
                self.lock = Some(generation);
                self.queued_open = Some(request);
                self.begin_close(ctx);
            }
            SubmenuPhase::Closing => {
                log::debug!("parent {parent} queued behind closing submenu");
                self.queued_open = Some(request);
            }
        }
        Outcome::Accepted
    }

    pub fn close(
        &mut self,
        ctx: &mut SessionContext<T>,
        immediate: bool,
    ) -> (Outcome, Option<SubmenuEvent>) {
        match self.phase {
            SubmenuPhase::Closed => {
                log::debug!("close ignored, no submenu open");
                (Outcome::Accepted, None)
            }
            SubmenuPhase::Spawning => {
                log::debug!("submenu spawn for parent {:?} cancelled", self.parent);
                self.spawn = None;
                self.spawning = false;
                self.queued_open = None;
                self.parent = None;
                self.finish_closed(ctx);
                (Outcome::Accepted, None)
            }
            SubmenuPhase::Opening | SubmenuPhase::Closing if !immediate => {
                // an explicit close overrides any replacement waiting its turn
                self.queued_open = None;
                if self.phase == SubmenuPhase::Opening {
                    log::debug!("close queued until submenu finishes opening");
                    self.close_queued = true;
                }
                (Outcome::Accepted, None)
            }
            SubmenuPhase::Opening | SubmenuPhase::Closing => {
                self.queued_open = None;
                self.close_queued = false;
                let disposed = self.dispose(ctx);
                self.finish_closed(ctx);
                (Outcome::Accepted, disposed.map(SubmenuEvent::Disposed))
            }
            SubmenuPhase::Open if immediate => {
                if let Some(ring) = self.child.as_ref().map(Ring::id)
                    && let Some(generation) = ctx.guard.release_ring(ring)
                {
                    log::debug!("{generation} abandoned by immediate close of {ring}");
                }
                let disposed = self.dispose(ctx);
                self.phase = SubmenuPhase::Closed;
                (Outcome::Accepted, disposed.map(SubmenuEvent::Disposed))
            }
            SubmenuPhase::Open => {
                let Some(generation) = self.acquire_transition(ctx, self.parent) else {
                    return (Outcome::Rejected(ctx.guard.busy()), None);
                };
                self.lock = Some(generation);
                self.begin_close(ctx);
                (Outcome::Accepted, None)
            }
        }
    }

    /// Builds a pending child ring. Called once per frame.
    pub fn advance(&mut self, ctx: &mut SessionContext<T>) -> Option<SubmenuEvent> {
        if self.phase != SubmenuPhase::Spawning {
            return None;
        }
        let SpawnRequest { parent, items } = self.spawn.take()?;

        let id = self.last_ring.next();
        self.last_ring = id;
        let owner = Owner::Submenu { parent };
        let ring = Ring::new(id, owner, items, &ctx.tuning);

        ctx.renderer.ring_created(id, owner, &ring.angles());
        ctx.renderer.apply_transform(id, ring.rotation.rotation());
        ctx.renderer.apply_visibility(id, 0.0);
        self.transition = Some(ctx.animator.animate(TweenRequest {
            target: AnimTarget::Visibility(id),
            from: 0.0,
            to: 1.0,
            duration: ctx.tuning.submenu_show,
            easing: ctx.tuning.rotate_easing,
        }));

        log::info!("submenu {id} constructed for parent {parent} ({} items)", ring.len());
        self.child = Some(ring);
        self.spawning = false;
        self.phase = SubmenuPhase::Opening;
        Some(SubmenuEvent::Constructed(id))
    }

    /// Handles a visibility frame. Frames for other rings or superseded
    /// transitions are ignored.
    pub fn on_frame(&mut self, ctx: &mut SessionContext<T>, frame: &TweenFrame) -> Option<SubmenuEvent> {
        let id = self.child.as_ref().map(Ring::id)?;
        if frame.target != AnimTarget::Visibility(id) || self.transition != Some(frame.id) {
            log::trace!("stale visibility frame {} for {}", frame.id, frame.target.ring());
            return None;
        }

        ctx.renderer.apply_visibility(id, frame.value);
        if !frame.finished {
            return None;
        }
        self.transition = None;

        match self.phase {
            SubmenuPhase::Opening if self.close_queued => {
                self.close_queued = false;
                self.begin_close(ctx);
                None
            }
            SubmenuPhase::Opening => {
                self.phase = SubmenuPhase::Open;
                self.release_lock(ctx);
                log::debug!("submenu {id} open");
                Some(SubmenuEvent::Opened(id))
            }
            SubmenuPhase::Closing => {
                self.dispose(ctx);
                match self.queued_open.take() {
                    Some(request) => self.begin_spawn(request),
                    None => self.finish_closed(ctx),
                }
                Some(SubmenuEvent::Disposed(id))
            }
            _ => None,
        }
    }

    /// Takes the Transitioning lock for leaving an open child. A scroll or
    /// drag still settling on the child is abandoned; anything else blocks.
    fn acquire_transition(
        &self,
        ctx: &mut SessionContext<T>,
        parent: Option<usize>,
    ) -> Option<Generation> {
        if ctx.guard.state() == GuardState::Scrolling
            && let Some(child) = self.child.as_ref().map(Ring::id)
            && let Some(generation) = ctx.guard.release_ring(child)
        {
            log::debug!("{generation} scrolling the submenu abandoned for transition");
        }
        ctx.guard.acquire(LockKind::Transitioning, self.host, parent)
    }

    fn begin_spawn(&mut self, request: SpawnRequest<T>) {
        log::debug!("submenu spawn accepted for parent {}", request.parent);
        self.parent = Some(request.parent);
        self.spawn = Some(request);
        self.spawning = true;
        self.phase = SubmenuPhase::Spawning;
    }

    fn begin_close(&mut self, ctx: &mut SessionContext<T>) {
        let Some(id) = self.child.as_ref().map(Ring::id) else {
            return;
        };
        let target = AnimTarget::Visibility(id);
        ctx.animator.cancel_animations(target);
        self.transition = Some(ctx.animator.animate(TweenRequest {
            target,
            from: 1.0,
            to: 0.0,
            duration: ctx.tuning.submenu_hide,
            easing: ctx.tuning.rotate_easing,
        }));
        self.phase = SubmenuPhase::Closing;
        log::debug!("submenu {id} closing");
    }

    /// Tears down the child ring and every animation that references it.
    fn dispose(&mut self, ctx: &mut SessionContext<T>) -> Option<RingId> {
        let mut ring = self.child.take()?;
        let id = ring.id();

        ctx.animator.cancel_animations(AnimTarget::Rotation(id));
        ctx.animator.cancel_animations(AnimTarget::Visibility(id));
        for index in 0..ring.len() {
            ctx.animator.cancel_animations(AnimTarget::Highlight(id, index));
        }
        ring.rotation.abandon_tween();
        ctx.renderer.ring_disposed(id);

        self.transition = None;
        self.parent = None;
        self.disposals += 1;
        log::info!("submenu {id} disposed");
        Some(id)
    }

    fn finish_closed(&mut self, ctx: &mut SessionContext<T>) {
        self.phase = SubmenuPhase::Closed;
        self.release_lock(ctx);
    }

    fn release_lock(&mut self, ctx: &mut SessionContext<T>) {
        if let Some(generation) = self.lock.take() {
            ctx.guard.release(generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Animator;
    use crate::testing::{Draw, RecordingAnimator, RecordingContent, RecordingRenderer};
    use crate::tuning::Tuning;
    use std::time::Duration;

    struct Harness {
        ctx: SessionContext<&'static str>,
        lifecycle: SubmenuLifecycle<&'static str>,
        animator: RecordingAnimator,
        renderer: RecordingRenderer,
    }

    impl Harness {
        fn new() -> Self {
            let animator = RecordingAnimator::default();
            let renderer = RecordingRenderer::default();
            let ctx = SessionContext::new(
                Box::new(animator.clone()),
                Box::new(renderer.clone()),
                Box::new(RecordingContent::default()),
                Tuning::default(),
            );
            Self {
                ctx,
                lifecycle: SubmenuLifecycle::new(RingId::MAIN),
                animator,
                renderer,
            }
        }

        /// One frame: deliver tween completions, then build pending rings.
        fn frame(&mut self) -> Vec<SubmenuEvent> {
            let mut events = Vec::new();
            for frame in self.ctx.animator.advance(Duration::from_millis(16)) {
                events.extend(self.lifecycle.on_frame(&mut self.ctx, &frame));
            }
            events.extend(self.lifecycle.advance(&mut self.ctx));
            events
        }

        fn settle(&mut self) -> Vec<SubmenuEvent> {
            (0..8).flat_map(|_| self.frame()).collect()
        }

        fn open(&mut self, parent: usize) -> Outcome {
            self.lifecycle.open(&mut self.ctx, parent, vec!["a", "b", "c"])
        }
    }

    #[test]
    fn test_open_then_close() {
        let mut h = Harness::new();
        assert!(h.open(1).is_accepted());
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Spawning);
        assert_eq!(h.ctx.guard.state(), GuardState::Transitioning);

        let events = h.settle();
        let child = RingId::MAIN.next();
        assert_eq!(
            events,
            vec![SubmenuEvent::Constructed(child), SubmenuEvent::Opened(child)]
        );
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Open);
        assert!(h.lifecycle.owns_input());
        assert!(!h.ctx.guard.is_locked());
        assert_eq!(h.renderer.visibility(child), Some(1.0));

        let (outcome, event) = h.lifecycle.close(&mut h.ctx, false);
        assert!(outcome.is_accepted());
        assert_eq!(event, None);
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Closing);
        assert!(h.lifecycle.owns_input());

        assert_eq!(h.settle(), vec![SubmenuEvent::Disposed(child)]);
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Closed);
        assert!(!h.lifecycle.owns_input());
        assert!(!h.ctx.guard.is_locked());
    }

    #[test]
    fn test_rapid_second_open_rejected_while_spawning() {
        let mut h = Harness::new();
        assert!(h.open(1).is_accepted());
        assert!(!h.open(3).is_accepted());

        h.settle();
        assert_eq!(h.lifecycle.parent(), Some(1));
        let created = h
            .renderer
            .draws()
            .into_iter()
            .filter(|d| matches!(d, Draw::Created(..)))
            .count();
        assert_eq!(created, 1);
    }

    #[test]
    fn test_switching_parent_disposes_before_constructing() {
        let mut h = Harness::new();
        h.open(1);
        h.settle();
        let first = RingId::MAIN.next();

        assert!(h.open(3).is_accepted());
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Closing);
        h.settle();

        let second = first.next();
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Open);
        assert_eq!(h.lifecycle.parent(), Some(3));
        assert_eq!(h.lifecycle.child().map(Ring::id), Some(second));
        assert_eq!(h.lifecycle.disposals(), 1);

        let lifecycle: Vec<_> = h
            .renderer
            .draws()
            .into_iter()
            .filter(|d| matches!(d, Draw::Created(..) | Draw::Disposed(_)))
            .collect();
        assert_eq!(
            lifecycle,
            vec![
                Draw::Created(first, Owner::Submenu { parent: 1 }),
                Draw::Disposed(first),
                Draw::Created(second, Owner::Submenu { parent: 3 }),
            ]
        );
        assert!(!h.ctx.guard.is_locked());
    }

    #[test]
    fn test_open_during_opening_queues_replacement() {
        let mut h = Harness::new();
        h.open(1);
        h.frame(); // constructed, show tween running
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Opening);

        assert!(h.open(3).is_accepted());
        h.settle();

        assert_eq!(h.lifecycle.parent(), Some(3));
        assert_eq!(h.lifecycle.disposals(), 1);
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Open);
    }

    #[test]
    fn test_close_during_opening_runs_after_open_completes() {
        let mut h = Harness::new();
        h.open(2);
        h.frame();
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Opening);

        let (outcome, _) = h.lifecycle.close(&mut h.ctx, false);
        assert!(outcome.is_accepted());
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Opening);

        h.settle();
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Closed);
        assert_eq!(h.lifecycle.disposals(), 1);
        assert!(!h.ctx.guard.is_locked());
    }

    #[test]
    fn test_reopen_same_parent_cancels_queued_close() {
        let mut h = Harness::new();
        h.open(2);
        h.frame();
        h.lifecycle.close(&mut h.ctx, false);
        assert!(h.open(2).is_accepted());

        h.settle();
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Open);
        assert_eq!(h.lifecycle.parent(), Some(2));
        assert_eq!(h.lifecycle.disposals(), 0);
        assert!(!h.ctx.guard.is_locked());
    }

    #[test]
    fn test_close_from_open_takes_over_child_scroll() {
        let mut h = Harness::new();
        h.open(1);
        h.settle();
        let child = RingId::MAIN.next();
        h.ctx.guard.acquire(LockKind::Scrolling, child, Some(1)).unwrap();

        let (outcome, _) = h.lifecycle.close(&mut h.ctx, false);
        assert!(outcome.is_accepted());
        assert_eq!(h.ctx.guard.state(), GuardState::Transitioning);
        h.settle();
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Closed);
        assert!(!h.ctx.guard.is_locked());
    }

    #[test]
    fn test_close_from_open_still_waits_for_child_selection() {
        let mut h = Harness::new();
        h.open(1);
        h.settle();
        let child = RingId::MAIN.next();
        h.ctx.guard.lock_selection(child, 2).unwrap();

        let (outcome, _) = h.lifecycle.close(&mut h.ctx, false);
        assert_eq!(outcome, Outcome::Rejected(Rejection::Busy(GuardState::Selecting)));
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Open);
    }

    #[test]
    fn test_immediate_close_disposes_synchronously() {
        let mut h = Harness::new();
        h.open(0);
        h.settle();
        let child = RingId::MAIN.next();

        let (outcome, event) = h.lifecycle.close(&mut h.ctx, true);
        assert!(outcome.is_accepted());
        assert_eq!(event, Some(SubmenuEvent::Disposed(child)));
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Closed);
        assert_eq!(h.animator.running(AnimTarget::Visibility(child)), 0);

        // closing again is a no-op
        let (outcome, event) = h.lifecycle.close(&mut h.ctx, true);
        assert!(outcome.is_accepted());
        assert_eq!(event, None);
        assert_eq!(h.lifecycle.disposals(), 1);
    }

    #[test]
    fn test_immediate_close_frees_child_selection_lock() {
        let mut h = Harness::new();
        h.open(0);
        h.settle();
        let child = RingId::MAIN.next();
        h.ctx.guard.lock_selection(child, 1).unwrap();

        h.lifecycle.close(&mut h.ctx, true);
        assert!(!h.ctx.guard.is_locked());
    }

    #[test]
    fn test_close_while_spawning_cancels() {
        let mut h = Harness::new();
        h.open(4);
        let (outcome, event) = h.lifecycle.close(&mut h.ctx, false);
        assert!(outcome.is_accepted());
        assert_eq!(event, None);
        assert!(h.settle().is_empty());
        assert!(h.renderer.draws().is_empty());
        assert!(!h.ctx.guard.is_locked());
    }

    #[test]
    fn test_open_rejected_while_guard_busy() {
        let mut h = Harness::new();
        h.ctx.guard.lock_selection(RingId::MAIN, 0).unwrap();
        assert_eq!(
            h.open(1),
            Outcome::Rejected(Rejection::Busy(GuardState::Selecting))
        );
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Closed);
    }

    #[test]
    fn test_empty_items_rejected() {
        let mut h = Harness::new();
        assert_eq!(
            h.lifecycle.open(&mut h.ctx, 1, Vec::new()),
            Outcome::Rejected(Rejection::EmptyRing)
        );
    }

    #[test]
    fn test_stale_visibility_frame_ignored() {
        let mut h = Harness::new();
        h.open(1);
        h.frame();
        let child = RingId::MAIN.next();
        let stale = TweenFrame {
            id: TweenId::from(999),
            target: AnimTarget::Visibility(child),
            value: 1.0,
            finished: true,
        };
        assert_eq!(h.lifecycle.on_frame(&mut h.ctx, &stale), None);
        assert_eq!(h.lifecycle.phase(), SubmenuPhase::Opening);
    }
}
