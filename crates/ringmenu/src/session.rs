use crate::animation::{AnimTarget, Animator, TweenFrame, TweenId};
use crate::error::{Outcome, Rejection};
use crate::guard::{self, Finish, Generation, LockHost, LockKind, LockRequest, SelectionGuard};
use crate::highlight::HighlightController;
use crate::layout;
use crate::render::{ContentSink, Renderer};
use crate::ring::{Entry, Owner, Ring, RingId};
use crate::rotation::{RotateOptions, TickOutcome};
use crate::submenu::{SubmenuEvent, SubmenuLifecycle, SubmenuPhase};
use crate::tuning::Tuning;
use std::convert::Infallible;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// Collaborators and shared coordination state, owned by one session.
pub struct SessionContext<T> {
    pub animator: Box<dyn Animator>,
    pub renderer: Box<dyn Renderer>,
    pub content: Box<dyn ContentSink<T>>,
    pub guard: SelectionGuard,
    pub tuning: Tuning,
}

impl<T> SessionContext<T> {
    pub fn new(
        animator: Box<dyn Animator>,
        renderer: Box<dyn Renderer>,
        content: Box<dyn ContentSink<T>>,
        tuning: Tuning,
    ) -> Self {
        Self {
            animator,
            renderer,
            content,
            guard: SelectionGuard::new(),
            tuning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum KeyIntent {
    #[strum(to_string = "next", serialize = "right")]
    Next,
    #[strum(to_string = "previous", serialize = "prev", serialize = "left")]
    Previous,
    #[strum(to_string = "activate", serialize = "enter")]
    Activate,
    #[strum(to_string = "back", serialize = "escape")]
    Back,
}

struct Pending {
    tween: TweenId,
    finish: Finish,
}

/// One carousel: the main ring, at most one submenu ring, and the single
/// guard both share. Input always goes to the submenu ring while one exists.
pub struct Session<T: Entry> {
    ctx: SessionContext<T>,
    main: Ring<T>,
    submenu: SubmenuLifecycle<T>,
    highlight: HighlightController,
    pending: Option<Pending>,
    drag: Option<Generation>,
    clock: Duration,
    quiet_until: Duration,
}

impl<T: Entry> Session<T> {
    pub fn new(items: Vec<T>, mut ctx: SessionContext<T>) -> Self {
        let main = Ring::new(RingId::MAIN, Owner::Main, items, &ctx.tuning);
        ctx.renderer
            .ring_created(main.id(), main.owner(), &main.angles());
        ctx.renderer.apply_transform(main.id(), main.rotation.rotation());

        let mut session = Self {
            highlight: Self::highlight_for(&ctx.tuning),
            ctx,
            main,
            submenu: SubmenuLifecycle::new(RingId::MAIN),
            pending: None,
            drag: None,
            clock: Duration::ZERO,
            quiet_until: Duration::ZERO,
        };
        session.highlight_current(RingId::MAIN);
        log::debug!("session started with {} entries", session.main.len());
        session
    }

    fn highlight_for(tuning: &Tuning) -> HighlightController {
        HighlightController::new(tuning.highlight_duration, tuning.rotate_easing)
    }

    pub fn main_ring(&self) -> &Ring<T> {
        &self.main
    }

    pub fn submenu_ring(&self) -> Option<&Ring<T>> {
        self.submenu.child()
    }

    pub fn submenu_phase(&self) -> SubmenuPhase {
        self.submenu.phase()
    }

    pub fn submenu_parent(&self) -> Option<usize> {
        self.submenu.parent()
    }

    pub fn submenu_disposals(&self) -> usize {
        self.submenu.disposals()
    }

    pub fn guard(&self) -> &SelectionGuard {
        &self.ctx.guard
    }

    pub fn tuning(&self) -> &Tuning {
        &self.ctx.tuning
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// The ring that currently receives scroll and tap input.
    pub fn active_ring(&self) -> &Ring<T> {
        self.submenu.child().unwrap_or(&self.main)
    }

    pub fn ring(&self, id: RingId) -> Option<&Ring<T>> {
        if id == RingId::MAIN {
            Some(&self.main)
        } else {
            self.submenu.child().filter(|r| r.id() == id)
        }
    }

    fn split(&mut self, id: RingId) -> Option<(&mut Ring<T>, &mut SessionContext<T>)> {
        let ring = if id == RingId::MAIN {
            Some(&mut self.main)
        } else {
            self.submenu.child_mut().filter(|r| r.id() == id)
        };
        ring.map(|r| (r, &mut self.ctx))
    }

    pub fn handle_scroll(&mut self, delta: i32) -> Outcome {
        self.scroll(delta).logged("scroll")
    }

    fn scroll(&mut self, delta: i32) -> Outcome {
        if delta == 0 {
            return Outcome::Accepted;
        }
        let ring = self.active_ring();
        if ring.is_empty() {
            return Outcome::Rejected(Rejection::EmptyRing);
        }
        if !self.ctx.guard.can_scroll() {
            return Outcome::Rejected(self.ctx.guard.busy());
        }

        let target = ring.rotation.target() - delta as f64 * layout::step(ring.len());
        let Some(index) = crate::front::front_index(target, &ring.angles()) else {
            return Outcome::Rejected(Rejection::EmptyRing);
        };
        let request = LockRequest {
            kind: LockKind::Scrolling,
            ring: ring.id(),
            index,
            target_rotation: target,
        };
        let options = self.ctx.tuning.rotate_options(true);

        guard::with_selection_lock(self, request, |session, finish| {
            session.drag = None;
            session.rotate_then_finish(finish, options)
        })
        .unwrap_or_else(|never| match never {})
    }

    pub fn handle_select(&mut self, index: usize) -> Outcome {
        self.select(index, self.ctx.tuning.animate_selection)
    }

    pub fn select(&mut self, index: usize, animate: bool) -> Outcome {
        self.try_select(index, animate).logged("select")
    }

    fn try_select(&mut self, index: usize, animate: bool) -> Outcome {
        let ring = self.active_ring();
        if ring.is_empty() {
            return Outcome::Rejected(Rejection::EmptyRing);
        }
        let Some(target) = ring.rotation_for(index) else {
            return Outcome::Rejected(Rejection::InvalidIndex {
                index,
                len: ring.len(),
            });
        };
        if !self.ctx.guard.can_select() {
            return Outcome::Rejected(self.ctx.guard.busy());
        }

        let request = LockRequest {
            kind: LockKind::Selecting,
            ring: ring.id(),
            index,
            target_rotation: target,
        };
        let options = self.ctx.tuning.rotate_options(animate);

        guard::with_selection_lock(self, request, |session, finish| {
            session.rotate_then_finish(finish, options)
        })
        .unwrap_or_else(|never| match never {})
    }

    /// Drags the active ring by `delta` radians. The damped tick follows the
    /// finger; once it settles the ring snaps to the front item.
    pub fn handle_drag(&mut self, delta: f64) -> Outcome {
        self.drag_by(delta).logged("drag")
    }

    fn drag_by(&mut self, delta: f64) -> Outcome {
        if !delta.is_finite() {
            return Outcome::Rejected(Rejection::NonFiniteDelta);
        }
        let id = self.active_ring().id();
        let Some((ring, ctx)) = self.split(id) else {
            return Outcome::Rejected(Rejection::EmptyRing);
        };
        if ring.is_empty() {
            return Outcome::Rejected(Rejection::EmptyRing);
        }
        let Some(generation) = ctx.guard.acquire(LockKind::Scrolling, id, None) else {
            return Outcome::Rejected(ctx.guard.busy());
        };

        ring.rotation
            .nudge_target(delta, AnimTarget::Rotation(id), ctx.animator.as_mut());
        self.pending = None;
        self.drag = Some(generation);
        Outcome::Accepted
    }

    pub fn handle_key(&mut self, intent: KeyIntent) -> Outcome {
        match intent {
            KeyIntent::Next => self.handle_scroll(1),
            KeyIntent::Previous => self.handle_scroll(-1),
            KeyIntent::Activate => match self.active_ring().current_index() {
                Some(index) => self.handle_select(index),
                None => Outcome::Rejected(Rejection::EmptyRing).logged("activate"),
            },
            KeyIntent::Back => self.close_submenu(false),
        }
    }

    pub fn open_submenu(&mut self, parent: usize, items: Vec<T>) -> Outcome {
        if parent >= self.main.len() {
            return Outcome::Rejected(Rejection::InvalidIndex {
                index: parent,
                len: self.main.len(),
            })
            .logged("open submenu");
        }
        let outcome = self.submenu.open(&mut self.ctx, parent, items);
        self.forget_abandoned();
        outcome.logged("open submenu")
    }

    pub fn close_submenu(&mut self, immediate: bool) -> Outcome {
        let (outcome, event) = self.submenu.close(&mut self.ctx, immediate);
        self.forget_abandoned();
        if let Some(event) = event {
            self.on_submenu_event(event);
        }
        outcome.logged("close submenu")
    }

    /// Drops a parked finish or drag whose lock a transition took over.
    fn forget_abandoned(&mut self) {
        let guard = &self.ctx.guard;
        if let Some(pending) = self
            .pending
            .take_if(|p| !guard.is_held_by(p.finish.generation))
        {
            log::debug!("pending finish of {} dropped", pending.finish.generation);
        }
        self.drag.take_if(|generation| !guard.is_held_by(*generation));
    }

    /// Advances one frame: tween samples and completions first, then pending
    /// submenu construction, damped ticks, and automatic front highlighting.
    pub fn frame(&mut self, dt: Duration) {
        self.clock += dt;

        for frame in self.ctx.animator.advance(dt) {
            self.dispatch(frame);
        }
        if let Some(event) = self.submenu.advance(&mut self.ctx) {
            self.on_submenu_event(event);
        }
        self.tick(RingId::MAIN, dt);
        if let Some(child) = self.submenu.child().map(Ring::id) {
            self.tick(child, dt);
        }
        self.auto_highlight();
        self.ctx.renderer.end_frame();
    }

    /// Replaces the menu, e.g. after a config reload. Any submenu is
    /// disposed and in-flight work on the main ring is abandoned.
    pub fn reload(&mut self, items: Vec<T>, tuning: Tuning) {
        self.close_submenu(true);
        self.pending = None;
        self.drag = None;
        if let Some(generation) = self.ctx.guard.release_ring(RingId::MAIN) {
            log::debug!("{generation} abandoned by reload");
        }

        let id = self.main.id();
        self.ctx.animator.cancel_animations(AnimTarget::Rotation(id));
        for index in 0..self.main.len() {
            self.ctx
                .animator
                .cancel_animations(AnimTarget::Highlight(id, index));
        }
        self.ctx.renderer.ring_disposed(id);

        self.ctx.tuning = tuning;
        self.highlight = Self::highlight_for(&self.ctx.tuning);
        self.main = Ring::new(id, Owner::Main, items, &self.ctx.tuning);
        self.ctx
            .renderer
            .ring_created(id, Owner::Main, &self.main.angles());
        self.ctx.renderer.apply_transform(id, 0.0);
        self.highlight_current(id);
        log::info!("menu reloaded with {} entries", self.main.len());
    }

    fn rotate_then_finish(&mut self, finish: Finish, options: RotateOptions) -> Result<(), Infallible> {
        let Some((ring, ctx)) = self.split(finish.ring) else {
            return Ok(());
        };
        let tween = ring.rotation.set_target(
            finish.target_rotation,
            options,
            AnimTarget::Rotation(finish.ring),
            ctx.animator.as_mut(),
        );

        match tween {
            Some(tween) => self.pending = Some(Pending { tween, finish }),
            None => {
                ctx.renderer.apply_transform(finish.ring, finish.target_rotation);
                finish.run(self);
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, frame: TweenFrame) {
        match frame.target {
            AnimTarget::Rotation(id) => {
                let Some((ring, ctx)) = self.split(id) else {
                    log::trace!("rotation frame for disposed {id}");
                    return;
                };
                if !ring.rotation.apply_frame(&frame) {
                    log::trace!("stale rotation frame {} on {id}", frame.id);
                    return;
                }
                ctx.renderer.apply_transform(id, ring.rotation.rotation());

                if frame.finished
                    && let Some(pending) = self.pending.take_if(|p| p.tween == frame.id)
                    && !pending.finish.run(self)
                {
                    log::trace!(
                        "{}",
                        Rejection::StaleCallback(pending.finish.generation)
                    );
                }
            }
            AnimTarget::Highlight(id, index) => {
                if let Some((_, ctx)) = self.split(id) {
                    ctx.renderer.apply_emphasis(id, index, frame.value);
                }
            }
            AnimTarget::Visibility(_) => {
                if let Some(event) = self.submenu.on_frame(&mut self.ctx, &frame) {
                    self.on_submenu_event(event);
                }
            }
        }
    }

    fn on_submenu_event(&mut self, event: SubmenuEvent) {
        match event {
            SubmenuEvent::Constructed(_) => {}
            SubmenuEvent::Opened(id) => self.highlight_current(id),
            SubmenuEvent::Disposed(id) => {
                if self.pending.take_if(|p| p.finish.ring == id).is_some() {
                    log::debug!("pending finish dropped with {id}");
                }
                if self
                    .drag
                    .is_some_and(|generation| !self.ctx.guard.is_held_by(generation))
                {
                    self.drag = None;
                }
            }
        }
    }

    fn tick(&mut self, id: RingId, dt: Duration) {
        let Some((ring, ctx)) = self.split(id) else {
            return;
        };
        let outcome = ring.rotation.tick(dt);
        if matches!(outcome, TickOutcome::Moving | TickOutcome::Settled) {
            ctx.renderer.apply_transform(id, ring.rotation.rotation());
        }
        if matches!(outcome, TickOutcome::Settled | TickOutcome::Idle) {
            self.settle_drag(id);
        }
    }

    /// Snaps a finished drag onto the item in front and commits it.
    fn settle_drag(&mut self, id: RingId) {
        let Some(generation) = self.drag else {
            return;
        };
        if !self.ctx.guard.is_held_by(generation) {
            self.drag = None;
            return;
        }
        if self.ctx.guard.locked_ring() != Some(id) {
            return;
        }
        let Some(ring) = self.ring(id) else {
            return;
        };
        let Some(index) = ring.front_index() else {
            return;
        };
        let Some(target) = ring.rotation_for(index) else {
            return;
        };

        self.drag = None;
        let finish = Finish {
            generation,
            kind: LockKind::Scrolling,
            ring: id,
            index,
            target_rotation: target,
        };
        let options = self.ctx.tuning.snap_options();
        let _ = self.rotate_then_finish(finish, options);
    }

    fn auto_highlight(&mut self) {
        if self.clock < self.quiet_until || !self.ctx.guard.can_update_highlight(None) {
            return;
        }
        let highlight = self.highlight;
        let id = self.active_ring().id();
        let Some((ring, ctx)) = self.split(id) else {
            return;
        };
        let Some(front) = ring.front_index() else {
            return;
        };
        if ring.highlighted() != Some(front) {
            let _ = highlight.apply(ring, front, ctx.animator.as_mut(), ctx.renderer.as_mut());
        }
    }

    fn highlight_current(&mut self, id: RingId) {
        let highlight = self.highlight;
        if let Some((ring, ctx)) = self.split(id)
            && let Some(index) = ring.current_index()
            && ctx.guard.can_update_highlight(None)
        {
            let _ = highlight.apply(ring, index, ctx.animator.as_mut(), ctx.renderer.as_mut());
        }
    }
}

impl<T: Entry> LockHost for Session<T> {
    fn guard(&self) -> &SelectionGuard {
        &self.ctx.guard
    }

    fn guard_mut(&mut self) -> &mut SelectionGuard {
        &mut self.ctx.guard
    }

    fn commit(&mut self, finish: &Finish) {
        let highlight = self.highlight;
        if finish.kind == LockKind::Selecting {
            self.quiet_until = self.clock + self.ctx.tuning.selection_debounce;
        }
        let Some((ring, ctx)) = self.split(finish.ring) else {
            log::trace!("commit for disposed {}", finish.ring);
            return;
        };

        ring.set_current_index(finish.index);
        if ctx.guard.can_update_highlight(Some(finish.generation)) {
            let _ = highlight.apply(
                ring,
                finish.index,
                ctx.animator.as_mut(),
                ctx.renderer.as_mut(),
            );
        }
    }

    fn after_release(&mut self, finish: &Finish) {
        let Some((ring, ctx)) = self.split(finish.ring) else {
            return;
        };
        let Some(item) = ring.item(finish.index) else {
            return;
        };
        log::info!("{} selection finalized at {}", finish.ring, finish.index);
        ctx.content
            .on_selection_finalized(finish.ring, finish.index, &item.payload);

        if finish.kind == LockKind::Selecting && finish.ring == RingId::MAIN {
            let children = item.payload.children().to_vec();
            if !children.is_empty() {
                self.open_submenu(finish.index, children);
            }
        }
    }

    fn is_parked(&self, generation: Generation) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.finish.generation == generation)
    }
}
