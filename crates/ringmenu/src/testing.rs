//! Collaborator doubles shared by the unit tests.

use crate::animation::{AnimTarget, Animator, TweenFrame, TweenId, TweenRequest};
use crate::render::{ContentSink, Renderer};
use crate::ring::{Owner, Presentation, RingId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Call {
    Animate(AnimTarget, f64),
    Cancel(AnimTarget),
}

impl Call {
    pub fn target(&self) -> AnimTarget {
        match *self {
            Self::Animate(target, _) | Self::Cancel(target) => target,
        }
    }
}

#[derive(Default)]
struct AnimatorLog {
    calls: Vec<Call>,
    pending: Vec<(TweenId, TweenRequest)>,
    issued: u64,
}

/// Records every call and completes all pending tweens on the next
/// `advance`, whatever their duration.
#[derive(Clone, Default)]
pub struct RecordingAnimator {
    log: Rc<RefCell<AnimatorLog>>,
}

impl RecordingAnimator {
    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().calls.clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().calls.clear();
    }

    pub fn running(&self, target: AnimTarget) -> usize {
        self.log
            .borrow()
            .pending
            .iter()
            .filter(|(_, r)| r.target == target)
            .count()
    }
}

impl Animator for RecordingAnimator {
    fn animate(&mut self, request: TweenRequest) -> TweenId {
        let mut log = self.log.borrow_mut();
        log.issued += 1;
        let id = TweenId::from(log.issued);
        log.calls.push(Call::Animate(request.target, request.to));
        log.pending.push((id, request));
        id
    }

    fn cancel_animations(&mut self, target: AnimTarget) {
        let mut log = self.log.borrow_mut();
        log.calls.push(Call::Cancel(target));
        log.pending.retain(|(_, r)| r.target != target);
    }

    fn advance(&mut self, _dt: Duration) -> Vec<TweenFrame> {
        self.log
            .borrow_mut()
            .pending
            .drain(..)
            .map(|(id, request)| TweenFrame {
                id,
                target: request.target,
                value: request.to,
                finished: true,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Draw {
    Created(RingId, Owner),
    Disposed(RingId),
    Presentation(RingId, usize, Presentation),
}

#[derive(Default)]
struct RendererLog {
    draws: Vec<Draw>,
    transforms: HashMap<RingId, f64>,
    visibility: HashMap<RingId, f64>,
}

#[derive(Clone, Default)]
pub struct RecordingRenderer {
    log: Rc<RefCell<RendererLog>>,
}

impl RecordingRenderer {
    pub fn draws(&self) -> Vec<Draw> {
        self.log.borrow().draws.clone()
    }

    pub fn transform(&self, ring: RingId) -> Option<f64> {
        self.log.borrow().transforms.get(&ring).copied()
    }

    pub fn visibility(&self, ring: RingId) -> Option<f64> {
        self.log.borrow().visibility.get(&ring).copied()
    }
}

impl Renderer for RecordingRenderer {
    fn ring_created(&mut self, ring: RingId, owner: Owner, _angles: &[f64]) {
        self.log.borrow_mut().draws.push(Draw::Created(ring, owner));
    }

    fn ring_disposed(&mut self, ring: RingId) {
        self.log.borrow_mut().draws.push(Draw::Disposed(ring));
    }

    fn apply_transform(&mut self, ring: RingId, rotation: f64) {
        self.log.borrow_mut().transforms.insert(ring, rotation);
    }

    fn apply_presentation(&mut self, ring: RingId, index: usize, state: Presentation) {
        self.log
            .borrow_mut()
            .draws
            .push(Draw::Presentation(ring, index, state));
    }

    fn apply_visibility(&mut self, ring: RingId, amount: f64) {
        self.log.borrow_mut().visibility.insert(ring, amount);
    }
}

#[derive(Clone, Default)]
pub struct RecordingContent {
    finalized: Rc<RefCell<Vec<(RingId, usize)>>>,
}

impl RecordingContent {
    pub fn finalized(&self) -> Vec<(RingId, usize)> {
        self.finalized.borrow().clone()
    }
}

impl<T> ContentSink<T> for RecordingContent {
    fn on_selection_finalized(&mut self, ring: RingId, index: usize, _item: &T) {
        self.finalized.borrow_mut().push((ring, index));
    }
}
