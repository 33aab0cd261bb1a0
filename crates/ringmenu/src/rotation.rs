use crate::animation::{AnimTarget, Animator, Easing, TweenFrame, TweenId, TweenRequest};
use crate::layout;
use std::time::Duration;

/// Frame rate the damping factor is expressed against.
const REFERENCE_FPS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateOptions {
    pub animate: bool,
    pub duration: Duration,
    pub easing: Easing,
}

impl RotateOptions {
    pub fn snap() -> Self {
        Self {
            animate: false,
            duration: Duration::ZERO,
            easing: Easing::Linear,
        }
    }

    pub fn animated(duration: Duration, easing: Easing) -> Self {
        Self {
            animate: true,
            duration,
            easing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A tween owns the rotation; the tick did nothing.
    Animating,
    Moving,
    /// Landed exactly on target during this tick.
    Settled,
    /// Already on target before the tick.
    Idle,
}

/// Owns one ring's rotation. Either a tween or the damped tick drives the
/// angle, never both.
#[derive(Debug, Clone)]
pub struct RotationController {
    rotation: f64,
    target: f64,
    damping: f64,
    epsilon: f64,
    tween: Option<TweenId>,
}

impl RotationController {
    pub fn new(damping: f64, epsilon: f64) -> Self {
        Self {
            rotation: 0.0,
            target: 0.0,
            damping: damping.clamp(f64::EPSILON, 1.0),
            epsilon,
            tween: None,
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn tween(&self) -> Option<TweenId> {
        self.tween
    }

    /// Points the ring at `angle`. Any running tween is cancelled first; with
    /// `animate` a fresh tween is started, otherwise the rotation snaps.
    pub fn set_target(
        &mut self,
        angle: f64,
        options: RotateOptions,
        target: AnimTarget,
        animator: &mut dyn Animator,
    ) -> Option<TweenId> {
        animator.cancel_animations(target);
        self.target = angle;

        if !options.animate {
            self.tween = None;
            self.rotation = angle;
            return None;
        }

        let id = animator.animate(TweenRequest {
            target,
            from: self.rotation,
            to: angle,
            duration: options.duration,
            easing: options.easing,
        });
        self.tween = Some(id);
        Some(id)
    }

    /// Moves the target without starting a tween; `tick` closes the gap.
    /// A running tween is cancelled so the two never compete.
    pub fn nudge_target(&mut self, delta: f64, target: AnimTarget, animator: &mut dyn Animator) {
        if self.tween.take().is_some() {
            animator.cancel_animations(target);
        }
        self.target += delta;
    }

    /// Applies a tween sample. Frames from a tween other than the current one
    /// are stale and rejected.
    pub fn apply_frame(&mut self, frame: &TweenFrame) -> bool {
        if self.tween != Some(frame.id) {
            return false;
        }
        self.rotation = frame.value;
        if frame.finished {
            self.rotation = self.target;
            self.tween = None;
        }
        true
    }

    /// Drops tween ownership without touching the angle, e.g. on disposal.
    pub fn abandon_tween(&mut self) {
        self.tween = None;
    }

    pub fn tick(&mut self, dt: Duration) -> TickOutcome {
        if self.is_animating() {
            return TickOutcome::Animating;
        }
        if self.rotation == self.target {
            return TickOutcome::Idle;
        }

        let delta = layout::shortest_delta(self.rotation, self.target);
        if delta.abs() < self.epsilon {
            self.rotation = self.target;
            return TickOutcome::Settled;
        }

        self.rotation += delta * self.step_factor(dt);
        TickOutcome::Moving
    }

    fn step_factor(&self, dt: Duration) -> f64 {
        let frames = dt.as_secs_f64() * REFERENCE_FPS;
        if frames <= 0.0 {
            return 0.0;
        }
        (1.0 - (1.0 - self.damping).powf(frames)).clamp(0.0, 1.0)
    }
}
