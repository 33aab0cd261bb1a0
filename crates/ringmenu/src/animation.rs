use crate::ring::RingId;
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("tween#{_0}")]
pub struct TweenId(u64);

/// The single animatable property a tween drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimTarget {
    /// Ring rotation angle in radians.
    Rotation(RingId),
    /// Highlight emphasis of one item, 0.0 to 1.0.
    Highlight(RingId, usize),
    /// Ring visibility used by submenu show/hide, 0.0 to 1.0.
    Visibility(RingId),
}

impl AnimTarget {
    pub fn ring(&self) -> RingId {
        match *self {
            Self::Rotation(ring) | Self::Highlight(ring, _) | Self::Visibility(ring) => ring,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    QuadInOut,
    #[default]
    CubicOut,
    SineInOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::CubicOut => 1.0 - (1.0 - t).powi(3),
            Self::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenRequest {
    pub target: AnimTarget,
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
    pub easing: Easing,
}

/// One sampled value of a running tween. The last frame a tween produces has
/// `finished` set and carries exactly `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenFrame {
    pub id: TweenId,
    pub target: AnimTarget,
    pub value: f64,
    pub finished: bool,
}

/// Animation collaborator. Completion is reported through `advance` rather
/// than through callbacks, so the caller decides when and where state changes.
pub trait Animator {
    fn animate(&mut self, request: TweenRequest) -> TweenId;

    /// Drops every tween driving `target`. Cancelled tweens never produce
    /// another frame.
    fn cancel_animations(&mut self, target: AnimTarget);

    fn advance(&mut self, dt: Duration) -> Vec<TweenFrame>;
}

struct Tween {
    id: TweenId,
    request: TweenRequest,
    elapsed: Duration,
}

impl Tween {
    fn sample(&self) -> TweenFrame {
        let TweenRequest {
            target,
            from,
            to,
            duration,
            easing,
        } = self.request;

        let progress = if duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
        };
        let finished = progress >= 1.0;
        let value = if finished {
            to
        } else {
            from + (to - from) * easing.apply(progress)
        };

        TweenFrame {
            id: self.id,
            target,
            value,
            finished,
        }
    }
}

/// Frame-stepped tween engine.
#[derive(Default)]
pub struct Timeline {
    tweens: Vec<Tween>,
    next_id: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn active(&self, target: AnimTarget) -> usize {
        self.tweens
            .iter()
            .filter(|t| t.request.target == target)
            .count()
    }
}

impl Animator for Timeline {
    fn animate(&mut self, request: TweenRequest) -> TweenId {
        self.next_id += 1;
        let id = TweenId(self.next_id);
        self.tweens.push(Tween {
            id,
            request,
            elapsed: Duration::ZERO,
        });
        id
    }

    fn cancel_animations(&mut self, target: AnimTarget) {
        self.tweens.retain(|t| t.request.target != target);
    }

    fn advance(&mut self, dt: Duration) -> Vec<TweenFrame> {
        let frames: Vec<TweenFrame> = self
            .tweens
            .iter_mut()
            .map(|tween| {
                tween.elapsed += dt;
                tween.sample()
            })
            .collect();

        self.tweens.retain(|t| {
            frames
                .iter()
                .find(|f| f.id == t.id)
                .is_none_or(|f| !f.finished)
        });
        frames
    }
}
