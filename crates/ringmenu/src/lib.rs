//! Rotating radial selection rings with an optional submenu ring.
//!
//! A [`Session`] owns the main ring, at most one child ring and the single
//! [`SelectionGuard`] they share. Drawing and animation are delegated to the
//! [`Renderer`] and [`Animator`] collaborators.

pub mod animation;
pub mod error;
pub mod front;
pub mod guard;
pub mod highlight;
pub mod layout;
pub mod render;
pub mod ring;
pub mod rotation;
pub mod session;
pub mod submenu;
pub mod tuning;

#[cfg(test)]
mod testing;

pub use animation::{AnimTarget, Animator, Easing, Timeline, TweenFrame, TweenId, TweenRequest};
pub use error::{Outcome, Rejection};
pub use guard::{Generation, GuardState, SelectionGuard, with_selection_lock};
pub use render::{ContentSink, Renderer};
pub use ring::{Entry, Owner, Presentation, Ring, RingId, RingItem};
pub use session::{KeyIntent, Session, SessionContext};
pub use submenu::SubmenuPhase;
pub use tuning::Tuning;
