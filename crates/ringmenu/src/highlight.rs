use crate::animation::{AnimTarget, Animator, Easing, TweenRequest};
use crate::error::Rejection;
use crate::render::Renderer;
use crate::ring::{Presentation, Ring};
use std::time::Duration;

/// Applies the "selected" presentation. Never touches rotation, and never
/// consults the guard: callers check `can_update_highlight` first.
#[derive(Debug, Clone, Copy)]
pub struct HighlightController {
    duration: Duration,
    easing: Easing,
}

impl HighlightController {
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self { duration, easing }
    }

    pub fn apply<T>(
        &self,
        ring: &mut Ring<T>,
        index: usize,
        animator: &mut dyn Animator,
        renderer: &mut dyn Renderer,
    ) -> Result<(), Rejection> {
        if ring.is_empty() {
            return Err(Rejection::EmptyRing);
        }
        if index >= ring.len() {
            return Err(Rejection::InvalidIndex {
                index,
                len: ring.len(),
            });
        }

        let id = ring.id();
        for i in (0..ring.len()).filter(|&i| i != index) {
            animator.cancel_animations(AnimTarget::Highlight(id, i));
            Self::present(ring, i, Presentation::Normal, renderer);
        }

        // kill before start so repeated triggers never stack
        let target = AnimTarget::Highlight(id, index);
        animator.cancel_animations(target);
        animator.animate(TweenRequest {
            target,
            from: 0.0,
            to: 1.0,
            duration: self.duration,
            easing: self.easing,
        });
        Self::present(ring, index, Presentation::Selected, renderer);
        Ok(())
    }

    /// Reverts every item to normal and stops all highlight animations.
    pub fn clear<T>(&self, ring: &mut Ring<T>, animator: &mut dyn Animator, renderer: &mut dyn Renderer) {
        let id = ring.id();
        for i in 0..ring.len() {
            animator.cancel_animations(AnimTarget::Highlight(id, i));
            Self::present(ring, i, Presentation::Normal, renderer);
        }
    }

    fn present<T>(ring: &mut Ring<T>, index: usize, state: Presentation, renderer: &mut dyn Renderer) {
        let id = ring.id();
        if let Some(item) = ring.item_mut(index)
            && item.presentation != state
        {
            item.presentation = state;
            renderer.apply_presentation(id, index, state);
        }
    }
}
