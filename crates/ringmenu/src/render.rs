use crate::ring::{Owner, Presentation, RingId};

/// Maps ring state onto whatever draws it. The core never sees meshes or
/// materials, only these calls.
pub trait Renderer {
    fn ring_created(&mut self, _ring: RingId, _owner: Owner, _angles: &[f64]) {}

    fn ring_disposed(&mut self, _ring: RingId) {}

    fn apply_transform(&mut self, ring: RingId, rotation: f64);

    fn apply_presentation(&mut self, ring: RingId, index: usize, state: Presentation);

    /// Progress of an item's highlight animation, 0.0 to 1.0.
    fn apply_emphasis(&mut self, _ring: RingId, _index: usize, _amount: f64) {}

    /// Ring opacity during submenu show/hide, 0.0 to 1.0.
    fn apply_visibility(&mut self, _ring: RingId, _amount: f64) {}

    /// Called once at the end of every session frame.
    fn end_frame(&mut self) {}
}

/// Receives selections once they have fully completed.
pub trait ContentSink<T> {
    fn on_selection_finalized(&mut self, ring: RingId, index: usize, item: &T);
}

impl<T, F> ContentSink<T> for F
where
    F: FnMut(RingId, usize, &T),
{
    fn on_selection_finalized(&mut self, ring: RingId, index: usize, item: &T) {
        self(ring, index, item)
    }
}
