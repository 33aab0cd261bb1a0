use ringmenu::{Owner, Presentation, Renderer, RingId};
use std::collections::BTreeMap;

pub mod log;
#[cfg(feature = "snapshot")]
pub mod snapshot;

pub use self::log::LogRenderer;
#[cfg(feature = "snapshot")]
pub use snapshot::SnapshotRenderer;

/// What a ring currently looks like, as last reported by the session.
#[derive(Debug, Clone, PartialEq)]
pub struct RingView {
    pub owner: Owner,
    pub angles: Vec<f64>,
    pub rotation: f64,
    pub presentation: Vec<Presentation>,
    pub emphasis: Vec<f64>,
    pub visibility: f64,
}

impl RingView {
    fn new(owner: Owner, angles: &[f64]) -> Self {
        Self {
            owner,
            angles: angles.to_vec(),
            rotation: 0.0,
            presentation: vec![Presentation::Normal; angles.len()],
            emphasis: vec![0.0; angles.len()],
            visibility: 1.0,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.presentation
            .iter()
            .position(|p| *p == Presentation::Selected)
    }
}

/// Retained copy of every live ring, shared by the concrete renderers.
#[derive(Debug, Default)]
pub struct Scene {
    rings: BTreeMap<RingId, RingView>,
    dirty: bool,
}

impl Scene {
    pub fn ring(&self, id: RingId) -> Option<&RingView> {
        self.rings.get(&id)
    }

    pub fn rings(&self) -> impl Iterator<Item = (RingId, &RingView)> {
        self.rings.iter().map(|(id, view)| (*id, view))
    }

    /// Whether anything changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn update(&mut self, id: RingId, f: impl FnOnce(&mut RingView)) {
        match self.rings.get_mut(&id) {
            Some(view) => {
                f(view);
                self.dirty = true;
            }
            None => ::log::trace!("update for unknown {id} ignored"),
        }
    }
}

impl Renderer for Scene {
    fn ring_created(&mut self, ring: RingId, owner: Owner, angles: &[f64]) {
        self.rings.insert(ring, RingView::new(owner, angles));
        self.dirty = true;
    }

    fn ring_disposed(&mut self, ring: RingId) {
        if self.rings.remove(&ring).is_some() {
            self.dirty = true;
        }
    }

    fn apply_transform(&mut self, ring: RingId, rotation: f64) {
        self.update(ring, |view| view.rotation = rotation);
    }

    fn apply_presentation(&mut self, ring: RingId, index: usize, state: Presentation) {
        self.update(ring, |view| {
            if let Some(p) = view.presentation.get_mut(index) {
                *p = state;
            }
        });
    }

    fn apply_emphasis(&mut self, ring: RingId, index: usize, amount: f64) {
        self.update(ring, |view| {
            if let Some(e) = view.emphasis.get_mut(index) {
                *e = amount;
            }
        });
    }

    fn apply_visibility(&mut self, ring: RingId, amount: f64) {
        self.update(ring, |view| view.visibility = amount);
    }
}
