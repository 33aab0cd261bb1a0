use super::Scene;
use ringmenu::{Owner, Presentation, Renderer, RingId};

/// Headless renderer: keeps a [`Scene`] and narrates changes through `log`.
#[derive(Debug, Default)]
pub struct LogRenderer {
    scene: Scene,
    frames: u64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LogRenderer {
    fn ring_created(&mut self, ring: RingId, owner: Owner, angles: &[f64]) {
        log::info!("{ring} created for {owner:?} with {} items", angles.len());
        self.scene.ring_created(ring, owner, angles);
    }

    fn ring_disposed(&mut self, ring: RingId) {
        log::info!("{ring} disposed");
        self.scene.ring_disposed(ring);
    }

    fn apply_transform(&mut self, ring: RingId, rotation: f64) {
        log::trace!("{ring} rotation {rotation:.4}");
        self.scene.apply_transform(ring, rotation);
    }

    fn apply_presentation(&mut self, ring: RingId, index: usize, state: Presentation) {
        log::debug!("{ring} item {index} -> {state}");
        self.scene.apply_presentation(ring, index, state);
    }

    fn apply_emphasis(&mut self, ring: RingId, index: usize, amount: f64) {
        self.scene.apply_emphasis(ring, index, amount);
    }

    fn apply_visibility(&mut self, ring: RingId, amount: f64) {
        log::trace!("{ring} visibility {amount:.2}");
        self.scene.apply_visibility(ring, amount);
    }

    fn end_frame(&mut self) {
        if self.scene.take_dirty() {
            self.frames += 1;
            for (id, view) in self.scene.rings() {
                log::trace!(
                    "frame {}: {id} at {:.3} rad, selected {:?}, visibility {:.2}",
                    self.frames,
                    view.rotation,
                    view.selected(),
                    view.visibility
                );
            }
        }
    }
}
