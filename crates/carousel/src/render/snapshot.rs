use super::{RingView, Scene};
use cairo::{Context, Format, ImageSurface};
use palette::{Mix, Srgba};
use ringmenu::{Owner, Presentation, Renderer, RingId};
use std::f64::consts::PI;
use std::path::PathBuf;
use thiserror::Error;

const SIZE: i32 = 480;
const MENU_RADIUS: f64 = 120.0;
const SLOT_RADIUS: f64 = 30.0;
const CENTER_CIRCLE_RADIUS: f64 = 32.0;
const START_OFFSET: f64 = -PI / 2.0; // front is at the top
const SUBMENU_RADIUS_FACTOR: f64 = 1.6;
const SUBMENU_SLOT_FACTOR: f64 = 0.6;
const EMPHASIS_GROWTH: f64 = 0.25;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("PNG error: {0}")]
    Png(#[from] cairo::IoError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ThemeColors {
    pub selected: Srgba<f64>,
    pub default: Srgba<f64>,
    pub center_circle: Srgba<f64>,
    pub background: Srgba<f64>,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            selected: Srgba::new(0.4, 0.4, 0.8, 0.9),
            default: Srgba::new(0.15, 0.15, 0.15, 0.5),
            center_circle: Srgba::new(0.2, 0.2, 0.2, 0.15),
            background: Srgba::new(0.05, 0.05, 0.07, 1.0),
        }
    }
}

/// Writes a PNG of the scene for every frame in which something changed.
pub struct SnapshotRenderer {
    scene: Scene,
    dir: PathBuf,
    colors: ThemeColors,
    written: u64,
}

impl SnapshotRenderer {
    pub fn new(dir: PathBuf) -> Result<Self, SnapshotError> {
        fs_err::create_dir_all(&dir)?;
        Ok(Self {
            scene: Scene::default(),
            dir,
            colors: ThemeColors::default(),
            written: 0,
        })
    }

    fn write_frame(&mut self) -> Result<PathBuf, SnapshotError> {
        let surface = ImageSurface::create(Format::ARgb32, SIZE, SIZE)?;
        {
            let cr = Context::new(&surface)?;
            draw(&cr, &self.scene, &self.colors)?;
        }

        self.written += 1;
        let path = self.dir.join(format!("frame-{:05}.png", self.written));
        let mut file = fs_err::File::create(&path)?;
        surface.write_to_png(&mut file)?;
        Ok(path)
    }
}

fn set_color(cr: &Context, color: Srgba<f64>, alpha: f64) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a * alpha);
}

fn draw(cr: &Context, scene: &Scene, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let center = SIZE as f64 / 2.0;
    set_color(cr, colors.background, 1.0);
    cr.paint()?;

    set_color(cr, colors.center_circle, 1.0);
    cr.arc(center, center, CENTER_CIRCLE_RADIUS, 0.0, 2.0 * PI);
    cr.fill()?;

    for (_, view) in scene.rings() {
        draw_ring(cr, view, center, colors)?;
    }
    Ok(())
}

fn draw_ring(cr: &Context, view: &RingView, center: f64, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let (radius, slot) = match view.owner {
        Owner::Main => (MENU_RADIUS, SLOT_RADIUS),
        Owner::Submenu { .. } => (
            MENU_RADIUS * SUBMENU_RADIUS_FACTOR,
            SLOT_RADIUS * SUBMENU_SLOT_FACTOR,
        ),
    };

    for (i, angle) in view.angles.iter().enumerate() {
        let world = angle + view.rotation + START_OFFSET;
        let (x, y) = (center + radius * world.cos(), center + radius * world.sin());

        let emphasis = view.emphasis.get(i).copied().unwrap_or(0.0);
        let color = match view.presentation.get(i) {
            Some(Presentation::Selected) => colors.default.mix(colors.selected, emphasis),
            _ => colors.default,
        };
        set_color(cr, color, view.visibility);
        let grow = match view.presentation.get(i) {
            Some(Presentation::Selected) => 1.0 + EMPHASIS_GROWTH * emphasis,
            _ => 1.0,
        };
        cr.arc(x, y, slot * grow, 0.0, 2.0 * PI);
        cr.fill()?;

        cr.set_source_rgba(1.0, 1.0, 1.0, view.visibility);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(slot * 0.5);
        let label = i.to_string();
        if let Ok(ext) = cr.text_extents(&label) {
            cr.move_to(x - ext.width() / 2.0, y + ext.height() / 2.0);
            cr.show_text(&label)?;
        }
    }
    Ok(())
}

impl Renderer for SnapshotRenderer {
    fn ring_created(&mut self, ring: RingId, owner: Owner, angles: &[f64]) {
        self.scene.ring_created(ring, owner, angles);
    }

    fn ring_disposed(&mut self, ring: RingId) {
        self.scene.ring_disposed(ring);
    }

    fn apply_transform(&mut self, ring: RingId, rotation: f64) {
        self.scene.apply_transform(ring, rotation);
    }

    fn apply_presentation(&mut self, ring: RingId, index: usize, state: Presentation) {
        self.scene.apply_presentation(ring, index, state);
    }

    fn apply_emphasis(&mut self, ring: RingId, index: usize, amount: f64) {
        self.scene.apply_emphasis(ring, index, amount);
    }

    fn apply_visibility(&mut self, ring: RingId, amount: f64) {
        self.scene.apply_visibility(ring, amount);
    }

    fn end_frame(&mut self) {
        if !self.scene.take_dirty() {
            return;
        }
        match self.write_frame() {
            Ok(path) => log::trace!("Wrote {}", path.display()),
            Err(e) => log::error!("Snapshot failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_png_only_for_changed_frames() {
        let dir = std::env::temp_dir().join(format!("carousel-snapshot-{}", std::process::id()));
        let mut renderer = SnapshotRenderer::new(dir.clone()).unwrap();

        renderer.ring_created(RingId::MAIN, Owner::Main, &[0.0, PI]);
        renderer.apply_presentation(RingId::MAIN, 0, Presentation::Selected);
        renderer.end_frame();
        renderer.end_frame();

        assert_eq!(renderer.written, 1);
        assert!(dir.join("frame-00001.png").exists());
        fs_err::remove_dir_all(&dir).unwrap();
    }
}
