use crate::cli::Overrides;
use crate::config::{self, Config};
use crate::events::AppEvent;
use crate::menu::{self, MenuEntry};
use async_channel::Receiver;
use ringmenu::{Entry, Renderer, RingId, Session, SessionContext, Timeline};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Longest step fed to the session, so a stalled loop does not teleport rings.
const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The daemon's only owner of the session. Everything that touches it runs
/// on the frame loop.
pub struct App {
    session: Session<MenuEntry>,
    config_path: PathBuf,
    overrides: Overrides,
    frame_interval: Duration,
}

fn log_finalized(ring: RingId, index: usize, entry: &MenuEntry) {
    if entry.children().is_empty() {
        log::info!("Activated '{}' ({ring} item {index})", entry);
    } else {
        log::info!("Selected '{}' ({ring} item {index}), opening submenu", entry);
    }
}

impl App {
    pub fn new(
        config: &Config,
        config_path: PathBuf,
        overrides: Overrides,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        let ctx = SessionContext::new(
            Box::new(Timeline::new()),
            renderer,
            Box::new(log_finalized),
            config.tuning.clone(),
        );
        Self {
            session: Session::new(menu::entries(config), ctx),
            config_path,
            overrides,
            frame_interval: config.frame_interval(),
        }
    }

    pub fn session(&self) -> &Session<MenuEntry> {
        &self.session
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    pub fn update(&mut self, event: AppEvent) -> Flow {
        log::debug!("Event: {:?}", event);
        match event {
            AppEvent::Scroll(steps) => {
                self.session.handle_scroll(steps);
            }
            AppEvent::Select(index) => {
                self.session.handle_select(index);
            }
            AppEvent::Drag(radians) => {
                self.session.handle_drag(radians);
            }
            AppEvent::Key(intent) => {
                self.session.handle_key(intent);
            }
            AppEvent::Open(parent) => self.open(parent),
            AppEvent::Close { immediate } => {
                self.session.close_submenu(immediate);
            }
            AppEvent::ConfigReload => self.reload(),
            AppEvent::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    pub fn tick(&mut self, dt: Duration) {
        self.session.frame(dt.min(MAX_FRAME_STEP));
    }

    fn open(&mut self, parent: usize) {
        let children = match self.session.main_ring().item(parent) {
            Some(item) => item.payload.children().to_vec(),
            None => {
                log::warn!("No entry at index {}", parent);
                return;
            }
        };
        if children.is_empty() {
            log::warn!("Entry {} has no submenu", parent);
            return;
        }
        self.session.open_submenu(parent, children);
    }

    fn reload(&mut self) {
        match config::load_config(&self.config_path) {
            Ok(mut new_config) => {
                self.overrides.apply(&mut new_config);
                self.frame_interval = new_config.frame_interval();
                self.session
                    .reload(menu::entries(&new_config), new_config.tuning);
                log::info!("Configuration reloaded");
            }
            Err(e) => log::error!("Failed to reload config: {}", e),
        }
    }

    /// Drives the session until `quit` arrives or every sender is gone.
    pub async fn run(mut self, rx: Receiver<AppEvent>) -> anyhow::Result<()> {
        let mut interval = tokio::time::interval(self.frame_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last = Instant::now();

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Ok(event) => {
                        if self.update(event) == Flow::Quit {
                            log::info!("Quit requested");
                            break;
                        }
                        if interval.period() != self.frame_interval {
                            interval = tokio::time::interval(self.frame_interval);
                            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                        }
                    }
                    Err(_) => {
                        log::warn!("Event channel closed");
                        break;
                    }
                },
                now = interval.tick() => {
                    self.tick(now.saturating_duration_since(last));
                    last = now;
                }
            }
        }
        Ok(())
    }
}
