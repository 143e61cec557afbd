//! Redraw orchestration
//!
//! `Redrawer` ties the pieces together: on every trigger it snapshots the
//! session facts, asks the geometry provider for the current layout,
//! composites a frame, and hands it to the presenter. The scheduler
//! decides when that happens.

pub mod scheduler;

use std::time::Instant;

use log::{debug, warn};
use rand::Rng;

use crate::display::{GeometryProvider, Presenter};
use crate::render::Compositor;
use crate::session::{InputState, SessionFacts, SessionState};

pub use scheduler::{RedrawScheduler, Trigger};

/// Session facts that come from configuration rather than from the state
#[derive(Debug, Clone, Default)]
pub struct FactSettings {
    pub login: Option<String>,
    pub authorized_lock_minutes: u64,
}

/// Composites and presents frames in response to triggers
pub struct Redrawer<R: Rng, P: Presenter, G: GeometryProvider> {
    compositor: Compositor<R>,
    presenter: P,
    geometry: G,
    facts: FactSettings,
    scheduler: RedrawScheduler,
    redraws: u64,
}

impl<R: Rng, P: Presenter, G: GeometryProvider> Redrawer<R, P, G> {
    pub fn new(compositor: Compositor<R>, presenter: P, geometry: G, facts: FactSettings) -> Self {
        Self {
            compositor,
            presenter,
            geometry,
            facts,
            scheduler: RedrawScheduler::new(),
            redraws: 0,
        }
    }

    pub fn scheduler(&self) -> &RedrawScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut RedrawScheduler {
        &mut self.scheduler
    }

    #[cfg(test)]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Frames composited so far
    #[cfg(test)]
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    /// Arm (or re-arm) the clock tick
    pub fn start_periodic(&mut self, now: Instant) {
        self.scheduler.start_periodic(now);
    }

    pub fn stop_periodic(&mut self) {
        self.scheduler.stop_periodic();
    }

    /// Queue a redraw for a state change
    pub fn request_redraw(&mut self) {
        self.scheduler.request(Trigger::Event);
    }

    /// Composite the current state and present it. A failed presentation is
    /// logged; the next trigger tries again.
    pub fn redraw_screen(&mut self, state: &SessionState, now: Instant) {
        let facts = SessionFacts::collect(
            state,
            self.facts.login.as_deref(),
            self.facts.authorized_lock_minutes,
            now,
        );
        debug!(
            "redraw_screen(input = {:?}, auth = {:?}, locked = {})",
            state.input,
            state.auth,
            facts.elapsed_label()
        );
        let geometry = self.geometry.geometry();
        let frame = self
            .compositor
            .composite(&facts, state.input, state.auth, &geometry);
        self.redraws += 1;
        debug!(
            "Frame #{}: {} placements, highlight {:?}",
            self.redraws,
            frame.placements().len(),
            frame.highlight_start()
        );
        if let Err(e) = self.presenter.present(&frame) {
            warn!("Failed to present frame: {}", e);
        }
    }

    /// Hide keystroke feedback and redraw
    pub fn clear_indicator(&mut self, state: &mut SessionState, now: Instant) {
        state.input = InputState::Idle;
        self.redraw_screen(state, now);
    }

    /// Run every trigger that is queued or due at `now`, in order
    pub fn run_due(&mut self, state: &mut SessionState, now: Instant) -> usize {
        self.scheduler.collect_due(now);
        let mut ran = 0;
        while let Some(trigger) = self.scheduler.next_trigger() {
            match trigger {
                Trigger::ClearIndicator => self.clear_indicator(state, now),
                Trigger::Event | Trigger::Tick => self.redraw_screen(state, now),
            }
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndicatorConfig;
    use crate::display::geometry::{Output, Resolution, ScreenGeometry, StaticGeometry};
    use crate::display::present::testing::RecordingPresenter;
    use crate::font::text::testing::BoxFace;
    use crate::render::{Background, CompositorSettings, PanelKind};
    use crate::session::AuthState;
    use crate::utils::Rgba;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    type TestRedrawer = Redrawer<StdRng, RecordingPresenter, StaticGeometry>;

    fn redrawer(face: &BoxFace, outputs: Vec<Output>) -> TestRedrawer {
        let compositor = Compositor::new(
            CompositorSettings::from(&IndicatorConfig::default()),
            Background::solid(Rgba::WHITE),
            Box::new(face.clone()),
            StdRng::seed_from_u64(1),
        );
        let geometry = StaticGeometry(ScreenGeometry {
            outputs,
            resolution: Resolution::new(640, 480),
            scale: 1.0,
        });
        Redrawer::new(
            compositor,
            RecordingPresenter::default(),
            geometry,
            FactSettings {
                login: None,
                authorized_lock_minutes: 60,
            },
        )
    }

    #[test]
    fn test_each_trigger_presents_one_frame() {
        let face = BoxFace::default();
        let mut r = redrawer(&face, Vec::new());
        let t0 = Instant::now();
        let mut state = SessionState::new(t0);

        r.start_periodic(t0);
        r.request_redraw();
        r.request_redraw();
        assert_eq!(r.run_due(&mut state, t0), 2);
        assert_eq!(r.run_due(&mut state, t0 + Duration::from_secs(1)), 1);
        assert_eq!(r.presenter().frames.len(), 3);
        assert_eq!(r.redraw_count(), 3);
    }

    #[test]
    fn test_each_redraw_reads_current_state() {
        let face = BoxFace::default();
        let mut r = redrawer(&face, Vec::new());
        let t0 = Instant::now();
        let mut state = SessionState::new(t0);

        r.redraw_screen(&state, t0 + Duration::from_secs(125));
        assert!(face.find("02:05").is_some());

        state.set_auth(AuthState::Verifying);
        r.redraw_screen(&state, t0 + Duration::from_secs(126));
        assert!(face.find("Verifying...").is_some());
        assert!(face.find("02:06").is_some());
    }

    #[test]
    fn test_override_recomputed_every_redraw() {
        let face = BoxFace::default();
        let mut r = redrawer(&face, vec![Output::new(0, 0, 640, 480)]);
        let t0 = Instant::now();
        let state = SessionState::new(t0);

        r.redraw_screen(&state, t0 + Duration::from_secs(59 * 60 + 59));
        r.redraw_screen(&state, t0 + Duration::from_secs(60 * 60));
        let frames = &r.presenter().frames;
        assert_eq!(frames[0].placements_of(PanelKind::LogoutBanner).count(), 0);
        assert_eq!(frames[1].placements_of(PanelKind::LogoutBanner).count(), 1);
    }

    #[test]
    fn test_clear_indicator_resets_input() {
        let face = BoxFace::default();
        let mut r = redrawer(&face, Vec::new());
        let t0 = Instant::now();
        let mut state = SessionState::new(t0);
        state.input = InputState::KeyActive;

        r.scheduler_mut().arm_clear(t0);
        assert_eq!(r.run_due(&mut state, t0 + Duration::from_secs(1)), 1);
        assert_eq!(state.input, InputState::Idle);
        assert_eq!(r.presenter().frames[0].highlight_start(), None);
    }
}
