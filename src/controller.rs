use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};

use crate::config::FxConfig;
use crate::effects::nav_overlay::{self, NavOverlay, NavState};
use crate::effects::timeline::{self, Timeline};
use crate::effects::{keyboard, parallax, particles, reveal, scroll_spy};
use crate::error::FxError;
use crate::host::Host;

/// What got wired at mount. Missing markup or a failed effect shows up as
/// zero / `false` here; see `failed` for the latter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountReport {
    pub particles: usize,
    pub nav_overlay: bool,
    pub buttons: usize,
    pub parallax: bool,
    pub revealed: usize,
    pub timeline: bool,
    pub spied_sections: usize,
    pub failed: Vec<&'static str>,
}

/// Owns every page effect. Built once per page load; listeners stay
/// registered until the page goes away.
pub struct PageFx<H: Host> {
    host: H,
    config: FxConfig,
    nav: Option<Rc<RefCell<NavOverlay<H::Element>>>>,
    timeline: Option<Rc<RefCell<Timeline<H::Element>>>>,
    report: MountReport,
}

impl<H: Host> PageFx<H> {
    /// Wires each effect independently; one failing never stops the rest.
    pub fn mount(host: H, config: FxConfig) -> Self {
        let mut report = MountReport::default();

        report.particles = settle(&mut report, "particles", particles::spawn(&host, &config))
            .unwrap_or_default();
        let nav = settle(&mut report, "nav overlay", nav_overlay::mount(&host)).flatten();
        report.nav_overlay = nav.is_some();
        report.buttons =
            settle(&mut report, "keyboard buttons", keyboard::mount(&host)).unwrap_or_default();
        report.parallax =
            settle(&mut report, "parallax", parallax::mount(&host, &config)).unwrap_or_default();
        report.revealed =
            settle(&mut report, "scroll reveal", reveal::mount(&host, &config)).unwrap_or_default();
        let timeline = settle(&mut report, "timeline", timeline::mount(&host, &config)).flatten();
        report.timeline = timeline.is_some();
        report.spied_sections =
            settle(&mut report, "scroll spy", scroll_spy::mount(&host, &config)).unwrap_or_default();

        info!(
            "page effects mounted: {} particles, nav overlay {}, {} buttons, parallax {}, {} reveal targets, timeline {}, {} spied sections",
            report.particles,
            report.nav_overlay,
            report.buttons,
            report.parallax,
            report.revealed,
            report.timeline,
            report.spied_sections,
        );

        Self {
            host,
            config,
            nav,
            timeline,
            report,
        }
    }

    pub fn report(&self) -> &MountReport {
        &self.report
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &FxConfig {
        &self.config
    }

    pub fn nav_state(&self) -> Option<NavState> {
        self.nav.as_ref().map(|nav| nav.borrow().state())
    }

    /// Recomputes the timeline now, bypassing the throttle.
    pub fn refresh_timeline(&self) -> Option<f64> {
        let timeline = self.timeline.as_ref()?;
        let height = self.host.viewport().height;
        timeline.borrow_mut().update(height)
    }
}

fn settle<T>(report: &mut MountReport, effect: &'static str, result: Result<T, FxError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("{} disabled: {}", effect, err);
            report.failed.push(effect);
            None
        }
    }
}
