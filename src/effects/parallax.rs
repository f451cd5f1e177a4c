use std::cell::RefCell;
use std::rc::Rc;

use crate::config::{FxConfig, REDUCED_MOTION_QUERY};
use crate::error::FxError;
use crate::geometry::Viewport;
use crate::host::{Element, EventKind, Host, HostEvent, Target};
use crate::throttle::Throttle;

pub const GLOW_SELECTOR: &str = ".glow";

pub struct Parallax {
    throttle: Throttle,
    range: f64,
}

impl Parallax {
    pub fn new(config: &FxConfig) -> Self {
        Self {
            throttle: Throttle::new(config.frame_interval_ms),
            range: config.parallax_range,
        }
    }

    /// Cursor offset from the viewport center, `±range / 2` per axis.
    pub fn offset(&self, viewport: &Viewport, client_x: f64, client_y: f64) -> (f64, f64) {
        let x = (client_x / viewport.width - 0.5) * self.range;
        let y = (client_y / viewport.height - 0.5) * self.range;
        (x, y)
    }

    /// Moves every glow, farther ones faster. Returns false when throttled.
    pub fn apply<H: Host>(&mut self, host: &H, event: &HostEvent) -> bool {
        if !self.throttle.try_fire(host.now_ms()) {
            return false;
        }
        let (x, y) = self.offset(&host.viewport(), event.client_x, event.client_y);
        for (index, glow) in host.query_all(GLOW_SELECTOR).iter().enumerate() {
            let speed = (index + 1) as f64 * 0.5;
            glow.set_style(
                "transform",
                &format!("translate({}px, {}px)", x * speed, y * speed),
            );
        }
        true
    }
}

/// Returns whether the mousemove listener was installed.
pub fn mount<H: Host>(host: &H, config: &FxConfig) -> Result<bool, FxError> {
    if host.matches_media(REDUCED_MOTION_QUERY) {
        return Ok(false);
    }
    let parallax = Rc::new(RefCell::new(Parallax::new(config)));
    let listener_host = host.clone();
    host.listen(
        Target::Document,
        EventKind::MouseMove,
        Box::new(move |event: &HostEvent| {
            parallax.borrow_mut().apply(&listener_host, event);
        }),
    )?;
    Ok(true)
}
