use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::config::FxConfig;
use crate::error::FxError;
use crate::geometry::Rect;
use crate::host::{Element, EventKind, Host, HostEvent, Target};
use crate::throttle::Throttle;

pub const REACHED_CLASS: &str = "line-reached";

/// Fraction of `section` scrolled into a viewport `viewport_height` tall,
/// or `None` while the section is off screen.
pub fn progress(section: &Rect, viewport_height: f64) -> Option<f64> {
    if section.top() >= viewport_height || section.bottom() <= 0.0 || section.height <= 0.0 {
        return None;
    }
    let visible = (viewport_height - section.top()).min(section.height);
    Some((visible / section.height).clamp(0.0, 1.0))
}

/// Grows `#timelineLine` with scroll and flags items the line has passed.
pub struct Timeline<E: Element> {
    section: E,
    line: E,
    container: Option<E>,
    items: Vec<E>,
    throttle: Throttle,
    lead_in: f64,
}

impl<E: Element> Timeline<E> {
    pub fn new(section: E, line: E, container: Option<E>, items: Vec<E>, config: &FxConfig) -> Self {
        Self {
            section,
            line,
            container,
            items,
            throttle: Throttle::new(config.frame_interval_ms),
            lead_in: config.timeline_lead_in,
        }
    }

    /// Throttled entry point for scroll and resize.
    pub fn tick(&mut self, viewport_height: f64, now_ms: f64) -> Option<f64> {
        if !self.throttle.try_fire(now_ms) {
            return None;
        }
        self.update(viewport_height)
    }

    /// Sets the line height and returns it. Reached flags are only ever
    /// added, so scrolling back up leaves them in place.
    pub fn update(&mut self, viewport_height: f64) -> Option<f64> {
        let fraction = progress(&self.section.bounding_rect(), viewport_height)?;
        let full_height = self
            .container
            .as_ref()
            .unwrap_or(&self.section)
            .offset_height();
        let line_height = full_height * fraction;
        self.line.set_style("height", &format!("{}px", line_height));

        for item in &self.items {
            if line_height >= item.offset_top() - self.lead_in {
                item.add_class(REACHED_CLASS);
            }
        }
        Some(line_height)
    }
}

pub fn mount<H: Host>(
    host: &H,
    config: &FxConfig,
) -> Result<Option<Rc<RefCell<Timeline<H::Element>>>>, FxError> {
    let section = host.query(".timeline-section");
    let line = host.element_by_id("timelineLine");
    let items = host.query_all(".timeline-item");
    let (Some(section), Some(line)) = (section, line) else {
        debug!("timeline section or line missing, timeline inert");
        return Ok(None);
    };
    if items.is_empty() {
        debug!("no timeline items, timeline inert");
        return Ok(None);
    }

    let container = host.query(".timeline-container");
    let timeline = Rc::new(RefCell::new(Timeline::new(section, line, container, items, config)));

    for kind in [EventKind::Scroll, EventKind::Resize] {
        let timeline = timeline.clone();
        let listener_host = host.clone();
        host.listen(
            Target::Window,
            kind,
            Box::new(move |_: &HostEvent| {
                timeline
                    .borrow_mut()
                    .tick(listener_host.viewport().height, listener_host.now_ms());
            }),
        )?;
    }
    timeline
        .borrow_mut()
        .tick(host.viewport().height, host.now_ms());

    Ok(Some(timeline))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_screen_sections_have_no_progress() {
        assert_eq!(progress(&Rect::new(0.0, 900.0, 100.0, 500.0), 800.0), None);
        assert_eq!(progress(&Rect::new(0.0, -500.0, 100.0, 500.0), 800.0), None);
    }

    #[test]
    fn progress_tracks_visible_fraction() {
        // top edge 200px above the fold
        assert_eq!(progress(&Rect::new(0.0, 600.0, 100.0, 1000.0), 800.0), Some(0.2));
        // fully scrolled in
        assert_eq!(progress(&Rect::new(0.0, -100.0, 100.0, 400.0), 800.0), Some(1.0));
    }

    #[test]
    fn zero_height_section_is_ignored() {
        assert_eq!(progress(&Rect::new(0.0, 100.0, 100.0, 0.0), 800.0), None);
    }
}
