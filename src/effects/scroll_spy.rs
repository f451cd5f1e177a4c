use log::debug;

use crate::config::FxConfig;
use crate::error::FxError;
use crate::host::{Element, Host, Intersection};

pub const ACTIVE_CLASS: &str = "active";
pub const SECTION_ATTRIBUTE: &str = "data-section";

/// Highlights the desktop and overlay nav links pointing at the section
/// in view. Both lists are kept in sync.
pub struct ScrollSpy<E: Element> {
    desktop_links: Vec<E>,
    overlay_links: Vec<E>,
}

impl<E: Element> ScrollSpy<E> {
    pub fn new(desktop_links: Vec<E>, overlay_links: Vec<E>) -> Self {
        Self {
            desktop_links,
            overlay_links,
        }
    }

    pub fn activate(&self, section_id: &str) {
        for link in self.desktop_links.iter().chain(&self.overlay_links) {
            link.remove_class(ACTIVE_CLASS);
            if link.attribute(SECTION_ATTRIBUTE).as_deref() == Some(section_id) {
                link.add_class(ACTIVE_CLASS);
            }
        }
    }
}

/// Returns the number of observed sections; desktop widths only.
pub fn mount<H: Host>(host: &H, config: &FxConfig) -> Result<usize, FxError> {
    if !host.matches_media(&config.desktop_media_query()) {
        debug!("not a desktop viewport, scroll spy off");
        return Ok(0);
    }
    let sections = host.query_all("section[id]");
    let spy = ScrollSpy::new(
        host.query_all(".desktop-nav .nav-link"),
        host.query_all(".nav-overlay-link[data-section]"),
    );

    // entries are applied in delivery order, the last intersecting one wins
    host.observe_intersections(
        &sections,
        &config.scroll_spy,
        Box::new(move |entries: Vec<Intersection<H::Element>>| {
            for entry in entries.iter().filter(|entry| entry.is_intersecting) {
                if let Some(id) = entry.target.attribute("id") {
                    spy.activate(&id);
                }
            }
        }),
    )?;
    Ok(sections.len())
}
