use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::error::FxError;
use crate::host::{Element, EventKind, Host, HostEvent, Target};

pub const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Closed,
    Open,
}

/// Slide-out navigation: the menu icon toggles it, the close button, any
/// overlay link, the register button and Escape close it.
pub struct NavOverlay<E: Element> {
    icon: E,
    overlay: E,
    body: Option<E>,
    state: NavState,
}

impl<E: Element> NavOverlay<E> {
    pub fn new(icon: E, overlay: E, body: Option<E>) -> Self {
        Self {
            icon,
            overlay,
            body,
            state: NavState::Closed,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn toggle(&mut self) {
        self.state = match self.state {
            NavState::Closed => NavState::Open,
            NavState::Open => NavState::Closed,
        };
        debug!("nav overlay toggled to {:?}", self.state);
        self.render();
    }

    pub fn close(&mut self) {
        self.state = NavState::Closed;
        self.render();
    }

    /// Escape closes an open overlay and is ignored otherwise.
    pub fn handle_key(&mut self, key: &str) {
        if key == "Escape" && self.state == NavState::Open {
            self.close();
        }
    }

    fn render(&self) {
        let open = self.state == NavState::Open;
        for element in [&self.icon, &self.overlay] {
            if open {
                element.add_class(ACTIVE_CLASS);
            } else {
                element.remove_class(ACTIVE_CLASS);
            }
        }
        // lock background scrolling while open
        if let Some(body) = &self.body {
            body.set_style("overflow", if open { "hidden" } else { "" });
        }
    }
}

pub fn mount<H: Host>(host: &H) -> Result<Option<Rc<RefCell<NavOverlay<H::Element>>>>, FxError> {
    let (Some(icon), Some(overlay)) = (host.query(".menu-icon"), host.query(".nav-overlay")) else {
        debug!("menu icon or overlay missing, nav overlay inert");
        return Ok(None);
    };
    let nav = Rc::new(RefCell::new(NavOverlay::new(icon.clone(), overlay, host.body())));

    {
        let nav = nav.clone();
        host.listen(
            Target::Element(&icon),
            EventKind::Click,
            Box::new(move |_: &HostEvent| nav.borrow_mut().toggle()),
        )?;
    }

    let mut closers = Vec::new();
    closers.extend(host.query(".nav-overlay-close"));
    closers.extend(host.query_all(".nav-overlay-link"));
    closers.extend(host.query(".nav-overlay-register"));
    for closer in &closers {
        let nav = nav.clone();
        // default navigation of links still proceeds
        host.listen(
            Target::Element(closer),
            EventKind::Click,
            Box::new(move |_: &HostEvent| nav.borrow_mut().close()),
        )?;
    }

    {
        let nav = nav.clone();
        host.listen(
            Target::Document,
            EventKind::KeyDown,
            Box::new(move |event: &HostEvent| {
                if let Some(key) = event.key.as_deref() {
                    nav.borrow_mut().handle_key(key);
                }
            }),
        )?;
    }

    Ok(Some(nav))
}
