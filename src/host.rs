//! Capabilities the page effects need from a DOM-like environment.
//!
//! The effects never touch `web-sys` directly; they are written against
//! [`Host`] and [`Element`] so the same wiring runs in the browser
//! (`crate::web`) and in-process (`memory::MemoryHost`, behind the
//! `memory-host` feature).

use std::cell::Cell;

use crate::error::FxError;
use crate::geometry::{ObserverOptions, Rect, Viewport};

#[cfg(feature = "memory-host")]
pub mod memory;

pub trait Element: Clone + 'static {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;
    fn attribute(&self, name: &str) -> Option<String>;
    /// An empty `value` removes the property.
    fn set_style(&self, property: &str, value: &str);
    fn style(&self, property: &str) -> Option<String>;
    /// Border box relative to the viewport.
    fn bounding_rect(&self) -> Rect;
    fn offset_top(&self) -> f64;
    fn offset_height(&self) -> f64;
    /// Synthetic click, delivered to the element's click listeners.
    fn click(&self);
    fn append_child(&self, child: &Self) -> Result<(), FxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
    MouseMove,
    Scroll,
    Resize,
    DomReady,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::KeyDown => "keydown",
            EventKind::MouseMove => "mousemove",
            EventKind::Scroll => "scroll",
            EventKind::Resize => "resize",
            EventKind::DomReady => "DOMContentLoaded",
        }
    }
}

pub enum Target<'a, E> {
    Window,
    Document,
    Element(&'a E),
}

/// The parts of a platform event the effects read.
#[derive(Debug, Default)]
pub struct HostEvent {
    pub key: Option<String>,
    pub client_x: f64,
    pub client_y: f64,
    default_prevented: Cell<bool>,
}

impl HostEvent {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn key(key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            ..Self::default()
        }
    }

    pub fn pointer(client_x: f64, client_y: f64) -> Self {
        Self {
            client_x,
            client_y,
            ..Self::default()
        }
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

pub struct Intersection<E> {
    pub target: E,
    pub is_intersecting: bool,
    pub ratio: f64,
}

pub type Listener = Box<dyn FnMut(&HostEvent)>;
pub type IntersectionListener<E> = Box<dyn FnMut(Vec<Intersection<E>>)>;

pub trait Host: Clone + 'static {
    type Element: Element;

    fn query(&self, selector: &str) -> Option<Self::Element>;
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
    fn create_element(&self, tag: &str, class: &str) -> Result<Self::Element, FxError>;
    fn body(&self) -> Option<Self::Element>;

    fn matches_media(&self, query: &str) -> bool;
    fn viewport(&self) -> Viewport;
    /// Milliseconds on a monotonic-enough clock.
    fn now_ms(&self) -> f64;
    /// Uniform in `[0, 1)`.
    fn random(&self) -> f64;

    /// Registers a listener for the page's lifetime.
    fn listen(
        &self,
        target: Target<'_, Self::Element>,
        kind: EventKind,
        listener: Listener,
    ) -> Result<(), FxError>;

    /// Starts observing `targets`; the listener gets batches of entries in
    /// observation order.
    fn observe_intersections(
        &self,
        targets: &[Self::Element],
        options: &ObserverOptions,
        listener: IntersectionListener<Self::Element>,
    ) -> Result<(), FxError>;
}
