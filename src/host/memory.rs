//! In-process page model implementing [`Host`]: enough DOM to mount every
//! effect, lay elements out on a scrollable document and compute
//! intersections the way the browser observer reports them.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    Element, EventKind, Host, HostEvent, Intersection, IntersectionListener, Listener, Target,
};
use crate::error::FxError;
use crate::geometry::{intersection_ratio, meets_threshold, ObserverOptions, Rect, Viewport};

type SharedListener = Rc<RefCell<Listener>>;

struct NodeData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    /// Document coordinates.
    layout: Rect,
    offset_top: Option<f64>,
    parent: Option<Weak<RefCell<NodeData>>>,
    children: Vec<MemoryElement>,
    listeners: Vec<(EventKind, SharedListener)>,
}

struct Observer {
    targets: Vec<MemoryElement>,
    options: ObserverOptions,
    listener: RefCell<IntersectionListener<MemoryElement>>,
    /// Per target: overlapping the root, and at or past the threshold.
    last: RefCell<Vec<(bool, bool)>>,
}

struct PageState {
    viewport: Cell<Viewport>,
    scroll_y: Cell<f64>,
    reduced_motion: Cell<bool>,
    now: Cell<f64>,
    mutations: Cell<usize>,
    rng: RefCell<StdRng>,
    window_listeners: RefCell<Vec<(EventKind, SharedListener)>>,
    document_listeners: RefCell<Vec<(EventKind, SharedListener)>>,
    observers: RefCell<Vec<Rc<Observer>>>,
}

impl PageState {
    fn touch(&self) {
        self.mutations.set(self.mutations.get() + 1);
    }
}

#[derive(Clone)]
pub struct MemoryElement {
    node: Rc<RefCell<NodeData>>,
    page: Rc<PageState>,
}

#[derive(Clone)]
pub struct MemoryHost {
    page: Rc<PageState>,
    body: MemoryElement,
}

impl MemoryHost {
    pub fn new(viewport: Viewport) -> Self {
        let page = Rc::new(PageState {
            viewport: Cell::new(viewport),
            scroll_y: Cell::new(0.0),
            reduced_motion: Cell::new(false),
            now: Cell::new(0.0),
            mutations: Cell::new(0),
            rng: RefCell::new(StdRng::seed_from_u64(0x5eed)),
            window_listeners: RefCell::new(Vec::new()),
            document_listeners: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
        });
        let body = MemoryElement::detached(&page, "body");
        Self { page, body }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        *self.page.rng.borrow_mut() = StdRng::seed_from_u64(seed);
        self
    }

    pub fn set_reduced_motion(&self, reduced: bool) {
        self.page.reduced_motion.set(reduced);
    }

    /// Detached element; attach it with [`MemoryElement::append`].
    pub fn create(&self, tag: &str) -> MemoryElement {
        MemoryElement::detached(&self.page, tag)
    }

    pub fn root(&self) -> &MemoryElement {
        &self.body
    }

    /// Class/style/tree mutations performed so far.
    pub fn mutations(&self) -> usize {
        self.page.mutations.get()
    }

    pub fn set_time(&self, now_ms: f64) {
        self.page.now.set(now_ms);
    }

    pub fn advance(&self, ms: f64) {
        self.page.now.set(self.page.now.get() + ms);
    }

    /// Scrolls the document, fires window `scroll` and re-evaluates
    /// observers.
    pub fn scroll_to(&self, y: f64) {
        self.page.scroll_y.set(y);
        self.dispatch_window(EventKind::Scroll, &HostEvent::plain());
        self.flush_observers();
    }

    pub fn resize(&self, viewport: Viewport) {
        self.page.viewport.set(viewport);
        self.dispatch_window(EventKind::Resize, &HostEvent::plain());
        self.flush_observers();
    }

    pub fn move_mouse(&self, client_x: f64, client_y: f64) {
        self.dispatch_document(EventKind::MouseMove, &HostEvent::pointer(client_x, client_y));
    }

    /// Keydown on `target` (or the document), bubbling to document and
    /// window. Returns whether a listener prevented the default action.
    pub fn press_key(&self, target: Option<&MemoryElement>, key: &str) -> bool {
        let event = HostEvent::key(key);
        if let Some(element) = target {
            element.dispatch(EventKind::KeyDown, &event);
        }
        self.dispatch_document(EventKind::KeyDown, &event);
        self.dispatch_window(EventKind::KeyDown, &event);
        event.default_prevented()
    }

    fn dispatch_window(&self, kind: EventKind, event: &HostEvent) {
        let listeners = matching(&self.page.window_listeners.borrow(), kind);
        run(listeners, event);
    }

    fn dispatch_document(&self, kind: EventKind, event: &HostEvent) {
        let listeners = matching(&self.page.document_listeners.borrow(), kind);
        run(listeners, event);
    }

    fn flush_observers(&self) {
        let observers = self.page.observers.borrow().clone();
        for observer in observers {
            self.deliver(&observer, false);
        }
    }

    fn deliver(&self, observer: &Observer, initial: bool) {
        let viewport = self.page.viewport.get();
        let mut entries = Vec::new();
        {
            let mut last = observer.last.borrow_mut();
            for (index, target) in observer.targets.iter().enumerate() {
                let rect = target.bounding_rect();
                let ratio = intersection_ratio(&rect, &viewport, &observer.options.root_margin);
                // any overlap intersects; crossing the threshold either way
                // is what queues a new entry
                let is_intersecting = ratio > 0.0;
                let state = (
                    is_intersecting,
                    meets_threshold(&rect, &viewport, &observer.options),
                );
                if initial || last[index] != state {
                    last[index] = state;
                    entries.push(Intersection {
                        target: target.clone(),
                        is_intersecting,
                        ratio,
                    });
                }
            }
        }
        if entries.is_empty() {
            return;
        }
        if let Ok(mut listener) = observer.listener.try_borrow_mut() {
            (*listener)(entries);
        }
    }

    fn descendants(&self) -> Vec<MemoryElement> {
        let mut out = Vec::new();
        self.body.collect_descendants(&mut out);
        out
    }
}

fn matching(listeners: &[(EventKind, SharedListener)], kind: EventKind) -> Vec<SharedListener> {
    listeners
        .iter()
        .filter(|(k, _)| *k == kind)
        .map(|(_, l)| l.clone())
        .collect()
}

fn run(listeners: Vec<SharedListener>, event: &HostEvent) {
    for listener in listeners {
        // a listener that re-enters itself is skipped, not deadlocked
        if let Ok(mut listener) = listener.try_borrow_mut() {
            (*listener)(event);
        }
    }
}

impl MemoryElement {
    fn detached(page: &Rc<PageState>, tag: &str) -> Self {
        Self {
            node: Rc::new(RefCell::new(NodeData {
                tag: tag.to_ascii_lowercase(),
                id: None,
                classes: Vec::new(),
                attributes: BTreeMap::new(),
                style: BTreeMap::new(),
                layout: Rect::default(),
                offset_top: None,
                parent: None,
                children: Vec::new(),
                listeners: Vec::new(),
            })),
            page: page.clone(),
        }
    }

    pub fn with_id(self, id: &str) -> Self {
        self.node.borrow_mut().id = Some(id.to_string());
        self
    }

    pub fn with_class(self, class: &str) -> Self {
        for class in class.split_whitespace() {
            let mut node = self.node.borrow_mut();
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
        self
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.node
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Position in document coordinates (unscrolled).
    pub fn with_layout(self, layout: Rect) -> Self {
        self.node.borrow_mut().layout = layout;
        self
    }

    pub fn with_offset_top(self, offset_top: f64) -> Self {
        self.node.borrow_mut().offset_top = Some(offset_top);
        self
    }

    /// Attaches `child` and hands it back for further nesting.
    pub fn append(&self, child: MemoryElement) -> MemoryElement {
        self.attach(&child);
        child
    }

    pub fn children(&self) -> Vec<MemoryElement> {
        self.node.borrow().children.clone()
    }

    pub fn classes(&self) -> Vec<String> {
        self.node.borrow().classes.clone()
    }

    pub fn ptr_eq(&self, other: &MemoryElement) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    fn attach(&self, child: &MemoryElement) {
        child.node.borrow_mut().parent = Some(Rc::downgrade(&self.node));
        self.node.borrow_mut().children.push(child.clone());
    }

    fn parent(&self) -> Option<MemoryElement> {
        let parent = self.node.borrow().parent.as_ref()?.upgrade()?;
        Some(MemoryElement {
            node: parent,
            page: self.page.clone(),
        })
    }

    fn collect_descendants(&self, out: &mut Vec<MemoryElement>) {
        for child in self.children() {
            out.push(child.clone());
            child.collect_descendants(out);
        }
    }

    fn dispatch(&self, kind: EventKind, event: &HostEvent) {
        let listeners = matching(&self.node.borrow().listeners, kind);
        run(listeners, event);
    }

    fn matches(&self, selector: &str) -> bool {
        selector
            .split(',')
            .map(str::trim)
            .filter(|group| !group.is_empty())
            .any(|group| self.matches_group(group))
    }

    fn matches_group(&self, group: &str) -> bool {
        let mut parts: Vec<Compound> = group.split_whitespace().map(Compound::parse).collect();
        let Some(last) = parts.pop() else {
            return false;
        };
        if !last.matches(self) {
            return false;
        }
        // descendant combinator: each remaining part needs a matching ancestor
        let mut ancestor = self.parent();
        while let Some(part) = parts.pop() {
            loop {
                match ancestor {
                    Some(candidate) => {
                        ancestor = candidate.parent();
                        if part.matches(&candidate) {
                            break;
                        }
                    }
                    None => return false,
                }
            }
        }
        true
    }
}

impl Element for MemoryElement {
    fn add_class(&self, class: &str) {
        let mut node = self.node.borrow_mut();
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
            self.page.touch();
        }
    }

    fn remove_class(&self, class: &str) {
        let mut node = self.node.borrow_mut();
        let before = node.classes.len();
        node.classes.retain(|c| c != class);
        if node.classes.len() != before {
            self.page.touch();
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.node.borrow().classes.iter().any(|c| c == class)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        let node = self.node.borrow();
        match name {
            "id" => node.id.clone(),
            "class" => Some(node.classes.join(" ")),
            _ => node.attributes.get(name).cloned(),
        }
    }

    fn set_style(&self, property: &str, value: &str) {
        let mut node = self.node.borrow_mut();
        let changed = if value.is_empty() {
            node.style.remove(property).is_some()
        } else {
            node.style.insert(property.to_string(), value.to_string()).as_deref() != Some(value)
        };
        if changed {
            self.page.touch();
        }
    }

    fn style(&self, property: &str) -> Option<String> {
        self.node.borrow().style.get(property).cloned()
    }

    fn bounding_rect(&self) -> Rect {
        self.node.borrow().layout.translate(0.0, -self.page.scroll_y.get())
    }

    fn offset_top(&self) -> f64 {
        let node = self.node.borrow();
        node.offset_top.unwrap_or(node.layout.y)
    }

    fn offset_height(&self) -> f64 {
        self.node.borrow().layout.height
    }

    fn click(&self) {
        let event = HostEvent::plain();
        self.dispatch(EventKind::Click, &event);
        let listeners = matching(&self.page.document_listeners.borrow(), EventKind::Click);
        run(listeners, &event);
    }

    fn append_child(&self, child: &Self) -> Result<(), FxError> {
        self.attach(child);
        self.page.touch();
        Ok(())
    }
}

impl Host for MemoryHost {
    type Element = MemoryElement;

    fn query(&self, selector: &str) -> Option<MemoryElement> {
        self.descendants().into_iter().find(|el| el.matches(selector))
    }

    fn query_all(&self, selector: &str) -> Vec<MemoryElement> {
        self.descendants()
            .into_iter()
            .filter(|el| el.matches(selector))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<MemoryElement> {
        self.descendants()
            .into_iter()
            .find(|el| el.node.borrow().id.as_deref() == Some(id))
    }

    fn create_element(&self, tag: &str, class: &str) -> Result<MemoryElement, FxError> {
        Ok(self.create(tag).with_class(class))
    }

    fn body(&self) -> Option<MemoryElement> {
        Some(self.body.clone())
    }

    fn matches_media(&self, query: &str) -> bool {
        let inner = query.trim().trim_start_matches('(').trim_end_matches(')');
        let Some((feature, value)) = inner.split_once(':') else {
            return false;
        };
        let value = value.trim();
        let width = self.page.viewport.get().width;
        let px = || value.strip_suffix("px").and_then(|v| v.trim().parse::<f64>().ok());
        match feature.trim() {
            "min-width" => px().map_or(false, |min| width >= min),
            "max-width" => px().map_or(false, |max| width <= max),
            "prefers-reduced-motion" => (value == "reduce") == self.page.reduced_motion.get(),
            _ => false,
        }
    }

    fn viewport(&self) -> Viewport {
        self.page.viewport.get()
    }

    fn now_ms(&self) -> f64 {
        self.page.now.get()
    }

    fn random(&self) -> f64 {
        self.page.rng.borrow_mut().gen::<f64>()
    }

    fn listen(
        &self,
        target: Target<'_, MemoryElement>,
        kind: EventKind,
        listener: Listener,
    ) -> Result<(), FxError> {
        let entry = (kind, Rc::new(RefCell::new(listener)));
        match target {
            Target::Window => self.page.window_listeners.borrow_mut().push(entry),
            Target::Document => self.page.document_listeners.borrow_mut().push(entry),
            Target::Element(element) => element.node.borrow_mut().listeners.push(entry),
        }
        Ok(())
    }

    fn observe_intersections(
        &self,
        targets: &[MemoryElement],
        options: &ObserverOptions,
        listener: IntersectionListener<MemoryElement>,
    ) -> Result<(), FxError> {
        let observer = Rc::new(Observer {
            targets: targets.to_vec(),
            options: *options,
            listener: RefCell::new(listener),
            last: RefCell::new(vec![(false, false); targets.len()]),
        });
        self.page.observers.borrow_mut().push(observer.clone());
        self.deliver(&observer, true);
        Ok(())
    }
}

/// One simple selector: `tag.class#id[attr][attr=value]`.
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
    /// Set when the source has syntax this parser does not know; such a
    /// compound matches nothing.
    unsupported: bool,
}

impl Compound {
    fn parse(source: &str) -> Self {
        let mut compound = Compound {
            tag: None,
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
            unsupported: false,
        };
        let mut rest = source;
        let name_end = |s: &str| s.find(['.', '#', '[']).unwrap_or(s.len());

        let end = name_end(rest);
        if end > 0 {
            compound.tag = Some(rest[..end].to_ascii_lowercase());
        }
        rest = &rest[end..];

        while let Some(marker) = rest.chars().next() {
            rest = &rest[marker.len_utf8()..];
            match marker {
                '.' => {
                    let end = name_end(rest);
                    compound.classes.push(rest[..end].to_string());
                    rest = &rest[end..];
                }
                '#' => {
                    let end = name_end(rest);
                    compound.id = Some(rest[..end].to_string());
                    rest = &rest[end..];
                }
                '[' => {
                    let end = rest.find(']').unwrap_or(rest.len());
                    let body = &rest[..end];
                    let attribute = match body.split_once('=') {
                        Some((name, value)) => (
                            name.trim().to_string(),
                            Some(value.trim().trim_matches(['"', '\'']).to_string()),
                        ),
                        None => (body.trim().to_string(), None),
                    };
                    compound.attributes.push(attribute);
                    rest = rest.get(end + 1..).unwrap_or("");
                }
                _ => {
                    compound.unsupported = true;
                    break;
                }
            }
        }
        compound
    }

    fn matches(&self, element: &MemoryElement) -> bool {
        if self.unsupported {
            return false;
        }
        let node = element.node.borrow();
        if let Some(tag) = &self.tag {
            if *tag != node.tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.id.as_ref() != Some(id) {
                return false;
            }
        }
        if !self
            .classes
            .iter()
            .all(|class| node.classes.iter().any(|c| c == class))
        {
            return false;
        }
        drop(node);
        self.attributes.iter().all(|(name, expected)| {
            match (element.attribute(name), expected) {
                (Some(actual), Some(expected)) => actual == *expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> MemoryHost {
        MemoryHost::new(Viewport::new(1280.0, 800.0))
    }

    #[test]
    fn descendant_and_attribute_selectors() {
        let host = host();
        let nav = host.root().append(host.create("nav").with_class("desktop-nav"));
        let inside = nav.append(host.create("a").with_class("nav-link").with_attr("data-section", "about"));
        host.root().append(host.create("a").with_class("nav-link"));
        host.root().append(host.create("section").with_id("about"));
        host.root().append(host.create("section"));

        let links = host.query_all(".desktop-nav .nav-link");
        assert_eq!(links.len(), 1);
        assert!(links[0].ptr_eq(&inside));

        assert_eq!(host.query_all("section[id]").len(), 1);
        assert_eq!(host.query_all(".nav-link[data-section]").len(), 1);
        assert_eq!(host.query_all(".nav-link[data-section=about]").len(), 1);
        assert_eq!(host.query_all(".nav-link[data-section=\"contact\"]").len(), 0);
    }

    #[test]
    fn unknown_selector_syntax_matches_nothing() {
        let host = host();
        host.root().append(host.create("div").with_attr("data-x", "1"));

        assert_eq!(host.query_all("[data-x]").len(), 1);
        assert!(host.query_all("[data-x]é").is_empty());
        assert!(host.query_all("[data-x]x").is_empty());
        assert!(host.query_all("div:hover").is_empty());
        assert_eq!(host.query_all("div:hover, [data-x]").len(), 1);
    }

    #[test]
    fn selector_list_keeps_document_order_without_duplicates() {
        let host = host();
        host.root().append(host.create("div").with_class("about-content"));
        host.root().append(host.create("div").with_class("guideline-card advisory-card"));
        host.root().append(host.create("div").with_class("guideline-card"));

        let found = host.query_all(".guideline-card, .about-content, .advisory-card");
        assert_eq!(found.len(), 3);
        assert!(found[0].has_class("about-content"));
    }

    #[test]
    fn media_queries_follow_viewport_and_preference() {
        let host = host();
        assert!(host.matches_media("(min-width: 768px)"));
        assert!(!host.matches_media("(prefers-reduced-motion: reduce)"));
        host.set_reduced_motion(true);
        assert!(host.matches_media("(prefers-reduced-motion: reduce)"));
        host.resize(Viewport::new(500.0, 800.0));
        assert!(!host.matches_media("(min-width: 768px)"));
        assert!(host.matches_media("(max-width: 768px)"));
    }

    #[test]
    fn empty_style_value_removes_property() {
        let host = host();
        let body = host.body().unwrap();
        body.set_style("overflow", "hidden");
        assert_eq!(body.style("overflow").as_deref(), Some("hidden"));
        body.set_style("overflow", "");
        assert_eq!(body.style("overflow"), None);
        assert_eq!(host.mutations(), 2);
    }

    #[test]
    fn scrolling_shifts_bounding_rect() {
        let host = host();
        let block = host
            .root()
            .append(host.create("div").with_layout(Rect::new(0.0, 1000.0, 1280.0, 200.0)));
        host.scroll_to(600.0);
        assert_eq!(block.bounding_rect().top(), 400.0);
    }
}
