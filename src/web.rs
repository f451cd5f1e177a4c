//! Browser implementation of [`Host`] on top of `web-sys`, plus the wasm
//! entry point.

use log::{info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::{Array, Date, Math};
use web_sys::{
    Document, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, MouseEvent, Window,
};

use crate::config::{self, FxConfig, CONFIG_ELEMENT_ID};
use crate::controller::PageFx;
use crate::error::FxError;
use crate::geometry::{ObserverOptions, Rect, Viewport};
use crate::host::{
    Element, EventKind, Host, HostEvent, Intersection, IntersectionListener, Listener, Target,
};

impl From<FxError> for JsValue {
    fn from(err: FxError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[derive(Clone)]
pub struct WebElement(web_sys::Element);

impl WebElement {
    fn html(&self) -> Option<&HtmlElement> {
        self.0.dyn_ref::<HtmlElement>()
    }
}

impl Element for WebElement {
    fn add_class(&self, class: &str) {
        let _ = self.0.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.0.class_list().remove_1(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_style(&self, property: &str, value: &str) {
        let Some(html) = self.html() else {
            return;
        };
        let style = html.style();
        let _ = if value.is_empty() {
            style.remove_property(property).map(|_| ())
        } else {
            style.set_property(property, value)
        };
    }

    fn style(&self, property: &str) -> Option<String> {
        self.html()?
            .style()
            .get_property_value(property)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn bounding_rect(&self) -> Rect {
        let rect = self.0.get_bounding_client_rect();
        Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
    }

    fn offset_top(&self) -> f64 {
        self.html().map_or(0.0, |html| html.offset_top() as f64)
    }

    fn offset_height(&self) -> f64 {
        self.html().map_or(0.0, |html| html.offset_height() as f64)
    }

    fn click(&self) {
        if let Some(html) = self.html() {
            html.click();
        }
    }

    fn append_child(&self, child: &Self) -> Result<(), FxError> {
        self.0.append_child(&child.0)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct WebHost {
    window: Window,
    document: Document,
}

impl WebHost {
    pub fn new() -> Result<Self, FxError> {
        let window = web_sys::window().ok_or(FxError::NoWindow)?;
        let document = window.document().ok_or(FxError::NoDocument)?;
        Ok(Self { window, document })
    }

    /// Reads the JSON config element, falling back to defaults.
    pub fn load_config(&self) -> FxConfig {
        let Some(element) = self.element_by_id(CONFIG_ELEMENT_ID) else {
            return FxConfig::default();
        };
        let json = element.0.text_content().unwrap_or_default();
        FxConfig::from_json(&json).unwrap_or_else(|err| {
            warn!("ignoring #{}: {}", CONFIG_ELEMENT_ID, err);
            FxConfig::default()
        })
    }
}

fn host_event(event: &web_sys::Event) -> HostEvent {
    if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
        return HostEvent::key(&key.key());
    }
    if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
        return HostEvent::pointer(mouse.client_x() as f64, mouse.client_y() as f64);
    }
    HostEvent::plain()
}

impl Host for WebHost {
    type Element = WebElement;

    fn query(&self, selector: &str) -> Option<WebElement> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .map(WebElement)
    }

    fn query_all(&self, selector: &str) -> Vec<WebElement> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .map(WebElement)
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<WebElement> {
        self.document.get_element_by_id(id).map(WebElement)
    }

    fn create_element(&self, tag: &str, class: &str) -> Result<WebElement, FxError> {
        let element = self.document.create_element(tag)?;
        element.set_class_name(class);
        Ok(WebElement(element))
    }

    fn body(&self) -> Option<WebElement> {
        self.document.body().map(|body| WebElement(body.into()))
    }

    fn matches_media(&self, query: &str) -> bool {
        self.window
            .match_media(query)
            .ok()
            .flatten()
            .map_or(false, |list| list.matches())
    }

    fn viewport(&self) -> Viewport {
        let dimension = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };
        Viewport::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn now_ms(&self) -> f64 {
        Date::now()
    }

    fn random(&self) -> f64 {
        Math::random()
    }

    fn listen(
        &self,
        target: Target<'_, WebElement>,
        kind: EventKind,
        mut listener: Listener,
    ) -> Result<(), FxError> {
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let host_event = host_event(&event);
            listener(&host_event);
            if host_event.default_prevented() {
                event.prevent_default();
            }
        });
        let target: &web_sys::EventTarget = match target {
            Target::Window => self.window.as_ref(),
            Target::Document => self.document.as_ref(),
            Target::Element(element) => element.0.as_ref(),
        };
        target.add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref())?;
        // page-lifetime listener
        callback.forget();
        Ok(())
    }

    fn observe_intersections(
        &self,
        targets: &[WebElement],
        options: &ObserverOptions,
        mut listener: IntersectionListener<WebElement>,
    ) -> Result<(), FxError> {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let batch = entries
                    .iter()
                    .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| Intersection {
                        target: WebElement(entry.target()),
                        is_intersecting: entry.is_intersecting(),
                        ratio: entry.intersection_ratio(),
                    })
                    .collect();
                listener(batch);
            },
        );
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin.to_string());
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        for target in targets {
            observer.observe(&target.0);
        }
        callback.forget();
        Ok(())
    }
}

fn mount_page(host: WebHost) {
    let config = host.load_config();
    let fx = PageFx::mount(host, config);
    if !fx.report().failed.is_empty() {
        warn!("some page effects failed: {:?}", fx.report().failed);
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    console_log::init_with_level(config::log_level())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let host = WebHost::new()?;
    if host.document.ready_state() == "loading" {
        info!("waiting for DOMContentLoaded");
        let mut pending = Some(host.clone());
        host.listen(
            Target::Document,
            EventKind::DomReady,
            Box::new(move |_: &HostEvent| {
                if let Some(host) = pending.take() {
                    mount_page(host);
                }
            }),
        )?;
    } else {
        mount_page(host);
    }
    Ok(())
}
