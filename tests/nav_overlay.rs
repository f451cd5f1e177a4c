use landing_fx::effects::nav_overlay::NavState;
use landing_fx::geometry::Viewport;
use landing_fx::{Element, FxConfig, Host, MemoryElement, MemoryHost, PageFx};

struct Nav {
    host: MemoryHost,
    icon: MemoryElement,
    overlay: MemoryElement,
    close: MemoryElement,
    links: Vec<MemoryElement>,
    register: MemoryElement,
}

fn page() -> Nav {
    let host = MemoryHost::new(Viewport::new(1280.0, 800.0));
    let header = host.root().append(host.create("header"));
    let icon = header.append(host.create("button").with_class("menu-icon btn"));
    let overlay = host.root().append(host.create("div").with_class("nav-overlay"));
    let close = overlay.append(host.create("button").with_class("nav-overlay-close"));
    let links = ["about", "timeline", "contact"]
        .iter()
        .map(|section| {
            overlay.append(
                host.create("a")
                    .with_class("nav-overlay-link")
                    .with_attr("data-section", section),
            )
        })
        .collect();
    let register = overlay.append(host.create("a").with_class("nav-overlay-register btn"));
    Nav {
        host,
        icon,
        overlay,
        close,
        links,
        register,
    }
}

impl Nav {
    fn assert_closed(&self) {
        assert!(!self.icon.has_class("active"));
        assert!(!self.overlay.has_class("active"));
        assert_eq!(self.host.body().unwrap().style("overflow"), None);
    }

    fn assert_open(&self) {
        assert!(self.icon.has_class("active"));
        assert!(self.overlay.has_class("active"));
        assert_eq!(self.host.body().unwrap().style("overflow").as_deref(), Some("hidden"));
    }
}

#[test]
fn icon_opens_and_overlay_link_closes() {
    let nav = page();
    let fx = PageFx::mount(nav.host.clone(), FxConfig::default());
    assert!(fx.report().nav_overlay);
    assert_eq!(fx.nav_state(), Some(NavState::Closed));

    nav.icon.click();
    nav.assert_open();
    assert_eq!(fx.nav_state(), Some(NavState::Open));

    nav.links[1].click();
    nav.assert_closed();
    assert_eq!(fx.nav_state(), Some(NavState::Closed));
}

#[test]
fn icon_toggles_back_closed() {
    let nav = page();
    PageFx::mount(nav.host.clone(), FxConfig::default());
    nav.icon.click();
    nav.icon.click();
    nav.assert_closed();
}

#[test]
fn every_close_trigger_releases_scroll_lock() {
    let triggers: [fn(&Nav); 4] = [
        |nav| nav.close.click(),
        |nav| nav.links[0].click(),
        |nav| nav.register.click(),
        |nav| {
            nav.host.press_key(None, "Escape");
        },
    ];
    for trigger in triggers {
        let nav = page();
        PageFx::mount(nav.host.clone(), FxConfig::default());
        nav.icon.click();
        nav.assert_open();
        trigger(&nav);
        nav.assert_closed();
    }
}

#[test]
fn escape_while_closed_mutates_nothing() {
    let nav = page();
    PageFx::mount(nav.host.clone(), FxConfig::default());
    let before = nav.host.mutations();
    let prevented = nav.host.press_key(None, "Escape");
    assert!(!prevented);
    assert_eq!(nav.host.mutations(), before);
    nav.assert_closed();
}

#[test]
fn other_keys_leave_open_overlay_alone() {
    let nav = page();
    PageFx::mount(nav.host.clone(), FxConfig::default());
    nav.icon.click();
    nav.host.press_key(None, "Tab");
    nav.assert_open();
}

#[test]
fn missing_overlay_leaves_icon_inert() {
    let host = MemoryHost::new(Viewport::new(1280.0, 800.0));
    let icon = host.root().append(host.create("button").with_class("menu-icon"));
    let fx = PageFx::mount(host.clone(), FxConfig::default());
    assert!(!fx.report().nav_overlay);
    assert_eq!(fx.nav_state(), None);
    icon.click();
    assert!(!icon.has_class("active"));
    assert_eq!(host.body().unwrap().style("overflow"), None);
}

#[test]
fn enter_and_space_activate_buttons() {
    let nav = page();
    let fx = PageFx::mount(nav.host.clone(), FxConfig::default());
    assert_eq!(fx.report().buttons, 2);

    assert!(nav.host.press_key(Some(&nav.icon), "Enter"));
    nav.assert_open();

    assert!(nav.host.press_key(Some(&nav.register), " "));
    nav.assert_closed();

    assert!(!nav.host.press_key(Some(&nav.icon), "a"));
    nav.assert_closed();
}
