use landing_fx::geometry::{Rect, Viewport};
use landing_fx::{Element, FxConfig, MemoryElement, MemoryHost, PageFx};

struct Spy {
    host: MemoryHost,
    desktop: Vec<MemoryElement>,
    overlay: Vec<MemoryElement>,
}

fn page(width: f64, sections: &[(&str, f64, f64)]) -> Spy {
    let host = MemoryHost::new(Viewport::new(width, 1000.0));
    let nav = host.root().append(host.create("nav").with_class("desktop-nav"));
    let overlay_root = host.root().append(host.create("div").with_class("nav-overlay"));
    let mut desktop = Vec::new();
    let mut overlay = Vec::new();
    for (id, top, height) in sections {
        desktop.push(nav.append(
            host.create("a").with_class("nav-link").with_attr("data-section", id),
        ));
        overlay.push(overlay_root.append(
            host.create("a")
                .with_class("nav-overlay-link")
                .with_attr("data-section", id),
        ));
        host.root().append(
            host.create("section")
                .with_id(id)
                .with_layout(Rect::new(0.0, *top, width, *height)),
        );
    }
    Spy {
        host,
        desktop,
        overlay,
    }
}

impl Spy {
    fn active(links: &[MemoryElement]) -> Vec<bool> {
        links.iter().map(|link| link.has_class("active")).collect()
    }

    fn assert_active(&self, expected: &[bool]) {
        assert_eq!(Self::active(&self.desktop), expected);
        assert_eq!(Self::active(&self.overlay), expected);
    }
}

#[test]
fn top_section_wins_over_bottom_band() {
    // A fills the top 80% of the viewport, B the bottom 20%
    let spy = page(1280.0, &[("a", 0.0, 800.0), ("b", 800.0, 200.0)]);
    let fx = PageFx::mount(spy.host.clone(), FxConfig::default());
    assert_eq!(fx.report().spied_sections, 2);
    spy.assert_active(&[true, false]);
}

#[test]
fn highlight_follows_scroll() {
    let spy = page(
        1280.0,
        &[("a", 0.0, 800.0), ("b", 800.0, 300.0), ("c", 1100.0, 900.0)],
    );
    PageFx::mount(spy.host.clone(), FxConfig::default());
    spy.assert_active(&[true, false, false]);

    // b fills the band; c only touches its lower edge
    spy.host.scroll_to(700.0);
    spy.assert_active(&[false, true, false]);

    spy.host.scroll_to(1100.0);
    spy.assert_active(&[false, false, true]);
}

#[test]
fn leaving_section_reclaims_highlight_while_still_overlapping() {
    // active band is y 100..400 of a 1000px viewport
    let spy = page(1280.0, &[("a", 0.0, 600.0), ("b", 600.0, 800.0)]);
    PageFx::mount(spy.host.clone(), FxConfig::default());
    spy.assert_active(&[true, false]);

    // an eighth of b overlaps: intersecting, below the threshold
    spy.host.scroll_to(300.0);
    spy.assert_active(&[false, true]);

    // a drops under the threshold on its way out and reports itself
    // as intersecting again
    spy.host.scroll_to(350.0);
    spy.assert_active(&[true, false]);

    spy.host.scroll_to(500.0);
    spy.assert_active(&[false, true]);
}

#[test]
fn last_intersecting_entry_in_a_batch_wins() {
    // both fully inside the active band at load
    let spy = page(1280.0, &[("x", 120.0, 100.0), ("y", 250.0, 100.0)]);
    PageFx::mount(spy.host.clone(), FxConfig::default());
    spy.assert_active(&[false, true]);
}

#[test]
fn tablet_widths_skip_scroll_spy() {
    let spy = page(768.0, &[("a", 0.0, 800.0), ("b", 800.0, 200.0)]);
    let fx = PageFx::mount(spy.host.clone(), FxConfig::default());
    assert_eq!(fx.report().spied_sections, 0);
    spy.assert_active(&[false, false]);
    spy.host.scroll_to(700.0);
    spy.assert_active(&[false, false]);
}
