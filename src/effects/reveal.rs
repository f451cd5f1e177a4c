use crate::config::FxConfig;
use crate::error::FxError;
use crate::host::{Element, Host, Intersection};

/// Hides content cards until they scroll into view, then fades them in.
/// Returns the number of observed elements.
pub fn mount<H: Host>(host: &H, config: &FxConfig) -> Result<usize, FxError> {
    let targets = host.query_all(&config.reveal_selector);
    if targets.is_empty() {
        return Ok(0);
    }
    for element in &targets {
        element.set_style("opacity", "0");
        element.set_style("transform", "translateY(30px)");
        element.set_style("transition", "all 0.6s ease");
    }
    host.observe_intersections(
        &targets,
        &config.reveal,
        Box::new(|entries: Vec<Intersection<H::Element>>| {
            for entry in entries.iter().filter(|entry| entry.is_intersecting) {
                entry.target.set_style("opacity", "1");
                entry.target.set_style("transform", "translateY(0)");
            }
        }),
    )?;
    Ok(targets.len())
}
