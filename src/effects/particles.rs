use log::debug;

use crate::config::{FxConfig, REDUCED_MOTION_QUERY};
use crate::error::FxError;
use crate::host::{Element, Host};

pub const CONTAINER_ID: &str = "particles";
pub const PARTICLE_CLASS: &str = "particle";

/// Fills `#particles` with drifting decorative dots. Returns how many were
/// created; zero on small screens or when reduced motion is requested.
pub fn spawn<H: Host>(host: &H, config: &FxConfig) -> Result<usize, FxError> {
    let Some(container) = host.element_by_id(CONTAINER_ID) else {
        debug!("no #{} container, skipping particles", CONTAINER_ID);
        return Ok(0);
    };
    let large_viewport = host.matches_media(&config.particle_media_query());
    let reduced_motion = host.matches_media(REDUCED_MOTION_QUERY);
    if !large_viewport || reduced_motion {
        debug!(
            "particles skipped (large_viewport: {}, reduced_motion: {})",
            large_viewport, reduced_motion
        );
        return Ok(0);
    }

    for _ in 0..config.particle_count {
        let particle = host.create_element("div", PARTICLE_CLASS)?;
        particle.set_style("left", &format!("{}%", host.random() * 100.0));
        particle.set_style("top", &format!("{}%", host.random() * 100.0));
        particle.set_style("--tx", &format!("{}px", (host.random() - 0.5) * 200.0));
        particle.set_style("--ty", &format!("{}px", (host.random() - 0.5) * 200.0));
        particle.set_style("animation-delay", &format!("{}s", host.random() * 20.0));
        particle.set_style("animation-duration", &format!("{}s", 15.0 + host.random() * 10.0));
        container.append_child(&particle)?;
    }
    Ok(config.particle_count)
}
