//! Scroll, pointer and navigation effects for the marketing landing page.
//!
//! The page markup is plain HTML; this crate is loaded as a wasm module and
//! mounts every effect once the DOM is ready.

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod host;
pub mod throttle;

pub mod effects {
    pub mod keyboard;
    pub mod nav_overlay;
    pub mod parallax;
    pub mod particles;
    pub mod reveal;
    pub mod scroll_spy;
    pub mod timeline;
}

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::FxConfig;
pub use controller::{MountReport, PageFx};
pub use error::FxError;
#[cfg(feature = "memory-host")]
pub use host::memory::{MemoryElement, MemoryHost};
pub use host::{Element, Host};
