use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::FxError;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Overlapping region, `None` when the rects do not touch.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Length {
    /// Resolves against the root dimension along the same axis.
    pub fn resolve(&self, basis: f64) -> f64 {
        match *self {
            Length::Px(px) => px,
            Length::Percent(pct) => basis * pct / 100.0,
        }
    }
}

impl FromStr for Length {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FxError::InvalidRootMargin(s.to_string());
        if let Some(px) = s.strip_suffix("px") {
            return px.parse().map(Length::Px).map_err(|_| invalid());
        }
        if let Some(pct) = s.strip_suffix('%') {
            return pct.parse().map(Length::Percent).map_err(|_| invalid());
        }
        // unitless zero is the only bare number CSS accepts here
        match s.parse::<f64>() {
            Ok(v) if v == 0.0 => Ok(Length::Px(0.0)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(px) => write!(f, "{}px", px),
            Length::Percent(pct) => write!(f, "{}%", pct),
        }
    }
}

/// CSS `margin`-style shorthand grown (positive) or shrunk (negative)
/// around the observer root.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl RootMargin {
    pub fn zero() -> Self {
        Self {
            top: Length::Px(0.0),
            right: Length::Px(0.0),
            bottom: Length::Px(0.0),
            left: Length::Px(0.0),
        }
    }

    /// The root rect after applying the margin to `viewport`.
    pub fn apply(&self, viewport: &Viewport) -> Rect {
        let top = self.top.resolve(viewport.height);
        let bottom = self.bottom.resolve(viewport.height);
        let left = self.left.resolve(viewport.width);
        let right = self.right.resolve(viewport.width);
        Rect::new(
            -left,
            -top,
            viewport.width + left + right,
            viewport.height + top + bottom,
        )
    }
}

impl FromStr for RootMargin {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<Length>, _>>()?;
        let (top, right, bottom, left) = match parts.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => return Err(FxError::InvalidRootMargin(s.to_string())),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl TryFrom<String> for RootMargin {
    type Error = FxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl ObserverOptions {
    pub fn new(threshold: f64, root_margin: RootMargin) -> Self {
        Self {
            threshold,
            root_margin,
        }
    }
}

/// Visible fraction of `target` (viewport coordinates) inside the
/// margin-adjusted root.
pub fn intersection_ratio(target: &Rect, viewport: &Viewport, margin: &RootMargin) -> f64 {
    let area = target.area();
    if area <= 0.0 {
        return 0.0;
    }
    let root = margin.apply(viewport);
    target
        .intersection(&root)
        .map(|overlap| overlap.area() / area)
        .unwrap_or(0.0)
}

/// Whether `target` overlaps the root by at least the threshold. Any
/// smaller overlap still counts as intersecting for observer entries.
pub fn meets_threshold(target: &Rect, viewport: &Viewport, options: &ObserverOptions) -> bool {
    let ratio = intersection_ratio(target, viewport, &options.root_margin);
    ratio > 0.0 && ratio >= options.threshold
}
