//! Infinite-scroll trigger.
//!
//! The trigger only decides whether the viewport has reached the bottom of
//! the document. It keeps no timer: repeated firings while a page is in
//! flight are absorbed by the catalog's `Loading` state.

use serde::{Deserialize, Serialize};

/// Scroll geometry of the document, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(scroll_top: f64, viewport_height: f64, document_height: f64) -> Self {
        Self {
            scroll_top,
            viewport_height,
            document_height,
        }
    }

    /// Distance left between the viewport bottom and the document end.
    #[must_use]
    pub fn remaining(&self) -> f64 {
        self.document_height - (self.scroll_top + self.viewport_height)
    }
}

/// Decides when the next catalog page should be requested.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollTrigger {
    prefetch_margin: f64,
}

impl ScrollTrigger {
    /// A trigger that fires `prefetch_margin` pixels before the bottom.
    ///
    /// Negative margins are treated as 0.
    #[must_use]
    pub fn new(prefetch_margin: f64) -> Self {
        Self {
            prefetch_margin: prefetch_margin.max(0.0),
        }
    }

    #[must_use]
    pub const fn prefetch_margin(&self) -> f64 {
        self.prefetch_margin
    }

    /// Whether the next page should be loaded for `viewport`.
    ///
    /// True exactly when `scroll_top + viewport_height (+ margin) >=
    /// document_height` and the catalog is not exhausted.
    #[must_use]
    pub fn should_load(&self, viewport: &Viewport, exhausted: bool) -> bool {
        !exhausted
            && viewport.scroll_top + viewport.viewport_height + self.prefetch_margin
                >= viewport.document_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_at_bottom() {
        let trigger = ScrollTrigger::default();
        assert!(trigger.should_load(&Viewport::new(1200.0, 800.0, 2000.0), false));
        assert!(trigger.should_load(&Viewport::new(1250.0, 800.0, 2000.0), false));
    }

    #[test]
    fn test_does_not_fire_above_bottom() {
        let trigger = ScrollTrigger::default();
        assert!(!trigger.should_load(&Viewport::new(1199.5, 800.0, 2000.0), false));
        assert!(!trigger.should_load(&Viewport::new(0.0, 800.0, 2000.0), false));
    }

    #[test]
    fn test_never_fires_when_exhausted() {
        let trigger = ScrollTrigger::default();
        assert!(!trigger.should_load(&Viewport::new(1200.0, 800.0, 2000.0), true));
    }

    #[test]
    fn test_prefetch_margin() {
        let trigger = ScrollTrigger::new(200.0);
        assert!(trigger.should_load(&Viewport::new(1000.0, 800.0, 2000.0), false));
        assert!(!trigger.should_load(&Viewport::new(999.0, 800.0, 2000.0), false));
        assert!((ScrollTrigger::new(-5.0).prefetch_margin()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_short_document_fires_immediately() {
        let trigger = ScrollTrigger::default();
        let viewport = Viewport::new(0.0, 900.0, 600.0);
        assert!(viewport.remaining() < 0.0);
        assert!(trigger.should_load(&viewport, false));
    }
}
