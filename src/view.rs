//! View transform and bounds calculations
//!
//! Pure calculation logic shared by the interaction controller and render
//! adapters. The transform maps world (simulation) coordinates to screen
//! pixels as `screen = world * k + (x, y)`; it never feeds back into the
//! physics.

use crate::config::{DEFAULT_HEIGHT, DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, DEFAULT_WIDTH};

/// Zoom/pan state for 2D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    /// Canvas width in pixels
    pub width: f64,
    /// Canvas height in pixels
    pub height: f64,
    /// Translation in screen pixels
    pub x: f64,
    pub y: f64,
    /// Zoom level (1.0 = 100%)
    pub k: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl ViewTransform {
    /// Identity transform for a canvas of the given size
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            x: 0.0,
            y: 0.0,
            k: 1.0,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
        }
    }

    /// Set the allowed zoom range
    pub fn with_scale_extent(mut self, min_scale: f64, max_scale: f64) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self.k = self.k.clamp(min_scale, max_scale);
        self
    }

    /// Convert world coordinates to screen coordinates
    pub fn world_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.k + self.x, y * self.k + self.y)
    }

    /// Convert screen coordinates to world coordinates
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }

    /// Pan the view by delta pixels
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Zoom by `factor`, keeping the world point under `(sx, sy)` fixed
    pub fn zoom_at(&mut self, factor: f64, sx: f64, sy: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let (wx, wy) = self.screen_to_world(sx, sy);
        self.k = (self.k * factor).clamp(self.min_scale, self.max_scale);
        self.x = sx - wx * self.k;
        self.y = sy - wy * self.k;
    }

    /// Reset view to identity
    pub fn reset(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.k = 1.0_f64.clamp(self.min_scale, self.max_scale);
    }

    /// Scale and center so `bounds` fills the canvas minus `padding`
    pub fn fit_to_bounds(&mut self, bounds: &BoundingBox, padding: f64) {
        if bounds.is_empty() {
            return;
        }

        let available_width = (self.width - 2.0 * padding).max(1.0);
        let available_height = (self.height - 2.0 * padding).max(1.0);

        let scale_x = available_width / bounds.width();
        let scale_y = available_height / bounds.height();
        self.k = scale_x.min(scale_y).clamp(self.min_scale, self.max_scale);

        self.x = self.width / 2.0 - bounds.center_x() * self.k;
        self.y = self.height / 2.0 - bounds.center_y() * self.k;
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create an empty bounding box
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn include_point(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// Expand the bounding box to include a circle
    pub fn include_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.min_x = self.min_x.min(x - radius);
        self.max_x = self.max_x.max(x + radius);
        self.min_y = self.min_y.min(y - radius);
        self.max_y = self.max_y.max(y + radius);
    }

    /// Width, at least 1 to keep scale calculations finite
    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).max(1.0)
    }

    /// Height, at least 1
    pub fn height(&self) -> f64 {
        (self.max_y - self.min_y).max(1.0)
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.max_x - self.min_x) * (self.max_y - self.min_y)
        }
    }

    pub fn center_x(&self) -> f64 {
        (self.min_x + self.max_x) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        (self.min_y + self.max_y) / 2.0
    }

    /// Grow every side by `margin`
    pub fn padded(&self, margin: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            min_x: self.min_x - margin,
            max_x: self.max_x + margin,
            min_y: self.min_y - margin,
            max_y: self.max_y + margin,
        }
    }
}
