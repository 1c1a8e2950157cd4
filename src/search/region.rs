//! Pointer hit-testing for a component's own screen area.
//!
//! The renderer reports where the trigger and the open dropdown were laid
//! out; outside-click detection compares pointer positions against those
//! rectangles instead of listening on the whole document.

/// Pointer position in renderer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, edges inclusive
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn from_origin_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Point::new(x, y),
            max: Point::new(x + width.max(0.0), y + height.max(0.0)),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Screen area owned by one select: trigger plus dropdown panel when shown
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitRegion {
    trigger: Option<Bounds>,
    dropdown: Option<Bounds>,
}

impl HitRegion {
    pub fn set_trigger(&mut self, bounds: Bounds) {
        self.trigger = Some(bounds);
    }

    pub fn set_dropdown(&mut self, bounds: Option<Bounds>) {
        self.dropdown = bounds;
    }

    /// Whether the point lands inside the component. Before the first
    /// layout nothing is known, so every point counts as inside.
    pub fn contains(&self, point: Point) -> bool {
        if self.trigger.is_none() && self.dropdown.is_none() {
            return true;
        }
        self.trigger.is_some_and(|b| b.contains(point))
            || self.dropdown.is_some_and(|b| b.contains(point))
    }
}
