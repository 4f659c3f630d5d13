//! Resize and rotate handle math.
//!
//! All functions here are pure: they take the geometry captured when a
//! gesture started plus the pointer positions and return the geometry the
//! module should have now. Nothing is written to the store.

use campmap_core::{normalize_degrees, Geometry, Position, Size};
use campmap_settings::EditorSettings;
use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};

/// Distance of the rotate handle above the top edge, in world units.
pub const ROTATE_HANDLE_OFFSET: f64 = 30.0;

/// Axis-aligned box in the module's unrotated frame: top-left plus size.
/// Rotation, when any, pivots around the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_geometry(geometry: &Geometry) -> Self {
        Self::new(
            geometry.position.x,
            geometry.position.y,
            geometry.size.width,
            geometry.size.height,
        )
    }

    pub fn to_geometry(&self, rotation: f64) -> Geometry {
        Geometry::new(
            Position::new(self.x, self.y),
            Size::new(self.width, self.height),
            rotation,
        )
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A draggable control on a selected module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    Rotate,
}

impl Handle {
    pub const RESIZE: [Handle; 8] = [
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Right,
        Handle::BottomRight,
        Handle::Bottom,
        Handle::BottomLeft,
        Handle::Left,
    ];

    pub fn is_resize(&self) -> bool {
        !matches!(self, Handle::Rotate)
    }

    pub fn is_corner(&self) -> bool {
        matches!(
            self,
            Handle::TopLeft | Handle::TopRight | Handle::BottomRight | Handle::BottomLeft
        )
    }

    /// Direction of the handle from the center, per axis, in `{-1, 0, 1}`.
    pub fn anchor(&self) -> (f64, f64) {
        match self {
            Handle::TopLeft => (-1.0, -1.0),
            Handle::Top => (0.0, -1.0),
            Handle::TopRight => (1.0, -1.0),
            Handle::Right => (1.0, 0.0),
            Handle::BottomRight => (1.0, 1.0),
            Handle::Bottom => (0.0, 1.0),
            Handle::BottomLeft => (-1.0, 1.0),
            Handle::Left => (-1.0, 0.0),
            Handle::Rotate => (0.0, -1.0),
        }
    }

    /// The handle on the other side of the center. `Rotate` has none.
    pub fn opposite(&self) -> Option<Handle> {
        let opposite = match self {
            Handle::TopLeft => Handle::BottomRight,
            Handle::Top => Handle::Bottom,
            Handle::TopRight => Handle::BottomLeft,
            Handle::Right => Handle::Left,
            Handle::BottomRight => Handle::TopLeft,
            Handle::Bottom => Handle::Top,
            Handle::BottomLeft => Handle::TopRight,
            Handle::Left => Handle::Right,
            Handle::Rotate => return None,
        };
        Some(opposite)
    }

    /// World positions of every handle for a module with `bounds` rotated
    /// by `rotation` degrees.
    pub fn handle_positions(bounds: &Bounds, rotation: f64) -> Vec<(Handle, Point2<f64>)> {
        let center = bounds.center();
        let rot = Rotation2::new(rotation.to_radians());
        let (hw, hh) = (bounds.width / 2.0, bounds.height / 2.0);

        let mut out: Vec<(Handle, Point2<f64>)> = Handle::RESIZE
            .iter()
            .map(|&h| {
                let (ax, ay) = h.anchor();
                (h, center + rot * Vector2::new(ax * hw, ay * hh))
            })
            .collect();
        out.push((
            Handle::Rotate,
            center + rot * Vector2::new(0.0, -hh - ROTATE_HANDLE_OFFSET),
        ));
        out
    }

    /// The handle nearest to `p` within `tolerance`, if any.
    pub fn handle_at(
        p: Point2<f64>,
        bounds: &Bounds,
        rotation: f64,
        tolerance: f64,
    ) -> Option<Handle> {
        Self::handle_positions(bounds, rotation)
            .into_iter()
            .map(|(h, pos)| (h, nalgebra::distance(&p, &pos)))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(h, _)| h)
    }
}

/// Limits applied while resizing and rotating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConstraints {
    pub snap_to_grid: bool,
    pub grid_size: f64,
    pub preserve_aspect_ratio: bool,
    pub min_width: f64,
    pub min_height: f64,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    pub angle_snap_degrees: f64,
}

impl Default for TransformConstraints {
    fn default() -> Self {
        Self::from_settings(&EditorSettings::default())
    }
}

impl TransformConstraints {
    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self {
            snap_to_grid: settings.grid.enabled,
            grid_size: settings.grid.size,
            preserve_aspect_ratio: settings.transform.preserve_aspect_ratio,
            min_width: settings.transform.min_width,
            min_height: settings.transform.min_height,
            max_width: settings.transform.max_width,
            max_height: settings.transform.max_height,
            angle_snap_degrees: settings.transform.angle_snap_degrees,
        }
    }

    fn snap(&self, value: f64) -> f64 {
        if self.snap_to_grid && self.grid_size > 0.0 {
            (value / self.grid_size).round() * self.grid_size
        } else {
            value
        }
    }
}

/// Keyboard modifiers held during a gesture.
///
/// `shift` toggles the aspect lock while resizing and enables angle snapping
/// while rotating. `alt` resizes symmetrically about the center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn shift() -> Self {
        Self {
            shift: true,
            alt: false,
        }
    }
}

/// Result of [`compute_resize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeOutcome {
    pub bounds: Bounds,
    /// True when the result was raised to the minimum size.
    pub corrected: bool,
}

/// Resizes `snapshot` by dragging `handle` from `start` to `current`.
///
/// The pointer delta is taken into the module's rotated frame before it is
/// applied, so dragging along a rotated edge changes only that edge. The
/// handle opposite the dragged one stays put in world space, unless `alt`
/// is held, in which case the center does.
pub fn compute_resize(
    snapshot: &Bounds,
    rotation: f64,
    handle: Handle,
    start: Point2<f64>,
    current: Point2<f64>,
    constraints: &TransformConstraints,
    modifiers: Modifiers,
) -> ResizeOutcome {
    if !handle.is_resize() {
        return ResizeOutcome {
            bounds: *snapshot,
            corrected: false,
        };
    }

    let rot = Rotation2::new(rotation.to_radians());
    let local = rot.inverse() * (current - start);
    let dx = constraints.snap(local.x);
    let dy = constraints.snap(local.y);

    let (ax, ay) = handle.anchor();
    let grow = if modifiers.alt { 2.0 } else { 1.0 };
    let mut width = snapshot.width + ax * dx * grow;
    let mut height = snapshot.height + ay * dy * grow;

    let keep_aspect = constraints.preserve_aspect_ratio != modifiers.shift;
    if keep_aspect && snapshot.width > 0.0 && snapshot.height > 0.0 {
        let ratio = snapshot.width / snapshot.height;
        if handle.is_corner() {
            let sx = width / snapshot.width;
            let sy = height / snapshot.height;
            let s = if (sx - 1.0).abs() >= (sy - 1.0).abs() {
                sx
            } else {
                sy
            };
            width = snapshot.width * s;
            height = snapshot.height * s;
        } else if ax != 0.0 {
            height = width / ratio;
        } else {
            width = height * ratio;
        }
    }

    let mut corrected = false;
    if keep_aspect && width > 0.0 && height > 0.0 {
        let up = (constraints.min_width / width).max(constraints.min_height / height);
        if up > 1.0 {
            width *= up;
            height *= up;
            corrected = true;
        }
    }
    if width < constraints.min_width {
        width = constraints.min_width;
        corrected = true;
    }
    if height < constraints.min_height {
        height = constraints.min_height;
        corrected = true;
    }
    if corrected {
        tracing::debug!("resize corrected to minimum: {:.1} x {:.1}", width, height);
    }
    let max_width = constraints.max_width.map(|max| max.max(constraints.min_width));
    let max_height = constraints.max_height.map(|max| max.max(constraints.min_height));
    if keep_aspect && width > 0.0 && height > 0.0 {
        let down = max_width
            .map_or(1.0, |max| max / width)
            .min(max_height.map_or(1.0, |max| max / height))
            .min(1.0);
        width *= down;
        height *= down;
    } else {
        if let Some(max) = max_width {
            width = width.min(max);
        }
        if let Some(max) = max_height {
            height = height.min(max);
        }
    }

    let old_center = snapshot.center();
    let center = if modifiers.alt {
        old_center
    } else {
        // The opposite anchor, in world space, is fixed.
        let fixed = old_center
            + rot * Vector2::new(-ax * snapshot.width / 2.0, -ay * snapshot.height / 2.0);
        fixed - rot * Vector2::new(-ax * width / 2.0, -ay * height / 2.0)
    };

    ResizeOutcome {
        bounds: Bounds::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        ),
        corrected,
    }
}

/// Rotation in degrees after dragging the rotate handle from `start` to
/// `current`, starting from `start_angle`.
///
/// With `shift` held the result snaps to the configured increment.
pub fn compute_rotation(
    snapshot: &Bounds,
    start_angle: f64,
    start: Point2<f64>,
    current: Point2<f64>,
    constraints: &TransformConstraints,
    modifiers: Modifiers,
) -> f64 {
    let center = snapshot.center();
    let a0 = (start.y - center.y).atan2(start.x - center.x);
    let a1 = (current.y - center.y).atan2(current.x - center.x);
    let mut angle = start_angle + (a1 - a0).to_degrees();

    if modifiers.shift && constraints.angle_snap_degrees > 0.0 {
        let step = constraints.angle_snap_degrees;
        angle = (angle / step).round() * step;
    }
    normalize_degrees(angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints() -> TransformConstraints {
        TransformConstraints {
            snap_to_grid: false,
            grid_size: 10.0,
            preserve_aspect_ratio: false,
            min_width: 10.0,
            min_height: 10.0,
            max_width: None,
            max_height: None,
            angle_snap_degrees: 15.0,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_right_handle_grows_width_only() {
        let b = Bounds::new(100.0, 100.0, 80.0, 40.0);
        let out = compute_resize(
            &b,
            0.0,
            Handle::Right,
            Point2::new(180.0, 120.0),
            Point2::new(200.0, 150.0),
            &constraints(),
            Modifiers::default(),
        );
        assert_eq!(out.bounds, Bounds::new(100.0, 100.0, 100.0, 40.0));
        assert!(!out.corrected);
    }

    #[test]
    fn test_grid_snap_rounds_delta() {
        let b = Bounds::new(0.0, 0.0, 50.0, 50.0);
        let mut c = constraints();
        c.snap_to_grid = true;
        let out = compute_resize(
            &b,
            0.0,
            Handle::Right,
            Point2::new(50.0, 25.0),
            Point2::new(73.0, 25.0),
            &c,
            Modifiers::default(),
        );
        assert_eq!(out.bounds.width, 70.0);
    }

    #[test]
    fn test_top_left_keeps_bottom_right_fixed() {
        let b = Bounds::new(100.0, 100.0, 80.0, 40.0);
        let out = compute_resize(
            &b,
            0.0,
            Handle::TopLeft,
            Point2::new(100.0, 100.0),
            Point2::new(90.0, 95.0),
            &constraints(),
            Modifiers::default(),
        );
        assert_eq!(out.bounds, Bounds::new(90.0, 95.0, 90.0, 45.0));
    }

    #[test]
    fn test_below_minimum_is_corrected() {
        let b = Bounds::new(0.0, 0.0, 40.0, 40.0);
        let out = compute_resize(
            &b,
            0.0,
            Handle::Right,
            Point2::new(40.0, 20.0),
            Point2::new(-100.0, 20.0),
            &constraints(),
            Modifiers::default(),
        );
        assert!(out.corrected);
        assert_eq!(out.bounds.width, 10.0);
        assert_eq!(out.bounds.x, 0.0);
    }

    #[test]
    fn test_shift_locks_aspect_on_corner() {
        let b = Bounds::new(0.0, 0.0, 40.0, 20.0);
        let out = compute_resize(
            &b,
            0.0,
            Handle::BottomRight,
            Point2::new(40.0, 20.0),
            Point2::new(80.0, 22.0),
            &constraints(),
            Modifiers::shift(),
        );
        assert!(approx(out.bounds.width, 80.0));
        assert!(approx(out.bounds.height, 40.0));
    }

    #[test]
    fn test_max_size_is_enforced() {
        let b = Bounds::new(0.0, 0.0, 40.0, 40.0);
        let mut c = constraints();
        c.max_width = Some(60.0);
        let out = compute_resize(
            &b,
            0.0,
            Handle::Right,
            Point2::new(40.0, 20.0),
            Point2::new(400.0, 20.0),
            &c,
            Modifiers::default(),
        );
        assert_eq!(out.bounds.width, 60.0);
    }

    #[test]
    fn test_rotated_resize_keeps_opposite_edge() {
        // A 90 degree rotation turns the local right edge to face down.
        let b = Bounds::new(0.0, 0.0, 40.0, 20.0);
        let out = compute_resize(
            &b,
            90.0,
            Handle::Right,
            Point2::new(20.0, 30.0),
            Point2::new(20.0, 50.0),
            &constraints(),
            Modifiers::default(),
        );
        assert!(approx(out.bounds.width, 60.0));
        assert!(approx(out.bounds.height, 20.0));

        // Local left edge midpoint in world space must not move.
        let rot = Rotation2::new(90f64.to_radians());
        let left_edge =
            |bounds: &Bounds| bounds.center() + rot * Vector2::new(-bounds.width / 2.0, 0.0);
        let before = left_edge(&b);
        let after = left_edge(&out.bounds);
        assert!(approx(before.x, after.x) && approx(before.y, after.y));
    }

    #[test]
    fn test_alt_resizes_about_center() {
        let b = Bounds::new(100.0, 100.0, 40.0, 40.0);
        let out = compute_resize(
            &b,
            0.0,
            Handle::Right,
            Point2::new(140.0, 120.0),
            Point2::new(150.0, 120.0),
            &constraints(),
            Modifiers {
                shift: false,
                alt: true,
            },
        );
        assert_eq!(out.bounds, Bounds::new(90.0, 100.0, 60.0, 40.0));
    }

    #[test]
    fn test_rotation_quarter_turn_and_snap() {
        let b = Bounds::new(0.0, 0.0, 20.0, 20.0);
        let c = constraints();
        let angle = compute_rotation(
            &b,
            0.0,
            Point2::new(10.0, -20.0),
            Point2::new(40.0, 10.0),
            &c,
            Modifiers::default(),
        );
        assert!(approx(angle, 90.0));

        let snapped = compute_rotation(
            &b,
            0.0,
            Point2::new(10.0, -20.0),
            Point2::new(40.0, 5.0),
            &c,
            Modifiers::shift(),
        );
        assert!(approx(snapped, 75.0) || approx(snapped, 90.0));
        assert!(approx(snapped % 15.0, 0.0));
    }

    #[test]
    fn test_handle_hit_testing() {
        let b = Bounds::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(
            Handle::handle_at(Point2::new(101.0, 49.0), &b, 0.0, 5.0),
            Some(Handle::BottomRight)
        );
        assert_eq!(
            Handle::handle_at(Point2::new(50.0, -ROTATE_HANDLE_OFFSET), &b, 0.0, 5.0),
            Some(Handle::Rotate)
        );
        assert_eq!(Handle::handle_at(Point2::new(50.0, 25.0), &b, 0.0, 5.0), None);
    }

    #[test]
    fn test_opposites_pair_up() {
        for h in Handle::RESIZE {
            let o = h.opposite().unwrap();
            assert_eq!(o.opposite(), Some(h));
        }
        assert_eq!(Handle::Rotate.opposite(), None);
    }

    #[test]
    fn test_max_width_keeps_locked_aspect() {
        let b = Bounds::new(0.0, 0.0, 40.0, 20.0);
        let mut c = constraints();
        c.max_width = Some(60.0);
        let out = compute_resize(
            &b,
            0.0,
            Handle::BottomRight,
            Point2::new(40.0, 20.0),
            Point2::new(400.0, 20.0),
            &c,
            Modifiers::shift(),
        );
        assert!(approx(out.bounds.width, 60.0));
        assert!(approx(out.bounds.height, 30.0));
        assert!(approx(out.bounds.x, 0.0) && approx(out.bounds.y, 0.0));
    }

    #[test]
    fn test_max_clamps_each_side_without_aspect_lock() {
        let b = Bounds::new(0.0, 0.0, 40.0, 20.0);
        let mut c = constraints();
        c.max_width = Some(60.0);
        let out = compute_resize(
            &b,
            0.0,
            Handle::BottomRight,
            Point2::new(40.0, 20.0),
            Point2::new(400.0, 60.0),
            &c,
            Modifiers::default(),
        );
        assert!(approx(out.bounds.width, 60.0));
        assert!(approx(out.bounds.height, 60.0));
    }
}
