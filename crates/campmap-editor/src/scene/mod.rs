//! Retained-mode scene graph mirroring the document store.
//!
//! Each module becomes a [`SceneGroup`] anchored at its center, the way a
//! canvas library positions objects. The group keeps the size it was built
//! with as its intrinsic size; later resizes are expressed as scale factors.
//! [`ModuleFactory`] converts between groups and module records.

mod factory;

pub use factory::ModuleFactory;

use std::collections::HashMap;

use campmap_core::{DocumentStore, Geometry, GeometryError};
use lyon::math::{point, vector, Angle, Box2D, Transform};
use lyon::path::{Path, Winding};
use nalgebra::{Matrix3, Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::handles::Bounds;

/// Filled outline of a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeNode {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    /// Empty for a solid border.
    pub dash: Vec<f64>,
    pub corner_radius: f64,
}

/// A glyph drawn at the group center.
///
/// `font_size` is in world units; icons are drawn without the group scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconNode {
    pub glyph: String,
    pub font_size: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneNode {
    Shape(ShapeNode),
    Icon(IconNode),
    LockBadge(IconNode),
}

/// Which interactive controls a group offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSet {
    pub resize: bool,
    pub rotate: bool,
    pub movable: bool,
}

impl ControlSet {
    pub fn all() -> Self {
        Self {
            resize: true,
            rotate: true,
            movable: true,
        }
    }

    /// Locked modules stay selectable but offer no transform.
    pub fn none() -> Self {
        Self {
            resize: false,
            rotate: false,
            movable: false,
        }
    }

    pub fn any(&self) -> bool {
        self.resize || self.rotate || self.movable
    }
}

/// Graphical group for one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGroup {
    pub module_id: String,
    /// Center x.
    pub left: f64,
    /// Center y.
    pub top: f64,
    /// Intrinsic width, fixed at creation.
    pub width: f64,
    /// Intrinsic height, fixed at creation.
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Degrees, clockwise in screen space.
    pub angle: f64,
    pub opacity: f64,
    pub z_index: i64,
    pub locked: bool,
    pub visible: bool,
    pub children: Vec<SceneNode>,
    pub controls: ControlSet,
}

impl SceneGroup {
    /// Rendered width.
    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale_x
    }

    /// Rendered height.
    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale_y
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.left, self.top)
    }

    /// Local-to-world transform: translate to the center, rotate, scale.
    pub fn world_transform(&self) -> Matrix3<f64> {
        Matrix3::new_translation(&Vector2::new(self.left, self.top))
            * Matrix3::new_rotation(self.angle.to_radians())
            * Matrix3::new_nonuniform_scaling(&Vector2::new(self.scale_x, self.scale_y))
    }

    /// Tests a world point against the rotated footprint.
    pub fn contains_point(&self, p: Point2<f64>) -> bool {
        let Some(inverse) = self.world_transform().try_inverse() else {
            return false;
        };
        let local = inverse.transform_point(&p);
        local.x.abs() <= self.width / 2.0 + 1e-9 && local.y.abs() <= self.height / 2.0 + 1e-9
    }

    /// World-space corners, clockwise from the local top-left.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let m = self.world_transform();
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        [
            m.transform_point(&Point2::new(-hw, -hh)),
            m.transform_point(&Point2::new(hw, -hh)),
            m.transform_point(&Point2::new(hw, hh)),
            m.transform_point(&Point2::new(-hw, hh)),
        ]
    }

    /// Axis-aligned bounds of the rotated footprint.
    pub fn world_bounds(&self) -> Bounds {
        let corners = self.corners();
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        Bounds::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// World-space outline as a lyon path.
    pub fn outline_path(&self) -> Path {
        let (hw, hh) = ((self.width / 2.0) as f32, (self.height / 2.0) as f32);
        let mut builder = Path::builder();
        builder.add_rectangle(
            &Box2D::new(point(-hw, -hh), point(hw, hh)),
            Winding::Positive,
        );
        let path = builder.build();

        let transform = Transform::scale(self.scale_x as f32, self.scale_y as f32)
            .then_rotate(Angle::degrees(self.angle as f32))
            .then_translate(vector(self.left as f32, self.top as f32));
        path.transformed(&transform)
    }

    /// Places the group at `geometry` without touching its decorations.
    ///
    /// Size becomes a scale relative to the intrinsic size.
    pub fn set_geometry(&mut self, geometry: &Geometry) -> Result<(), GeometryError> {
        campmap_core::validate_size(&self.module_id, geometry.size)?;
        campmap_core::validate_position(&self.module_id, geometry.position)?;
        if !geometry.rotation.is_finite() {
            return Err(GeometryError::NonFiniteRotation {
                id: self.module_id.clone(),
                rotation: geometry.rotation,
            });
        }

        self.left = geometry.position.x + geometry.size.width / 2.0;
        self.top = geometry.position.y + geometry.size.height / 2.0;
        self.scale_x = geometry.size.width / self.width;
        self.scale_y = geometry.size.height / self.height;
        self.angle = geometry.rotation;
        Ok(())
    }

    pub fn icon(&self) -> Option<&IconNode> {
        self.children.iter().find_map(|c| match c {
            SceneNode::Icon(icon) => Some(icon),
            _ => None,
        })
    }

    pub fn shape(&self) -> Option<&ShapeNode> {
        self.children.iter().find_map(|c| match c {
            SceneNode::Shape(shape) => Some(shape),
            _ => None,
        })
    }

    pub fn has_lock_badge(&self) -> bool {
        self.children
            .iter()
            .any(|c| matches!(c, SceneNode::LockBadge(_)))
    }
}

/// What a [`Scene::sync`] changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    /// Modules whose record could not be turned into a group, with the reason.
    pub failed: Vec<(String, String)>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// All groups of a map, keyed by module id.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    groups: HashMap<String, SceneGroup>,
    /// Collection order of the store at the last sync.
    order: Vec<String>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&SceneGroup> {
        self.groups.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SceneGroup> {
        self.groups.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups sorted by z-index, ties broken by collection order.
    pub fn draw_order(&self) -> Vec<&SceneGroup> {
        let mut ordered: Vec<&SceneGroup> = self
            .order
            .iter()
            .filter_map(|id| self.groups.get(id))
            .collect();
        ordered.sort_by_key(|g| g.z_index);
        ordered
    }

    /// Topmost group under `p`. Hidden groups are still hit.
    pub fn hit_test(&self, p: Point2<f64>) -> Option<&SceneGroup> {
        self.draw_order()
            .into_iter()
            .rev()
            .find(|g| g.contains_point(p))
    }

    /// Brings the scene in line with `store`.
    ///
    /// A module whose record cannot be rendered is reported and keeps its
    /// previous group, if any.
    pub fn sync(&mut self, store: &dyn DocumentStore, factory: &ModuleFactory) -> SyncReport {
        let mut report = SyncReport::default();

        for module in store.modules() {
            match self.groups.get_mut(&module.id) {
                Some(group) => match factory.update(group, module) {
                    Ok(()) => report.updated.push(module.id.clone()),
                    Err(e) => {
                        tracing::warn!("scene: cannot update {}: {}", module.id, e);
                        report.failed.push((module.id.clone(), e.to_string()));
                    }
                },
                None => match factory.create(module) {
                    Ok(group) => {
                        self.groups.insert(module.id.clone(), group);
                        report.created.push(module.id.clone());
                    }
                    Err(e) => {
                        tracing::warn!("scene: cannot create {}: {}", module.id, e);
                        report.failed.push((module.id.clone(), e.to_string()));
                    }
                },
            }
        }

        let stale: Vec<String> = self
            .groups
            .keys()
            .filter(|id| !store.contains(id))
            .cloned()
            .collect();
        for id in stale {
            self.groups.remove(&id);
            report.removed.push(id);
        }

        self.order = store
            .modules()
            .iter()
            .filter(|m| self.groups.contains_key(&m.id))
            .map(|m| m.id.clone())
            .collect();

        tracing::debug!(
            "scene sync: {} created, {} updated, {} removed, {} failed",
            report.created.len(),
            report.updated.len(),
            report.removed.len(),
            report.failed.len()
        );
        report
    }
}
