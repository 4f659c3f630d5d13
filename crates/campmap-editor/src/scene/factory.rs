use campmap_core::{
    validate_position, validate_size, Geometry, GeometryError, Module, Position, Size,
};
use campmap_settings::AppearanceSettings;

use super::{ControlSet, IconNode, SceneGroup, SceneNode, ShapeNode};

const STROKE: &str = "#333333";
const LOCKED_STROKE: &str = "#B71C1C";
const STROKE_WIDTH: f64 = 1.0;
const LOCKED_STROKE_WIDTH: f64 = 2.0;
const CORNER_RADIUS: f64 = 4.0;
const LOCK_GLYPH: &str = "lock";
/// Lock badge size relative to the icon size.
const LOCK_BADGE_RATIO: f64 = 0.6;

/// Builds scene groups from module records and reads geometry back.
#[derive(Debug, Clone, Default)]
pub struct ModuleFactory {
    appearance: AppearanceSettings,
}

impl ModuleFactory {
    pub fn new(appearance: AppearanceSettings) -> Self {
        Self { appearance }
    }

    pub fn appearance(&self) -> &AppearanceSettings {
        &self.appearance
    }

    /// Creates the group for `module`. The module's size becomes the
    /// group's intrinsic size.
    pub fn create(&self, module: &Module) -> Result<SceneGroup, GeometryError> {
        module.validate_geometry()?;

        let (left, top) = module.center();
        Ok(SceneGroup {
            module_id: module.id.clone(),
            left,
            top,
            width: module.size.width,
            height: module.size.height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: module.rotation,
            opacity: self.opacity_for(module),
            z_index: module.z_index,
            locked: module.locked,
            visible: module.visible,
            children: self.decorations(module),
            controls: controls_for(module),
        })
    }

    /// Brings an existing group in line with `module`.
    ///
    /// Nothing is changed when the record carries invalid geometry.
    pub fn update(&self, group: &mut SceneGroup, module: &Module) -> Result<(), GeometryError> {
        module.validate_geometry()?;
        check_intrinsic_size(group)?;

        group.set_geometry(&module.geometry())?;
        group.opacity = self.opacity_for(module);
        group.z_index = module.z_index;
        group.locked = module.locked;
        group.visible = module.visible;
        group.children = self.decorations(module);
        group.controls = controls_for(module);
        Ok(())
    }

    /// Reads position, size and rotation from a group after an interactive
    /// transform.
    ///
    /// The top-left is clamped to the map origin.
    pub fn extract(&self, group: &SceneGroup) -> Result<Geometry, GeometryError> {
        let valid_scale = |s: f64| s.is_finite() && s > 0.0;
        if !valid_scale(group.scale_x) || !valid_scale(group.scale_y) {
            return Err(GeometryError::InvalidScale {
                id: group.module_id.clone(),
                scale_x: group.scale_x,
                scale_y: group.scale_y,
            });
        }
        check_intrinsic_size(group)?;
        let valid_center = |c: f64| c.is_finite() && c > 0.0;
        if !valid_center(group.left) || !valid_center(group.top) {
            return Err(GeometryError::InvalidCenter {
                id: group.module_id.clone(),
                left: group.left,
                top: group.top,
            });
        }
        if !group.angle.is_finite() {
            return Err(GeometryError::NonFiniteRotation {
                id: group.module_id.clone(),
                rotation: group.angle,
            });
        }

        let size = Size::new(group.scaled_width(), group.scaled_height());
        validate_size(&group.module_id, size)?;
        let position = Position::new(
            (group.left - size.width / 2.0).max(0.0),
            (group.top - size.height / 2.0).max(0.0),
        );
        validate_position(&group.module_id, position)?;

        Ok(Geometry::new(position, size, group.angle))
    }

    /// Hidden modules ghost, locked modules dim; the lower wins when both apply.
    pub fn opacity_for(&self, module: &Module) -> f64 {
        let mut opacity: f64 = 1.0;
        if !module.visible {
            opacity = opacity.min(self.appearance.ghost_opacity);
        }
        if module.locked {
            opacity = opacity.min(self.appearance.locked_opacity);
        }
        opacity
    }

    fn decorations(&self, module: &Module) -> Vec<SceneNode> {
        let mut children = vec![SceneNode::Shape(ShapeNode {
            fill: module.module_type.color().to_string(),
            stroke: if module.locked { LOCKED_STROKE } else { STROKE }.to_string(),
            stroke_width: if module.locked {
                LOCKED_STROKE_WIDTH
            } else {
                STROKE_WIDTH
            },
            dash: if module.locked {
                self.appearance.lock_dash.clone()
            } else {
                Vec::new()
            },
            corner_radius: CORNER_RADIUS,
        })];

        let smaller_side = module.size.width.min(module.size.height);
        let font_size = smaller_side * self.appearance.icon_scale;
        if smaller_side >= self.appearance.icon_min_size {
            children.push(SceneNode::Icon(IconNode {
                glyph: module.module_type.icon().to_string(),
                font_size,
                opacity: 1.0,
            }));
        }

        if module.locked {
            children.push(SceneNode::LockBadge(IconNode {
                glyph: LOCK_GLYPH.to_string(),
                font_size: (font_size * LOCK_BADGE_RATIO).max(1.0),
                opacity: self.appearance.lock_badge_opacity,
            }));
        }

        children
    }
}

fn controls_for(module: &Module) -> ControlSet {
    if module.locked {
        ControlSet::none()
    } else {
        ControlSet::all()
    }
}

fn check_intrinsic_size(group: &SceneGroup) -> Result<(), GeometryError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if valid(group.width) && valid(group.height) {
        Ok(())
    } else {
        Err(GeometryError::InvalidIntrinsicSize {
            id: group.module_id.clone(),
            width: group.width,
            height: group.height,
        })
    }
}
