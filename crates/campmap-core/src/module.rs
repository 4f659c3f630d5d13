//! Placed modules: the unit of layout on a campground map.
//!
//! Positions are always the top-left corner of the unrotated footprint;
//! rotation pivots around the footprint center. The scene layer works in
//! center coordinates and converts at its boundary.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GeometryError;
use crate::metadata::Metadata;

/// Kind of module. Determines default size, color, icon and metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    Campsite,
    Toilet,
    Storage,
    Building,
    Parking,
    Road,
    WaterSource,
    Electricity,
    WasteDisposal,
    Recreation,
    Custom,
}

impl ModuleType {
    pub const ALL: [ModuleType; 11] = [
        Self::Campsite,
        Self::Toilet,
        Self::Storage,
        Self::Building,
        Self::Parking,
        Self::Road,
        Self::WaterSource,
        Self::Electricity,
        Self::WasteDisposal,
        Self::Recreation,
        Self::Custom,
    ];

    /// Default footprint in map units.
    pub fn default_size(&self) -> Size {
        let (w, h) = match self {
            Self::Campsite => (60.0, 40.0),
            Self::Toilet => (30.0, 30.0),
            Self::Storage => (40.0, 30.0),
            Self::Building => (80.0, 60.0),
            Self::Parking => (60.0, 30.0),
            Self::Road => (120.0, 20.0),
            Self::WaterSource => (20.0, 20.0),
            Self::Electricity => (20.0, 20.0),
            Self::WasteDisposal => (30.0, 30.0),
            Self::Recreation => (70.0, 50.0),
            Self::Custom => (50.0, 50.0),
        };
        Size::new(w, h)
    }

    /// Fill color as a CSS hex string.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Campsite => "#4CAF50",
            Self::Toilet => "#2196F3",
            Self::Storage => "#795548",
            Self::Building => "#9E9E9E",
            Self::Parking => "#607D8B",
            Self::Road => "#424242",
            Self::WaterSource => "#03A9F4",
            Self::Electricity => "#FFC107",
            Self::WasteDisposal => "#8D6E63",
            Self::Recreation => "#E91E63",
            Self::Custom => "#9C27B0",
        }
    }

    /// Icon name understood by the host's icon font.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Campsite => "tent",
            Self::Toilet => "restroom",
            Self::Storage => "warehouse",
            Self::Building => "building",
            Self::Parking => "car",
            Self::Road => "road",
            Self::WaterSource => "droplet",
            Self::Electricity => "bolt",
            Self::WasteDisposal => "trash",
            Self::Recreation => "futbol",
            Self::Custom => "star",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Campsite => "Campsite",
            Self::Toilet => "Toilet",
            Self::Storage => "Storage",
            Self::Building => "Building",
            Self::Parking => "Parking",
            Self::Road => "Road",
            Self::WaterSource => "Water Source",
            Self::Electricity => "Electricity",
            Self::WasteDisposal => "Waste Disposal",
            Self::Recreation => "Recreation",
            Self::Custom => "Custom",
        }
    }

    /// Metadata every new module of this type starts with.
    pub fn default_metadata(&self) -> Metadata {
        match self {
            Self::Campsite => Metadata::new()
                .with("name", "New Campsite")
                .with("capacity", 6)
                .with("pricePerNight", 35.0)
                .with("hasElectricity", false)
                .with("hasWater", false)
                .with("maxVehicleLength", 0.0),
            Self::Toilet => Metadata::new()
                .with("name", "Restroom")
                .with("accessible", true)
                .with("hasShower", false),
            Self::Storage => Metadata::new()
                .with("name", "Storage")
                .with("capacity", 0.0),
            Self::Building => Metadata::new()
                .with("name", "Building")
                .with("purpose", "office"),
            Self::Parking => Metadata::new()
                .with("name", "Parking")
                .with("spaces", 10),
            Self::Road => Metadata::new()
                .with("name", "Road")
                .with("surface", "gravel")
                .with("oneWay", false),
            Self::WaterSource => Metadata::new().with("potable", true),
            Self::Electricity => Metadata::new()
                .with("amperage", 30)
                .with("outlets", 2),
            Self::WasteDisposal => Metadata::new().with("kind", "general"),
            Self::Recreation => Metadata::new()
                .with("name", "Recreation")
                .with("activity", "playground"),
            Self::Custom => Metadata::new(),
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Top-left coordinate of a module.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Footprint of a module before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Position, size and rotation of a module taken together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub position: Position,
    pub size: Size,
    pub rotation: f64,
}

impl Geometry {
    pub fn new(position: Position, size: Size, rotation: f64) -> Self {
        Self {
            position,
            size,
            rotation,
        }
    }

    /// Patch writing all three fields.
    pub fn to_patch(&self) -> ModulePatch {
        ModulePatch {
            position: Some(self.position),
            size: Some(self.size),
            rotation: Some(self.rotation),
            ..Default::default()
        }
    }
}

/// A module placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    pub position: Position,
    pub size: Size,
    pub rotation: f64,
    pub z_index: i64,
    pub locked: bool,
    pub visible: bool,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Module {
    /// Creates a module of `module_type` at `position` with the type's defaults.
    pub fn new(module_type: ModuleType, position: Position) -> Self {
        create_module(module_type, position, None)
    }

    /// Same as [`Module::new`] with an explicit id.
    pub fn with_id(id: impl Into<String>, module_type: ModuleType, position: Position) -> Self {
        let mut module = create_module(module_type, position, None);
        module.id = id.into();
        module
    }

    /// Center of the footprint; rotation pivots here.
    pub fn center(&self) -> (f64, f64) {
        (
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.position, self.size, self.rotation)
    }

    /// Rejects geometry the scene cannot render.
    pub fn validate_geometry(&self) -> Result<(), GeometryError> {
        validate_size(&self.id, self.size)?;
        validate_position(&self.id, self.position)?;
        if !self.rotation.is_finite() {
            return Err(GeometryError::NonFiniteRotation {
                id: self.id.clone(),
                rotation: self.rotation,
            });
        }
        Ok(())
    }
}

/// Checks that a size is finite and strictly positive.
pub fn validate_size(id: &str, size: Size) -> Result<(), GeometryError> {
    if !size.width.is_finite() || !size.height.is_finite() {
        return Err(GeometryError::NonFiniteSize {
            id: id.to_string(),
            width: size.width,
            height: size.height,
        });
    }
    if size.width <= 0.0 || size.height <= 0.0 {
        return Err(GeometryError::NonPositiveSize {
            id: id.to_string(),
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}

/// Checks that a position is finite and non-negative.
pub fn validate_position(id: &str, position: Position) -> Result<(), GeometryError> {
    if !position.x.is_finite() || !position.y.is_finite() {
        return Err(GeometryError::NonFinitePosition {
            id: id.to_string(),
            x: position.x,
            y: position.y,
        });
    }
    if position.x < 0.0 || position.y < 0.0 {
        return Err(GeometryError::NegativePosition {
            id: id.to_string(),
            x: position.x,
            y: position.y,
        });
    }
    Ok(())
}

/// Factory for new modules.
///
/// Assigns a fresh id, the type's default size and metadata (with `overrides`
/// shallow-merged on top), a collision-resistant z-index and timestamps.
pub fn create_module(
    module_type: ModuleType,
    position: Position,
    overrides: Option<&Metadata>,
) -> Module {
    let now = Utc::now();
    let mut metadata = module_type.default_metadata();
    if let Some(overrides) = overrides {
        metadata.merge(overrides);
    }

    Module {
        id: Uuid::new_v4().to_string(),
        module_type,
        position,
        size: module_type.default_size(),
        rotation: 0.0,
        z_index: next_z_index(),
        locked: false,
        visible: true,
        metadata,
        created_at: now,
        updated_at: now,
    }
}

/// Generates a z-index from the wall clock and a random component.
///
/// Independent editors in one process never share a counter; two modules
/// created in the same millisecond still differ with high probability.
pub fn next_z_index() -> i64 {
    let millis = Utc::now().timestamp_millis();
    let jitter = (Uuid::new_v4().as_u128() % 1000) as i64;
    millis.saturating_mul(1000).saturating_add(jitter)
}

/// Normalizes an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle % 360.0;
    let a = if a < 0.0 { a + 360.0 } else { a };
    // Tiny negative remainders round up to exactly 360.
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Partial update of a module.
///
/// Unset fields are left alone. `metadata` replaces the whole bag.
/// `updated_at`, when set, is written verbatim instead of the current time;
/// undo uses it to restore a bit-exact record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ModulePatch {
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Default::default()
        }
    }

    pub fn z_index(z_index: i64) -> Self {
        Self {
            z_index: Some(z_index),
            ..Default::default()
        }
    }

    pub fn locked(locked: bool) -> Self {
        Self {
            locked: Some(locked),
            ..Default::default()
        }
    }

    pub fn visible(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            ..Default::default()
        }
    }

    pub fn metadata(metadata: Metadata) -> Self {
        Self {
            metadata: Some(metadata),
            ..Default::default()
        }
    }

    /// Returns the patch with an explicit `updated_at` stamp.
    pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    /// True when no field is set (the stamp does not count).
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.size.is_none()
            && self.rotation.is_none()
            && self.z_index.is_none()
            && self.locked.is_none()
            && self.visible.is_none()
            && self.metadata.is_none()
    }

    /// Checks any geometry the patch carries.
    pub fn validate(&self, id: &str) -> Result<(), GeometryError> {
        if let Some(size) = self.size {
            validate_size(id, size)?;
        }
        if let Some(position) = self.position {
            validate_position(id, position)?;
        }
        if let Some(rotation) = self.rotation {
            if !rotation.is_finite() {
                return Err(GeometryError::NonFiniteRotation {
                    id: id.to_string(),
                    rotation,
                });
            }
        }
        Ok(())
    }

    /// Applies the set fields to `module` and refreshes `updated_at`.
    pub fn apply_to(&self, module: &mut Module, now: DateTime<Utc>) {
        if let Some(position) = self.position {
            module.position = position;
        }
        if let Some(size) = self.size {
            module.size = size;
        }
        if let Some(rotation) = self.rotation {
            module.rotation = rotation;
        }
        if let Some(z_index) = self.z_index {
            module.z_index = z_index;
        }
        if let Some(locked) = self.locked {
            module.locked = locked;
        }
        if let Some(visible) = self.visible {
            module.visible = visible;
        }
        if let Some(metadata) = &self.metadata {
            module.metadata = metadata.clone();
        }
        module.updated_at = self.updated_at.unwrap_or(now);
    }

    /// Builds the patch that would restore `module`'s current values for
    /// every field this patch touches.
    pub fn inverse_for(&self, module: &Module) -> ModulePatch {
        ModulePatch {
            position: self.position.map(|_| module.position),
            size: self.size.map(|_| module.size),
            rotation: self.rotation.map(|_| module.rotation),
            z_index: self.z_index.map(|_| module.z_index),
            locked: self.locked.map(|_| module.locked),
            visible: self.visible.map(|_| module.visible),
            metadata: self.metadata.as_ref().map(|_| module.metadata.clone()),
            updated_at: Some(module.updated_at),
        }
    }
}
