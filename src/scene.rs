//! Scene loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable scene files. Every field has a
//! default, so a scene file only needs to name what it changes.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use crate::mesh::{self, primitives, PlyError};
use crate::rasterizer::{Patch, Vec3, MAX_FB_HEIGHT, MAX_FB_WIDTH};

/// Framebuffer size of the built-in scene
pub const DEFAULT_WIDTH: usize = 960;
pub const DEFAULT_HEIGHT: usize = 540;
pub const DEFAULT_SHADOW_MAP_SIZE: usize = 256;

const _: () = assert!(DEFAULT_WIDTH <= MAX_FB_WIDTH && DEFAULT_HEIGHT <= MAX_FB_HEIGHT);
const _: () = assert!(DEFAULT_SHADOW_MAP_SIZE <= MAX_FB_WIDTH && DEFAULT_SHADOW_MAP_SIZE <= MAX_FB_HEIGHT);

/// Error type for scene loading
#[derive(Debug)]
pub enum SceneError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    MeshError { path: PathBuf, source: PlyError },
    SizeError { what: &'static str, width: usize, height: usize },
    SettingError { setting: &'static str, reason: &'static str },
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::ParseError(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::SerializeError(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::IoError(e) => write!(f, "IO error: {}", e),
            SceneError::ParseError(e) => write!(f, "Parse error: {}", e),
            SceneError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            SceneError::MeshError { path, source } => {
                write!(f, "Mesh error in {}: {}", path.display(), source)
            }
            SceneError::SizeError { what, width, height } => write!(
                f,
                "{} size {}x{} must be non-zero and at most {}x{}",
                what, width, height, MAX_FB_WIDTH, MAX_FB_HEIGHT
            ),
            SceneError::SettingError { setting, reason } => write!(f, "Invalid {}: {}", setting, reason),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::IoError(e) => Some(e),
            SceneError::ParseError(e) => Some(e),
            SceneError::SerializeError(e) => Some(e),
            SceneError::MeshError { source, .. } => Some(source),
            SceneError::SizeError { .. } | SceneError::SettingError { .. } => None,
        }
    }
}

/// Where a mesh's patches come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshSource {
    /// Binary PLY file, relative paths resolve against the scene file's directory
    Ply(PathBuf),
    Cuboid { center: Vec3, half_extents: Vec3, color: Vec3 },
    Ground { size: f32, height: f32, color: Vec3 },
}

impl MeshSource {
    /// Produce the object-space patches
    pub fn build(&self, base_dir: &Path) -> Result<Vec<Patch>, SceneError> {
        match self {
            MeshSource::Ply(path) => {
                let full = base_dir.join(path);
                mesh::load_ply(&full).map_err(|source| SceneError::MeshError { path: full, source })
            }
            MeshSource::Cuboid { center, half_extents, color } => {
                Ok(primitives::cuboid(*center, *half_extents, *color))
            }
            MeshSource::Ground { size, height, color } => Ok(primitives::ground(*size, *height, *color)),
        }
    }
}

/// Which patch shader a mesh is drawn with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Material {
    /// Sun + ambient, shadowed by the shadow map
    #[default]
    LitShadowed,
    /// Sun + ambient, never shadowed
    Lit,
    /// Flat patch colour
    Unlit,
}

fn default_true() -> bool {
    true
}

/// One drawable in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshEntry {
    pub source: MeshSource,
    /// World-space translation
    #[serde(default)]
    pub offset: Vec3,
    #[serde(default)]
    pub material: Material,
    /// Also translated `marker_distance` along the sun direction (sun marker)
    #[serde(default)]
    pub follow_sun: bool,
    /// Rendered into the shadow map
    #[serde(default = "default_true")]
    pub casts_shadow: bool,
}

impl MeshEntry {
    pub fn new(source: MeshSource, material: Material) -> Self {
        Self { source, offset: Vec3::ZERO, material, follow_sun: false, casts_shadow: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    /// Towards the sun; normalized on use
    pub direction: Vec3,
    pub color: Vec3,
    /// How far along the direction `follow_sun` meshes are moved
    pub marker_distance: f32,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.55, 1.5, -1.1),
            color: Vec3::new(0.95, 0.9, 0.7),
            marker_distance: 14.0,
        }
    }
}

impl SunConfig {
    pub fn unit_direction(&self) -> Vec3 {
        self.direction.normalized()
    }
}

/// Orbit camera around the origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub orbit_radius: f32,
    /// Animation time at the first frame, seconds
    pub start_time: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 80.0,
            orbit_radius: 5.5,
            start_time: std::f32::consts::PI * 0.9,
        }
    }
}

/// Orthographic light volume and sampling bias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub map_size: usize,
    pub width: f32,
    pub height: f32,
    pub near: f32,
    pub far: f32,
    /// Light eye distance from the origin along the sun direction
    pub light_distance: f32,
    pub bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: DEFAULT_SHADOW_MAP_SIZE,
            width: 10.0,
            height: 10.0,
            near: 0.1,
            far: 80.0,
            light_distance: 40.0,
            bias: crate::rasterizer::shadow::DEFAULT_SHADOW_BIAS,
        }
    }
}

/// Everything a frame needs apart from the loaded geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: usize,
    pub height: usize,
    /// Sky colour; stored with alpha 0, forced opaque on presentation
    pub clear_color: Vec3,
    pub sun: SunConfig,
    pub camera: CameraConfig,
    pub shadow: ShadowConfig,
    pub meshes: Vec<MeshEntry>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let bark = Vec3::new(0.45, 0.3, 0.18);
        let leaves = Vec3::new(0.3, 0.65, 0.25);

        let mut sun_marker = MeshEntry::new(
            MeshSource::Cuboid {
                center: Vec3::ZERO,
                half_extents: Vec3::splat(0.4),
                color: Vec3::new(1.0, 0.9, 0.5),
            },
            Material::Unlit,
        );
        sun_marker.follow_sun = true;
        sun_marker.casts_shadow = false;

        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            clear_color: Vec3::new(0.6, 0.8, 1.0),
            sun: SunConfig::default(),
            camera: CameraConfig::default(),
            shadow: ShadowConfig::default(),
            meshes: vec![
                MeshEntry::new(
                    MeshSource::Ground { size: 8.0, height: 0.0, color: Vec3::new(0.55, 0.7, 0.35) },
                    Material::LitShadowed,
                ),
                MeshEntry::new(
                    MeshSource::Cuboid {
                        center: Vec3::new(0.0, 0.6, 0.0),
                        half_extents: Vec3::new(0.15, 0.6, 0.15),
                        color: bark,
                    },
                    Material::LitShadowed,
                ),
                MeshEntry::new(
                    MeshSource::Cuboid {
                        center: Vec3::new(0.0, 1.6, 0.0),
                        half_extents: Vec3::new(0.8, 0.5, 0.8),
                        color: leaves,
                    },
                    Material::LitShadowed,
                ),
                MeshEntry::new(
                    MeshSource::Cuboid {
                        center: Vec3::new(0.0, 2.35, 0.0),
                        half_extents: Vec3::new(0.45, 0.3, 0.45),
                        color: leaves,
                    },
                    Material::LitShadowed,
                ),
                sun_marker,
            ],
        }
    }
}

/// Smallest horizontal share of the sun direction; the light basis is built against world up
const MIN_SUN_TILT: f32 = 1e-3;

fn check(ok: bool, setting: &'static str, reason: &'static str) -> Result<(), SceneError> {
    if ok {
        Ok(())
    } else {
        Err(SceneError::SettingError { setting, reason })
    }
}

impl SceneConfig {
    /// Reject framebuffer sizes the renderer can't allocate and settings that give
    /// degenerate camera or light matrices
    pub fn validate(&self) -> Result<(), SceneError> {
        let fits = |w: usize, h: usize| w > 0 && h > 0 && w <= MAX_FB_WIDTH && h <= MAX_FB_HEIGHT;

        if !fits(self.width, self.height) {
            return Err(SceneError::SizeError { what: "Framebuffer", width: self.width, height: self.height });
        }
        let map = self.shadow.map_size;
        if !fits(map, map) {
            return Err(SceneError::SizeError { what: "Shadow map", width: map, height: map });
        }

        let c = self.clear_color;
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        check(in_unit(c.x) && in_unit(c.y) && in_unit(c.z), "clear_color", "channels must be within 0..1")?;

        let d = self.sun.direction;
        let length = d.magnitude();
        check(length.is_finite() && length > 0.0, "sun.direction", "must be a non-zero finite vector")?;
        check(
            (d.x * d.x + d.z * d.z).sqrt() / length > MIN_SUN_TILT,
            "sun.direction",
            "must not point straight up or down",
        )?;
        check(self.sun.marker_distance.is_finite(), "sun.marker_distance", "must be finite")?;

        let cam = &self.camera;
        check(
            cam.orbit_radius.is_finite() && cam.orbit_radius > 0.0,
            "camera.orbit_radius",
            "must be positive",
        )?;
        check(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0, "camera.fov_degrees", "must be within 0..180")?;
        check(cam.near > 0.0 && cam.far > cam.near, "camera.near/far", "need 0 < near < far")?;
        check(cam.start_time.is_finite(), "camera.start_time", "must be finite")?;

        let sh = &self.shadow;
        check(sh.width > 0.0 && sh.height > 0.0, "shadow.width/height", "must be positive")?;
        check(sh.near >= 0.0 && sh.far > sh.near, "shadow.near/far", "need 0 <= near < far")?;
        check(sh.light_distance.is_finite(), "shadow.light_distance", "must be finite")?;
        check(sh.bias.is_finite(), "shadow.bias", "must be finite")?;
        Ok(())
    }
}

/// Load a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneConfig, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_from_str(&contents)
}

/// Load a scene from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<SceneConfig, SceneError> {
    let scene: SceneConfig = ron::from_str(s)?;
    scene.validate()?;
    Ok(scene)
}

/// Pretty-printed RON text for a scene
pub fn scene_to_string(scene: &SceneConfig) -> Result<String, SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    Ok(ron::ser::to_string_pretty(scene, config)?)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &SceneConfig, path: P) -> Result<(), SceneError> {
    let contents = scene_to_string(scene)?;
    fs::write(path, contents)?;
    Ok(())
}
