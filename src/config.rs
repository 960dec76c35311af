use std::time::Duration;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::catalog::{DEFAULT_BASE_URL, DEFAULT_BUCKET};
use crate::projector::{Camera, Viewport};
use crate::propagate::PathSettings;
use crate::registry::RegistrySettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub registry: RegistryConfig,
    pub orbit_path: OrbitPathConfig,
    pub camera: CameraConfig,
    pub viewport: ViewportConfig,
    pub frame: FrameConfig,
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_groups")]
    pub groups: Vec<String>,
    #[serde(default = "default_bucket", deserialize_with = "human_duration")]
    pub cache_bucket: Duration,
    #[serde(default = "default_request_timeout", deserialize_with = "human_duration")]
    pub request_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            groups: default_groups(),
            cache_bucket: default_bucket(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_groups() -> Vec<String> {
    ["stations", "gps-ops", "weather", "active"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_bucket() -> Duration {
    DEFAULT_BUCKET
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_max_satellites")]
    pub max_satellites: usize,
    #[serde(default = "default_true")]
    pub show_orbits: bool,
    #[serde(default = "default_true")]
    pub show_labels: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_satellites: default_max_satellites(),
            show_orbits: true,
            show_labels: true,
        }
    }
}

fn default_max_satellites() -> usize {
    100
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrbitPathConfig {
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default = "default_step", deserialize_with = "human_duration")]
    pub step: Duration,
}

impl Default for OrbitPathConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            step: default_step(),
        }
    }
}

fn default_steps() -> usize {
    100
}

fn default_step() -> Duration {
    Duration::from_secs(90 * 60)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_eye")]
    pub eye: [f64; 3],
    #[serde(default)]
    pub target: [f64; 3],
    #[serde(default = "default_up")]
    pub up: [f64; 3],
    #[serde(default = "default_fov")]
    pub fov_y_deg: f64,
    #[serde(default = "default_near")]
    pub near: f64,
    #[serde(default = "default_far")]
    pub far: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: default_eye(),
            target: [0.0; 3],
            up: default_up(),
            fov_y_deg: default_fov(),
            near: default_near(),
            far: default_far(),
        }
    }
}

fn default_eye() -> [f64; 3] {
    [0.0, 0.0, 5.0]
}

fn default_up() -> [f64; 3] {
    [0.0, 1.0, 0.0]
}

fn default_fov() -> f64 {
    75.0
}

fn default_near() -> f64 {
    0.1
}

fn default_far() -> f64 {
    1000.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_width() -> f64 {
    1280.0
}

fn default_height() -> f64 {
    720.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

const MAX_FPS: u32 = 1000;

fn default_fps() -> u32 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn human_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.catalog.groups.is_empty() {
            return invalid("catalog.groups must not be empty");
        }
        if self.registry.max_satellites == 0 {
            return invalid("registry.max_satellites must be positive");
        }
        if self.orbit_path.steps == 0 {
            return invalid("orbit_path.steps must be positive");
        }
        if self.orbit_path.step.is_zero() {
            return invalid("orbit_path.step must be positive");
        }
        if !(1..=MAX_FPS).contains(&self.frame.fps) {
            return invalid("frame.fps must be between 1 and 1000");
        }
        let camera = &self.camera;
        if !(camera.fov_y_deg > 0.0 && camera.fov_y_deg < 180.0) {
            return invalid("camera.fov_y_deg must be in (0, 180)");
        }
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return invalid("camera.near must be positive and less than camera.far");
        }
        if camera.eye == camera.target {
            return invalid("camera.eye and camera.target must differ");
        }
        let forward = Vector3::from(camera.target) - Vector3::from(camera.eye);
        let up = Vector3::from(camera.up);
        let sine = forward.cross(&up).norm() / (forward.norm() * up.norm());
        if !(sine.is_finite() && sine > 1e-9) {
            return invalid("camera.up must not be parallel to the view direction");
        }
        if !self.viewport().is_valid() {
            return invalid("viewport size is invalid");
        }
        Ok(())
    }

    pub fn registry_settings(&self) -> Result<RegistrySettings, ConfigError> {
        let step = chrono::Duration::from_std(self.orbit_path.step)
            .map_err(|e| ConfigError::Invalid(format!("orbit_path.step: {e}")))?;
        Ok(RegistrySettings {
            max_satellites: self.registry.max_satellites,
            path: PathSettings {
                steps: self.orbit_path.steps,
                step,
            },
            show_orbits: self.registry.show_orbits,
            show_labels: self.registry.show_labels,
        })
    }

    pub fn camera(&self) -> Camera {
        let c = &self.camera;
        Camera {
            eye: Point3::from(c.eye),
            target: Point3::from(c.target),
            up: Vector3::from(c.up),
            fov_y_deg: c.fov_y_deg,
            near: c.near,
            far: c.far,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport.width, self.viewport.height)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame.fps.max(1) as f64)
    }
}
