use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Extrude
pub const DISTANCE: &str = "distance";
pub const DIRECTION_X: &str = "direction_x";
pub const DIRECTION_Y: &str = "direction_y";
pub const DIRECTION_Z: &str = "direction_z";
pub const TAPER_ANGLE: &str = "taper_angle";
pub const MIDPLANE: &str = "midplane";

// Loft
pub const SOLID: &str = "solid";
pub const RULED: &str = "ruled";
pub const CLOSED: &str = "closed";

// Sweep
pub const TWIST_ANGLE: &str = "twist_angle";
pub const SCALE_FACTOR: &str = "scale_factor";
pub const KEEP_ORIENTATION: &str = "keep_orientation";

/// String-keyed numeric parameters of a feature.
///
/// Missing keys read as `0.0`; flags are stored as `1.0` / `0.0` and any
/// non-zero value reads as set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterStore {
    values: HashMap<String, f64>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: &[(&str, f64)]) -> Self {
        Self {
            values: defaults.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn value(&self, key: &str) -> f64 {
        self.value_or(key, 0.0)
    }

    pub fn value_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    pub fn set(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_string(), value);
    }

    pub fn flag(&self, key: &str) -> bool {
        self.value(key) != 0.0
    }

    pub fn set_flag(&mut self, key: &str, on: bool) {
        self.set(key, if on { 1.0 } else { 0.0 });
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
