//! Simulation configuration and validation
//!
//! Every field has a default, so configuration files only need to list the
//! values they override. Setting a force section to `null` disables that force.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Default Constants
// =============================================================================

/// Default canvas width in pixels
pub const DEFAULT_WIDTH: f64 = 900.0;

/// Default canvas height in pixels
pub const DEFAULT_HEIGHT: f64 = 700.0;

/// Default minimum alpha before the simulation settles
pub const DEFAULT_ALPHA_MIN: f64 = 0.001;

/// Default number of ticks for alpha to decay from 1 to alpha_min
pub const DEFAULT_ALPHA_DECAY_TICKS: f64 = 300.0;

/// Default velocity decay factor (0-1, applied each tick)
pub const DEFAULT_VELOCITY_DECAY: f64 = 0.6;

/// Default charge for many-body repulsion (negative = repulsion)
pub const DEFAULT_CHARGE: f64 = -30.0;

/// Default minimum distance for many-body force (avoids singularity)
pub const DEFAULT_DISTANCE_MIN: f64 = 1.0;

/// Default maximum interaction distance for many-body force
pub const DEFAULT_DISTANCE_MAX: f64 = 300.0;

/// Default Barnes-Hut theta approximation threshold (0 = exact)
pub const DEFAULT_THETA: f64 = 0.9;

/// Default link rest length
pub const DEFAULT_LINK_DISTANCE: f64 = 100.0;

/// Default number of collision passes per tick
pub const DEFAULT_COLLIDE_ITERATIONS: usize = 2;

/// Alpha target applied while a node is being dragged
pub const DEFAULT_DRAG_ALPHA_TARGET: f64 = 0.3;

/// Default zoom extent
pub const DEFAULT_MIN_SCALE: f64 = 0.1;
pub const DEFAULT_MAX_SCALE: f64 = 10.0;

/// Minimum hit-test radius in world units
pub const DEFAULT_HIT_RADIUS: f64 = 12.0;

/// Errors raised when a configuration or input graph is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite positive number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be at least 1")]
    NoIterations { field: &'static str },

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("many_body.distance_max ({max}) must exceed many_body.distance_min ({min})")]
    DistanceRange { min: f64, max: f64 },

    #[error("interaction.min_scale ({min}) must not exceed interaction.max_scale ({max})")]
    ScaleRange { min: f64, max: f64 },

    #[error("alpha_target ({target}) must be below alpha_min ({min}) or the simulation never settles")]
    TargetAboveMin { target: f64, min: f64 },

    #[error(
        "interaction.drag_alpha_target ({target}) must exceed alpha_min ({min}) to keep the simulation running during a drag"
    )]
    DragTargetTooLow { target: f64, min: f64 },

    #[error("node '{id}' has invalid radius {radius}")]
    InvalidRadius { id: String, radius: f64 },

    #[error("link '{from}' -> '{to}' has invalid weight {weight}")]
    InvalidWeight {
        from: String,
        to: String,
        weight: f64,
    },
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn check_iterations(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::NoIterations { field })
    } else {
        Ok(())
    }
}

/// Many-body (charge) force settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManyBodyConfig {
    /// Charge strength (negative = repulsion)
    pub strength: f64,
    /// Distances below this are clamped to avoid singular forces
    pub distance_min: f64,
    /// Pairs farther apart than this contribute nothing
    pub distance_max: f64,
    /// Barnes-Hut threshold; 0 selects exact pairwise summation
    pub theta: f64,
}

impl Default for ManyBodyConfig {
    fn default() -> Self {
        Self {
            strength: DEFAULT_CHARGE,
            distance_min: DEFAULT_DISTANCE_MIN,
            distance_max: DEFAULT_DISTANCE_MAX,
            theta: DEFAULT_THETA,
        }
    }
}

/// Link (spring) force settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Rest length between linked nodes
    pub distance: f64,
    /// Divide the rest length by the link weight
    pub weight_scaled_distance: bool,
    /// Fixed spring strength; `None` uses 1 / min(degree) of the endpoints
    pub strength: Option<f64>,
    /// Passes per tick
    pub iterations: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            distance: DEFAULT_LINK_DISTANCE,
            weight_scaled_distance: false,
            strength: None,
            iterations: 1,
        }
    }
}

/// Centering force settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterConfig {
    /// Target x; `None` uses the canvas center
    pub x: Option<f64>,
    /// Target y; `None` uses the canvas center
    pub y: Option<f64>,
    pub strength: f64,
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            strength: 1.0,
        }
    }
}

/// Collision avoidance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollideConfig {
    pub strength: f64,
    /// Extra spacing added to every node radius
    pub padding: f64,
    /// Passes per tick
    pub iterations: usize,
}

impl Default for CollideConfig {
    fn default() -> Self {
        Self {
            strength: 1.0,
            padding: 0.0,
            iterations: DEFAULT_COLLIDE_ITERATIONS,
        }
    }
}

/// Pointer interaction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Alpha target while a drag is active
    pub drag_alpha_target: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Nodes smaller than this are still grabbable within this radius
    pub hit_radius: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_alpha_target: DEFAULT_DRAG_ALPHA_TARGET,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            hit_radius: DEFAULT_HIT_RADIUS,
        }
    }
}

/// Configuration for the force simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Canvas width (used for the default center)
    pub width: f64,
    /// Canvas height (used for the default center)
    pub height: f64,
    /// Initial alpha value
    pub alpha: f64,
    /// Minimum alpha before the simulation settles
    pub alpha_min: f64,
    /// Alpha decay rate per tick
    pub alpha_decay: f64,
    /// Alpha value the simulation relaxes toward
    pub alpha_target: f64,
    /// Velocity decay factor (friction)
    pub velocity_decay: f64,
    /// Integration step size
    pub time_step: f64,
    /// Seed for the degenerate-geometry jitter
    pub seed: u64,
    pub many_body: Option<ManyBodyConfig>,
    pub link: Option<LinkConfig>,
    pub center: Option<CenterConfig>,
    pub collide: Option<CollideConfig>,
    pub interaction: InteractionConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            alpha: 1.0,
            alpha_min: DEFAULT_ALPHA_MIN,
            // Decay formula from D3: 1 - alpha_min^(1/300)
            alpha_decay: 1.0 - DEFAULT_ALPHA_MIN.powf(1.0 / DEFAULT_ALPHA_DECAY_TICKS),
            alpha_target: 0.0,
            velocity_decay: DEFAULT_VELOCITY_DECAY,
            time_step: 1.0,
            seed: 0,
            many_body: Some(ManyBodyConfig::default()),
            link: Some(LinkConfig::default()),
            center: Some(CenterConfig::default()),
            collide: Some(CollideConfig::default()),
            interaction: InteractionConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Create a configuration for the given canvas size
    pub fn with_size(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Point the centering force aims at
    pub fn center_point(&self) -> (f64, f64) {
        let (cx, cy) = (self.width / 2.0, self.height / 2.0);
        match &self.center {
            Some(center) => (center.x.unwrap_or(cx), center.y.unwrap_or(cy)),
            None => (cx, cy),
        }
    }

    /// Check every value against its documented range
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("width", self.width)?;
        check_positive("height", self.height)?;
        check_range("alpha", self.alpha, 0.0, 1.0)?;
        check_positive("alpha_min", self.alpha_min)?;
        check_range("alpha_min", self.alpha_min, 0.0, 1.0)?;
        check_positive("alpha_decay", self.alpha_decay)?;
        check_range("alpha_decay", self.alpha_decay, 0.0, 1.0)?;
        check_range("alpha_target", self.alpha_target, 0.0, 1.0)?;
        if self.alpha_target >= self.alpha_min {
            return Err(ConfigError::TargetAboveMin {
                target: self.alpha_target,
                min: self.alpha_min,
            });
        }
        check_range("velocity_decay", self.velocity_decay, 0.0, 1.0)?;
        check_positive("time_step", self.time_step)?;

        if let Some(many_body) = &self.many_body {
            check_finite("many_body.strength", many_body.strength)?;
            check_positive("many_body.distance_min", many_body.distance_min)?;
            // distance_max may be infinite (no cutoff)
            if many_body.distance_max.is_nan() || many_body.distance_max <= many_body.distance_min
            {
                return Err(ConfigError::DistanceRange {
                    min: many_body.distance_min,
                    max: many_body.distance_max,
                });
            }
            check_range("many_body.theta", many_body.theta, 0.0, f64::MAX)?;
        }

        if let Some(link) = &self.link {
            check_positive("link.distance", link.distance)?;
            if let Some(strength) = link.strength {
                check_range("link.strength", strength, 0.0, 1.0)?;
            }
            check_iterations("link.iterations", link.iterations)?;
        }

        if let Some(center) = &self.center {
            check_range("center.strength", center.strength, 0.0, 1.0)?;
            if let Some(x) = center.x {
                check_finite("center.x", x)?;
            }
            if let Some(y) = center.y {
                check_finite("center.y", y)?;
            }
        }

        if let Some(collide) = &self.collide {
            check_range("collide.strength", collide.strength, 0.0, 1.0)?;
            check_range("collide.padding", collide.padding, 0.0, f64::MAX)?;
            check_iterations("collide.iterations", collide.iterations)?;
        }

        let interaction = &self.interaction;
        check_range(
            "interaction.drag_alpha_target",
            interaction.drag_alpha_target,
            0.0,
            1.0,
        )?;
        if interaction.drag_alpha_target <= self.alpha_min {
            return Err(ConfigError::DragTargetTooLow {
                target: interaction.drag_alpha_target,
                min: self.alpha_min,
            });
        }
        check_positive("interaction.min_scale", interaction.min_scale)?;
        check_positive("interaction.max_scale", interaction.max_scale)?;
        if interaction.min_scale > interaction.max_scale {
            return Err(ConfigError::ScaleRange {
                min: interaction.min_scale,
                max: interaction.max_scale,
            });
        }
        check_range("interaction.hit_radius", interaction.hit_radius, 0.0, f64::MAX)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_alpha_decay_reaches_min_in_300_ticks() {
        let config = SimulationConfig::default();
        let alpha = (1.0 - config.alpha_decay).powf(DEFAULT_ALPHA_DECAY_TICKS);
        assert!((alpha - DEFAULT_ALPHA_MIN).abs() < 1e-9);
    }

    #[test]
    fn center_defaults_to_canvas_middle() {
        let config = SimulationConfig::with_size(800.0, 600.0);
        assert_eq!(config.center_point(), (400.0, 300.0));
    }

    #[test]
    fn center_override_is_used() {
        let mut config = SimulationConfig::default();
        config.center = Some(CenterConfig {
            x: Some(0.0),
            y: Some(10.0),
            strength: 1.0,
        });
        assert_eq!(config.center_point(), (0.0, 10.0));
    }

    #[test]
    fn rejects_velocity_decay_above_one() {
        let config = SimulationConfig {
            velocity_decay: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "velocity_decay",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_alpha_min() {
        let config = SimulationConfig {
            alpha_min: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "alpha_min",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_alpha_decay() {
        let config = SimulationConfig {
            alpha_decay: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "alpha_decay",
                ..
            })
        ));
    }

    #[test]
    fn rejects_alpha_target_at_or_above_alpha_min() {
        for alpha_target in [DEFAULT_ALPHA_MIN, 0.5] {
            let config = SimulationConfig {
                alpha_target,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::TargetAboveMin { .. })
            ));
        }
    }

    #[test]
    fn rejects_drag_alpha_target_at_or_below_alpha_min() {
        for drag_alpha_target in [0.0, DEFAULT_ALPHA_MIN] {
            let mut config = SimulationConfig::default();
            config.interaction.drag_alpha_target = drag_alpha_target;
            assert!(matches!(
                config.validate(),
                Err(ConfigError::DragTargetTooLow { .. })
            ));
        }
    }

    #[test]
    fn rejects_non_positive_canvas() {
        let config = SimulationConfig::with_size(0.0, 600.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "width", .. })
        ));
    }

    #[test]
    fn rejects_inverted_distance_range() {
        let mut config = SimulationConfig::default();
        config.many_body = Some(ManyBodyConfig {
            distance_min: 10.0,
            distance_max: 5.0,
            ..Default::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DistanceRange { .. })
        ));
    }

    #[test]
    fn accepts_unbounded_distance_max() {
        let mut config = SimulationConfig::default();
        config.many_body = Some(ManyBodyConfig {
            distance_max: f64::INFINITY,
            ..Default::default()
        });
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_scale_range() {
        let mut config = SimulationConfig::default();
        config.interaction.min_scale = 5.0;
        config.interaction.max_scale = 2.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ScaleRange { .. })
        ));
    }

    #[test]
    fn rejects_zero_collide_iterations() {
        let mut config = SimulationConfig::default();
        config.collide = Some(CollideConfig {
            iterations: 0,
            ..Default::default()
        });
        assert_eq!(
            config.validate(),
            Err(ConfigError::NoIterations {
                field: "collide.iterations"
            })
        );
    }

    #[test]
    fn rejects_link_strength_out_of_range() {
        let mut config = SimulationConfig::default();
        config.link = Some(LinkConfig {
            strength: Some(2.0),
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "width: 400\nmany_body:\n  strength: -50\ncollide: null\n";
        let config: SimulationConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.width, 400.0);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        let many_body = config.many_body.unwrap();
        assert_eq!(many_body.strength, -50.0);
        assert_eq!(many_body.distance_max, DEFAULT_DISTANCE_MAX);
        assert!(config.collide.is_none());
        assert!(config.link.is_some());
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = ConfigError::NotPositive {
            field: "link.distance",
            value: -1.0,
        };
        assert_eq!(
            err.to_string(),
            "link.distance must be a finite positive number, got -1"
        );
    }
}
