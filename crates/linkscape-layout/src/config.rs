//! Solver selection and physics parameters.
//!
//! Each solver owns its own parameter struct, so a parameter that does not apply to the active
//! solver cannot be expressed. Defaults follow the vis.js physics defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vertical distance between hierarchy levels.
pub const LEVEL_SEPARATION: f64 = 150.0;

/// Integration constants for solvers that do not expose them.
pub(crate) const DEFAULT_MIN_VELOCITY: f64 = 0.1;
pub(crate) const DEFAULT_MAX_VELOCITY: f64 = 50.0;
pub(crate) const DEFAULT_TIMESTEP: f64 = 0.5;

pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
pub const DEFAULT_EPSILON: f64 = DEFAULT_MIN_VELOCITY * DEFAULT_TIMESTEP;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    Repulsion,
    #[default]
    BarnesHut,
    ForceAtlas2,
    HierarchicalRepulsion,
}

impl SolverKind {
    pub const ALL: [SolverKind; 4] = [
        SolverKind::Repulsion,
        SolverKind::BarnesHut,
        SolverKind::ForceAtlas2,
        SolverKind::HierarchicalRepulsion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SolverKind::Repulsion => "repulsion",
            SolverKind::BarnesHut => "barnes_hut",
            SolverKind::ForceAtlas2 => "force_atlas2",
            SolverKind::HierarchicalRepulsion => "hierarchical_repulsion",
        }
    }

    /// Names of the parameters this solver accepts.
    pub fn parameter_names(self) -> &'static [&'static str] {
        match self {
            SolverKind::Repulsion => RepulsionParams::NAMES,
            SolverKind::BarnesHut => BarnesHutParams::NAMES,
            SolverKind::ForceAtlas2 => ForceAtlas2Params::NAMES,
            SolverKind::HierarchicalRepulsion => HierarchicalRepulsionParams::NAMES,
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverKind {
    type Err = Error;

    /// Accepts snake_case and camelCase spellings (`barnes_hut`, `barnesHut`, `forceAtlas2Based`).
    fn from_str(s: &str) -> Result<Self> {
        let key = normalize(s);
        let key = key.strip_suffix("based").unwrap_or(key.as_str());
        SolverKind::ALL
            .into_iter()
            .find(|k| normalize(k.as_str()) == key)
            .ok_or_else(|| Error::UnknownSolver {
                name: s.to_string(),
            })
    }
}

/// Lowercase with `_` and `-` removed, so `spring_length` and `springLength` compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn check(name: &str, value: f64) -> Result<()> {
    let invalid = |reason| {
        Err(Error::InvalidParameter {
            name: name.to_string(),
            value,
            reason,
        })
    };
    if !value.is_finite() {
        return invalid("must be finite");
    }
    match name {
        "damping" | "avoid_overlap" if !(0.0..=1.0).contains(&value) => {
            invalid("must be within [0, 1]")
        }
        "theta" | "timestep" | "node_distance" if value <= 0.0 => invalid("must be positive"),
        "spring_length" | "spring_constant" | "central_gravity" | "min_velocity"
        | "max_velocity"
            if value < 0.0 =>
        {
            invalid("must not be negative")
        }
        "gravitational_constant" if value > 0.0 => invalid("must not be positive"),
        _ => Ok(()),
    }
}

macro_rules! solver_params {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$fmeta:meta])* $field:ident: $default:expr),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: f64,)+
        }

        impl Default for $name {
            fn default() -> Self {
                Self { $($field: $default,)+ }
            }
        }

        impl $name {
            pub const NAMES: &'static [&'static str] = &[$(stringify!($field)),+];

            fn slot(&mut self, key: &str) -> Option<(&'static str, &mut f64)> {
                $(
                    if normalize(stringify!($field)) == key {
                        return Some((stringify!($field), &mut self.$field));
                    }
                )+
                None
            }

            fn value(&self, key: &str) -> Option<f64> {
                $(
                    if normalize(stringify!($field)) == key {
                        return Some(self.$field);
                    }
                )+
                None
            }

            pub fn validate(&self) -> Result<()> {
                $(check(stringify!($field), self.$field)?;)+
                Ok(())
            }
        }
    };
}

solver_params! {
    /// Exact all-pairs repulsion that fades out past `2 · node_distance`.
    RepulsionParams {
        central_gravity: 0.2,
        spring_length: 200.0,
        spring_constant: 0.05,
        node_distance: 100.0,
        damping: 0.09,
        min_velocity: DEFAULT_MIN_VELOCITY,
        max_velocity: DEFAULT_MAX_VELOCITY,
        timestep: DEFAULT_TIMESTEP,
        wind_x: 0.0,
        wind_y: 0.0,
    }
}

solver_params! {
    /// Inverse-square repulsion approximated with a quad tree.
    BarnesHutParams {
        /// Opening criterion: a cell is treated as one mass when `size / distance < theta`.
        theta: 0.5,
        gravitational_constant: -2000.0,
        central_gravity: 0.3,
        spring_length: 95.0,
        spring_constant: 0.04,
        damping: 0.09,
        avoid_overlap: 0.0,
    }
}

solver_params! {
    /// Degree-weighted linear repulsion (ForceAtlas2 style) with a fixed `theta` of 0.5.
    ForceAtlas2Params {
        gravitational_constant: -50.0,
        central_gravity: 0.01,
        spring_length: 100.0,
        spring_constant: 0.08,
        damping: 0.4,
        avoid_overlap: 0.0,
    }
}

solver_params! {
    /// Short-range repulsion with nodes pinned to hierarchy rows.
    HierarchicalRepulsionParams {
        central_gravity: 0.0,
        spring_length: 100.0,
        spring_constant: 0.01,
        node_distance: 120.0,
        damping: 0.09,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "solver", content = "params", rename_all = "snake_case")]
pub enum PhysicsConfig {
    Repulsion(RepulsionParams),
    BarnesHut(BarnesHutParams),
    ForceAtlas2(ForceAtlas2Params),
    HierarchicalRepulsion(HierarchicalRepulsionParams),
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig::defaults(SolverKind::default())
    }
}

impl PhysicsConfig {
    pub fn defaults(kind: SolverKind) -> Self {
        match kind {
            SolverKind::Repulsion => PhysicsConfig::Repulsion(RepulsionParams::default()),
            SolverKind::BarnesHut => PhysicsConfig::BarnesHut(BarnesHutParams::default()),
            SolverKind::ForceAtlas2 => PhysicsConfig::ForceAtlas2(ForceAtlas2Params::default()),
            SolverKind::HierarchicalRepulsion => {
                PhysicsConfig::HierarchicalRepulsion(HierarchicalRepulsionParams::default())
            }
        }
    }

    pub fn kind(&self) -> SolverKind {
        match self {
            PhysicsConfig::Repulsion(_) => SolverKind::Repulsion,
            PhysicsConfig::BarnesHut(_) => SolverKind::BarnesHut,
            PhysicsConfig::ForceAtlas2(_) => SolverKind::ForceAtlas2,
            PhysicsConfig::HierarchicalRepulsion(_) => SolverKind::HierarchicalRepulsion,
        }
    }

    /// Builds a configuration from a loose `(name, value)` bag on top of the solver defaults.
    ///
    /// Names may be snake_case or camelCase. A name the solver does not own is rejected with
    /// [`Error::UnknownParameter`]; out-of-range values with [`Error::InvalidParameter`].
    pub fn from_params<S: AsRef<str>>(kind: SolverKind, params: &[(S, f64)]) -> Result<Self> {
        let mut config = PhysicsConfig::defaults(kind);
        for (name, value) in params {
            config.set(name.as_ref(), *value)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Overrides one parameter of the active solver.
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        let key = normalize(name);
        let kind = self.kind();
        let slot = match self {
            PhysicsConfig::Repulsion(p) => p.slot(&key),
            PhysicsConfig::BarnesHut(p) => p.slot(&key),
            PhysicsConfig::ForceAtlas2(p) => p.slot(&key),
            PhysicsConfig::HierarchicalRepulsion(p) => p.slot(&key),
        };
        let Some((canonical, field)) = slot else {
            return Err(Error::UnknownParameter {
                solver: kind,
                name: name.to_string(),
            });
        };
        check(canonical, value)?;
        *field = value;
        Ok(())
    }

    /// Current value of a parameter of the active solver.
    pub fn get(&self, name: &str) -> Option<f64> {
        let key = normalize(name);
        match self {
            PhysicsConfig::Repulsion(p) => p.value(&key),
            PhysicsConfig::BarnesHut(p) => p.value(&key),
            PhysicsConfig::ForceAtlas2(p) => p.value(&key),
            PhysicsConfig::HierarchicalRepulsion(p) => p.value(&key),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            PhysicsConfig::Repulsion(p) => {
                p.validate()?;
                if p.min_velocity > p.max_velocity {
                    return Err(Error::InvalidParameter {
                        name: "min_velocity".to_string(),
                        value: p.min_velocity,
                        reason: "must not exceed max_velocity",
                    });
                }
                Ok(())
            }
            PhysicsConfig::BarnesHut(p) => p.validate(),
            PhysicsConfig::ForceAtlas2(p) => p.validate(),
            PhysicsConfig::HierarchicalRepulsion(p) => p.validate(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialPlacement {
    /// Evenly spaced on a circle, in graph node order.
    #[default]
    Circular,
    /// Uniform in a square scaled with the node count.
    Random {
        #[serde(default)]
        seed: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationOptions {
    /// Hard cap on iterations; 0 selects [`DEFAULT_MAX_ITERATIONS`].
    pub max_iterations: usize,
    /// The layout has converged once no node moves farther than this in one iteration.
    pub epsilon: f64,
    pub initial_placement: InitialPlacement,
    /// Rendered node radius, used by `avoid_overlap`.
    pub node_radius: f64,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: DEFAULT_EPSILON,
            initial_placement: InitialPlacement::default(),
            node_radius: 10.0,
        }
    }
}

impl SimulationOptions {
    pub fn effective_max_iterations(&self) -> usize {
        if self.max_iterations == 0 {
            DEFAULT_MAX_ITERATIONS
        } else {
            self.max_iterations
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_case_and_separators() {
        assert_eq!(normalize("springLength"), "springlength");
        assert_eq!(normalize("spring_length"), "springlength");
        assert_eq!(normalize("Avoid-Overlap"), "avoidoverlap");
    }

    #[test]
    fn solver_names_parse_in_either_case() {
        assert_eq!("barnesHut".parse::<SolverKind>().ok(), Some(SolverKind::BarnesHut));
        assert_eq!(
            "forceAtlas2Based".parse::<SolverKind>().ok(),
            Some(SolverKind::ForceAtlas2)
        );
        assert_eq!(
            "hierarchical_repulsion".parse::<SolverKind>().ok(),
            Some(SolverKind::HierarchicalRepulsion)
        );
        assert!("spring".parse::<SolverKind>().is_err());
    }

    #[test]
    fn names_list_every_field() {
        assert_eq!(RepulsionParams::NAMES.len(), 10);
        assert!(BarnesHutParams::NAMES.contains(&"theta"));
        assert!(!ForceAtlas2Params::NAMES.contains(&"theta"));
    }
}
