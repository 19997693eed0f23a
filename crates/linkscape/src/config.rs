//! Session configuration: one document describing every computation a session runs.

use crate::error::Result;
use linkscape_analysis::{CentralityKind, CentralityOptions, CommunityOptions, Selection};
use linkscape_layout::{PhysicsConfig, SimulationOptions};
use serde::{Deserialize, Serialize};

/// Everything [`crate::Session::apply`] needs. Missing fields take their defaults.
///
/// ```yaml
/// selection: { kind: top_by_degree, k: 50 }
/// centrality: betweenness
/// physics:
///   solver: force_atlas2
///   params: { gravitational_constant: -80 }
/// simulation: { max_iterations: 400 }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub selection: Selection,
    pub centrality: CentralityKind,
    pub centrality_options: CentralityOptions,
    pub communities: CommunityOptions,
    pub physics: PhysicsConfig,
    pub simulation: SimulationOptions,
}

impl SessionConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses JSON when the document starts with `{`, YAML otherwise.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim_start().starts_with('{') {
            Self::from_json(text)
        } else {
            Self::from_yaml(text)
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.physics.validate()?;
        Ok(())
    }
}
