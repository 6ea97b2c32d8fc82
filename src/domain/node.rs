// Node domain model
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Active,
    Warning,
    Error,
}

impl NodeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            NodeStatus::Active => "Active",
            NodeStatus::Warning => "Warning",
            NodeStatus::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub status: NodeStatus,
    /// Feed channel for this node; the configured default applies when unset.
    #[serde(default)]
    pub channel_id: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lng,
            status: NodeStatus::Active,
            channel_id: None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum NodeError {
    #[error("node name must not be empty")]
    EmptyName,
    #[error("invalid {axis}: {input:?}")]
    InvalidCoordinate { axis: &'static str, input: String },
}

/// Unvalidated input for adding a node, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct NewNode {
    pub name: String,
    pub lat: String,
    pub lng: String,
}

impl NewNode {
    pub fn new(name: impl Into<String>, lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lat: lat.into(),
            lng: lng.into(),
        }
    }

    /// Builds an active node under the given id.
    pub fn into_node(self, id: String) -> Result<Node, NodeError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(NodeError::EmptyName);
        }
        let lat = parse_coordinate("latitude", &self.lat)?;
        let lng = parse_coordinate("longitude", &self.lng)?;
        Ok(Node::new(id, name, lat, lng))
    }
}

fn parse_coordinate(axis: &'static str, input: &str) -> Result<f64, NodeError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| NodeError::InvalidCoordinate {
            axis,
            input: input.to_string(),
        })
}
