//! Error types for puppet-rs.

use thiserror::Error;

use crate::node::{Axis, NodeHandle};

/// The main error type for puppet-rs operations.
#[derive(Error, Debug)]
pub enum PuppetError {
    /// The scene loader produced no root node.
    #[error("scene has no root node")]
    MissingRoot,

    /// A joint axis range does not satisfy `min <= init <= max`.
    #[error("joint '{name}' has invalid {axis:?} range: min {min}, init {init}, max {max}")]
    InvalidJointRange {
        name: String,
        axis: Axis,
        min: f32,
        init: f32,
        max: f32,
    },

    /// Every id below the picking background id has been handed out.
    #[error("node id space exhausted")]
    IdSpaceExhausted,

    /// A handle does not refer to a live node.
    #[error("node {0:?} not found")]
    NodeNotFound(NodeHandle),

    /// Attaching the child would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        parent: NodeHandle,
        child: NodeHandle,
    },

    /// The child is already attached to a parent.
    #[error("node {0:?} already has a parent")]
    AlreadyParented(NodeHandle),

    /// A transform contained NaN or infinite entries.
    #[error("transform for node {0:?} is not finite")]
    NonFiniteTransform(NodeHandle),

    /// A transform has no usable inverse (zero scale or near-singular).
    #[error("transform for node '{0}' is not invertible")]
    SingularTransform(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for puppet-rs operations.
pub type Result<T> = std::result::Result<T, PuppetError>;
