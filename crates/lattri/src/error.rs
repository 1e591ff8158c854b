//! Error type shared by construction, providers and queries.

use std::fmt;

/// Everything that can go wrong while building or querying a triangulation.
///
/// Numerical-precision conditions (heights near a wall, rounded integral heights)
/// are not errors; they are logged with `tracing::warn!` and the object keeps working.
#[derive(Debug)]
pub enum TriangError {
    /// Bad caller input: empty label set, malformed simplices, heights of the wrong
    /// length, unknown backend name, out-of-range face dimension.
    InvalidInput { reason: String },
    /// A single-shot external provider failed to run, exited nonzero, or wrote to stderr.
    Tool { tool: String, reason: String },
    /// Provider output could not be parsed.
    Parse { tool: String, output: String },
    /// The query is not defined for this configuration (non-star, non-full-dimensional,
    /// non-reflexive, non-regular).
    Unsupported { reason: String },
    /// A random flip walk found no neighbor passing the active filters.
    StuckWalk { step: usize },
}

impl TriangError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported {
            reason: reason.into(),
        }
    }

    pub(crate) fn tool(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(tool: impl Into<String>, output: impl Into<String>) -> Self {
        Self::Parse {
            tool: tool.into(),
            output: output.into(),
        }
    }
}

impl fmt::Display for TriangError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
            Self::Tool { tool, reason } => write!(f, "{tool} failed: {reason}"),
            Self::Parse { tool, output } => {
                write!(f, "failed to parse {tool} output: {output:?}")
            }
            Self::Unsupported { reason } => write!(f, "not implemented for this case: {reason}"),
            Self::StuckWalk { step } => write!(
                f,
                "random flip walk stuck at step {step}: no neighbor passes the filters"
            ),
        }
    }
}

impl std::error::Error for TriangError {}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TriangError>;
