use thiserror::Error;

pub type MeshResult<T> = Result<T, MeshError>;

/// Errors raised by the mesh store and part operations.
///
/// None of these leave a mesh half-modified: index and argument checks run before any
/// mutation, and growth failures are reported before counts are updated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A part order, internal slot, triangle ordinal or vertex ordinal was out of range.
    #[error("{what} {index} out of range (len {len})")]
    Index {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Growing a collection failed, or the requested size does not fit in memory.
    #[error("cannot grow {what} by {additional} slots")]
    Capacity {
        what: &'static str,
        additional: usize,
    },

    /// The mesh breaks one of its structural invariants.
    #[error("inconsistent mesh: {message}")]
    Consistency { message: String },

    /// Input arrays have the wrong shape.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl MeshError {
    pub fn index(what: &'static str, index: usize, len: usize) -> Self {
        MeshError::Index { what, index, len }
    }

    pub fn consistency(message: impl Into<String>) -> Self {
        MeshError::Consistency {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        MeshError::InvalidArgument {
            message: message.into(),
        }
    }
}
