use fcekit_mesh::MeshError;
use thiserror::Error;

pub type FceResult<T> = Result<T, FceError>;

#[derive(Debug, Error)]
pub enum FceError {
    /// The buffer is not a well-formed FCE file, or the mesh does not fit the format.
    #[error("invalid FCE data: {message}")]
    Format { message: String },

    /// The output buffer is smaller than the encoded size.
    #[error("buffer holds {available} bytes, {required} required")]
    Capacity { required: usize, available: usize },

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FceError {
    pub fn format(message: impl Into<String>) -> Self {
        FceError::Format {
            message: message.into(),
        }
    }
}
