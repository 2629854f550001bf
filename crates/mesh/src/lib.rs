//! In-memory model of an FCE vehicle mesh and the editing operations on it.
//!
//! A [`Mesh`] stores parts, triangles and vertices in holey collections so that deleting
//! one element never invalidates the indices of the others. See the `fcekit-fce` crate
//! for reading and writing meshes.

mod attributes;
mod error;
mod geometry;
mod index_list;
mod inject;
mod mesh;
mod ops;
mod summary;
mod validate;

pub use error::*;
pub use geometry::*;
pub use index_list::{IndexList, Iter as IndexListIter};
pub use inject::PartGeometry;
pub use mesh::{ColorTable, Mesh, Part};
pub use summary::{MeshSummary, FCE3_PART_ROLES};
pub use validate::MeshValidity;

/// Longest part or dummy name, in characters.
pub const MAX_NAME_LEN: usize = 63;

/// Largest number of parts a mesh may be encoded with.
pub const MAX_PARTS: usize = 64;

/// Largest number of dummies a mesh may hold.
pub const MAX_DUMMIES: usize = 16;

/// Largest number of entries per color table.
pub const MAX_COLORS: usize = 16;
