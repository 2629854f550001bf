//! Reading and writing FCE 3D models.
//!
//! Three variants are supported: FCE3, FCE4 and FCE4M. Decoding validates the whole
//! buffer before building a [`Mesh`]; encoding writes a fresh layout from the mesh.

mod decode;
mod encode;
mod error;
mod header;
mod layout;
mod validate;
mod version;
mod warning;

pub use decode::decode_fce;
pub use encode::{
    encode_fce, encode_fce_to_vec, encoded_size, half_size, table_offsets, EncodeConfig,
    FCE4_HIGH_BODY_PARTS,
};
pub use error::{FceError, FceResult};
pub use header::{Header, PartRange};
pub use layout::{Table, FCE3_HEADER_SIZE, FCE4_HEADER_SIZE};
pub use validate::{is_valid_fce, validate_fce, validate_header};
pub use version::{fce_version, FceVersion, FCE4M_TAG, FCE4_TAG};
pub use warning::{Warning, Warnings};

pub use fcekit_mesh as mesh;
pub use fcekit_mesh::{Mesh, PartGeometry};

use std::io::{Read, Write};
use std::path::Path;

/// Decodes an FCE file. Warnings are logged and otherwise dropped.
pub fn read_fce<P: AsRef<Path>>(p: P) -> FceResult<Mesh> {
    let data = std::fs::read(p)?;
    parse_fce(&data)
}

/// Decodes an in-memory FCE file. Warnings are logged and otherwise dropped.
pub fn parse_fce(data: &[u8]) -> FceResult<Mesh> {
    let (mesh, _warnings) = decode_fce(data)?;
    Ok(mesh)
}

/// Encodes `mesh` as `version` and writes it to a new file at `p`.
pub fn write_fce<P: AsRef<Path>>(
    p: P,
    mesh: &mut Mesh,
    version: FceVersion,
    config: &EncodeConfig,
) -> FceResult<Warnings> {
    let mut f = std::fs::File::create(p)?;
    f.write_fce(mesh, version, config)
}

pub trait FceReader: Read {
    /// Reads to the end of the stream and decodes what was read.
    fn read_fce(&mut self) -> FceResult<Mesh>;
}

impl<T: Read> FceReader for T {
    fn read_fce(&mut self) -> FceResult<Mesh> {
        let mut data = Vec::new();
        self.read_to_end(&mut data)?;
        parse_fce(&data)
    }
}

pub trait FceWriter: Write {
    fn write_fce(
        &mut self,
        mesh: &mut Mesh,
        version: FceVersion,
        config: &EncodeConfig,
    ) -> FceResult<Warnings>;
}

impl<T: Write> FceWriter for T {
    fn write_fce(
        &mut self,
        mesh: &mut Mesh,
        version: FceVersion,
        config: &EncodeConfig,
    ) -> FceResult<Warnings> {
        let (buf, warnings) = encode_fce_to_vec(mesh, version, config)?;
        self.write_all(&buf)?;
        self.flush()?;
        Ok(warnings)
    }
}
