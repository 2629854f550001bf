use crate::{
    error::{FceError, FceResult},
    layout::{FCE3_HEADER_SIZE, FCE4_HEADER_SIZE},
};
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

/// Version tag at offset 0 of an FCE4 file.
pub const FCE4_TAG: i32 = 0x0010_1014;
/// Version tag at offset 0 of an FCE4M file.
pub const FCE4M_TAG: i32 = 0x0010_1015;

/// The three FCE wire variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FceVersion {
    Fce3,
    Fce4,
    Fce4M,
}

impl FceVersion {
    /// Any tag other than the two FCE4 tags selects FCE3, whose first header word
    /// carries no version.
    pub fn from_tag(tag: i32) -> Self {
        match tag {
            FCE4_TAG => FceVersion::Fce4,
            FCE4M_TAG => FceVersion::Fce4M,
            _ => FceVersion::Fce3,
        }
    }

    /// The tag written at offset 0, which is 0 for FCE3.
    pub fn tag(self) -> i32 {
        match self {
            FceVersion::Fce3 => 0,
            FceVersion::Fce4 => FCE4_TAG,
            FceVersion::Fce4M => FCE4M_TAG,
        }
    }

    /// 3, 4 or 5 (for FCE4M).
    pub fn number(self) -> i32 {
        match self {
            FceVersion::Fce3 => 3,
            FceVersion::Fce4 => 4,
            FceVersion::Fce4M => 5,
        }
    }

    pub fn header_size(self) -> usize {
        match self {
            FceVersion::Fce3 => FCE3_HEADER_SIZE,
            FceVersion::Fce4 | FceVersion::Fce4M => FCE4_HEADER_SIZE,
        }
    }

    /// Size in bytes of a file with the given global counts, or `None` on overflow.
    pub fn file_size(self, num_vertices: usize, num_triangles: usize) -> Option<usize> {
        let (per_vertex, per_triangle) = self.bytes_per_element();
        num_vertices
            .checked_mul(per_vertex as usize)?
            .checked_add(num_triangles.checked_mul(per_triangle as usize)?)?
            .checked_add(self.header_size())
    }

    /// Like [`FceVersion::file_size`] for header counts, which are signed.
    pub(crate) fn file_size_i64(self, num_vertices: i64, num_triangles: i64) -> i64 {
        let (per_vertex, per_triangle) = self.bytes_per_element();
        self.header_size() as i64 + per_vertex * num_vertices + per_triangle * num_triangles
    }

    fn bytes_per_element(self) -> (i64, i64) {
        match self {
            FceVersion::Fce3 => (80, 56),
            FceVersion::Fce4 => (140, 68),
            FceVersion::Fce4M => (141, 68),
        }
    }
}

impl fmt::Display for FceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FceVersion::Fce3 => write!(f, "FCE3"),
            FceVersion::Fce4 => write!(f, "FCE4"),
            FceVersion::Fce4M => write!(f, "FCE4M"),
        }
    }
}

/// Detects the variant of an FCE buffer from its version tag.
///
/// Buffers shorter than the smallest header are rejected. A buffer tagged FCE4 may
/// still be too short for its own header; decode and validation check that.
pub fn fce_version(buf: &[u8]) -> FceResult<FceVersion> {
    if buf.len() < FCE3_HEADER_SIZE {
        return Err(FceError::format(format!(
            "buffer of {} bytes is shorter than the {} byte header",
            buf.len(),
            FCE3_HEADER_SIZE
        )));
    }
    Ok(FceVersion::from_tag(LittleEndian::read_i32(&buf[0..4])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_select_variant() {
        let mut buf = vec![0u8; FCE4_HEADER_SIZE];
        assert_eq!(FceVersion::Fce3, fce_version(&buf).unwrap());
        LittleEndian::write_i32(&mut buf[0..4], FCE4_TAG);
        assert_eq!(FceVersion::Fce4, fce_version(&buf).unwrap());
        LittleEndian::write_i32(&mut buf[0..4], FCE4M_TAG);
        assert_eq!(5, fce_version(&buf).unwrap().number());
        LittleEndian::write_i32(&mut buf[0..4], 7);
        assert_eq!(3, fce_version(&buf).unwrap().number());
    }

    #[test]
    fn short_buffer_has_no_version() {
        assert!(matches!(
            fce_version(&[0u8; 16]),
            Err(FceError::Format { .. })
        ));
    }

    #[test]
    fn file_sizes() {
        assert_eq!(Some(0x1F04 + 80 * 3 + 56), FceVersion::Fce3.file_size(3, 1));
        assert_eq!(Some(0x2038 + 140 * 3 + 68), FceVersion::Fce4.file_size(3, 1));
        assert_eq!(Some(0x2038 + 141 * 3 + 68), FceVersion::Fce4M.file_size(3, 1));
        assert_eq!(None, FceVersion::Fce3.file_size(usize::MAX, 1));
        assert_eq!(
            FceVersion::Fce4M.file_size(10, 20).map(|s| s as i64),
            Some(FceVersion::Fce4M.file_size_i64(10, 20))
        );
    }
}
