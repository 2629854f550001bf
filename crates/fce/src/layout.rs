//! Byte layout of the two FCE header formats and the tables that follow them.
//!
//! All offsets are absolute positions in the file. Table offsets stored in the header
//! are relative to the end of the header.

use static_assertions::const_assert_eq;

pub const FCE3_HEADER_SIZE: usize = 0x1F04;
pub const FCE4_HEADER_SIZE: usize = 0x2038;

/// Width of a name field, NUL terminator included.
pub const NAME_FIELD_LEN: usize = 64;
pub const TRIANGLE_RECORD_LEN: usize = 56;
/// Written into the three unused words of every triangle record.
pub const TRIANGLE_PADDING: i32 = 0xFF00;

pub const VECTOR_LEN: usize = 12;

/// Field positions of the FCE3 header.
pub mod fce3 {
    pub const UNKNOWN1: usize = 0x0000;
    pub const NUM_TRIANGLES: usize = 0x0004;
    pub const NUM_VERTICES: usize = 0x0008;
    pub const NUM_ARTS: usize = 0x000C;
    pub const TABLE_OFFSETS: usize = 0x0010;
    pub const HALF_SIZE: usize = 0x0028;
    pub const NUM_DUMMIES: usize = 0x0034;
    pub const DUMMIES: usize = 0x0038;
    pub const NUM_PARTS: usize = 0x00F8;
    pub const PART_POSITIONS: usize = 0x00FC;
    pub const PART_FIRST_VERTICES: usize = 0x03FC;
    pub const PART_NUM_VERTICES: usize = 0x04FC;
    pub const PART_FIRST_TRIANGLES: usize = 0x05FC;
    pub const PART_NUM_TRIANGLES: usize = 0x06FC;
    pub const NUM_PRIMARY_COLORS: usize = 0x07FC;
    pub const PRIMARY_COLORS: usize = 0x0800;
    pub const NUM_SECONDARY_COLORS: usize = 0x0900;
    pub const SECONDARY_COLORS: usize = 0x0904;
    pub const DUMMY_NAMES: usize = 0x0A04;
    pub const PART_NAMES: usize = 0x0E04;
    pub const UNKNOWN2: usize = 0x1E04;
    /// FCE3 colors store each channel as a 4-byte integer.
    pub const COLOR_LEN: usize = 16;
}

/// Field positions of the FCE4 and FCE4M header.
pub mod fce4 {
    pub const VERSION: usize = 0x0000;
    pub const UNKNOWN1: usize = 0x0004;
    pub const NUM_TRIANGLES: usize = 0x0008;
    pub const NUM_VERTICES: usize = 0x000C;
    pub const NUM_ARTS: usize = 0x0010;
    pub const TABLE_OFFSETS: usize = 0x0014;
    pub const HALF_SIZE: usize = 0x004C;
    pub const NUM_DUMMIES: usize = 0x0058;
    pub const DUMMIES: usize = 0x005C;
    pub const NUM_PARTS: usize = 0x011C;
    pub const PART_POSITIONS: usize = 0x0120;
    pub const PART_FIRST_VERTICES: usize = 0x0420;
    pub const PART_NUM_VERTICES: usize = 0x0520;
    pub const PART_FIRST_TRIANGLES: usize = 0x0620;
    pub const PART_NUM_TRIANGLES: usize = 0x0720;
    pub const NUM_COLORS: usize = 0x0820;
    /// Primary, interior, secondary and driver tables, in that order.
    pub const COLORS: [usize; 4] = [0x0824, 0x0864, 0x08A4, 0x08E4];
    pub const UNKNOWN3: usize = 0x0924;
    pub const UNKNOWN2: usize = 0x0928;
    pub const DUMMY_NAMES: usize = 0x0A28;
    pub const PART_NAMES: usize = 0x0E28;
    pub const UNKNOWN4: usize = 0x1E28;
    /// FCE4 colors store one byte per channel.
    pub const COLOR_LEN: usize = 4;
}

const_assert_eq!(fce3::UNKNOWN2 + 256, FCE3_HEADER_SIZE);
const_assert_eq!(fce4::UNKNOWN4 + 528, FCE4_HEADER_SIZE);
const_assert_eq!(fce3::PART_NAMES + 64 * NAME_FIELD_LEN, fce3::UNKNOWN2);
const_assert_eq!(fce4::PART_NAMES + 64 * NAME_FIELD_LEN, fce4::UNKNOWN4);
const_assert_eq!(fce4::COLORS[3] + 16 * fce4::COLOR_LEN, fce4::UNKNOWN3);
const_assert_eq!(fce4::UNKNOWN2 + 256, fce4::DUMMY_NAMES);
const_assert_eq!(fce3::SECONDARY_COLORS + 16 * fce3::COLOR_LEN, fce3::DUMMY_NAMES);

/// Data tables following the header, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Vertices,
    Normals,
    Triangles,
    Reserve1,
    Reserve2,
    Reserve3,
    UndamagedVertices,
    UndamagedNormals,
    DamagedVertices,
    DamagedNormals,
    Reserve4,
    Animation,
    Reserve5,
    Reserve6,
}

impl Table {
    pub const FCE3: [Table; 6] = [
        Table::Vertices,
        Table::Normals,
        Table::Triangles,
        Table::Reserve1,
        Table::Reserve2,
        Table::Reserve3,
    ];

    pub const FCE4: [Table; 14] = [
        Table::Vertices,
        Table::Normals,
        Table::Triangles,
        Table::Reserve1,
        Table::Reserve2,
        Table::Reserve3,
        Table::UndamagedVertices,
        Table::UndamagedNormals,
        Table::DamagedVertices,
        Table::DamagedNormals,
        Table::Reserve4,
        Table::Animation,
        Table::Reserve5,
        Table::Reserve6,
    ];

    /// Position of this table's offset in the header's offset block.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Table::Vertices => "vertex table",
            Table::Normals => "normal table",
            Table::Triangles => "triangle table",
            Table::Reserve1 => "reserve1 table",
            Table::Reserve2 => "reserve2 table",
            Table::Reserve3 => "reserve3 table",
            Table::UndamagedVertices => "undamaged vertex table",
            Table::UndamagedNormals => "undamaged normal table",
            Table::DamagedVertices => "damaged vertex table",
            Table::DamagedNormals => "damaged normal table",
            Table::Reserve4 => "reserve4 table",
            Table::Animation => "animation table",
            Table::Reserve5 => "reserve5 table",
            Table::Reserve6 => "reserve6 table",
        }
    }

    /// Bytes per vertex and bytes per triangle. Only reserve6 of FCE4M has both.
    pub fn widths(self, fce4m: bool) -> (i64, i64) {
        match self {
            Table::Triangles => (0, 56),
            Table::Reserve1 => (32, 0),
            Table::Reserve4 | Table::Animation | Table::Reserve5 => (4, 0),
            Table::Reserve6 => (if fce4m { 1 } else { 0 }, 12),
            _ => (12, 0),
        }
    }

    /// Length in bytes of this table for the given counts.
    pub fn byte_len(self, fce4m: bool, num_vertices: i64, num_triangles: i64) -> i64 {
        let (per_vertex, per_triangle) = self.widths(fce4m);
        per_vertex * num_vertices + per_triangle * num_triangles
    }
}

const_assert_eq!(Table::Reserve6 as usize, 13);
