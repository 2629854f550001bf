use crate::{
    error::{FceError, FceResult},
    layout::{fce3, fce4, Table, FCE4_HEADER_SIZE, NAME_FIELD_LEN},
    version::{fce_version, FceVersion},
};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use fcekit_mesh::{Color, Vector3, MAX_COLORS, MAX_DUMMIES, MAX_NAME_LEN, MAX_PARTS, ZERO};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

/// Where one part's vertices and triangles live in the file tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartRange {
    pub first_vertex: i32,
    pub num_vertices: i32,
    pub first_triangle: i32,
    pub num_triangles: i32,
}

/// The fixed-size header of any FCE variant, with every slot of every fixed table.
///
/// Counts are kept exactly as stored so that validation can inspect out-of-range
/// values. FCE3 has separate primary and secondary color counts and no interior or
/// driver tables; FCE4 has a single count for all four tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub version: FceVersion,
    pub num_triangles: i32,
    pub num_vertices: i32,
    pub num_arts: i32,
    /// Indexed by [`Table::index`]. FCE3 only uses the first six.
    pub offsets: [i32; 14],
    pub half_size: Vector3,
    pub num_dummies: i32,
    pub dummies: [Vector3; MAX_DUMMIES],
    pub num_parts: i32,
    pub part_positions: Vec<Vector3>,
    pub parts: Vec<PartRange>,
    pub num_colors: i32,
    pub num_secondary_colors: i32,
    /// Primary, interior, secondary and driver, in [`fcekit_mesh::ColorTable::ALL`] order.
    pub colors: [[Color; MAX_COLORS]; 4],
    pub dummy_names: Vec<String>,
    pub part_names: Vec<String>,
}

impl Header {
    /// An all-zero header for `version`.
    pub fn new(version: FceVersion) -> Self {
        Header {
            version,
            num_triangles: 0,
            num_vertices: 0,
            num_arts: 0,
            offsets: [0; 14],
            half_size: ZERO,
            num_dummies: 0,
            dummies: [ZERO; MAX_DUMMIES],
            num_parts: 0,
            part_positions: vec![ZERO; MAX_PARTS],
            parts: vec![PartRange::default(); MAX_PARTS],
            num_colors: 0,
            num_secondary_colors: 0,
            colors: [[Color::default(); MAX_COLORS]; 4],
            dummy_names: vec![String::new(); MAX_DUMMIES],
            part_names: vec![String::new(); MAX_PARTS],
        }
    }

    /// Reads the header at the start of `buf`.
    ///
    /// Only the buffer length is checked; field values are left for
    /// [`crate::validate_fce`] to judge.
    pub fn parse(buf: &[u8]) -> FceResult<Header> {
        let version = fce_version(buf)?;
        if version != FceVersion::Fce3 && buf.len() < FCE4_HEADER_SIZE {
            return Err(FceError::format(format!(
                "{} buffer of {} bytes is shorter than the {} byte header",
                version,
                buf.len(),
                FCE4_HEADER_SIZE
            )));
        }
        let mut c = Cursor::new(buf);
        let header = match version {
            FceVersion::Fce3 => read_fce3(&mut c)?,
            FceVersion::Fce4 | FceVersion::Fce4M => read_fce4(&mut c, version)?,
        };
        Ok(header)
    }

    /// Writes every header field. Bytes not covered by a field are left untouched, so
    /// the target should be zero-filled.
    pub fn write<W: Write + Seek>(&self, w: &mut W) -> std::io::Result<()> {
        match self.version {
            FceVersion::Fce3 => write_fce3(self, w),
            FceVersion::Fce4 | FceVersion::Fce4M => write_fce4(self, w),
        }
    }

    pub fn offset(&self, table: Table) -> i32 {
        self.offsets[table.index()]
    }

    /// Live part ranges, clamped to the 64 slots the header has room for.
    pub fn part_ranges(&self) -> &[PartRange] {
        let n = (self.num_parts.max(0) as usize).min(MAX_PARTS);
        &self.parts[..n]
    }
}

struct Fields {
    num_triangles: usize,
    num_vertices: usize,
    num_arts: usize,
    table_offsets: usize,
    table_count: usize,
    half_size: usize,
    num_dummies: usize,
    dummies: usize,
    num_parts: usize,
    part_positions: usize,
    part_tables: [usize; 4],
    dummy_names: usize,
    part_names: usize,
}

const FCE3_FIELDS: Fields = Fields {
    num_triangles: fce3::NUM_TRIANGLES,
    num_vertices: fce3::NUM_VERTICES,
    num_arts: fce3::NUM_ARTS,
    table_offsets: fce3::TABLE_OFFSETS,
    table_count: Table::FCE3.len(),
    half_size: fce3::HALF_SIZE,
    num_dummies: fce3::NUM_DUMMIES,
    dummies: fce3::DUMMIES,
    num_parts: fce3::NUM_PARTS,
    part_positions: fce3::PART_POSITIONS,
    part_tables: [
        fce3::PART_FIRST_VERTICES,
        fce3::PART_NUM_VERTICES,
        fce3::PART_FIRST_TRIANGLES,
        fce3::PART_NUM_TRIANGLES,
    ],
    dummy_names: fce3::DUMMY_NAMES,
    part_names: fce3::PART_NAMES,
};

const FCE4_FIELDS: Fields = Fields {
    num_triangles: fce4::NUM_TRIANGLES,
    num_vertices: fce4::NUM_VERTICES,
    num_arts: fce4::NUM_ARTS,
    table_offsets: fce4::TABLE_OFFSETS,
    table_count: Table::FCE4.len(),
    half_size: fce4::HALF_SIZE,
    num_dummies: fce4::NUM_DUMMIES,
    dummies: fce4::DUMMIES,
    num_parts: fce4::NUM_PARTS,
    part_positions: fce4::PART_POSITIONS,
    part_tables: [
        fce4::PART_FIRST_VERTICES,
        fce4::PART_NUM_VERTICES,
        fce4::PART_FIRST_TRIANGLES,
        fce4::PART_NUM_TRIANGLES,
    ],
    dummy_names: fce4::DUMMY_NAMES,
    part_names: fce4::PART_NAMES,
};

fn read_common<R: Read + Seek>(f: &mut R, fields: &Fields, h: &mut Header) -> std::io::Result<()> {
    f.seek(SeekFrom::Start(fields.num_triangles as u64))?;
    h.num_triangles = f.read_i32::<LittleEndian>()?;
    f.seek(SeekFrom::Start(fields.num_vertices as u64))?;
    h.num_vertices = f.read_i32::<LittleEndian>()?;
    f.seek(SeekFrom::Start(fields.num_arts as u64))?;
    h.num_arts = f.read_i32::<LittleEndian>()?;

    f.seek(SeekFrom::Start(fields.table_offsets as u64))?;
    for offset in h.offsets.iter_mut().take(fields.table_count) {
        *offset = f.read_i32::<LittleEndian>()?;
    }

    f.seek(SeekFrom::Start(fields.half_size as u64))?;
    h.half_size = read_vector(f)?;

    f.seek(SeekFrom::Start(fields.num_dummies as u64))?;
    h.num_dummies = f.read_i32::<LittleEndian>()?;
    f.seek(SeekFrom::Start(fields.dummies as u64))?;
    for dummy in h.dummies.iter_mut() {
        *dummy = read_vector(f)?;
    }

    f.seek(SeekFrom::Start(fields.num_parts as u64))?;
    h.num_parts = f.read_i32::<LittleEndian>()?;
    f.seek(SeekFrom::Start(fields.part_positions as u64))?;
    for position in h.part_positions.iter_mut() {
        *position = read_vector(f)?;
    }

    // Four parallel tables of 64 i32 each.
    for (table, start) in fields.part_tables.into_iter().enumerate() {
        f.seek(SeekFrom::Start(start as u64))?;
        for part in h.parts.iter_mut() {
            let value = f.read_i32::<LittleEndian>()?;
            match table {
                0 => part.first_vertex = value,
                1 => part.num_vertices = value,
                2 => part.first_triangle = value,
                _ => part.num_triangles = value,
            }
        }
    }

    f.seek(SeekFrom::Start(fields.dummy_names as u64))?;
    for name in h.dummy_names.iter_mut() {
        *name = read_name(f)?;
    }
    f.seek(SeekFrom::Start(fields.part_names as u64))?;
    for name in h.part_names.iter_mut() {
        *name = read_name(f)?;
    }
    Ok(())
}

fn read_fce3<R: Read + Seek>(f: &mut R) -> std::io::Result<Header> {
    let mut h = Header::new(FceVersion::Fce3);
    read_common(f, &FCE3_FIELDS, &mut h)?;

    f.seek(SeekFrom::Start(fce3::NUM_PRIMARY_COLORS as u64))?;
    h.num_colors = f.read_i32::<LittleEndian>()?;
    f.seek(SeekFrom::Start(fce3::PRIMARY_COLORS as u64))?;
    for color in h.colors[0].iter_mut() {
        *color = read_wide_color(f)?;
    }
    f.seek(SeekFrom::Start(fce3::NUM_SECONDARY_COLORS as u64))?;
    h.num_secondary_colors = f.read_i32::<LittleEndian>()?;
    f.seek(SeekFrom::Start(fce3::SECONDARY_COLORS as u64))?;
    for color in h.colors[2].iter_mut() {
        *color = read_wide_color(f)?;
    }
    // FCE3 has no interior or driver tables; they mirror secondary and primary.
    h.colors[1] = h.colors[2];
    h.colors[3] = h.colors[0];
    Ok(h)
}

fn read_fce4<R: Read + Seek>(f: &mut R, version: FceVersion) -> std::io::Result<Header> {
    let mut h = Header::new(version);
    read_common(f, &FCE4_FIELDS, &mut h)?;

    f.seek(SeekFrom::Start(fce4::NUM_COLORS as u64))?;
    h.num_colors = f.read_i32::<LittleEndian>()?;
    h.num_secondary_colors = h.num_colors;
    for (table, start) in h.colors.iter_mut().zip(fce4::COLORS) {
        f.seek(SeekFrom::Start(start as u64))?;
        for color in table.iter_mut() {
            let mut rgba = [0u8; 4];
            f.read_exact(&mut rgba)?;
            *color = Color::new(rgba[0], rgba[1], rgba[2], rgba[3]);
        }
    }
    Ok(h)
}

fn write_common<W: Write + Seek>(h: &Header, fields: &Fields, f: &mut W) -> std::io::Result<()> {
    f.seek(SeekFrom::Start(fields.num_triangles as u64))?;
    f.write_i32::<LittleEndian>(h.num_triangles)?;
    f.seek(SeekFrom::Start(fields.num_vertices as u64))?;
    f.write_i32::<LittleEndian>(h.num_vertices)?;
    f.seek(SeekFrom::Start(fields.num_arts as u64))?;
    f.write_i32::<LittleEndian>(h.num_arts)?;

    f.seek(SeekFrom::Start(fields.table_offsets as u64))?;
    for &offset in h.offsets.iter().take(fields.table_count) {
        f.write_i32::<LittleEndian>(offset)?;
    }

    f.seek(SeekFrom::Start(fields.half_size as u64))?;
    write_vector(f, h.half_size)?;

    f.seek(SeekFrom::Start(fields.num_dummies as u64))?;
    f.write_i32::<LittleEndian>(h.num_dummies)?;
    f.seek(SeekFrom::Start(fields.dummies as u64))?;
    for &dummy in h.dummies.iter() {
        write_vector(f, dummy)?;
    }

    f.seek(SeekFrom::Start(fields.num_parts as u64))?;
    f.write_i32::<LittleEndian>(h.num_parts)?;
    f.seek(SeekFrom::Start(fields.part_positions as u64))?;
    for &position in h.part_positions.iter() {
        write_vector(f, position)?;
    }

    let columns: [fn(&PartRange) -> i32; 4] = [
        |p| p.first_vertex,
        |p| p.num_vertices,
        |p| p.first_triangle,
        |p| p.num_triangles,
    ];
    for (start, column) in fields.part_tables.into_iter().zip(columns) {
        f.seek(SeekFrom::Start(start as u64))?;
        for part in h.parts.iter() {
            f.write_i32::<LittleEndian>(column(part))?;
        }
    }

    f.seek(SeekFrom::Start(fields.dummy_names as u64))?;
    for name in h.dummy_names.iter() {
        write_name(f, name)?;
    }
    f.seek(SeekFrom::Start(fields.part_names as u64))?;
    for name in h.part_names.iter() {
        write_name(f, name)?;
    }
    Ok(())
}

fn write_fce3<W: Write + Seek>(h: &Header, f: &mut W) -> std::io::Result<()> {
    f.seek(SeekFrom::Start(fce3::UNKNOWN1 as u64))?;
    f.write_i32::<LittleEndian>(0)?;
    write_common(h, &FCE3_FIELDS, f)?;

    f.seek(SeekFrom::Start(fce3::NUM_PRIMARY_COLORS as u64))?;
    f.write_i32::<LittleEndian>(h.num_colors)?;
    f.seek(SeekFrom::Start(fce3::PRIMARY_COLORS as u64))?;
    for &color in h.colors[0].iter() {
        write_wide_color(f, color)?;
    }
    f.seek(SeekFrom::Start(fce3::NUM_SECONDARY_COLORS as u64))?;
    f.write_i32::<LittleEndian>(h.num_secondary_colors)?;
    f.seek(SeekFrom::Start(fce3::SECONDARY_COLORS as u64))?;
    for &color in h.colors[2].iter() {
        write_wide_color(f, color)?;
    }
    Ok(())
}

fn write_fce4<W: Write + Seek>(h: &Header, f: &mut W) -> std::io::Result<()> {
    f.seek(SeekFrom::Start(fce4::VERSION as u64))?;
    f.write_i32::<LittleEndian>(h.version.tag())?;
    f.seek(SeekFrom::Start(fce4::UNKNOWN1 as u64))?;
    f.write_i32::<LittleEndian>(0)?;
    write_common(h, &FCE4_FIELDS, f)?;

    f.seek(SeekFrom::Start(fce4::UNKNOWN3 as u64))?;
    f.write_all(&[0u8; fce4::UNKNOWN2 - fce4::UNKNOWN3])?;
    f.seek(SeekFrom::Start(fce4::UNKNOWN2 as u64))?;
    f.write_all(&[0u8; fce4::DUMMY_NAMES - fce4::UNKNOWN2])?;

    f.seek(SeekFrom::Start(fce4::NUM_COLORS as u64))?;
    f.write_i32::<LittleEndian>(h.num_colors)?;
    for (table, start) in h.colors.iter().zip(fce4::COLORS) {
        f.seek(SeekFrom::Start(start as u64))?;
        for color in table.iter() {
            f.write_all(&[
                color.hue,
                color.saturation,
                color.brightness,
                color.transparency,
            ])?;
        }
    }
    Ok(())
}

pub(crate) fn read_vector<R: Read>(f: &mut R) -> std::io::Result<Vector3> {
    Ok(Vector3 {
        x: f.read_f32::<LittleEndian>()?,
        y: f.read_f32::<LittleEndian>()?,
        z: f.read_f32::<LittleEndian>()?,
    })
}

pub(crate) fn write_vector<W: Write>(f: &mut W, v: Vector3) -> std::io::Result<()> {
    f.write_f32::<LittleEndian>(v.x)?;
    f.write_f32::<LittleEndian>(v.y)?;
    f.write_f32::<LittleEndian>(v.z)
}

// Each channel is a little-endian i32 of which only the low byte is meaningful.
fn read_wide_color<R: Read>(f: &mut R) -> std::io::Result<Color> {
    let mut channel = || f.read_i32::<LittleEndian>().map(|c| c as u8);
    Ok(Color {
        hue: channel()?,
        saturation: channel()?,
        brightness: channel()?,
        transparency: channel()?,
    })
}

fn write_wide_color<W: Write>(f: &mut W, color: Color) -> std::io::Result<()> {
    for channel in [
        color.hue,
        color.saturation,
        color.brightness,
        color.transparency,
    ] {
        f.write_i32::<LittleEndian>(i32::from(channel))?;
    }
    Ok(())
}

/// Reads a 64-byte name field. Text ends at the first NUL; bytes map to chars one to one.
fn read_name<R: Read>(f: &mut R) -> std::io::Result<String> {
    let mut field = [0u8; NAME_FIELD_LEN];
    f.read_exact(&mut field)?;
    Ok(field
        .iter()
        .take(MAX_NAME_LEN)
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect())
}

/// Writes `name` NUL-padded into a 64-byte field. Chars outside Latin-1 become `?`.
fn write_name<W: Write>(f: &mut W, name: &str) -> std::io::Result<()> {
    let mut field = [0u8; NAME_FIELD_LEN];
    for (byte, c) in field.iter_mut().zip(name.chars().take(MAX_NAME_LEN)) {
        *byte = u8::try_from(u32::from(c)).unwrap_or(b'?');
    }
    f.write_all(&field)
}
