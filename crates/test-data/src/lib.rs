//! Hand-assembled FCE files for tests.
//!
//! Buffers are laid out the way a conforming writer lays them out: tables in file order
//! with no gaps, NumArts of 1, unknown fields zeroed and reserved tables zero-filled.
//! HalfSize is computed over the first 12 parts, so a fixture re-encodes byte for byte
//! as long as those are exactly the body parts for the variant (FCE3: at most 5 parts,
//! FCE4: high-body names such as `:HB`, FCE4M: the first 12 parts).

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Cursor, Seek, SeekFrom, Write};

pub const FCE4_TAG: i32 = 0x0010_1014;
pub const FCE4M_TAG: i32 = 0x0010_1015;

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureTriangle {
    pub tex_page: i32,
    /// Part-local vertex references, as stored in the file.
    pub vertices: [i32; 3],
    pub flag: i32,
    pub u: [f32; 3],
    /// Stored as-is; FCE4 readers flip it.
    pub v: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixturePart {
    pub name: String,
    pub position: [f32; 3],
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Only written to FCE4 and FCE4M files.
    pub damaged_vertices: Vec<[f32; 3]>,
    pub damaged_normals: Vec<[f32; 3]>,
    pub animation: Vec<i32>,
    pub triangles: Vec<FixtureTriangle>,
}

impl FixturePart {
    /// A unit octahedron: 6 vertices, 8 triangles. Texture coordinates are multiples of
    /// 0.25 so that flipping V is exact.
    pub fn diamond(name: &str, position: [f32; 3]) -> Self {
        let vertices = vec![
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ];
        let faces = [
            [2, 5, 0],
            [2, 1, 5],
            [2, 4, 1],
            [2, 0, 4],
            [3, 0, 5],
            [3, 5, 1],
            [3, 1, 4],
            [3, 4, 0],
        ];
        let triangles = faces
            .iter()
            .enumerate()
            .map(|(i, &vertices)| FixtureTriangle {
                tex_page: (i % 2) as i32,
                vertices,
                flag: if i < 4 { 0x2 } else { 0 },
                u: [0.0, 0.5, 1.0],
                v: [0.25, 0.75, 1.0],
            })
            .collect();
        FixturePart {
            name: name.to_owned(),
            position,
            normals: vertices.clone(),
            damaged_vertices: vertices.clone(),
            damaged_normals: vertices.clone(),
            animation: vec![0; vertices.len()],
            vertices,
            triangles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fixture {
    pub parts: Vec<FixturePart>,
    pub dummies: Vec<(String, [f32; 3])>,
    /// FCE3 files get these as both primary and secondary colors, FCE4 files in all
    /// four tables.
    pub colors: Vec<[u8; 4]>,
}

impl Fixture {
    pub fn new(parts: Vec<FixturePart>) -> Self {
        Fixture {
            parts,
            ..Default::default()
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.parts.iter().map(|p| p.vertices.len()).sum()
    }

    pub fn num_triangles(&self) -> usize {
        self.parts.iter().map(|p| p.triangles.len()).sum()
    }

    pub fn fce3(&self) -> std::io::Result<Vec<u8>> {
        self.build(Variant::Fce3)
    }

    pub fn fce4(&self) -> std::io::Result<Vec<u8>> {
        self.build(Variant::Fce4)
    }

    pub fn fce4m(&self) -> std::io::Result<Vec<u8>> {
        self.build(Variant::Fce4M)
    }

    /// Half extents over all parts, in world coordinates.
    pub fn half_size(&self) -> [f32; 3] {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        let mut any = false;
        for part in self.parts.iter().take(12) {
            for v in &part.vertices {
                for axis in 0..3 {
                    let world = v[axis] + part.position[axis];
                    min[axis] = min[axis].min(world);
                    max[axis] = max[axis].max(world);
                }
                any = true;
            }
        }
        if !any {
            return [0.0; 3];
        }
        [
            0.5 * (max[0] - min[0]),
            min[1].abs() - 0.02,
            0.5 * (max[2] - min[2]),
        ]
    }

    fn build(&self, variant: Variant) -> std::io::Result<Vec<u8>> {
        let nv = self.num_vertices();
        let nt = self.num_triangles();
        let l = variant.layout();
        let tables = variant.tables(nv, nt);
        let size = l.header_size + tables.iter().map(|t| t.len).sum::<usize>();
        let mut buf = vec![0u8; size];
        let mut f = Cursor::new(&mut buf[..]);

        f.seek(SeekFrom::Start(0))?;
        f.write_i32::<LittleEndian>(variant.tag())?;
        at(&mut f, l.num_triangles)?.write_i32::<LittleEndian>(nt as i32)?;
        at(&mut f, l.num_vertices)?.write_i32::<LittleEndian>(nv as i32)?;
        at(&mut f, l.num_arts)?.write_i32::<LittleEndian>(1)?;
        at(&mut f, l.table_offsets)?;
        let mut offset = 0;
        for table in &tables {
            f.write_i32::<LittleEndian>(offset as i32)?;
            offset += table.len;
        }
        at(&mut f, l.half_size)?;
        write_vec3(&mut f, self.half_size())?;

        at(&mut f, l.num_dummies)?.write_i32::<LittleEndian>(self.dummies.len() as i32)?;
        at(&mut f, l.dummies)?;
        for (_, position) in &self.dummies {
            write_vec3(&mut f, *position)?;
        }
        at(&mut f, l.dummy_names)?;
        for (name, _) in &self.dummies {
            write_name(&mut f, name)?;
        }

        at(&mut f, l.num_parts)?.write_i32::<LittleEndian>(self.parts.len() as i32)?;
        at(&mut f, l.part_positions)?;
        for part in &self.parts {
            write_vec3(&mut f, part.position)?;
        }
        at(&mut f, l.part_names)?;
        for part in &self.parts {
            write_name(&mut f, &part.name)?;
        }
        let mut first_vertex = 0;
        let mut first_triangle = 0;
        for (i, part) in self.parts.iter().enumerate() {
            let columns = [
                first_vertex,
                part.vertices.len(),
                first_triangle,
                part.triangles.len(),
            ];
            for (start, value) in l.part_tables.iter().zip(columns) {
                at(&mut f, start + 4 * i)?.write_i32::<LittleEndian>(value as i32)?;
            }
            first_vertex += part.vertices.len();
            first_triangle += part.triangles.len();
        }

        match variant {
            Variant::Fce3 => {
                for (count, start) in [(0x07FC, 0x0800), (0x0900, 0x0904)] {
                    at(&mut f, count)?.write_i32::<LittleEndian>(self.colors.len() as i32)?;
                    at(&mut f, start)?;
                    for color in &self.colors {
                        for &channel in color {
                            f.write_i32::<LittleEndian>(i32::from(channel))?;
                        }
                    }
                }
            }
            Variant::Fce4 | Variant::Fce4M => {
                at(&mut f, 0x0820)?.write_i32::<LittleEndian>(self.colors.len() as i32)?;
                for start in [0x0824, 0x0864, 0x08A4, 0x08E4] {
                    at(&mut f, start)?;
                    for color in &self.colors {
                        f.write_all(color)?;
                    }
                }
            }
        }

        let data = l.header_size;
        let table_start = |name: &str| {
            let mut start = data;
            for table in &tables {
                if table.name == name {
                    return start;
                }
                start += table.len;
            }
            start
        };
        let mut vertex = 0;
        let mut triangle = 0;
        for part in &self.parts {
            for (i, position) in part.vertices.iter().enumerate() {
                let at_vertex = |name: &str, width: usize| table_start(name) + width * (vertex + i);
                at(&mut f, at_vertex("vertices", 12))?;
                write_vec3(&mut f, *position)?;
                at(&mut f, at_vertex("normals", 12))?;
                write_vec3(&mut f, part.normals[i])?;
                if variant != Variant::Fce3 {
                    at(&mut f, at_vertex("undamaged vertices", 12))?;
                    write_vec3(&mut f, *position)?;
                    at(&mut f, at_vertex("undamaged normals", 12))?;
                    write_vec3(&mut f, part.normals[i])?;
                    at(&mut f, at_vertex("damaged vertices", 12))?;
                    write_vec3(&mut f, part.damaged_vertices[i])?;
                    at(&mut f, at_vertex("damaged normals", 12))?;
                    write_vec3(&mut f, part.damaged_normals[i])?;
                    at(&mut f, at_vertex("animation", 4))?
                        .write_i32::<LittleEndian>(part.animation[i])?;
                }
            }
            for (i, t) in part.triangles.iter().enumerate() {
                at(&mut f, table_start("triangles") + 56 * (triangle + i))?;
                f.write_i32::<LittleEndian>(t.tex_page)?;
                for &v in &t.vertices {
                    f.write_i32::<LittleEndian>(v)?;
                }
                for _ in 0..3 {
                    f.write_i32::<LittleEndian>(0xFF00)?;
                }
                f.write_i32::<LittleEndian>(t.flag)?;
                for &u in &t.u {
                    f.write_f32::<LittleEndian>(u)?;
                }
                for &v in &t.v {
                    f.write_f32::<LittleEndian>(v)?;
                }
            }
            vertex += part.vertices.len();
            triangle += part.triangles.len();
        }
        Ok(buf)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Fce3,
    Fce4,
    Fce4M,
}

struct Layout {
    header_size: usize,
    num_triangles: usize,
    num_vertices: usize,
    num_arts: usize,
    table_offsets: usize,
    half_size: usize,
    num_dummies: usize,
    dummies: usize,
    num_parts: usize,
    part_positions: usize,
    part_tables: [usize; 4],
    dummy_names: usize,
    part_names: usize,
}

struct TableSpec {
    name: &'static str,
    len: usize,
}

impl Variant {
    fn tag(self) -> i32 {
        match self {
            Variant::Fce3 => 0,
            Variant::Fce4 => FCE4_TAG,
            Variant::Fce4M => FCE4M_TAG,
        }
    }

    fn layout(self) -> Layout {
        match self {
            Variant::Fce3 => Layout {
                header_size: 0x1F04,
                num_triangles: 0x0004,
                num_vertices: 0x0008,
                num_arts: 0x000C,
                table_offsets: 0x0010,
                half_size: 0x0028,
                num_dummies: 0x0034,
                dummies: 0x0038,
                num_parts: 0x00F8,
                part_positions: 0x00FC,
                part_tables: [0x03FC, 0x04FC, 0x05FC, 0x06FC],
                dummy_names: 0x0A04,
                part_names: 0x0E04,
            },
            Variant::Fce4 | Variant::Fce4M => Layout {
                header_size: 0x2038,
                num_triangles: 0x0008,
                num_vertices: 0x000C,
                num_arts: 0x0010,
                table_offsets: 0x0014,
                half_size: 0x004C,
                num_dummies: 0x0058,
                dummies: 0x005C,
                num_parts: 0x011C,
                part_positions: 0x0120,
                part_tables: [0x0420, 0x0520, 0x0620, 0x0720],
                dummy_names: 0x0A28,
                part_names: 0x0E28,
            },
        }
    }

    fn tables(self, nv: usize, nt: usize) -> Vec<TableSpec> {
        let spec = |name, len| TableSpec { name, len };
        let mut tables = vec![
            spec("vertices", 12 * nv),
            spec("normals", 12 * nv),
            spec("triangles", 56 * nt),
            spec("reserve1", 32 * nv),
            spec("reserve2", 12 * nv),
            spec("reserve3", 12 * nv),
        ];
        if self != Variant::Fce3 {
            let reserve6 = 12 * nt + if self == Variant::Fce4M { nv } else { 0 };
            tables.extend([
                spec("undamaged vertices", 12 * nv),
                spec("undamaged normals", 12 * nv),
                spec("damaged vertices", 12 * nv),
                spec("damaged normals", 12 * nv),
                spec("reserve4", 4 * nv),
                spec("animation", 4 * nv),
                spec("reserve5", 4 * nv),
                spec("reserve6", reserve6),
            ]);
        }
        tables
    }
}

fn at<'a, 'b>(
    f: &'a mut Cursor<&'b mut [u8]>,
    pos: usize,
) -> std::io::Result<&'a mut Cursor<&'b mut [u8]>> {
    f.seek(SeekFrom::Start(pos as u64))?;
    Ok(f)
}

fn write_vec3<W: Write>(f: &mut W, v: [f32; 3]) -> std::io::Result<()> {
    for x in v {
        f.write_f32::<LittleEndian>(x)?;
    }
    Ok(())
}

fn write_name<W: Write>(f: &mut W, name: &str) -> std::io::Result<()> {
    let mut field = [0u8; 64];
    for (byte, c) in field.iter_mut().zip(name.bytes().take(63)) {
        *byte = c;
    }
    f.write_all(&field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_counts() {
        let fixture = Fixture::new(vec![FixturePart::diamond(":HB", [0.0; 3])]);
        assert_eq!(0x1F04 + 80 * 6 + 56 * 8, fixture.fce3().unwrap().len());
        assert_eq!(0x2038 + 140 * 6 + 68 * 8, fixture.fce4().unwrap().len());
        assert_eq!(0x2038 + 141 * 6 + 68 * 8, fixture.fce4m().unwrap().len());
    }

    #[test]
    fn empty_fixture_is_bare_header() {
        let buf = Fixture::default().fce3().unwrap();
        assert_eq!(0x1F04, buf.len());
        assert_eq!(1, buf[0x0C]);
    }
}
