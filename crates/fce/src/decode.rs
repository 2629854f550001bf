use crate::{
    error::{FceError, FceResult},
    header::{read_vector, Header, PartRange},
    layout::{Table, TRIANGLE_RECORD_LEN, VECTOR_LEN},
    validate::validate_header,
    version::FceVersion,
    warning::Warnings,
};
use byteorder::{LittleEndian, ReadBytesExt};
use fcekit_mesh::{
    Color, ColorTable, Dummy, Mesh, PartGeometry, Triangle, Vector3, Vertex, MAX_COLORS,
};
use std::io::{Cursor, Read, Seek, SeekFrom};

/// Decodes an FCE buffer of any variant into a new mesh.
///
/// The buffer is fully validated first; nothing is built for an invalid buffer.
/// Warnings found along the way are logged and returned.
pub fn decode_fce(buf: &[u8]) -> FceResult<(Mesh, Warnings)> {
    let header = Header::parse(buf)?;
    let warnings = validate_header(&header, buf.len())?;
    let mesh = build_mesh(&header, buf)?;
    log::debug!(
        "decoded {}: {} parts, {} triangles, {} vertices",
        header.version,
        mesh.num_parts(),
        mesh.num_triangles(),
        mesh.num_vertices()
    );
    Ok((mesh, warnings))
}

fn build_mesh(header: &Header, buf: &[u8]) -> FceResult<Mesh> {
    let ranges = header.part_ranges();
    let mut mesh = Mesh::with_capacity(
        2 * ranges.len(),
        header.num_triangles.max(0) as usize,
        header.num_vertices.max(0) as usize,
    )?;
    mesh.set_num_arts(header.num_arts);

    let mut tables = Tables {
        header,
        c: Cursor::new(buf),
    };
    for (order, range) in ranges.iter().enumerate() {
        let geometry = PartGeometry {
            name: header.part_names[order].clone(),
            position: header.part_positions[order],
            vertices: tables.part_vertices(range)?,
            triangles: tables.part_triangles(order, range)?,
        };
        mesh.add_part(geometry)?;
    }

    let num_dummies = header.num_dummies.max(0) as usize;
    mesh.set_dummies(
        header
            .dummies
            .iter()
            .zip(header.dummy_names.iter())
            .take(num_dummies)
            .map(|(&position, name)| Dummy {
                name: name.clone(),
                position,
            })
            .collect(),
    )?;

    let (num_primary, num_secondary) = match header.version {
        FceVersion::Fce3 => (header.num_colors, header.num_secondary_colors),
        FceVersion::Fce4 | FceVersion::Fce4M => (header.num_colors, header.num_colors),
    };
    let clamp = |n: i32| (n.max(0) as usize).min(MAX_COLORS);
    for (i, table) in ColorTable::ALL.into_iter().enumerate() {
        let count = match table {
            ColorTable::Primary | ColorTable::Driver => clamp(num_primary),
            ColorTable::Interior | ColorTable::Secondary => clamp(num_secondary),
        };
        let colors: Vec<Color> = header.colors[i][..count].to_vec();
        mesh.set_colors(table, colors)?;
    }

    Ok(mesh)
}

/// Random access into the data tables that follow the header.
struct Tables<'a> {
    header: &'a Header,
    c: Cursor<&'a [u8]>,
}

impl Tables<'_> {
    fn seek(&mut self, table: Table, index: i32, width: usize) -> std::io::Result<()> {
        let start = self.header.version.header_size() as u64
            + self.header.offset(table) as u64
            + index as u64 * width as u64;
        self.c.seek(SeekFrom::Start(start))?;
        Ok(())
    }

    fn vector(&mut self, table: Table, index: i32) -> std::io::Result<Vector3> {
        self.seek(table, index, VECTOR_LEN)?;
        read_vector(&mut self.c)
    }

    fn part_vertices(&mut self, range: &PartRange) -> std::io::Result<Vec<Vertex>> {
        let mut vertices = Vec::with_capacity(range.num_vertices as usize);
        for index in range.first_vertex..range.first_vertex + range.num_vertices {
            let position = self.vector(Table::Vertices, index)?;
            let normal = self.vector(Table::Normals, index)?;
            let vertex = match self.header.version {
                FceVersion::Fce3 => Vertex::undamaged(position, normal),
                FceVersion::Fce4 | FceVersion::Fce4M => {
                    let damaged_position = self.vector(Table::DamagedVertices, index)?;
                    let damaged_normal = self.vector(Table::DamagedNormals, index)?;
                    self.seek(Table::Animation, index, 4)?;
                    Vertex {
                        position,
                        normal,
                        damaged_position,
                        damaged_normal,
                        animation: self.c.read_i32::<LittleEndian>()?,
                    }
                }
            };
            vertices.push(vertex);
        }
        Ok(vertices)
    }

    fn part_triangles(&mut self, order: usize, range: &PartRange) -> FceResult<Vec<Triangle>> {
        let flip_v = self.header.version != FceVersion::Fce3;
        let mut triangles = Vec::with_capacity(range.num_triangles as usize);
        for index in range.first_triangle..range.first_triangle + range.num_triangles {
            self.seek(Table::Triangles, index, TRIANGLE_RECORD_LEN)?;
            let f = &mut self.c;
            let tex_page = f.read_i32::<LittleEndian>()?;
            let mut vertices = [0usize; 3];
            for v in vertices.iter_mut() {
                let local = f.read_i32::<LittleEndian>()?;
                if local < 0 || local >= range.num_vertices {
                    return Err(FceError::format(format!(
                        "triangle {} of part {} references vertex {} of {}",
                        index, order, local, range.num_vertices
                    )));
                }
                *v = local as usize;
            }
            // Three padding words.
            let mut padding = [0u8; 12];
            f.read_exact(&mut padding)?;
            let flag = f.read_i32::<LittleEndian>()?;
            let mut u = [0f32; 3];
            f.read_f32_into::<LittleEndian>(&mut u)?;
            let mut v = [0f32; 3];
            f.read_f32_into::<LittleEndian>(&mut v)?;
            if flip_v {
                for x in v.iter_mut() {
                    *x = 1.0 - *x;
                }
            }
            triangles.push(Triangle {
                tex_page,
                vertices,
                flag,
                u,
                v,
            });
        }
        Ok(triangles)
    }
}
