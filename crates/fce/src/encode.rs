use crate::{
    error::{FceError, FceResult},
    header::{write_vector, Header, PartRange},
    layout::{Table, TRIANGLE_PADDING, TRIANGLE_RECORD_LEN, VECTOR_LEN},
    validate::half_size_warning,
    version::FceVersion,
    warning::Warnings,
};
use byteorder::{LittleEndian, WriteBytesExt};
use fcekit_mesh::{ColorTable, Mesh, Vector3, MAX_COLORS, MAX_DUMMIES, MAX_PARTS, ZERO};
use ordered_float::OrderedFloat;
use std::io::{Cursor, Seek, SeekFrom};

/// Names of the FCE4 parts that make up the high-detail body.
pub const FCE4_HIGH_BODY_PARTS: [&str; 18] = [
    ":HB", ":OT", ":OL", ":OS", ":OLB", ":ORB", ":OLM", ":ORM", ":OC", ":ODL", ":OH", ":OD",
    ":HLFW", ":HRFW", ":HLMW", ":HRMW", ":HLRW", ":HRRW",
];

/// Options for [`encode_fce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeConfig {
    /// Recenter the body parts around their local centroids before writing. This
    /// changes the mesh, not just the output.
    pub center_parts: bool,
}

/// Size in bytes of `mesh` encoded as `version`.
pub fn encoded_size(mesh: &Mesh, version: FceVersion) -> FceResult<usize> {
    version
        .file_size(mesh.num_vertices(), mesh.num_triangles())
        .ok_or_else(|| {
            FceError::format(format!(
                "{} vertices and {} triangles do not fit in memory",
                mesh.num_vertices(),
                mesh.num_triangles()
            ))
        })
}

/// Encodes `mesh` as `version` into the front of `buf`.
///
/// `buf` must hold at least [`encoded_size`] bytes; exactly that many are written.
/// Returns the warnings raised while encoding.
pub fn encode_fce(
    mesh: &mut Mesh,
    version: FceVersion,
    config: &EncodeConfig,
    buf: &mut [u8],
) -> FceResult<Warnings> {
    if mesh.num_parts() > MAX_PARTS {
        return Err(FceError::format(format!(
            "{} parts, at most {} fit in a header",
            mesh.num_parts(),
            MAX_PARTS
        )));
    }
    if mesh.dummies().len() > MAX_DUMMIES {
        return Err(FceError::format(format!(
            "{} dummies, at most {} fit in a header",
            mesh.dummies().len(),
            MAX_DUMMIES
        )));
    }
    for table in ColorTable::ALL {
        if mesh.colors(table).len() > MAX_COLORS {
            return Err(FceError::format(format!(
                "{} {:?} colors, at most {} fit in a header",
                mesh.colors(table).len(),
                table,
                MAX_COLORS
            )));
        }
    }
    mesh.check()?;

    let required = encoded_size(mesh, version)?;
    if buf.len() < required {
        return Err(FceError::Capacity {
            required,
            available: buf.len(),
        });
    }
    let num_vertices = count_field(mesh.num_vertices(), "vertices")?;
    let num_triangles = count_field(mesh.num_triangles(), "triangles")?;

    if config.center_parts {
        let body_parts = match version {
            FceVersion::Fce3 => 13,
            FceVersion::Fce4 | FceVersion::Fce4M => 12,
        };
        for order in 0..mesh.num_parts().min(body_parts) {
            mesh.center_part(order)?;
        }
    }

    let mut warnings = Warnings::new();
    let half_size = half_size(mesh, version);
    if let Some(warning) = half_size_warning(half_size) {
        warnings.push(warning);
    }

    let mut header = Header::new(version);
    header.num_vertices = num_vertices;
    header.num_triangles = num_triangles;
    header.num_arts = mesh.num_arts();
    header.offsets = table_offsets(version, i64::from(num_vertices), i64::from(num_triangles));
    header.half_size = half_size;
    fill_dummies_and_colors(&mut header, mesh);

    let out = &mut buf[..required];
    out.fill(0);
    let mut c = Cursor::new(out);
    let mut writer = TableWriter {
        version,
        offsets: header.offsets,
        c: &mut c,
    };

    // Global vertex index to part-local order, rebuilt per part.
    let mut local = vec![0i32; mesh.vertices_len()];
    let mut first_vertex = 0i32;
    let mut first_triangle = 0i32;
    for (order, part) in mesh.parts().enumerate() {
        header.part_names[order] = part.name().to_owned();
        header.part_positions[order] = part.position();
        let range = PartRange {
            first_vertex,
            num_vertices: part.num_vertices() as i32,
            first_triangle,
            num_triangles: part.num_triangles() as i32,
        };
        header.parts[order] = range;

        for (i, global) in part.vertices().indices().enumerate() {
            local[global] = i as i32;
            let Some(vertex) = mesh.vertex(global) else {
                continue;
            };
            let index = first_vertex + i as i32;
            writer.vector(Table::Vertices, index, vertex.position)?;
            writer.vector(Table::Normals, index, vertex.normal)?;
            if version != FceVersion::Fce3 {
                writer.vector(Table::UndamagedVertices, index, vertex.position)?;
                writer.vector(Table::UndamagedNormals, index, vertex.normal)?;
                writer.vector(Table::DamagedVertices, index, vertex.damaged_position)?;
                writer.vector(Table::DamagedNormals, index, vertex.damaged_normal)?;
                writer.seek(Table::Animation, index, 4)?;
                writer.c.write_i32::<LittleEndian>(vertex.animation)?;
            }
        }

        for (i, global) in part.triangles().indices().enumerate() {
            let Some(triangle) = mesh.triangle(global) else {
                continue;
            };
            writer.seek(Table::Triangles, first_triangle + i as i32, TRIANGLE_RECORD_LEN)?;
            let f = &mut *writer.c;
            f.write_i32::<LittleEndian>(triangle.tex_page)?;
            for &v in triangle.vertices.iter() {
                f.write_i32::<LittleEndian>(local[v])?;
            }
            for _ in 0..3 {
                f.write_i32::<LittleEndian>(TRIANGLE_PADDING)?;
            }
            f.write_i32::<LittleEndian>(triangle.flag)?;
            for &u in triangle.u.iter() {
                f.write_f32::<LittleEndian>(u)?;
            }
            for &v in triangle.v.iter() {
                let v = if version == FceVersion::Fce3 { v } else { 1.0 - v };
                f.write_f32::<LittleEndian>(v)?;
            }
        }

        first_vertex += range.num_vertices;
        first_triangle += range.num_triangles;
    }
    header.num_parts = mesh.num_parts() as i32;

    c.seek(SeekFrom::Start(0))?;
    header.write(&mut c)?;

    log::debug!(
        "encoded {} bytes as {}: {} parts, {} triangles, {} vertices",
        required,
        version,
        mesh.num_parts(),
        num_triangles,
        num_vertices
    );
    Ok(warnings)
}

/// Encodes `mesh` into a freshly allocated buffer of exactly [`encoded_size`] bytes.
pub fn encode_fce_to_vec(
    mesh: &mut Mesh,
    version: FceVersion,
    config: &EncodeConfig,
) -> FceResult<(Vec<u8>, Warnings)> {
    let mut buf = vec![0u8; encoded_size(mesh, version)?];
    let warnings = encode_fce(mesh, version, config, &mut buf)?;
    Ok((buf, warnings))
}

/// Table offsets of a freshly written file: every table directly follows the previous one.
pub fn table_offsets(version: FceVersion, num_vertices: i64, num_triangles: i64) -> [i32; 14] {
    let fce4m = version == FceVersion::Fce4M;
    let tables: &[Table] = match version {
        FceVersion::Fce3 => &Table::FCE3,
        FceVersion::Fce4 | FceVersion::Fce4M => &Table::FCE4,
    };
    let mut offsets = [0i32; 14];
    let mut next = 0i64;
    for &table in tables {
        offsets[table.index()] = next as i32;
        next += table.byte_len(fce4m, num_vertices, num_triangles);
    }
    offsets
}

/// Most body parts that count towards the FCE4 HalfSize.
const FCE4_MAX_BODY_PARTS: usize = 12;

/// Half extents of the body parts in world coordinates.
///
/// Which parts count as body parts depends on the variant. FCE4 takes the first 12 parts
/// named in [`FCE4_HIGH_BODY_PARTS`]. Without any body vertices the result is zero.
pub fn half_size(mesh: &Mesh, version: FceVersion) -> Vector3 {
    let mut min = [OrderedFloat(f32::INFINITY); 3];
    let mut max = [OrderedFloat(f32::NEG_INFINITY); 3];
    let mut any = false;
    let mut fce4_body_parts = 0;
    for (order, part) in mesh.parts().enumerate() {
        let body = match version {
            FceVersion::Fce3 => order <= 4 || order == 12,
            FceVersion::Fce4 => {
                fce4_body_parts < FCE4_MAX_BODY_PARTS
                    && FCE4_HIGH_BODY_PARTS.contains(&part.name())
            }
            FceVersion::Fce4M => order < 12,
        };
        if !body {
            continue;
        }
        if version == FceVersion::Fce4 {
            fce4_body_parts += 1;
        }
        for vertex in part.vertices().indices().filter_map(|g| mesh.vertex(g)) {
            let p = vertex.position + part.position();
            for (axis, value) in [p.x, p.y, p.z].into_iter().enumerate() {
                min[axis] = min[axis].min(OrderedFloat(value));
                max[axis] = max[axis].max(OrderedFloat(value));
            }
            any = true;
        }
    }
    if !any {
        return ZERO;
    }
    Vector3::new(
        0.5 * (max[0].0 - min[0].0),
        min[1].0.abs() - 0.02,
        0.5 * (max[2].0 - min[2].0),
    )
}

fn count_field(count: usize, what: &str) -> FceResult<i32> {
    i32::try_from(count).map_err(|_| FceError::format(format!("too many {} ({})", what, count)))
}

fn fill_dummies_and_colors(header: &mut Header, mesh: &Mesh) {
    header.num_dummies = mesh.dummies().len() as i32;
    for (i, dummy) in mesh.dummies().iter().enumerate() {
        header.dummies[i] = dummy.position;
        header.dummy_names[i] = dummy.name.clone();
    }

    for (i, table) in ColorTable::ALL.into_iter().enumerate() {
        for (slot, &color) in header.colors[i].iter_mut().zip(mesh.colors(table)) {
            *slot = color;
        }
    }
    header.num_colors = mesh.colors(ColorTable::Primary).len() as i32;
    header.num_secondary_colors = match header.version {
        FceVersion::Fce3 => mesh.colors(ColorTable::Secondary).len() as i32,
        FceVersion::Fce4 | FceVersion::Fce4M => header.num_colors,
    };
}

struct TableWriter<'a, 'b> {
    version: FceVersion,
    offsets: [i32; 14],
    c: &'a mut Cursor<&'b mut [u8]>,
}

impl TableWriter<'_, '_> {
    fn seek(&mut self, table: Table, index: i32, width: usize) -> std::io::Result<()> {
        let start = self.version.header_size() as u64
            + self.offsets[table.index()] as u64
            + index as u64 * width as u64;
        self.c.seek(SeekFrom::Start(start))?;
        Ok(())
    }

    fn vector(&mut self, table: Table, index: i32, v: Vector3) -> std::io::Result<()> {
        self.seek(table, index, VECTOR_LEN)?;
        write_vector(&mut *self.c, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_fce;
    use float_eq::assert_float_eq;
    use fcekit_mesh::Color;

    fn diamond(mesh: &mut Mesh, name: &str, position: Vector3) -> usize {
        mesh.add_helper_part(name, position).unwrap()
    }

    #[test]
    fn small_buffer_is_capacity_error() {
        let mut mesh = Mesh::new();
        diamond(&mut mesh, ":HB", ZERO);
        let mut buf = vec![0u8; 100];
        match encode_fce(&mut mesh, FceVersion::Fce3, &EncodeConfig::default(), &mut buf) {
            Err(FceError::Capacity {
                required,
                available,
            }) => {
                assert_eq!(0x1F04 + 80 * 6 + 56 * 8, required);
                assert_eq!(100, available);
            }
            other => panic!("expected capacity error, got {:?}", other),
        }
        // Nothing written.
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn empty_mesh_encodes_to_bare_header() {
        let mut mesh = Mesh::new();
        let (buf, warnings) =
            encode_fce_to_vec(&mut mesh, FceVersion::Fce3, &EncodeConfig::default()).unwrap();
        assert_eq!(0x1F04, buf.len());
        // NumArts is the only non-zero field.
        assert_eq!(1, buf[0x0C]);
        assert!(buf[..0x0C].iter().chain(&buf[0x10..]).all(|&b| b == 0));
        assert_eq!(1, warnings.len());
    }

    #[test]
    fn fce3_half_size_uses_body_parts() {
        let mut mesh = Mesh::new();
        for order in 0..6 {
            let position = if order == 5 {
                Vector3::new(100.0, -50.0, 100.0)
            } else {
                Vector3::new(0.0, 0.5, 0.0)
            };
            diamond(&mut mesh, &format!("part{}", order), position);
        }
        let half = half_size(&mesh, FceVersion::Fce3);
        assert_float_eq!(1.0, half.x, abs <= 1e-6);
        assert_float_eq!(0.48, half.y, abs <= 1e-6);
        assert_float_eq!(1.0, half.z, abs <= 1e-6);
    }

    #[test]
    fn fce4_half_size_uses_body_names() {
        let mut mesh = Mesh::new();
        diamond(&mut mesh, ":HLFW", Vector3::new(0.0, 2.0, 0.0));
        diamond(&mut mesh, ":Wheel", Vector3::new(9.0, -9.0, 9.0));
        let half = half_size(&mesh, FceVersion::Fce4);
        assert_float_eq!(1.0, half.x, abs <= 1e-6);
        assert_float_eq!(0.98, half.y, abs <= 1e-6);
        // FCE4M picks by order instead.
        let half = half_size(&mesh, FceVersion::Fce4M);
        assert_float_eq!(5.5, half.x, abs <= 1e-6);
    }

    #[test]
    fn fce4_half_size_stops_after_twelve_body_parts() {
        let mut mesh = Mesh::new();
        for name in &FCE4_HIGH_BODY_PARTS[..12] {
            diamond(&mut mesh, name, Vector3::new(0.0, 2.0, 0.0));
        }
        diamond(&mut mesh, FCE4_HIGH_BODY_PARTS[12], Vector3::new(0.0, -100.0, 0.0));
        let half = half_size(&mesh, FceVersion::Fce4);
        assert_float_eq!(0.98, half.y, abs <= 1e-6);
        assert_float_eq!(1.0, half.x, abs <= 1e-6);
    }

    #[test]
    fn fce4_half_size_skips_non_body_parts_when_counting() {
        let mut mesh = Mesh::new();
        diamond(&mut mesh, ":Wheel", Vector3::new(0.0, -100.0, 0.0));
        for name in &FCE4_HIGH_BODY_PARTS[..12] {
            diamond(&mut mesh, name, Vector3::new(0.0, 2.0, 0.0));
        }
        let half = half_size(&mesh, FceVersion::Fce4);
        assert_float_eq!(0.98, half.y, abs <= 1e-6);
    }

    #[test]
    fn centering_moves_parts_but_not_world_positions() {
        let mut mesh = Mesh::new();
        mesh.add_part_from_geometry(
            &[0, 1, 2],
            &[0.0; 6],
            &[2.0, 2.0, 2.0, 4.0, 2.0, 2.0, 4.0, 4.0, 2.0],
            &[0.0; 9],
        )
        .unwrap();
        let config = EncodeConfig { center_parts: true };
        let (buf, _) = encode_fce_to_vec(&mut mesh, FceVersion::Fce4, &config).unwrap();
        assert_eq!(Vector3::new(3.0, 3.0, 2.0), mesh.part(0).unwrap().position());
        assert_eq!(
            Vector3::new(-1.0, -1.0, 0.0),
            mesh.part_vertex_positions(0).unwrap()[0]
        );
        let (decoded, _) = decode_fce(&buf).unwrap();
        assert_eq!(mesh.part(0).unwrap().position(), decoded.part(0).unwrap().position());
    }

    #[test]
    fn too_many_parts_is_format_error() {
        let mut mesh = Mesh::new();
        for i in 0..=MAX_PARTS {
            diamond(&mut mesh, &format!("p{}", i), ZERO);
        }
        assert!(matches!(
            encode_fce_to_vec(&mut mesh, FceVersion::Fce3, &EncodeConfig::default()),
            Err(FceError::Format { .. })
        ));
    }

    #[test]
    fn fce3_writes_primary_and_secondary_colors() {
        let mut mesh = Mesh::new();
        mesh.set_colors(ColorTable::Primary, vec![Color::new(1, 2, 3, 4)])
            .unwrap();
        mesh.set_colors(
            ColorTable::Secondary,
            vec![Color::new(5, 6, 7, 8), Color::new(9, 9, 9, 9)],
        )
        .unwrap();
        let (buf, _) =
            encode_fce_to_vec(&mut mesh, FceVersion::Fce3, &EncodeConfig::default()).unwrap();
        let (decoded, warnings) = decode_fce(&buf).unwrap();
        assert_eq!(mesh.colors(ColorTable::Secondary), decoded.colors(ColorTable::Secondary));
        assert_eq!(mesh.colors(ColorTable::Primary), decoded.colors(ColorTable::Driver));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, crate::Warning::FewerPrimaryColors { .. })));
    }

    #[test]
    fn table_offsets_are_contiguous() {
        let offsets = table_offsets(FceVersion::Fce4M, 2, 1);
        assert_eq!(0, offsets[Table::Vertices.index()]);
        assert_eq!(24, offsets[Table::Normals.index()]);
        assert_eq!(48, offsets[Table::Triangles.index()]);
        // Reserve6 is last and holds 12 bytes per triangle plus 1 per vertex.
        assert_eq!(
            FceVersion::Fce4M.file_size(2, 1).unwrap() - 0x2038 - 12 - 2,
            offsets[Table::Reserve6.index()] as usize
        );
    }
}
