use crate::{
    error::{MeshError, MeshResult},
    geometry::{Triangle, Vector3, Vertex, DIAMOND_TRIANGLES, DIAMOND_VERTICES, ZERO},
    index_list::IndexList,
    mesh::{Mesh, Part},
};

/// Self-contained geometry for one part.
///
/// Unlike triangles stored in a `Mesh`, the triangles here reference vertices by their
/// position in `vertices`, i.e. by part-local order.
#[derive(Debug, Clone, PartialEq)]
pub struct PartGeometry {
    pub name: String,
    pub position: Vector3,
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Appends a new part built from `geometry` and returns its order.
    ///
    /// All storage is reserved before anything is written, so on error the mesh keeps its
    /// previous parts, counts and contents.
    pub fn add_part(&mut self, geometry: PartGeometry) -> MeshResult<usize> {
        let PartGeometry {
            name,
            position,
            vertices,
            triangles,
        } = geometry;

        for triangle in &triangles {
            for &v in triangle.vertices.iter() {
                if v >= vertices.len() {
                    return Err(MeshError::index("vertex ordinal", v, vertices.len()));
                }
            }
        }

        let (position_in_index, slot) = self.reserve_part()?;
        let first_vertex = self.reserve_vertices(vertices.len())?;
        let first_triangle = self.reserve_triangles(triangles.len())?;

        let mut part = Part::new(&name, position);
        part.vertices = IndexList::from_indices(first_vertex..first_vertex + vertices.len());
        part.triangles = IndexList::from_indices(first_triangle..first_triangle + triangles.len());

        for (i, vertex) in vertices.into_iter().enumerate() {
            self.vertices[first_vertex + i] = Some(vertex);
        }
        for (i, mut triangle) in triangles.into_iter().enumerate() {
            for v in triangle.vertices.iter_mut() {
                *v += first_vertex;
            }
            self.triangles[first_triangle + i] = Some(triangle);
        }

        let order = self.commit_part(position_in_index, slot, part);
        log::debug!(
            "added part {} {:?} at slot {} ({} vertices, {} triangles)",
            order,
            name,
            slot,
            self.part(order).map(|p| p.num_vertices()).unwrap_or(0),
            self.part(order).map(|p| p.num_triangles()).unwrap_or(0),
        );
        Ok(order)
    }

    /// Appends a new part from flat geometry arrays and returns its order.
    ///
    /// # Arguments
    ///
    /// * `vertex_ordinals` - Three zero-based vertex ordinals per triangle.
    /// * `tex_coords` - Six floats per triangle: the three U values, then the three V values.
    /// * `positions` - Three floats per vertex.
    /// * `normals` - Three floats per vertex.
    ///
    /// The new part is named `FromGeomData_<n>` where `n` is the part count before the
    /// call, sits at the origin, and has texture page and flag 0 on every triangle.
    pub fn add_part_from_geometry(
        &mut self,
        vertex_ordinals: &[usize],
        tex_coords: &[f32],
        positions: &[f32],
        normals: &[f32],
    ) -> MeshResult<usize> {
        if vertex_ordinals.len() % 3 != 0 {
            return Err(MeshError::invalid_argument(format!(
                "{} vertex ordinals is not a multiple of 3",
                vertex_ordinals.len()
            )));
        }
        if tex_coords.len() != 2 * vertex_ordinals.len() {
            return Err(MeshError::invalid_argument(format!(
                "expected {} texture coordinates, got {}",
                2 * vertex_ordinals.len(),
                tex_coords.len()
            )));
        }
        if positions.len() % 3 != 0 || positions.len() != normals.len() {
            return Err(MeshError::invalid_argument(format!(
                "{} position and {} normal floats do not describe the same vertices",
                positions.len(),
                normals.len()
            )));
        }
        let num_vertices = positions.len() / 3;
        if let Some(&max) = vertex_ordinals.iter().max() {
            if max >= num_vertices {
                return Err(MeshError::index("vertex ordinal", max, num_vertices));
            }
        }

        let vertices = positions
            .chunks_exact(3)
            .zip(normals.chunks_exact(3))
            .map(|(p, n)| {
                Vertex::undamaged(Vector3::new(p[0], p[1], p[2]), Vector3::new(n[0], n[1], n[2]))
            })
            .collect();
        let triangles = vertex_ordinals
            .chunks_exact(3)
            .zip(tex_coords.chunks_exact(6))
            .map(|(v, tc)| Triangle {
                tex_page: 0,
                vertices: [v[0], v[1], v[2]],
                flag: 0,
                u: [tc[0], tc[1], tc[2]],
                v: [tc[3], tc[4], tc[5]],
            })
            .collect();

        self.add_part(PartGeometry {
            name: format!("FromGeomData_{}", self.num_parts),
            position: ZERO,
            vertices,
            triangles,
        })
    }

    /// Adds a diamond-shaped marker part centered at `center` and returns its order.
    pub fn add_helper_part(&mut self, name: &str, center: Vector3) -> MeshResult<usize> {
        let ordinals: Vec<usize> = DIAMOND_TRIANGLES.iter().flatten().copied().collect();
        let positions: Vec<f32> = DIAMOND_VERTICES.iter().flatten().copied().collect();
        let tex_coords = vec![0.0; 2 * ordinals.len()];
        let order = self.add_part_from_geometry(&ordinals, &tex_coords, &positions, &positions)?;
        self.set_part_name(order, name)?;
        self.set_part_position(order, center)?;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_out_of_range_leaves_mesh_untouched() {
        let mut mesh = Mesh::new();
        let err = mesh
            .add_part_from_geometry(&[0, 1, 3], &[0.0; 6], &[0.0; 9], &[0.0; 9])
            .unwrap_err();
        assert_eq!(MeshError::index("vertex ordinal", 3, 3), err);
        assert_eq!(0, mesh.num_parts());
        assert_eq!(0, mesh.parts_len());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut mesh = Mesh::new();
        assert!(matches!(
            mesh.add_part_from_geometry(&[0, 1], &[0.0; 4], &[0.0; 9], &[0.0; 9]),
            Err(MeshError::InvalidArgument { .. })
        ));
        assert!(matches!(
            mesh.add_part_from_geometry(&[0, 1, 2], &[0.0; 5], &[0.0; 9], &[0.0; 9]),
            Err(MeshError::InvalidArgument { .. })
        ));
        assert!(matches!(
            mesh.add_part_from_geometry(&[0, 1, 2], &[0.0; 6], &[0.0; 9], &[0.0; 6]),
            Err(MeshError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn texture_coordinates_are_unpacked_per_triangle() {
        let mut mesh = Mesh::new();
        mesh.add_part_from_geometry(
            &[0, 1, 2],
            &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
            &[0.0; 9],
            &[0.0; 9],
        )
        .unwrap();
        let triangle = mesh.part_triangles(0).unwrap()[0];
        assert_eq!([0.1, 0.2, 0.3], triangle.u);
        assert_eq!([0.4, 0.5, 0.6], triangle.v);
        assert_eq!("FromGeomData_0", mesh.part(0).unwrap().name());
    }

    #[test]
    fn helper_part_is_a_diamond() {
        let mut mesh = Mesh::new();
        let order = mesh
            .add_helper_part(":HB", Vector3::new(1.0, 2.0, 3.0))
            .unwrap();
        let part = mesh.part(order).unwrap();
        assert_eq!(":HB", part.name());
        assert_eq!(Vector3::new(1.0, 2.0, 3.0), part.position());
        assert_eq!(6, part.num_vertices());
        assert_eq!(8, part.num_triangles());
        assert!(mesh.is_valid());
    }
}
