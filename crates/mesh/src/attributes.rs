//! Bulk getters and setters for per-part attributes.
//!
//! Setters take one value per live element, in part-local order, and reject slices of
//! the wrong length before touching the mesh.

use crate::{
    error::{MeshError, MeshResult},
    geometry::{truncate_name, Triangle, Vector3, Vertex},
    mesh::Mesh,
};

impl Mesh {
    /// Renames a part. Names are truncated to 63 characters.
    pub fn set_part_name(&mut self, order: usize, name: &str) -> MeshResult<()> {
        self.part_mut(order)?.name = truncate_name(name);
        Ok(())
    }

    /// Moves a part, and with it all of its vertices.
    pub fn set_part_position(&mut self, order: usize, position: Vector3) -> MeshResult<()> {
        self.part_mut(order)?.position = position;
        Ok(())
    }

    pub fn part_triangle_flags(&self, order: usize) -> MeshResult<Vec<i32>> {
        Ok(self.part_triangles(order)?.iter().map(|t| t.flag).collect())
    }

    pub fn set_part_triangle_flags(&mut self, order: usize, flags: &[i32]) -> MeshResult<()> {
        self.update_triangles(order, flags, |t, &flag| t.flag = flag)
    }

    pub fn part_triangle_tex_pages(&self, order: usize) -> MeshResult<Vec<i32>> {
        Ok(self
            .part_triangles(order)?
            .iter()
            .map(|t| t.tex_page)
            .collect())
    }

    pub fn set_part_triangle_tex_pages(&mut self, order: usize, pages: &[i32]) -> MeshResult<()> {
        self.update_triangles(order, pages, |t, &page| t.tex_page = page)
    }

    /// Texture coordinates of a part's triangles as `(u, v)` triples.
    pub fn part_triangle_tex_coords(&self, order: usize) -> MeshResult<Vec<([f32; 3], [f32; 3])>> {
        Ok(self
            .part_triangles(order)?
            .iter()
            .map(|t| (t.u, t.v))
            .collect())
    }

    pub fn set_part_triangle_tex_coords(
        &mut self,
        order: usize,
        coords: &[([f32; 3], [f32; 3])],
    ) -> MeshResult<()> {
        self.update_triangles(order, coords, |t, &(u, v)| {
            t.u = u;
            t.v = v;
        })
    }

    /// Vertex references of a part's triangles, as part-local vertex orders.
    pub fn part_triangle_vertex_orders(&self, order: usize) -> MeshResult<Vec<[usize; 3]>> {
        let part = self.part(order)?;
        let mut local = vec![None; self.vertices.len()];
        for (i, global) in part.vertices.indices().enumerate() {
            if let Some(l) = local.get_mut(global) {
                *l = Some(i);
            }
        }
        self.part_triangles(order)?
            .iter()
            .map(|t| {
                let mut orders = [0; 3];
                for (o, &global) in orders.iter_mut().zip(t.vertices.iter()) {
                    *o = local.get(global).copied().flatten().ok_or_else(|| {
                        MeshError::consistency(format!(
                            "part {} triangle references foreign vertex {}",
                            order, global
                        ))
                    })?;
                }
                Ok(orders)
            })
            .collect()
    }

    pub fn part_vertex_positions(&self, order: usize) -> MeshResult<Vec<Vector3>> {
        self.map_vertices(order, |v| v.position)
    }

    pub fn set_part_vertex_positions(&mut self, order: usize, values: &[Vector3]) -> MeshResult<()> {
        self.update_vertices(order, values, |v, &p| v.position = p)
    }

    pub fn part_vertex_normals(&self, order: usize) -> MeshResult<Vec<Vector3>> {
        self.map_vertices(order, |v| v.normal)
    }

    pub fn set_part_vertex_normals(&mut self, order: usize, values: &[Vector3]) -> MeshResult<()> {
        self.update_vertices(order, values, |v, &n| v.normal = n)
    }

    pub fn part_damaged_positions(&self, order: usize) -> MeshResult<Vec<Vector3>> {
        self.map_vertices(order, |v| v.damaged_position)
    }

    pub fn set_part_damaged_positions(&mut self, order: usize, values: &[Vector3]) -> MeshResult<()> {
        self.update_vertices(order, values, |v, &p| v.damaged_position = p)
    }

    pub fn part_damaged_normals(&self, order: usize) -> MeshResult<Vec<Vector3>> {
        self.map_vertices(order, |v| v.damaged_normal)
    }

    pub fn set_part_damaged_normals(&mut self, order: usize, values: &[Vector3]) -> MeshResult<()> {
        self.update_vertices(order, values, |v, &n| v.damaged_normal = n)
    }

    pub fn part_animation_flags(&self, order: usize) -> MeshResult<Vec<i32>> {
        self.map_vertices(order, |v| v.animation)
    }

    pub fn set_part_animation_flags(&mut self, order: usize, flags: &[i32]) -> MeshResult<()> {
        self.update_vertices(order, flags, |v, &a| v.animation = a)
    }

    /// Maps every global vertex slot to the vertex's order among all live vertices.
    ///
    /// Freed slots map to `None`.
    pub fn vertex_order_map(&self) -> Vec<Option<usize>> {
        let mut next = 0;
        self.vertices
            .iter()
            .map(|v| {
                v.as_ref().map(|_| {
                    next += 1;
                    next - 1
                })
            })
            .collect()
    }

    fn map_vertices<T>(&self, order: usize, f: impl Fn(&Vertex) -> T) -> MeshResult<Vec<T>> {
        Ok(self.part_vertices(order)?.into_iter().map(f).collect())
    }

    fn update_vertices<T>(
        &mut self,
        order: usize,
        values: &[T],
        f: impl Fn(&mut Vertex, &T),
    ) -> MeshResult<()> {
        let globals: Vec<usize> = self.part(order)?.vertices.indices().collect();
        if values.len() != globals.len() {
            return Err(MeshError::index("vertex value count", values.len(), globals.len()));
        }
        for (global, value) in globals.into_iter().zip(values) {
            if let Some(vertex) = self.vertex_mut(global) {
                f(vertex, value);
            }
        }
        Ok(())
    }

    fn update_triangles<T>(
        &mut self,
        order: usize,
        values: &[T],
        f: impl Fn(&mut Triangle, &T),
    ) -> MeshResult<()> {
        let globals: Vec<usize> = self.part(order)?.triangles.indices().collect();
        if values.len() != globals.len() {
            return Err(MeshError::index(
                "triangle value count",
                values.len(),
                globals.len(),
            ));
        }
        for (global, value) in globals.into_iter().zip(values) {
            if let Some(triangle) = self.triangle_mut(global) {
                f(triangle, value);
            }
        }
        Ok(())
    }
}
