use crate::{
    error::{MeshError, MeshResult},
    geometry::{truncate_name, Color, Dummy, Triangle, Vector3, Vertex, ZERO},
    index_list::{first_free_tail, grow_slots, resize_slots, IndexList},
    MAX_COLORS, MAX_DUMMIES,
};

/// A named, positioned sub-mesh.
///
/// A part does not store geometry itself. It owns a set of global vertex and triangle
/// indices into the mesh-wide collections of its `Mesh`.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub(crate) name: String,
    pub(crate) position: Vector3,
    pub(crate) vertices: IndexList,
    pub(crate) triangles: IndexList,
}

impl Part {
    pub(crate) fn new(name: &str, position: Vector3) -> Self {
        Part {
            name: truncate_name(name),
            position,
            vertices: IndexList::new(),
            triangles: IndexList::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Translation applied to every vertex of the part.
    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Part-local vertex order to global vertex index.
    pub fn vertices(&self) -> &IndexList {
        &self.vertices
    }

    /// Part-local triangle order to global triangle index.
    pub fn triangles(&self) -> &IndexList {
        &self.triangles
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }
}

/// Selects one of the four color tables of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTable {
    Primary,
    Interior,
    Secondary,
    Driver,
}

impl ColorTable {
    pub const ALL: [ColorTable; 4] = [
        ColorTable::Primary,
        ColorTable::Interior,
        ColorTable::Secondary,
        ColorTable::Driver,
    ];

    fn index(self) -> usize {
        match self {
            ColorTable::Primary => 0,
            ColorTable::Interior => 1,
            ColorTable::Secondary => 2,
            ColorTable::Driver => 3,
        }
    }
}

/// An editable FCE model.
///
/// Parts, triangles and vertices live in three holey collections. Deleting an element
/// leaves a `None` behind that later insertions may reuse; nothing is ever compacted.
///
/// Parts are addressed two ways:
///
/// * the *order* of a part is its position among live parts, as seen by consumers and
///   as written to disk;
/// * the *internal slot* of a part is its raw position in the part collection.
///
/// `part_index` maps one to the other: walking it and skipping `None` entries yields the
/// internal slot of each part in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub(crate) parts: Vec<Option<Part>>,
    pub(crate) part_index: Vec<Option<usize>>,
    pub(crate) triangles: Vec<Option<Triangle>>,
    pub(crate) vertices: Vec<Option<Vertex>>,
    pub(crate) num_parts: usize,
    pub(crate) num_triangles: usize,
    pub(crate) num_vertices: usize,
    pub(crate) num_arts: i32,
    pub(crate) dummies: Vec<Dummy>,
    pub(crate) colors: [Vec<Color>; 4],
}

impl std::default::Default for Mesh {
    fn default() -> Self {
        Mesh {
            parts: Vec::new(),
            part_index: Vec::new(),
            triangles: Vec::new(),
            vertices: Vec::new(),
            num_parts: 0,
            num_triangles: 0,
            num_vertices: 0,
            num_arts: 1,
            dummies: Vec::new(),
            colors: Default::default(),
        }
    }
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an empty mesh with room for the given number of elements.
    pub fn with_capacity(parts: usize, triangles: usize, vertices: usize) -> MeshResult<Self> {
        let mut mesh = Mesh::new();
        if parts > 0 {
            mesh.grow_parts(parts)?;
        }
        if triangles > 0 {
            mesh.grow_triangles(triangles)?;
        }
        if vertices > 0 {
            mesh.grow_vertices(vertices)?;
        }
        Ok(mesh)
    }

    pub fn num_parts(&self) -> usize {
        self.num_parts
    }

    pub fn num_triangles(&self) -> usize {
        self.num_triangles
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_arts(&self) -> i32 {
        self.num_arts
    }

    pub fn set_num_arts(&mut self, num_arts: i32) {
        self.num_arts = num_arts;
    }

    /// Allocated length of the part collection.
    pub fn parts_len(&self) -> usize {
        self.parts.len()
    }

    /// Allocated length of the triangle collection.
    pub fn triangles_len(&self) -> usize {
        self.triangles.len()
    }

    /// Allocated length of the vertex collection.
    pub fn vertices_len(&self) -> usize {
        self.vertices.len()
    }

    /// Order to internal slot map, with `None` for freed entries.
    pub fn part_index(&self) -> &[Option<usize>] {
        &self.part_index
    }

    /// Returns the first free entry of the part index list, or its length if it is full.
    pub fn first_unused_part_slot(&self) -> usize {
        self.part_index
            .iter()
            .position(|p| p.is_none())
            .unwrap_or(self.part_index.len())
    }

    /// Returns one past the largest global triangle index referenced by any part.
    pub fn first_unused_global_triangle_index(&self) -> MeshResult<usize> {
        self.first_unused_global_index(|p| &p.triangles, self.triangles.len(), "triangle")
    }

    /// Returns one past the largest global vertex index referenced by any part.
    pub fn first_unused_global_vertex_index(&self) -> MeshResult<usize> {
        self.first_unused_global_index(|p| &p.vertices, self.vertices.len(), "vertex")
    }

    fn first_unused_global_index(
        &self,
        list: impl Fn(&Part) -> &IndexList,
        len: usize,
        what: &str,
    ) -> MeshResult<usize> {
        let mut next = 0;
        for part in self.parts() {
            for global in list(part).indices() {
                if global >= len {
                    return Err(MeshError::consistency(format!(
                        "part {:?} references {} {} beyond collection length {}",
                        part.name, what, global, len
                    )));
                }
                next = next.max(global + 1);
            }
        }
        Ok(next)
    }

    /// Position in the part index list of the part with the given order.
    pub(crate) fn index_position(&self, order: usize) -> MeshResult<usize> {
        self.part_index
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_some())
            .nth(order)
            .map(|(position, _)| position)
            .ok_or_else(|| MeshError::index("part order", order, self.num_parts))
    }

    /// Translates a part order to the part's internal slot.
    pub fn internal_slot_from_order(&self, order: usize) -> MeshResult<usize> {
        let position = self.index_position(order)?;
        self.part_index[position]
            .ok_or_else(|| MeshError::index("part order", order, self.num_parts))
    }

    /// Translates an internal part slot back to the part's order.
    pub fn order_from_internal_slot(&self, slot: usize) -> MeshResult<usize> {
        self.part_index
            .iter()
            .flatten()
            .position(|&s| s == slot)
            .ok_or_else(|| MeshError::index("internal part slot", slot, self.parts.len()))
    }

    /// Grows the part collection and the part index list by `additional` slots.
    pub fn grow_parts(&mut self, additional: usize) -> MeshResult<()> {
        grow_slots(&mut self.part_index, additional, "part index")?;
        // Part storage tracks the index list slot for slot.
        let len = self.part_index.len();
        resize_slots(&mut self.parts, len, "parts")
    }

    pub fn grow_triangles(&mut self, additional: usize) -> MeshResult<()> {
        grow_slots(&mut self.triangles, additional, "triangles")
    }

    pub fn grow_vertices(&mut self, additional: usize) -> MeshResult<()> {
        grow_slots(&mut self.vertices, additional, "vertices")
    }

    /// Iterates live parts in order.
    pub fn parts(&self) -> impl Iterator<Item = &Part> + '_ {
        self.part_index
            .iter()
            .flatten()
            .filter_map(move |&slot| self.parts.get(slot).and_then(|p| p.as_ref()))
    }

    pub fn part(&self, order: usize) -> MeshResult<&Part> {
        let slot = self.internal_slot_from_order(order)?;
        self.parts
            .get(slot)
            .and_then(|p| p.as_ref())
            .ok_or_else(|| MeshError::index("part order", order, self.num_parts))
    }

    pub(crate) fn part_mut(&mut self, order: usize) -> MeshResult<&mut Part> {
        let slot = self.internal_slot_from_order(order)?;
        let num_parts = self.num_parts;
        self.parts
            .get_mut(slot)
            .and_then(|p| p.as_mut())
            .ok_or_else(|| MeshError::index("part order", order, num_parts))
    }

    /// Returns the vertex stored at a global index.
    pub fn vertex(&self, global: usize) -> Option<&Vertex> {
        self.vertices.get(global).and_then(|v| v.as_ref())
    }

    /// Returns the triangle stored at a global index.
    pub fn triangle(&self, global: usize) -> Option<&Triangle> {
        self.triangles.get(global).and_then(|t| t.as_ref())
    }

    pub(crate) fn vertex_mut(&mut self, global: usize) -> Option<&mut Vertex> {
        self.vertices.get_mut(global).and_then(|v| v.as_mut())
    }

    pub(crate) fn triangle_mut(&mut self, global: usize) -> Option<&mut Triangle> {
        self.triangles.get_mut(global).and_then(|t| t.as_mut())
    }

    /// Live vertices of a part, in part-local order.
    pub fn part_vertices(&self, order: usize) -> MeshResult<Vec<&Vertex>> {
        let part = self.part(order)?;
        part.vertices
            .indices()
            .map(|g| {
                self.vertex(g).ok_or_else(|| {
                    MeshError::consistency(format!("part {} references freed vertex {}", order, g))
                })
            })
            .collect()
    }

    /// Live triangles of a part, in part-local order.
    pub fn part_triangles(&self, order: usize) -> MeshResult<Vec<&Triangle>> {
        let part = self.part(order)?;
        part.triangles
            .indices()
            .map(|g| {
                self.triangle(g).ok_or_else(|| {
                    MeshError::consistency(format!(
                        "part {} references freed triangle {}",
                        order, g
                    ))
                })
            })
            .collect()
    }

    pub fn dummies(&self) -> &[Dummy] {
        &self.dummies
    }

    /// Replaces the dummies. Names longer than a name field holds are truncated.
    pub fn set_dummies(&mut self, dummies: Vec<Dummy>) -> MeshResult<()> {
        if dummies.len() > MAX_DUMMIES {
            return Err(MeshError::index("dummy count", dummies.len(), MAX_DUMMIES + 1));
        }
        self.dummies = dummies
            .into_iter()
            .map(|d| Dummy {
                name: truncate_name(&d.name),
                position: d.position,
            })
            .collect();
        Ok(())
    }

    pub fn colors(&self, table: ColorTable) -> &[Color] {
        &self.colors[table.index()]
    }

    pub fn set_colors(&mut self, table: ColorTable, colors: Vec<Color>) -> MeshResult<()> {
        if colors.len() > MAX_COLORS {
            return Err(MeshError::index("color count", colors.len(), MAX_COLORS + 1));
        }
        self.colors[table.index()] = colors;
        Ok(())
    }

    /// Makes room for one more part and returns `(index_position, internal_slot)` for it.
    ///
    /// New parts always come last in order. Their storage reuses the first free slot of
    /// the part collection.
    pub(crate) fn reserve_part(&mut self) -> MeshResult<(usize, usize)> {
        if first_free_tail(&self.part_index) == self.part_index.len() {
            self.grow_parts(1)?;
        }
        let position = first_free_tail(&self.part_index);
        let slot = match self.parts.iter().position(|p| p.is_none()) {
            Some(slot) => slot,
            None => {
                let len = self.parts.len() + 1;
                resize_slots(&mut self.parts, len, "parts")?;
                first_free_tail(&self.parts)
            }
        };
        Ok((position, slot))
    }

    /// Stores `part` at a position obtained from `reserve_part` and returns its order.
    pub(crate) fn commit_part(&mut self, position: usize, slot: usize, part: Part) -> usize {
        self.num_vertices += part.vertices.len();
        self.num_triangles += part.triangles.len();
        self.parts[slot] = Some(part);
        self.part_index[position] = Some(slot);
        self.num_parts += 1;
        self.num_parts - 1
    }

    /// Reserves `count` contiguous global vertex slots after the last referenced vertex.
    pub(crate) fn reserve_vertices(&mut self, count: usize) -> MeshResult<usize> {
        let first = self.first_unused_global_vertex_index()?;
        let required = first + count;
        if self.vertices.len() < required {
            self.grow_vertices(required - self.vertices.len())?;
        }
        Ok(first)
    }

    /// Reserves `count` contiguous global triangle slots after the last referenced triangle.
    pub(crate) fn reserve_triangles(&mut self, count: usize) -> MeshResult<usize> {
        let first = self.first_unused_global_triangle_index()?;
        let required = first + count;
        if self.triangles.len() < required {
            self.grow_triangles(required - self.triangles.len())?;
        }
        Ok(first)
    }
}

/// Bounding-box midpoint of a set of points, or the origin for an empty set.
pub(crate) fn centroid<I: IntoIterator<Item = Vector3>>(points: I) -> Vector3 {
    use ordered_float::OrderedFloat;

    let mut points = points.into_iter().peekable();
    if points.peek().is_none() {
        return ZERO;
    }
    let mut min = [OrderedFloat(f32::INFINITY); 3];
    let mut max = [OrderedFloat(f32::NEG_INFINITY); 3];
    for p in points {
        for (axis, value) in [p.x, p.y, p.z].into_iter().enumerate() {
            min[axis] = min[axis].min(OrderedFloat(value));
            max[axis] = max[axis].max(OrderedFloat(value));
        }
    }
    let mid = |axis: usize| 0.5 * (max[axis].0 - min[axis].0) + min[axis].0;
    Vector3::new(mid(0), mid(1), mid(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn new_mesh_is_empty() {
        let mesh = Mesh::new();
        assert_eq!(0, mesh.num_parts());
        assert_eq!(0, mesh.num_triangles());
        assert_eq!(0, mesh.num_vertices());
        assert_eq!(1, mesh.num_arts());
        assert_eq!(0, mesh.first_unused_part_slot());
        assert_eq!(Ok(0), mesh.first_unused_global_vertex_index());
        assert_eq!(Ok(0), mesh.first_unused_global_triangle_index());
        assert!(mesh.internal_slot_from_order(0).is_err());
    }

    #[test]
    fn grow_parts_keeps_index_and_storage_aligned() {
        let mut mesh = Mesh::new();
        mesh.grow_parts(3).unwrap();
        assert_eq!(6, mesh.parts_len());
        assert_eq!(6, mesh.part_index().len());
        assert!(mesh.part_index().iter().all(|p| p.is_none()));
        assert_eq!(0, mesh.first_unused_part_slot());

        mesh.grow_parts(1).unwrap();
        assert_eq!(12, mesh.part_index().len());
        assert_eq!(12, mesh.parts_len());
    }

    #[test]
    fn part_storage_stays_aligned_while_adding() {
        let mut mesh = Mesh::new();
        for i in 0..9 {
            mesh.add_helper_part(&format!("p{}", i), ZERO).unwrap();
            assert_eq!(mesh.part_index().len(), mesh.parts_len());
        }
        assert!(mesh.is_valid());
    }

    #[test]
    fn too_many_dummies_are_rejected() {
        let mut mesh = Mesh::new();
        let dummies = vec![Dummy::default(); MAX_DUMMIES + 1];
        assert!(matches!(
            mesh.set_dummies(dummies),
            Err(MeshError::Index { .. })
        ));
        assert!(mesh.dummies().is_empty());
    }

    #[test]
    fn centroid_of_box() {
        let c = centroid([
            Vector3::new(-1.0, 0.0, 2.0),
            Vector3::new(3.0, 4.0, 4.0),
            Vector3::new(0.0, 1.0, 3.0),
        ]);
        assert_float_eq!(1.0, c.x, abs <= 0.0001);
        assert_float_eq!(2.0, c.y, abs <= 0.0001);
        assert_float_eq!(3.0, c.z, abs <= 0.0001);
        assert_eq!(ZERO, centroid(Vec::new()));
    }
}
