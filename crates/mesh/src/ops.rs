use crate::{
    error::{MeshError, MeshResult},
    geometry::{Triangle, Vector3, Vertex, ZERO},
    inject::PartGeometry,
    mesh::{centroid, Mesh},
};
use std::collections::HashMap;

impl Mesh {
    /// Returns the midpoint of the bounding box of a part's vertices, in part-local
    /// coordinates. A part without vertices has its centroid at the origin.
    pub fn part_local_centroid(&self, order: usize) -> MeshResult<Vector3> {
        let vertices = self.part_vertices(order)?;
        Ok(centroid(vertices.into_iter().map(|v| v.position)))
    }

    /// Moves a part's origin to `new_position` without moving its vertices in world space.
    ///
    /// Every vertex (damaged state included) is shifted by the difference between the
    /// old and new part position.
    pub fn set_part_center(&mut self, order: usize, new_position: Vector3) -> MeshResult<()> {
        let part = self.part(order)?;
        let delta = part.position - new_position;
        let globals: Vec<usize> = part.vertices.indices().collect();
        for global in globals {
            if let Some(vertex) = self.vertex_mut(global) {
                vertex.position += delta;
                vertex.damaged_position += delta;
            }
        }
        self.part_mut(order)?.position = new_position;
        Ok(())
    }

    /// Recenters a part around the centroid of its vertices.
    ///
    /// The new part position is given in the same frame as the old one, so the part does
    /// not move.
    pub fn center_part(&mut self, order: usize) -> MeshResult<()> {
        let local = self.part_local_centroid(order)?;
        let position = self.part(order)?.position;
        self.set_part_center(order, position + local)
    }

    /// Snapshots a part as self-contained geometry with part-local vertex references.
    pub fn extract_part(&self, order: usize) -> MeshResult<PartGeometry> {
        let part = self.part(order)?;
        let mut local: HashMap<usize, usize> = HashMap::with_capacity(part.num_vertices());
        let mut vertices = Vec::with_capacity(part.num_vertices());
        for (i, global) in part.vertices.indices().enumerate() {
            let vertex = self.vertex(global).ok_or_else(|| {
                MeshError::consistency(format!("part {} references freed vertex {}", order, global))
            })?;
            local.insert(global, i);
            vertices.push(*vertex);
        }
        let mut triangles = Vec::with_capacity(part.num_triangles());
        for global in part.triangles.indices() {
            let triangle = self.triangle(global).ok_or_else(|| {
                MeshError::consistency(format!(
                    "part {} references freed triangle {}",
                    order, global
                ))
            })?;
            let mut copy: Triangle = *triangle;
            for v in copy.vertices.iter_mut() {
                let old = *v;
                *v = *local.get(&old).ok_or_else(|| {
                    MeshError::consistency(format!(
                        "triangle {} of part {} references foreign vertex {}",
                        global, order, old
                    ))
                })?;
            }
            triangles.push(copy);
        }
        Ok(PartGeometry {
            name: part.name.clone(),
            position: part.position,
            vertices,
            triangles,
        })
    }

    /// Deep-copies part `src_order` of `src` into this mesh and returns the new part's order.
    ///
    /// To copy a part within a single mesh use [`Mesh::copy_own_part`].
    pub fn copy_part_from(&mut self, src: &Mesh, src_order: usize) -> MeshResult<usize> {
        let geometry = src.extract_part(src_order)?;
        self.add_part(geometry)
    }

    /// Duplicates one of this mesh's parts and returns the copy's order.
    pub fn copy_own_part(&mut self, order: usize) -> MeshResult<usize> {
        let geometry = self.extract_part(order)?;
        self.add_part(geometry)
    }

    /// Deletes a part together with all vertices and triangles it owns.
    ///
    /// Freed slots are left empty for later reuse. Parts after `order` move up by one.
    pub fn delete_part(&mut self, order: usize) -> MeshResult<()> {
        let position = self.index_position(order)?;
        let slot = self.part_index[position]
            .ok_or_else(|| MeshError::index("part order", order, self.num_parts))?;
        let part = self.parts[slot]
            .take()
            .ok_or_else(|| MeshError::consistency(format!("part slot {} is empty", slot)))?;
        self.part_index[position] = None;

        for global in part.vertices.indices() {
            if let Some(v) = self.vertices.get_mut(global) {
                *v = None;
            }
        }
        for global in part.triangles.indices() {
            if let Some(t) = self.triangles.get_mut(global) {
                *t = None;
            }
        }
        self.num_vertices -= part.vertices.len();
        self.num_triangles -= part.triangles.len();
        self.num_parts -= 1;
        log::debug!("deleted part {} {:?}", order, part.name);
        Ok(())
    }

    /// Deletes the given triangles of a part, addressed by part-local triangle order.
    ///
    /// Vertices are left alone; see [`Mesh::delete_unreferenced_vertices`]. Duplicate
    /// ordinals are deleted once.
    pub fn delete_part_triangles(&mut self, order: usize, ordinals: &[usize]) -> MeshResult<()> {
        let mut ordinals = ordinals.to_vec();
        ordinals.sort_unstable();
        ordinals.dedup();
        let part = self.part(order)?;
        if let Some(&last) = ordinals.last() {
            if last >= part.num_triangles() {
                return Err(MeshError::index("triangle ordinal", last, part.num_triangles()));
            }
        }
        let slots: Vec<usize> = part
            .triangles
            .iter()
            .enumerate()
            .filter(|(local, _)| ordinals.binary_search(local).is_ok())
            .map(|(_, (slot, _))| slot)
            .collect();

        let part = self.part_mut(order)?;
        let mut freed = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(global) = part.triangles.free(slot) {
                freed.push(global);
            }
        }
        for &global in &freed {
            if let Some(t) = self.triangles.get_mut(global) {
                *t = None;
            }
        }
        self.num_triangles -= freed.len();
        Ok(())
    }

    /// Deletes every vertex that no triangle references.
    ///
    /// This walks all triangles of all parts before deleting anything, so it costs time
    /// proportional to the whole mesh. Returns the number of deleted vertices.
    pub fn delete_unreferenced_vertices(&mut self) -> MeshResult<usize> {
        let mut referenced = vec![false; self.vertices.len()];
        for part in self.parts() {
            for global in part.triangles.indices() {
                if let Some(triangle) = self.triangle(global) {
                    for &v in triangle.vertices.iter() {
                        if let Some(r) = referenced.get_mut(v) {
                            *r = true;
                        }
                    }
                }
            }
        }

        let mut deleted = 0;
        let slots: Vec<usize> = self.part_index.iter().flatten().copied().collect();
        for slot in slots {
            let Some(part) = self.parts.get_mut(slot).and_then(|p| p.as_mut()) else {
                continue;
            };
            let unreferenced: Vec<usize> = part
                .vertices
                .iter()
                .filter(|&(_, global)| !referenced.get(global).copied().unwrap_or(false))
                .map(|(list_slot, _)| list_slot)
                .collect();
            for list_slot in unreferenced {
                if let Some(global) = part.vertices.free(list_slot) {
                    if let Some(v) = self.vertices.get_mut(global) {
                        *v = None;
                    }
                    deleted += 1;
                }
            }
        }
        self.num_vertices -= deleted;
        if deleted > 0 {
            log::debug!("deleted {} unreferenced vertices", deleted);
        }
        Ok(deleted)
    }

    /// Creates a new part holding copies of the geometry of two parts and returns its order.
    ///
    /// Each source part's position is folded into its copied vertices and the merged part
    /// sits at the origin. The source parts are kept.
    pub fn merge_parts_to_new(&mut self, order1: usize, order2: usize) -> MeshResult<usize> {
        if order1 == order2 {
            return Err(MeshError::invalid_argument(format!(
                "cannot merge part {} with itself",
                order1
            )));
        }
        let first = self.extract_part(order1)?;
        let second = self.extract_part(order2)?;

        let shift = |vertices: Vec<Vertex>, by: Vector3| {
            vertices.into_iter().map(move |mut v| {
                v.position += by;
                v.damaged_position += by;
                v
            })
        };
        let offset = first.vertices.len();
        let mut vertices = Vec::with_capacity(offset + second.vertices.len());
        vertices.extend(shift(first.vertices, first.position));
        vertices.extend(shift(second.vertices, second.position));

        let mut triangles = first.triangles;
        triangles.extend(second.triangles.into_iter().map(|mut t| {
            for v in t.vertices.iter_mut() {
                *v += offset;
            }
            t
        }));

        self.add_part(PartGeometry {
            name: format!("{}_{}", order1, order2),
            position: ZERO,
            vertices,
            triangles,
        })
    }

    /// Swaps a part with the one before it and returns its new order.
    ///
    /// The first part stays where it is.
    pub fn move_up_part(&mut self, order: usize) -> MeshResult<usize> {
        let position = self.index_position(order)?;
        if order == 0 {
            return Ok(0);
        }
        let previous = self.index_position(order - 1)?;
        self.part_index.swap(position, previous);
        Ok(order - 1)
    }
}
