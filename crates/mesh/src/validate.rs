use crate::{
    error::{MeshError, MeshResult},
    mesh::{ColorTable, Mesh},
    MAX_COLORS, MAX_DUMMIES,
};

/// Result of a full structural check of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshValidity {
    /// Nothing has ever been allocated.
    EmptyValid,
    Valid,
    Invalid,
}

impl MeshValidity {
    pub fn is_valid(self) -> bool {
        self != MeshValidity::Invalid
    }
}

impl Mesh {
    /// Walks every part, triangle and vertex and reports whether the mesh is consistent.
    ///
    /// Problems are logged at warn level. Use [`Mesh::check`] to get the first problem
    /// as an error instead.
    pub fn validate(&self) -> MeshValidity {
        match self.check() {
            Ok(validity) => validity,
            Err(err) => {
                log::warn!("{}", err);
                MeshValidity::Invalid
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_valid()
    }

    /// Like [`Mesh::validate`], but returns the first violated invariant as a
    /// `MeshError::Consistency`.
    pub fn check(&self) -> MeshResult<MeshValidity> {
        let fail = |message: String| Err(MeshError::consistency(message));

        if self.parts.is_empty()
            && self.part_index.is_empty()
            && self.triangles.is_empty()
            && self.vertices.is_empty()
        {
            if self.num_parts != 0 || self.num_triangles != 0 || self.num_vertices != 0 {
                return fail(format!(
                    "empty mesh claims {} parts, {} triangles, {} vertices",
                    self.num_parts, self.num_triangles, self.num_vertices
                ));
            }
            return Ok(MeshValidity::EmptyValid);
        }

        // Part index list: every entry points at a live part, no part is listed twice, and
        // no live part is missing from the list.
        let mut part_seen = vec![false; self.parts.len()];
        let mut live_entries = 0;
        for (position, slot) in self.part_index.iter().enumerate() {
            let Some(slot) = *slot else { continue };
            if slot >= self.parts.len() {
                return fail(format!(
                    "part index entry {} points to slot {} beyond {}",
                    position,
                    slot,
                    self.parts.len()
                ));
            }
            if self.parts[slot].is_none() {
                return fail(format!(
                    "part index entry {} points to freed slot {}",
                    position, slot
                ));
            }
            if part_seen[slot] {
                return fail(format!("part slot {} is listed twice", slot));
            }
            part_seen[slot] = true;
            live_entries += 1;
        }
        if live_entries != self.num_parts {
            return fail(format!(
                "part index lists {} parts, header says {}",
                live_entries, self.num_parts
            ));
        }
        let stored_parts = self.parts.iter().filter(|p| p.is_some()).count();
        if stored_parts != self.num_parts {
            return fail(format!(
                "{} parts are stored but {} are indexed",
                stored_parts, self.num_parts
            ));
        }

        // Per-part lists. Every global index belongs to exactly one part.
        let mut vertex_owner: Vec<Option<usize>> = vec![None; self.vertices.len()];
        let mut triangle_owner: Vec<Option<usize>> = vec![None; self.triangles.len()];
        let mut sum_vertices = 0;
        let mut sum_triangles = 0;
        for (order, part) in self.parts().enumerate() {
            for (list, owner, live, what) in [
                (&part.vertices, &mut vertex_owner, self.vertices.len(), "vertex"),
                (&part.triangles, &mut triangle_owner, self.triangles.len(), "triangle"),
            ] {
                if list.count_live() != list.len() {
                    return fail(format!(
                        "part {} {} list holds {} entries, count says {}",
                        order,
                        what,
                        list.count_live(),
                        list.len()
                    ));
                }
                for global in list.indices() {
                    if global >= live {
                        return fail(format!(
                            "part {} references {} {} beyond {}",
                            order, what, global, live
                        ));
                    }
                    if let Some(other) = owner[global] {
                        return fail(format!(
                            "{} {} is shared by parts {} and {}",
                            what, global, other, order
                        ));
                    }
                    owner[global] = Some(order);
                }
            }
            for global in part.vertices.indices() {
                if self.vertices[global].is_none() {
                    return fail(format!("part {} references freed vertex {}", order, global));
                }
            }
            for global in part.triangles.indices() {
                let Some(triangle) = &self.triangles[global] else {
                    return fail(format!(
                        "part {} references freed triangle {}",
                        order, global
                    ));
                };
                for &v in triangle.vertices.iter() {
                    if vertex_owner.get(v).copied().flatten() != Some(order) {
                        return fail(format!(
                            "triangle {} of part {} references vertex {} it does not own",
                            global, order, v
                        ));
                    }
                }
            }
            sum_vertices += part.vertices.len();
            sum_triangles += part.triangles.len();
        }
        if sum_vertices != self.num_vertices {
            return fail(format!(
                "parts own {} vertices, header says {}",
                sum_vertices, self.num_vertices
            ));
        }
        if sum_triangles != self.num_triangles {
            return fail(format!(
                "parts own {} triangles, header says {}",
                sum_triangles, self.num_triangles
            ));
        }
        let stored_vertices = self.vertices.iter().filter(|v| v.is_some()).count();
        let stored_triangles = self.triangles.iter().filter(|t| t.is_some()).count();
        if stored_vertices != self.num_vertices || stored_triangles != self.num_triangles {
            return fail(format!(
                "{} vertices and {} triangles are stored but not all are owned",
                stored_vertices, stored_triangles
            ));
        }

        if self.dummies.len() > MAX_DUMMIES {
            return fail(format!("{} dummies", self.dummies.len()));
        }
        for table in ColorTable::ALL {
            if self.colors(table).len() > MAX_COLORS {
                return fail(format!(
                    "{} {:?} colors",
                    self.colors(table).len(),
                    table
                ));
            }
        }

        Ok(MeshValidity::Valid)
    }
}
