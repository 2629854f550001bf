use crate::mesh::{ColorTable, Mesh};
use std::fmt;

/// Roles of the first parts of a variant-3 car model, by part order.
pub const FCE3_PART_ROLES: [&str; 13] = [
    "high body",
    "left front wheel",
    "right front wheel",
    "left rear wheel",
    "right rear wheel",
    "medium body",
    "medium r front wheel",
    "medium l front wheel",
    "medium r rear wheel",
    "medium l rear wheel",
    "small body",
    "tiny body",
    "high headlights",
];

/// Human readable overview of a mesh, see [`Mesh::summary`].
pub struct MeshSummary<'a> {
    mesh: &'a Mesh,
}

impl Mesh {
    /// Returns a value whose `Display` output lists counts, parts, dummies and colors.
    pub fn summary(&self) -> MeshSummary<'_> {
        MeshSummary { mesh: self }
    }
}

impl<'a> fmt::Display for MeshSummary<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mesh = self.mesh;
        writeln!(f, "NumTriangles = {}", mesh.num_triangles())?;
        writeln!(f, "triangles_len = {}", mesh.triangles_len())?;
        writeln!(f, "NumVertices = {}", mesh.num_vertices())?;
        writeln!(f, "vertices_len = {}", mesh.vertices_len())?;
        writeln!(f, "NumParts = {}", mesh.num_parts())?;
        writeln!(f, "parts_len = {}", mesh.parts_len())?;
        writeln!(f, "NumDummies = {}", mesh.dummies().len())?;
        writeln!(f, "NumColors = {}", mesh.colors(ColorTable::Primary).len())?;
        writeln!(f, "NumSecColors = {}", mesh.colors(ColorTable::Secondary).len())?;

        writeln!(
            f,
            "Parts:\nOrd Idx   Verts  Triangles  (PartPos)                          FCE3 role            Name"
        )?;
        let (mut vertices, mut triangles) = (0, 0);
        let slots = mesh.part_index().iter().flatten();
        for (order, (part, slot)) in mesh.parts().zip(slots).enumerate() {
            writeln!(
                f,
                " {:2}  {:2}   {:5}      {:5}  ({:9.6}, {:9.6}, {:9.6})  {:>20} {}",
                order,
                slot,
                part.num_vertices(),
                part.num_triangles(),
                part.position().x,
                part.position().y,
                part.position().z,
                FCE3_PART_ROLES.get(order).copied().unwrap_or(""),
                part.name()
            )?;
            vertices += part.num_vertices();
            triangles += part.num_triangles();
        }
        writeln!(f, "    = {:5}    = {:5}", vertices, triangles)?;

        writeln!(f, "DummyNames (Position):")?;
        for (i, dummy) in mesh.dummies().iter().enumerate() {
            writeln!(
                f,
                " {:2}  ({:9.6}, {:9.6}, {:9.6}) {}",
                i, dummy.position.x, dummy.position.y, dummy.position.z, dummy.name
            )?;
        }

        writeln!(f, "Car colors (hue, saturation, brightness, transparency):")?;
        let labels = ["Primary    ", "Interior   ", "Secondary  ", "Driver hair"];
        for i in 0..mesh.colors(ColorTable::Primary).len() {
            for (table, label) in ColorTable::ALL.iter().zip(labels) {
                if let Some(c) = mesh.colors(*table).get(i) {
                    writeln!(
                        f,
                        " {:2}  {} {:3}, {:3}, {:3}, {:3}",
                        i, label, c.hue, c.saturation, c.brightness, c.transparency
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ZERO;

    #[test]
    fn summary_lists_parts_with_roles() {
        let mut mesh = Mesh::new();
        mesh.add_helper_part(":HB", ZERO).unwrap();
        let text = mesh.summary().to_string();
        assert!(text.contains("NumParts = 1"));
        assert!(text.contains("high body"));
        assert!(text.contains(":HB"));
        assert!(text.contains("    =     6    =     8"));
    }
}
