pub type Vector3 = cgmath::Vector3<f32>;

// Positions are written to and read from the wire as three consecutive f32s.
static_assertions::assert_eq_size!(Vector3, [f32; 3]);

pub const ZERO: Vector3 = Vector3 {
    x: 0.0,
    y: 0.0,
    z: 0.0,
};

/// A single mesh vertex.
///
/// Every vertex carries a second, "damaged" position and normal that the game blends to
/// when the car takes a hit. `animation` is a flag word; 4 marks the vertex as immovable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector3,
    pub normal: Vector3,
    pub damaged_position: Vector3,
    pub damaged_normal: Vector3,
    pub animation: i32,
}

impl Vertex {
    /// Creates a vertex whose damaged state equals its undamaged state.
    pub fn undamaged(position: Vector3, normal: Vector3) -> Self {
        Vertex {
            position,
            normal,
            damaged_position: position,
            damaged_normal: normal,
            animation: 0,
        }
    }
}

impl std::default::Default for Vertex {
    fn default() -> Self {
        Vertex::undamaged(ZERO, ZERO)
    }
}

/// A textured triangle.
///
/// `vertices` holds global vertex indices into the owning mesh, never part-local ones.
/// `u` and `v` are the texture coordinates of the three corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Triangle {
    pub tex_page: i32,
    pub vertices: [usize; 3],
    pub flag: i32,
    pub u: [f32; 3],
    pub v: [f32; 3],
}

/// A paint color in the game's HSB + transparency encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color {
    pub hue: u8,
    pub saturation: u8,
    pub brightness: u8,
    pub transparency: u8,
}

impl Color {
    pub fn new(hue: u8, saturation: u8, brightness: u8, transparency: u8) -> Self {
        Color {
            hue,
            saturation,
            brightness,
            transparency,
        }
    }
}

/// A named light or attachment point.
#[derive(Debug, Clone, PartialEq)]
pub struct Dummy {
    pub name: String,
    pub position: Vector3,
}

impl std::default::Default for Dummy {
    fn default() -> Self {
        Dummy {
            name: String::new(),
            position: ZERO,
        }
    }
}

/// Vertices of the unit octahedron used to mark dummies and helper parts.
pub const DIAMOND_VERTICES: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];

/// Faces of the unit octahedron, as zero-based indices into `DIAMOND_VERTICES`.
pub const DIAMOND_TRIANGLES: [[usize; 3]; 8] = [
    [2, 5, 0],
    [2, 1, 5],
    [2, 4, 1],
    [2, 0, 4],
    [3, 0, 5],
    [3, 5, 1],
    [3, 1, 4],
    [3, 4, 0],
];

/// Truncates `name` to the longest text a 64-byte, NUL-terminated name field can hold.
pub fn truncate_name(name: &str) -> String {
    name.chars().take(crate::MAX_NAME_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diamond_faces_reference_every_vertex() {
        let mut seen = [false; 6];
        for face in DIAMOND_TRIANGLES.iter() {
            for &v in face {
                seen[v] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn long_names_are_truncated() {
        let name = "x".repeat(100);
        assert_eq!(63, truncate_name(&name).len());
        assert_eq!(":HB", truncate_name(":HB"));
    }
}
