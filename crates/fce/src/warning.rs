use std::fmt;

/// An unusual but tolerated value found while validating, decoding or encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A global count in the header differs from the sum of the per-part counts.
    CountMismatch {
        what: &'static str,
        header: i64,
        parts: i64,
    },
    NumArts(i32),
    VertexTableOffset(i32),
    FewerPrimaryColors { primary: i32, secondary: i32 },
    DegenerateHalfSize { x: f32, y: f32, z: f32 },
    /// A trailing reserved table does not start where the counts say it should.
    TrailingTableOffset {
        table: &'static str,
        offset: i64,
        expected: i64,
    },
    /// The file is larger than its counts require, within the reserved-table slack.
    TrailingSize { required: i64, actual: i64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::CountMismatch {
                what,
                header,
                parts,
            } => write!(
                f,
                "header {} count {} differs from part total {}",
                what, header, parts
            ),
            Warning::NumArts(n) => write!(f, "NumArts is {}, expected 1", n),
            Warning::VertexTableOffset(offset) => {
                write!(f, "vertex table offset is {:#x}, expected 0", offset)
            }
            Warning::FewerPrimaryColors { primary, secondary } => write!(
                f,
                "{} primary colors but {} secondary colors",
                primary, secondary
            ),
            Warning::DegenerateHalfSize { x, y, z } => {
                write!(f, "unusual HalfSize ({}, {}, {})", x, y, z)
            }
            Warning::TrailingTableOffset {
                table,
                offset,
                expected,
            } => write!(
                f,
                "{} offset {:#x} does not match expected {:#x}",
                table, offset, expected
            ),
            Warning::TrailingSize { required, actual } => write!(
                f,
                "file is {} bytes, counts require {}",
                actual, required
            ),
        }
    }
}

/// Collects warnings, logging each one as it is added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.items.push(warning);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Warning] {
        &self.items
    }

    pub fn extend(&mut self, other: Warnings) {
        self.items.extend(other.items);
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Warnings {
    type Item = Warning;
    type IntoIter = std::vec::IntoIter<Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_insertion_order() {
        let mut warnings = Warnings::new();
        warnings.push(Warning::NumArts(3));
        warnings.push(Warning::VertexTableOffset(16));
        assert_eq!(
            vec![Warning::NumArts(3), Warning::VertexTableOffset(16)],
            warnings.as_slice().to_vec()
        );
    }

    #[test]
    fn display_names_the_field() {
        assert_eq!(
            "vertex table offset is 0x10, expected 0",
            Warning::VertexTableOffset(16).to_string()
        );
    }
}
