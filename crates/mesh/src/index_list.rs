use crate::error::{MeshError, MeshResult};

/// Computes the new length of a slot collection that must fit `additional` more slots.
///
/// Collections double in size. If doubling is not enough (including the empty case) we
/// jump straight to twice the required length so the next few insertions stay cheap.
fn grown_len(len: usize, additional: usize) -> Option<usize> {
    let required = len.checked_add(additional)?;
    let doubled = len.checked_mul(2)?;
    if doubled < required {
        required.checked_mul(2)
    } else {
        Some(doubled)
    }
}

/// Extends a holey collection by at least `additional` empty slots.
///
/// On failure the collection is left untouched.
pub(crate) fn grow_slots<T>(
    slots: &mut Vec<Option<T>>,
    additional: usize,
    what: &'static str,
) -> MeshResult<()> {
    let err = || MeshError::Capacity { what, additional };
    let new_len = grown_len(slots.len(), additional).ok_or_else(err)?;
    slots
        .try_reserve_exact(new_len - slots.len())
        .map_err(|_| err())?;
    slots.resize_with(new_len, || None);
    Ok(())
}

/// Extends a holey collection to exactly `len` slots. Longer collections are left alone.
pub(crate) fn resize_slots<T>(
    slots: &mut Vec<Option<T>>,
    len: usize,
    what: &'static str,
) -> MeshResult<()> {
    let current = slots.len();
    if current >= len {
        return Ok(());
    }
    slots
        .try_reserve_exact(len - current)
        .map_err(|_| MeshError::Capacity {
            what,
            additional: len - current,
        })?;
    slots.resize_with(len, || None);
    Ok(())
}

/// Makes sure `slots` has at least `additional` free slots after its last live entry.
pub(crate) fn reserve_tail<T>(
    slots: &mut Vec<Option<T>>,
    additional: usize,
    what: &'static str,
) -> MeshResult<()> {
    let tail = first_free_tail(slots);
    let available = slots.len() - tail;
    if available < additional {
        grow_slots(slots, additional - available, what)?;
    }
    Ok(())
}

/// Returns the position just after the last live slot, or 0 for an all-empty collection.
pub(crate) fn first_free_tail<T>(slots: &[Option<T>]) -> usize {
    slots
        .iter()
        .rposition(|s| s.is_some())
        .map(|p| p + 1)
        .unwrap_or(0)
}

/// A list of global indices with holes.
///
/// Parts use two of these, one mapping part-local vertex order to global vertex indices
/// and one doing the same for triangles. Deleting an element frees its slot without
/// compacting the list, so the *order* of an element is its position among live slots only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexList {
    entries: Vec<Option<usize>>,
    count: usize,
}

impl IndexList {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an empty list with `capacity` free slots.
    pub fn with_capacity(capacity: usize) -> MeshResult<Self> {
        let mut list = IndexList::new();
        if capacity > 0 {
            list.entries
                .try_reserve_exact(capacity)
                .map_err(|_| MeshError::Capacity {
                    what: "index list",
                    additional: capacity,
                })?;
            list.entries.resize(capacity, None);
        }
        Ok(list)
    }

    /// Builds a compact list from a sequence of global indices.
    pub fn from_indices<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        let entries: Vec<Option<usize>> = indices.into_iter().map(Some).collect();
        IndexList {
            count: entries.len(),
            entries,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of allocated slots, live or not.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Raw slots, including freed ones.
    pub fn slots(&self) -> &[Option<usize>] {
        &self.entries
    }

    /// Iterates live entries as `(slot, global_index)` pairs in order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            slots: self.entries.iter().enumerate(),
            remaining: self.count,
        }
    }

    /// Iterates live global indices in order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter().map(|(_, global)| global)
    }

    /// Returns the slot holding the entry with the given order.
    pub fn slot_of(&self, order: usize) -> Option<usize> {
        self.iter().nth(order).map(|(slot, _)| slot)
    }

    /// Returns the global index stored at the given order.
    pub fn get(&self, order: usize) -> Option<usize> {
        self.iter().nth(order).map(|(_, global)| global)
    }

    /// Returns the order of the entry referencing `global`.
    pub fn order_of(&self, global: usize) -> Option<usize> {
        self.indices().position(|g| g == global)
    }

    pub fn contains(&self, global: usize) -> bool {
        self.indices().any(|g| g == global)
    }

    /// Grows the list by `additional` free slots.
    pub fn grow(&mut self, additional: usize) -> MeshResult<()> {
        grow_slots(&mut self.entries, additional, "index list")
    }

    /// Makes sure at least `additional` entries can be pushed without growing.
    pub fn reserve(&mut self, additional: usize) -> MeshResult<()> {
        reserve_tail(&mut self.entries, additional, "index list")
    }

    /// Appends a global index after the last live entry, growing the list if needed.
    pub fn push(&mut self, global: usize) -> MeshResult<usize> {
        self.reserve(1)?;
        let slot = first_free_tail(&self.entries);
        self.entries[slot] = Some(global);
        self.count += 1;
        Ok(slot)
    }

    /// Frees a slot, returning the global index it held.
    pub fn free(&mut self, slot: usize) -> Option<usize> {
        let global = self.entries.get_mut(slot)?.take()?;
        self.count -= 1;
        Some(global)
    }

    /// Counts live slots by walking the whole list rather than trusting `len`.
    pub(crate) fn count_live(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    #[cfg(test)]
    pub(crate) fn set_count_for_test(&mut self, count: usize) {
        self.count = count;
    }
}

impl<'a> IntoIterator for &'a IndexList {
    type Item = (usize, usize);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the live entries of an `IndexList`.
///
/// Stops as soon as the list's live count has been visited, so trailing free slots are
/// never scanned.
pub struct Iter<'a> {
    slots: std::iter::Enumerate<std::slice::Iter<'a, Option<usize>>>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for (slot, entry) in self.slots.by_ref() {
            if let Some(global) = entry {
                self.remaining -= 1;
                return Some((slot, *global));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
