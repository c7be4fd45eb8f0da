/// Describes what a keyed index is: something that can find, change and drop
/// a value by its string key in (amortized) constant time.
pub trait KeyedIndex<V> {
    /// Get the value stored under a key, if any.
    fn get(&self, k: &str) -> Option<&V>;

    /// Get a mutable reference to the value stored under a key, if any. The
    /// entry's position in the index does not change.
    fn get_mut(&mut self, k: &str) -> Option<&mut V>;

    /// Whether a key is present.
    fn contains_key(&self, k: &str) -> bool {
        self.get(k).is_some()
    }

    /// Drop the entry for a key, returning whatever was there.
    fn remove(&mut self, k: &str) -> Option<V>;

    /// Empties the index.
    fn clear(&mut self);

    /// The number of entries stored right now.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
