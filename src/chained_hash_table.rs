//! A string-keyed hash table that resolves collisions by chaining. Chains are
//! singly linked lists whose nodes all live in one Vec and point at each other
//! by index, so unlinking an entry is a couple of index writes and a dead slot
//! goes on a freelist to be reused by the next insert.

use std::{fmt, mem};

use log::debug;

use crate::config::TableConfig;
use crate::djb2_hasher::djb2;
use crate::error::IndexError;
use crate::index::KeyedIndex;

/// Alias for the index of an entry in the table's storage vec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct EntryHandle(usize);

/// A node in a collision chain.
struct Entry<V> {
    key: String,

    value: V,

    /// The next entry in the same bucket, if any.
    next: Option<EntryHandle>,
}

/// Maps string keys to values of type `V`.
///
/// Keys are hashed with DJB2 and reduced modulo the number of buckets. New
/// keys are appended to the end of their bucket's chain; when the ratio of
/// entries to buckets goes over the load factor threshold the bucket array is
/// doubled (repeatedly, for thresholds well under one) and every entry is
/// relinked into its new bucket. The table never shrinks.
pub struct ChainedHashTable<V> {
    /// Head of each bucket's chain.
    buckets: Vec<Option<EntryHandle>>,

    /// Every entry ever allocated. `None` slots are on the freelist.
    store: Vec<Option<Entry<V>>>,

    /// Slots in `store` which aren't in use anymore. These will be reused.
    free: Vec<EntryHandle>,

    /// Number of live entries.
    len: usize,

    load_factor_threshold: f64,
}

impl<V> Default for ChainedHashTable<V> {
    fn default() -> Self {
        Self::from_config(TableConfig::default())
    }
}

impl<V> ChainedHashTable<V> {
    /// Makes a table with the default bucket count and load factor threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a table from a config, rejecting a zero bucket count or a load
    /// factor threshold below [`MIN_LOAD_FACTOR_THRESHOLD`](crate::config::MIN_LOAD_FACTOR_THRESHOLD).
    pub fn try_from_config(config: TableConfig) -> Result<Self, IndexError> {
        config.validate()?;

        let mut buckets = Vec::with_capacity(config.initial_capacity);
        buckets.resize(config.initial_capacity, None);

        Ok(Self {
            buckets,
            store: Vec::new(),
            free: Vec::new(),
            len: 0,
            load_factor_threshold: config.load_factor_threshold,
        })
    }

    /// Like [`try_from_config`](Self::try_from_config), but an invalid config
    /// is treated as a bug in the caller and panics.
    pub fn from_config(config: TableConfig) -> Self {
        match Self::try_from_config(config) {
            Ok(table) => table,
            Err(e) => panic!("invalid hash table config: {}", e),
        }
    }

    pub fn try_with_capacity_and_load_factor(
        capacity: usize,
        load_factor_threshold: f64,
    ) -> Result<Self, IndexError> {
        Self::try_from_config(TableConfig {
            initial_capacity: capacity,
            load_factor_threshold,
        })
    }

    /// Makes a table with `capacity` buckets. Panics if `capacity` is zero or
    /// the threshold is below [`MIN_LOAD_FACTOR_THRESHOLD`](crate::config::MIN_LOAD_FACTOR_THRESHOLD).
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor_threshold: f64) -> Self {
        Self::from_config(TableConfig {
            initial_capacity: capacity,
            load_factor_threshold,
        })
    }

    /// Makes a table with `capacity` buckets and the default threshold.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_config(TableConfig::default().with_initial_capacity(capacity))
    }

    /// The number of entries in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The current size of the bucket array.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor_threshold(&self) -> f64 {
        self.load_factor_threshold
    }

    /// Entries per bucket right now.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// The bucket a key belongs in at the current bucket count.
    pub fn bucket_of(&self, key: &str) -> usize {
        (djb2(key) % self.buckets.len() as u64) as usize
    }

    /// Stores a value under a key. If the key was already present its value is
    /// replaced in place and the old one handed back; otherwise the entry goes
    /// on the end of its bucket's chain, which may grow the table.
    pub fn insert<K>(&mut self, key: K, value: V) -> Option<V>
    where
        K: Into<String>,
    {
        let key = key.into();
        let bucket = self.bucket_of(&key);

        // walk the chain, overwriting on a match and remembering the last
        // node so a new entry can be hung off of it
        let mut last = None;
        let mut cursor = self.buckets[bucket];
        while let Some(handle) = cursor {
            let entry = self.entry_mut(handle);
            if entry.key == key {
                return Some(mem::replace(&mut entry.value, value));
            }
            last = Some(handle);
            cursor = entry.next;
        }

        let handle = self.alloc(Entry {
            key,
            value,
            next: None,
        });

        match last {
            Some(tail) => self.entry_mut(tail).next = Some(handle),
            None => self.buckets[bucket] = Some(handle),
        }

        self.len += 1;

        while self.load_factor() > self.load_factor_threshold {
            self.grow();
        }

        #[cfg(test)]
        self.continuity_test();

        None
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.find(key).map(|handle| &self.entry(handle).value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let handle = self.find(key)?;
        Some(&mut self.entry_mut(handle).value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Unlinks the entry for a key from its chain and returns its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let bucket = self.bucket_of(key);

        let mut prev: Option<EntryHandle> = None;
        let mut cursor = self.buckets[bucket];
        while let Some(handle) = cursor {
            let (found, next) = {
                let entry = self.entry(handle);
                (entry.key == key, entry.next)
            };

            if found {
                match prev {
                    Some(prev) => self.entry_mut(prev).next = next,
                    None => self.buckets[bucket] = next,
                }

                let entry = self.release(handle);
                self.len -= 1;

                #[cfg(test)]
                self.continuity_test();

                return Some(entry.value);
            }

            prev = Some(handle);
            cursor = next;
        }

        None
    }

    /// Drops every entry but keeps the current bucket count.
    pub fn clear(&mut self) {
        debug!(
            "clearing hash table of {} entries over {} buckets",
            self.len,
            self.buckets.len()
        );

        for bucket in self.buckets.iter_mut() {
            *bucket = None;
        }
        self.store.clear();
        self.free.clear();
        self.len = 0;

        #[cfg(test)]
        self.continuity_test();
    }

    /// Iterates over every `(key, value)` pair, bucket by bucket and then down
    /// each chain.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            table: self,
            bucket: 0,
            cursor: None,
            remaining: self.len,
        }
    }

    /// All keys in the table, in bucket order. Yields exactly `len()` items
    /// and can be restarted by calling it again.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    fn find(&self, key: &str) -> Option<EntryHandle> {
        let mut cursor = self.buckets[self.bucket_of(key)];
        while let Some(handle) = cursor {
            let entry = self.entry(handle);
            if entry.key == key {
                return Some(handle);
            }
            cursor = entry.next;
        }

        None
    }

    /// Doubles the bucket array and relinks every entry into the bucket it
    /// hashes to under the new size. Chains are rebuilt front-first, so
    /// relative order within a bucket is not kept.
    fn grow(&mut self) {
        let old_count = self.buckets.len();
        let new_count = old_count * 2;

        debug!(
            "growing hash table from {} to {} buckets ({} entries, threshold {})",
            old_count, new_count, self.len, self.load_factor_threshold
        );

        let old_buckets = mem::replace(&mut self.buckets, vec![None; new_count]);

        for head in old_buckets {
            let mut cursor = head;
            while let Some(handle) = cursor {
                let (next, bucket) = {
                    let entry = self.entry(handle);
                    (entry.next, self.bucket_of(&entry.key))
                };

                let chain_head = self.buckets[bucket];
                self.entry_mut(handle).next = chain_head;
                self.buckets[bucket] = Some(handle);

                cursor = next;
            }
        }
    }

    /// Puts an entry in the first free slot, or on the end of the store.
    fn alloc(&mut self, entry: Entry<V>) -> EntryHandle {
        match self.free.pop() {
            Some(handle) => {
                self.store[handle.0] = Some(entry);
                handle
            }
            None => {
                self.store.push(Some(entry));
                EntryHandle(self.store.len() - 1)
            }
        }
    }

    /// Takes an entry out of its slot and freelists the slot. The entry must
    /// already be unlinked from its chain.
    fn release(&mut self, handle: EntryHandle) -> Entry<V> {
        match self.store[handle.0].take() {
            Some(entry) => {
                self.free.push(handle);
                entry
            }
            None => unreachable!("released entry {} twice", handle.0),
        }
    }

    fn entry(&self, handle: EntryHandle) -> &Entry<V> {
        match &self.store[handle.0] {
            Some(entry) => entry,
            None => unreachable!("chain references freed entry {}", handle.0),
        }
    }

    fn entry_mut(&mut self, handle: EntryHandle) -> &mut Entry<V> {
        match &mut self.store[handle.0] {
            Some(entry) => entry,
            None => unreachable!("chain references freed entry {}", handle.0),
        }
    }

    #[cfg(test)]
    fn continuity_test(&self) {
        let mut count = 0;

        // walk every chain, making sure each entry sits in the bucket its key
        // hashes to and that no chain loops back on itself
        for (bucket, head) in self.buckets.iter().enumerate() {
            let mut cursor = *head;
            while let Some(handle) = cursor {
                let entry = self.entry(handle);
                assert_eq!(bucket, self.bucket_of(&entry.key));
                count += 1;
                assert!(count <= self.len);
                cursor = entry.next;
            }
        }

        assert_eq!(self.len, count);
        assert_eq!(self.store.len(), self.len + self.free.len());
        assert_eq!(self.len, self.iter().count());
    }
}

impl<V> KeyedIndex<V> for ChainedHashTable<V> {
    fn get(&self, k: &str) -> Option<&V> {
        ChainedHashTable::get(self, k)
    }

    fn get_mut(&mut self, k: &str) -> Option<&mut V> {
        ChainedHashTable::get_mut(self, k)
    }

    fn contains_key(&self, k: &str) -> bool {
        ChainedHashTable::contains_key(self, k)
    }

    fn remove(&mut self, k: &str) -> Option<V> {
        ChainedHashTable::remove(self, k)
    }

    fn clear(&mut self) {
        ChainedHashTable::clear(self)
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Walks a [`ChainedHashTable`] bucket by bucket.
pub struct Iter<'a, V> {
    table: &'a ChainedHashTable<V>,
    bucket: usize,
    cursor: Option<EntryHandle>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;

        loop {
            if let Some(handle) = self.cursor {
                let entry = table.entry(handle);
                self.cursor = entry.next;
                self.remaining -= 1;
                return Some((entry.key.as_str(), &entry.value));
            }

            if self.bucket >= table.buckets.len() {
                return None;
            }

            self.cursor = table.buckets[self.bucket];
            self.bucket += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, V> ExactSizeIterator for Iter<'a, V> {}

/// Dumps the table's sizing and every bucket's chain, one entry per line.
impl<V> fmt::Display for ChainedHashTable<V>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Hash Table (Size: {}, Count: {}, Load Factor Threshold: {:.2}, Current Load Factor: {:.2})",
            self.buckets.len(),
            self.len,
            self.load_factor_threshold,
            self.load_factor()
        )?;

        for (i, head) in self.buckets.iter().enumerate() {
            writeln!(f, "Bucket {}:", i)?;

            if head.is_none() {
                writeln!(f, "-> Empty")?;
            }

            let mut cursor = *head;
            while let Some(handle) = cursor {
                let entry = self.entry(handle);
                writeln!(f, "-> [Key: {}, Value: {:?}]", entry.key, entry.value)?;
                cursor = entry.next;
            }

            writeln!(f, "-------")?;
        }

        Ok(())
    }
}
