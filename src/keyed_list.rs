//! A doubly linked list which flattens all its nodes onto a Vec and keeps a
//! side index from key to node, so any node can be found, changed or spliced
//! out in O(1) without walking the list.

use std::{collections::HashMap, fmt, mem};

use log::debug;

use crate::error::IndexError;
use crate::index::KeyedIndex;

/// Alias for the index of a node in the list's storage vec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct NodeHandle(usize);

/// Sentinel before the first node. Never holds data.
const HEAD: NodeHandle = NodeHandle(0);

/// Sentinel after the last node. Never holds data.
const TAIL: NodeHandle = NodeHandle(1);

/// A node that lives in the list.
struct Node<V> {
    /// The key and value. `None` for the sentinels and for freelisted slots.
    entry: Option<(String, V)>,

    /// The index of the node previous to this one.
    prev: NodeHandle,

    /// The index of the next node in the list.
    next: NodeHandle,
}

impl<V> Node<V> {
    fn sentinel() -> Self {
        Node {
            entry: None,
            prev: HEAD,
            next: TAIL,
        }
    }
}

/// An ordered sequence of uniquely keyed values with O(1) insertion at either
/// end and O(1) lookup, update and removal by key.
///
/// Slots 0 and 1 of the store are the head and tail sentinels, so every live
/// node always has a real neighbour on both sides and splicing never has to
/// special-case the ends of the list. A key is in `index` exactly when its
/// node is linked between the sentinels.
///
/// Inserting a key that is already present is refused with
/// [`IndexError::DuplicateKey`]; use [`update`](Self::update) to change a
/// value or [`move_to_front`](Self::move_to_front) to reposition it.
pub struct KeyedDoublyLinkedList<V> {
    /// The sentinels followed by every node ever allocated.
    store: Vec<Node<V>>,

    /// Slots in the store which aren't in use anymore. These will be reused.
    free: Vec<NodeHandle>,

    /// Where each key's node lives.
    index: HashMap<String, NodeHandle>,
}

impl<V> Default for KeyedDoublyLinkedList<V> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<V> KeyedDoublyLinkedList<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list with room for `capacity` nodes before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut store = Vec::with_capacity(capacity + 2);
        store.push(Node::sentinel());
        store.push(Node::sentinel());

        Self {
            store,
            free: Vec::new(),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// The number of nodes in the list.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Puts a new node at the front of the list.
    pub fn insert_head<K>(&mut self, key: K, value: V) -> Result<(), IndexError>
    where
        K: Into<String>,
    {
        self.insert_after(HEAD, key.into(), value)
    }

    /// Puts a new node at the back of the list.
    pub fn insert_tail<K>(&mut self, key: K, value: V) -> Result<(), IndexError>
    where
        K: Into<String>,
    {
        let last = self.store[TAIL.0].prev;
        self.insert_after(last, key.into(), value)
    }

    /// Looks a value up by key without touching the order of the list.
    pub fn get(&self, key: &str) -> Option<&V> {
        let &handle = self.index.get(key)?;
        Some(&self.entry(handle).1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let &handle = self.index.get(key)?;
        Some(&mut self.entry_mut(handle).1)
    }

    /// Overwrites the value stored under a key, returning the old one. The
    /// node stays where it is. If the key isn't present `value` is dropped.
    pub fn update(&mut self, key: &str, value: V) -> Option<V> {
        self.get_mut(key).map(|v| mem::replace(v, value))
    }

    /// Splices the node for a key out of the list and returns its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let handle = self.index.remove(key)?;
        self.unlink(handle);
        let (_, value) = self.release(handle);

        #[cfg(test)]
        self.continuity_test();

        Some(value)
    }

    /// The first key and value in the list.
    pub fn front(&self) -> Option<(&str, &V)> {
        self.peek(self.store[HEAD.0].next)
    }

    /// The last key and value in the list.
    pub fn back(&self) -> Option<(&str, &V)> {
        self.peek(self.store[TAIL.0].prev)
    }

    /// Takes the first node off the list.
    pub fn pop_front(&mut self) -> Option<(String, V)> {
        self.pop(self.store[HEAD.0].next)
    }

    /// Takes the last node off the list.
    pub fn pop_back(&mut self) -> Option<(String, V)> {
        self.pop(self.store[TAIL.0].prev)
    }

    /// Moves the node for a key to the front of the list. Returns false if
    /// the key isn't present.
    pub fn move_to_front(&mut self, key: &str) -> bool {
        let handle = match self.index.get(key) {
            Some(&handle) => handle,
            None => return false,
        };

        self.unlink(handle);
        self.link_after(handle, HEAD);

        #[cfg(test)]
        self.continuity_test();

        true
    }

    /// Moves the node for a key to the back of the list. Returns false if the
    /// key isn't present.
    pub fn move_to_back(&mut self, key: &str) -> bool {
        let handle = match self.index.get(key) {
            Some(&handle) => handle,
            None => return false,
        };

        self.unlink(handle);
        let last = self.store[TAIL.0].prev;
        self.link_after(handle, last);

        #[cfg(test)]
        self.continuity_test();

        true
    }

    /// Empties the list by pointing the sentinels back at each other and
    /// dropping the index. Node storage is released in one go.
    pub fn clear(&mut self) {
        debug!("clearing keyed list of {} nodes", self.len());

        self.store.truncate(2);
        self.store[HEAD.0].next = TAIL;
        self.store[TAIL.0].prev = HEAD;
        self.free.clear();
        self.index.clear();

        #[cfg(test)]
        self.continuity_test();
    }

    /// Walks the list front to back. Call `.rev()` to walk it back to front.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            list: self,
            front: self.store[HEAD.0].next,
            back: self.store[TAIL.0].prev,
            remaining: self.len(),
        }
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Renders the list back to front, in the same format as its `Display`.
    pub fn display_reverse(&self) -> ReverseDisplay<'_, V> {
        ReverseDisplay(self)
    }

    fn insert_after(
        &mut self,
        prev: NodeHandle,
        key: String,
        value: V,
    ) -> Result<(), IndexError> {
        if self.index.contains_key(&key) {
            debug!("refusing to insert duplicate key {:?}", key);
            return Err(IndexError::DuplicateKey { key });
        }

        let handle = self.alloc(Node {
            entry: Some((key.clone(), value)),
            prev,
            next: prev,
        });
        self.link_after(handle, prev);
        self.index.insert(key, handle);

        #[cfg(test)]
        self.continuity_test();

        Ok(())
    }

    fn peek(&self, handle: NodeHandle) -> Option<(&str, &V)> {
        if handle == HEAD || handle == TAIL {
            return None;
        }

        let (k, v) = self.entry(handle);
        Some((k.as_str(), v))
    }

    fn pop(&mut self, handle: NodeHandle) -> Option<(String, V)> {
        if handle == HEAD || handle == TAIL {
            return None;
        }

        self.unlink(handle);
        let (key, value) = self.release(handle);

        let indexed = self.index.remove(&key);
        assert_eq!(
            Some(handle),
            indexed,
            "index and list disagree about key {:?}",
            key
        );

        #[cfg(test)]
        self.continuity_test();

        Some((key, value))
    }

    /// Links a node in directly after `prev`.
    fn link_after(&mut self, handle: NodeHandle, prev: NodeHandle) {
        let next = self.store[prev.0].next;

        self.store[handle.0].prev = prev;
        self.store[handle.0].next = next;
        self.store[prev.0].next = handle;
        self.store[next.0].prev = handle;
    }

    /// Links a node's neighbours to each other so the node isn't in the chain
    /// anymore. The node itself keeps its stale links until reused.
    fn unlink(&mut self, handle: NodeHandle) {
        let prev = self.store[handle.0].prev;
        let next = self.store[handle.0].next;

        self.store[prev.0].next = next;
        self.store[next.0].prev = prev;
    }

    /// Uses the first available location in the store, or pushes onto the end.
    fn alloc(&mut self, node: Node<V>) -> NodeHandle {
        match self.free.pop() {
            Some(handle) => {
                self.store[handle.0] = node;
                handle
            }
            None => {
                self.store.push(node);
                NodeHandle(self.store.len() - 1)
            }
        }
    }

    /// Takes the entry out of an unlinked node and freelists the slot.
    fn release(&mut self, handle: NodeHandle) -> (String, V) {
        match self.store[handle.0].entry.take() {
            Some(entry) => {
                self.free.push(handle);
                entry
            }
            None => unreachable!("released node {} holds no entry", handle.0),
        }
    }

    fn entry(&self, handle: NodeHandle) -> &(String, V) {
        match &self.store[handle.0].entry {
            Some(entry) => entry,
            None => unreachable!("node {} is linked but holds no entry", handle.0),
        }
    }

    fn entry_mut(&mut self, handle: NodeHandle) -> &mut (String, V) {
        match &mut self.store[handle.0].entry {
            Some(entry) => entry,
            None => unreachable!("node {} is linked but holds no entry", handle.0),
        }
    }

    #[cfg(test)]
    fn continuity_test(&self) {
        let mut count = 0;

        // walk forward, checking back links and that every node is indexed
        // under its own key
        let mut cursor = self.store[HEAD.0].next;
        let mut prev = HEAD;
        while cursor != TAIL {
            let node = &self.store[cursor.0];
            assert_eq!(prev, node.prev);
            let (k, _) = self.entry(cursor);
            assert_eq!(Some(&cursor), self.index.get(k));

            count += 1;
            assert!(count <= self.len());

            prev = cursor;
            cursor = node.next;
        }
        assert_eq!(prev, self.store[TAIL.0].prev);
        assert_eq!(self.len(), count);

        // and the same again in reverse through the iterator
        assert_eq!(self.len(), self.iter().rev().count());

        assert_eq!(self.store.len(), 2 + self.len() + self.free.len());
        assert!(self.store[HEAD.0].entry.is_none());
        assert!(self.store[TAIL.0].entry.is_none());
    }
}

impl<V> KeyedIndex<V> for KeyedDoublyLinkedList<V> {
    fn get(&self, k: &str) -> Option<&V> {
        KeyedDoublyLinkedList::get(self, k)
    }

    fn get_mut(&mut self, k: &str) -> Option<&mut V> {
        KeyedDoublyLinkedList::get_mut(self, k)
    }

    fn contains_key(&self, k: &str) -> bool {
        KeyedDoublyLinkedList::contains_key(self, k)
    }

    fn remove(&mut self, k: &str) -> Option<V> {
        KeyedDoublyLinkedList::remove(self, k)
    }

    fn clear(&mut self) {
        KeyedDoublyLinkedList::clear(self)
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

/// Walks a [`KeyedDoublyLinkedList`] from either end.
pub struct Iter<'a, V> {
    list: &'a KeyedDoublyLinkedList<V>,
    front: NodeHandle,
    back: NodeHandle,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let list = self.list;
        let (k, v) = list.entry(self.front);
        self.front = list.store[self.front.0].next;
        self.remaining -= 1;

        Some((k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, V> DoubleEndedIterator for Iter<'a, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let list = self.list;
        let (k, v) = list.entry(self.back);
        self.back = list.store[self.back.0].prev;
        self.remaining -= 1;

        Some((k.as_str(), v))
    }
}

impl<'a, V> ExactSizeIterator for Iter<'a, V> {}

fn write_nodes<'a, V, I>(f: &mut fmt::Formatter<'_>, mut nodes: I) -> fmt::Result
where
    V: fmt::Display + 'a,
    I: Iterator<Item = (&'a str, &'a V)>,
{
    let (k, v) = match nodes.next() {
        Some(first) => first,
        None => return write!(f, "List is empty"),
    };

    write!(f, "nil <- [{}:{}]", k, v)?;
    for (k, v) in nodes {
        write!(f, " <-> [{}:{}]", k, v)?;
    }
    write!(f, " -> nil")
}

/// Renders as `nil <- [a:1] <-> [b:2] -> nil`, front to back.
impl<V> fmt::Display for KeyedDoublyLinkedList<V>
where
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nodes(f, self.iter())
    }
}

/// Back to front rendering of a list, from
/// [`KeyedDoublyLinkedList::display_reverse`].
pub struct ReverseDisplay<'a, V>(&'a KeyedDoublyLinkedList<V>);

impl<'a, V> fmt::Display for ReverseDisplay<'a, V>
where
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nodes(f, self.0.iter().rev())
    }
}

#[cfg(test)]
mod tests {
    use super::KeyedDoublyLinkedList;
    use crate::error::IndexError;
    use crate::index::KeyedIndex;

    fn keys<V>(list: &KeyedDoublyLinkedList<V>) -> Vec<&str> {
        list.keys().collect()
    }

    #[test]
    fn test_insert_ordering() {
        let mut list = KeyedDoublyLinkedList::new();
        list.insert_head("a", 1).unwrap();
        list.insert_head("b", 2).unwrap();
        list.insert_tail("c", 3).unwrap();

        assert_eq!(vec!["b", "a", "c"], keys(&list));
        assert_eq!(vec!["c", "a", "b"], list.keys().rev().collect::<Vec<_>>());
        assert_eq!(3, list.len());
    }

    /// Queues 1, 2, 3 at the tail and removes the middle, to ensure both
    /// directions of the chain are relinked.
    #[test]
    fn test_remove_middle() {
        let mut list = KeyedDoublyLinkedList::with_capacity(5);
        list.insert_tail("1", 10).unwrap();
        list.insert_tail("2", 20).unwrap();
        list.insert_tail("3", 30).unwrap();

        assert_eq!(Some(20), list.remove("2"));

        assert_eq!(vec!["1", "3"], keys(&list));
        assert_eq!(vec!["3", "1"], list.keys().rev().collect::<Vec<_>>());
        assert_eq!("nil <- [1:10] <-> [3:30] -> nil", list.to_string());
        assert_eq!(
            "nil <- [3:30] <-> [1:10] -> nil",
            list.display_reverse().to_string()
        );
    }

    #[test]
    fn test_remove_then_search() {
        let mut list = KeyedDoublyLinkedList::new();
        list.insert_tail("k", "v").unwrap();

        assert_eq!(Some("v"), list.remove("k"));
        assert_eq!(None, list.get("k"));
        assert_eq!(None, list.remove("k"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_ends() {
        let mut list = KeyedDoublyLinkedList::new();
        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            list.insert_tail(*key, i).unwrap();
        }

        assert_eq!(Some(0), list.remove("a"));
        assert_eq!(Some(3), list.remove("d"));
        assert_eq!(vec!["b", "c"], keys(&list));
        assert_eq!(Some(("b", &1)), list.front());
        assert_eq!(Some(("c", &2)), list.back());
    }

    #[test]
    fn test_duplicate_insert_is_refused() {
        let mut list = KeyedDoublyLinkedList::new();
        list.insert_tail("a", 1).unwrap();
        list.insert_tail("b", 2).unwrap();

        assert_eq!(
            Err(IndexError::DuplicateKey {
                key: "a".to_owned()
            }),
            list.insert_head("a", 100)
        );
        assert!(list.insert_tail("b", 200).is_err());

        // nothing moved and nothing changed
        assert_eq!(vec!["a", "b"], keys(&list));
        assert_eq!(Some(&1), list.get("a"));
        assert_eq!(Some(&2), list.get("b"));
        assert_eq!(2, list.len());
    }

    #[test]
    fn test_update_in_place() {
        let mut list = KeyedDoublyLinkedList::new();
        list.insert_tail("a", 1).unwrap();
        list.insert_tail("b", 2).unwrap();
        list.insert_tail("c", 3).unwrap();

        assert_eq!(Some(2), list.update("b", 20));
        assert_eq!(None, list.update("z", 26));

        assert_eq!(vec!["a", "b", "c"], keys(&list));
        assert_eq!(Some(&20), list.get("b"));
        assert!(!list.contains_key("z"));
    }

    #[test]
    fn test_get_mut() {
        let mut list = KeyedDoublyLinkedList::new();
        list.insert_head("names", vec!["ann"]).unwrap();

        list.get_mut("names").unwrap().push("bob");

        assert_eq!(Some(&vec!["ann", "bob"]), list.get("names"));
        assert_eq!(None, list.get_mut("missing"));
    }

    #[test]
    fn test_clear() {
        let mut list = KeyedDoublyLinkedList::new();
        for i in 0..10 {
            list.insert_tail(i.to_string(), i).unwrap();
        }
        list.remove("4");

        list.clear();

        assert_eq!(0, list.len());
        assert!(list.is_empty());
        for i in 0..10 {
            assert_eq!(None, list.get(&i.to_string()));
        }
        assert_eq!(None, list.front());
        assert_eq!(None, list.back());
        assert_eq!("List is empty", list.to_string());

        // and it's usable afterwards
        list.insert_head("x", 1).unwrap();
        assert_eq!(vec!["x"], keys(&list));
    }

    #[test]
    fn test_queue_behaviour() {
        let mut list = KeyedDoublyLinkedList::new();
        list.insert_tail("1", 1).unwrap();
        list.insert_tail("2", 2).unwrap();
        list.insert_tail("3", 3).unwrap();

        let mut drained = Vec::new();
        while let Some((key, value)) = list.pop_front() {
            drained.push((key, value));
        }

        assert_eq!(
            vec![
                ("1".to_owned(), 1),
                ("2".to_owned(), 2),
                ("3".to_owned(), 3)
            ],
            drained
        );
        assert!(list.is_empty());
        assert_eq!(None, list.pop_back());
    }

    #[test]
    fn test_pop_back() {
        let mut list = KeyedDoublyLinkedList::new();
        list.insert_head("a", 1).unwrap();
        list.insert_head("b", 2).unwrap();

        assert_eq!(Some(("a".to_owned(), 1)), list.pop_back());
        assert!(!list.contains_key("a"));
        assert_eq!(Some(("b", &2)), list.front());
        assert_eq!(Some(("b", &2)), list.back());
    }

    #[test]
    fn test_move_to_front_and_back() {
        let mut list = KeyedDoublyLinkedList::new();
        for key in ["a", "b", "c", "d"].iter() {
            list.insert_tail(*key, ()).unwrap();
        }

        assert!(list.move_to_front("c"));
        assert_eq!(vec!["c", "a", "b", "d"], keys(&list));

        assert!(list.move_to_back("a"));
        assert_eq!(vec!["c", "b", "d", "a"], keys(&list));

        // moving to where it already is changes nothing
        assert!(list.move_to_back("a"));
        assert!(list.move_to_front("c"));
        assert_eq!(vec!["c", "b", "d", "a"], keys(&list));

        assert!(!list.move_to_front("z"));
        assert_eq!(4, list.len());
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut list = KeyedDoublyLinkedList::new();
        list.insert_tail("a", 1).unwrap();
        list.insert_tail("b", 2).unwrap();
        list.remove("a");
        list.insert_head("c", 3).unwrap();

        // two sentinels plus two live nodes, nothing on the freelist
        assert_eq!(4, list.store.len());
        assert!(list.free.is_empty());
        assert_eq!(vec!["c", "b"], keys(&list));
    }

    #[test]
    fn test_iter_meets_in_the_middle() {
        let mut list = KeyedDoublyLinkedList::new();
        for i in 0..5 {
            list.insert_tail(i.to_string(), i).unwrap();
        }

        let mut iter = list.values();
        assert_eq!(5, iter.len());
        assert_eq!(Some(&0), iter.next());
        assert_eq!(Some(&4), iter.next_back());
        assert_eq!(Some(&1), iter.next());
        assert_eq!(Some(&3), iter.next_back());
        assert_eq!(Some(&2), iter.next());
        assert_eq!(None, iter.next_back());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn test_through_trait() {
        fn total<I: KeyedIndex<u32>>(index: &I, keys: &[&str]) -> u32 {
            keys.iter().filter_map(|k| index.get(k)).sum()
        }

        let mut list = KeyedDoublyLinkedList::new();
        list.insert_tail("a", 1u32).unwrap();
        list.insert_tail("b", 2u32).unwrap();

        assert_eq!(3, total(&list, &["a", "b", "c"]));

        KeyedIndex::clear(&mut list);
        assert!(KeyedIndex::is_empty(&list));
    }
}
