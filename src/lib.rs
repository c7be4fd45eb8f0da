//! In-memory keyed indexes: a chained hash table keyed by strings, and a
//! doubly linked list whose nodes can be reached by key in O(1). Neither does
//! any locking; wrap them in your own mutex if you need to share one.
//!
//! ```
//! use keyed_index::{ChainedHashTable, KeyedDoublyLinkedList};
//!
//! let mut table = ChainedHashTable::with_capacity_and_load_factor(10, 0.8);
//! table.insert("name", "John");
//! assert_eq!(Some(&"John"), table.get("name"));
//!
//! let mut list = KeyedDoublyLinkedList::new();
//! list.insert_tail("1", 10).unwrap();
//! list.insert_head("0", 0).unwrap();
//! assert_eq!(vec!["0", "1"], list.keys().collect::<Vec<_>>());
//! assert!(list.insert_tail("1", 11).is_err());
//! ```

pub mod chained_hash_table;
pub mod config;
pub mod djb2_hasher;
pub mod error;
pub mod index;
pub mod keyed_list;

pub use chained_hash_table::ChainedHashTable;
pub use config::TableConfig;
pub use djb2_hasher::{BuildDjb2Hasher, Djb2Hasher};
pub use error::IndexError;
pub use index::KeyedIndex;
pub use keyed_list::KeyedDoublyLinkedList;
