#![forbid(unsafe_code)]

pub mod kv;
pub mod results;
pub mod sqlite;

pub use kv::{InMemoryStore, KeyValueStore, Storage, StorageError};
pub use results::{RESULTS_KEY, ResultsStore, StoreError};
pub use sqlite::{SqliteInitError, SqliteStore};
