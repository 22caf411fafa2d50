//! MessageStore の実装

pub mod inmemory;
pub mod sqlite;

#[cfg(test)]
mod contract;

pub use inmemory::InMemoryMessageStore;
pub use sqlite::SqliteMessageStore;
