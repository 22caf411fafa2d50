//! InMemory 実装
//!
//! プロセス内の HashMap を永続化先として使う。再起動すると履歴は消える。

mod message;

pub use message::InMemoryMessageStore;
