//! SQLite 実装
//!
//! メッセージをファイル上の SQLite データベースに保存する。再起動後も履歴が残る。

mod message;

pub use message::SqliteMessageStore;
