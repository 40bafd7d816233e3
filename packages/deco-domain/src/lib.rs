pub mod catalog;
pub mod conversation;
pub mod filter_sql;
pub mod message_gate;
