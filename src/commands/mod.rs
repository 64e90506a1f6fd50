pub mod ask;
pub mod chat;
pub mod import;
pub mod list;
