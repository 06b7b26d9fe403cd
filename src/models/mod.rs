pub mod chat;
pub mod flight;
pub mod travel;
