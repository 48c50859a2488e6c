pub mod active;
pub mod api;
pub mod board;
pub mod client;
pub mod command;
pub mod piece;
pub mod records;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod sfx;
pub mod store;
