pub mod access;
pub mod common;
pub mod export;
pub mod files;
pub mod fold;
pub mod stage;
