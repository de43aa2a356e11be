pub mod compute;
pub mod config;
pub mod entities;
pub mod formation;
pub mod removal;
