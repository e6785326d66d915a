//! API handlers for Depot REST endpoints

pub mod health;
pub mod item_types;
pub mod openapi;
pub mod requests;
pub mod returns;
