//! Data models for the Depot API

pub mod damage;
pub mod enums;
pub mod item_type;
pub mod request;
pub mod return_item;
pub mod transaction;
