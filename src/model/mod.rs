pub mod data;
pub mod joined;
pub mod relation;

pub use data::EntityId;
