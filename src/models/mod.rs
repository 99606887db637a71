pub mod delivery;
pub mod location;
pub mod point;
pub mod zone;
