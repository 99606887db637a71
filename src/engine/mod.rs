pub mod cache;
pub mod estimate;
pub mod proximity;
pub mod route;
pub mod zones;
