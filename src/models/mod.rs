pub mod assignment;
pub mod coordinate;
pub mod delivery;
pub mod driver;
pub mod order;
pub mod route;
