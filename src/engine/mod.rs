pub mod assignment;
pub mod dispatch;
pub mod earnings;
pub mod matrix;
pub mod route;
pub mod scoring;
