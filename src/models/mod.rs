pub mod coordinate;
pub mod route;
pub mod submission;
pub mod warehouse;
