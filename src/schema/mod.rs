pub mod auth;
pub mod boq;
pub mod common;
pub mod department;
pub mod designation;
pub mod offer;
pub mod permission;
pub mod product;
pub mod request;
pub mod role;
pub mod role_assignment;
pub mod user;
