pub mod boq;
pub mod department;
pub mod designation;
pub mod offer;
pub mod product;
pub mod request;
pub mod role;
pub mod role_assignment;
pub mod user;
