pub mod auth;
pub mod boq;
pub mod department;
#[cfg(test)]
mod department_test;
pub mod designation;
#[cfg(test)]
mod designation_test;
pub mod offer;
pub mod permission;
#[cfg(test)]
mod permission_test;
pub mod product;
pub mod profile;
pub mod request;
pub mod role;
pub mod role_assignment;
#[cfg(test)]
mod role_assignment_test;
pub mod user;
