pub mod department;
pub mod designation;
pub mod product;
pub mod role;
