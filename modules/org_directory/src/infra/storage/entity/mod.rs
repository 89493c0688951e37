pub mod department;
pub mod role;
pub mod role_department;
