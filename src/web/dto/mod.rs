pub mod admin;
pub mod auth;
pub mod cart;
pub mod courses;
pub mod orders;
pub mod student;
