pub mod admin;
pub mod auth;
pub mod forms;
pub mod public;
pub mod views;
