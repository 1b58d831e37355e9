pub mod dashboard;
pub mod profile;
pub mod view;
