pub mod config;
pub mod maintenance;
pub mod profile;
pub mod rbac;
