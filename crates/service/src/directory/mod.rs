//! Directory module: domain, repository and service layers for students,
//! courses and enrollments.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::DirectoryService;
