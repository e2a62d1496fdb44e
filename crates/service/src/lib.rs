//! Service layer for the enrollment directory on top of `models`.
//! - Separates business rules from data access behind `DirectoryRepository`.
//! - Translates store failures into the `DirectoryError` taxonomy.

pub mod errors;
pub mod directory;
#[cfg(test)]
pub mod test_support;

pub use directory::DirectoryService;
pub use errors::DirectoryError;
