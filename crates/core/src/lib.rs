//! `billkit-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod document;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use document::DocumentKind;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::CompanyId;
pub use value_object::ValueObject;
