//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod discount;
pub mod image;
pub mod option;
pub mod product;
pub mod product_root;
pub mod user;
pub mod webhook;
