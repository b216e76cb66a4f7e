//! # edusys core
//!
//! Foundational types shared by every edusys crate:
//!
//! - [`errors`]: the application error type and its HTTP rendering
//! - [`pagination`]: query parameters and response metadata for list endpoints
//! - [`password`]: bcrypt hashing and verification
//! - [`cpf`]: Brazilian taxpayer number (CPF) validation and formatting
//! - [`capabilities`]: module and action names used in permission records
//!
//! # Example
//!
//! ```ignore
//! use edusys_core::AppError;
//! use edusys_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("School not found"));
//! let hash = hash_password("secure_password")?;
//! ```

pub mod capabilities;
pub mod cpf;
pub mod errors;
pub mod pagination;
pub mod password;

pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
