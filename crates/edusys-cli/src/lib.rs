//! # edusys CLI
//!
//! Bootstrap operations that cannot go through the HTTP API because they
//! create the first principal able to call it.
//!
//! ```ignore
//! use edusys_cli::admin::create_admin;
//!
//! let created = create_admin(&pool, dto).await?;
//! println!("{}", created.user_id);
//! ```

pub mod admin;
