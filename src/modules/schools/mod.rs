//! Schools: CRUD over the `schools` table, guarded by the `schools` module
//! capabilities.

pub mod controller;
pub mod router;
pub mod service;
