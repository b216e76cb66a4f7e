//! Administration of permission records: which modules and actions each
//! user may use.

pub mod controller;
pub mod router;
pub mod service;
