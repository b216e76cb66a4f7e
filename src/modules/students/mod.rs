//! Students. CPFs are validated on input and stored formatted
//! (`XXX.XXX.XXX-XX`); every student belongs to an existing school.

pub mod controller;
pub mod router;
pub mod service;
