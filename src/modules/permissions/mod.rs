//! Permission catalogue: create, rename and delete permissions.

pub mod controller;
pub mod router;
pub mod service;
