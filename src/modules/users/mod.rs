//! User accounts and their role assignment.

pub mod controller;
pub mod router;
pub mod service;
