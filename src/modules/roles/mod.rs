//! Roles, their permission sets and their members.

pub mod controller;
pub mod router;
pub mod service;
