//! HTTP request handlers

pub mod access_control;
pub mod health;
pub mod tenants;
