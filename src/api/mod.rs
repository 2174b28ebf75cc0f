//! API handlers for Almacen REST endpoints

pub mod catalog;
pub mod health;
pub mod incidents;
pub mod loans;
pub mod openapi;
pub mod stats;
