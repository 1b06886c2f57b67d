//! Handout Server Library
//!
//! Converts uploaded PDF presentations into printable handouts by tiling
//! selected slides onto a fixed page grid. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `pdf`: Source document handling and rasterization via MuPDF
//! - `layout`: Grid geometry and handout page composition
//! - `store`: Short-lived upload storage with claim-once semantics
//! - `routes`: HTTP endpoints

pub mod config;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod routes;
pub mod state;
pub mod store;

// Fixture helpers shared by the route and pdf tests
#[cfg(test)]
pub(crate) mod testdata;
