//! Volume-based allocation of customer orders to shipping containers.
//!
//! `packer::OrderPacker` is the entry point; `api` exposes it over HTTP.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod packer;
pub mod product;
pub mod types;
