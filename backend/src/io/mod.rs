//! # IO Module
//!
//! Interface layer exposing the ledger to clients. Only HTTP/JSON for now;
//! handlers translate DTOs from the `shared` crate and contain no business
//! rules of their own.

pub mod rest;
