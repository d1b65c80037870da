//! Adapters for the outbound ports.

pub mod infra;
pub mod storage;
