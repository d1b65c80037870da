//! # Domain Layer
//!
//! Block model, verification rules and the chain checkpoint. Pure: no I/O.

pub mod ack;
pub mod block;
pub mod errors;
pub mod genesis;
pub mod header;
pub mod keys;
pub mod next_offset;
pub mod query;
pub mod state;
