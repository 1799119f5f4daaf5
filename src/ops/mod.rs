//! High-level operations.
//!
//! This module contains the implementation of ferry commands.

pub mod deploy;
pub mod transfer;

pub use deploy::deploy;
pub use transfer::{transfer, TransferOptions, TransferReport};
