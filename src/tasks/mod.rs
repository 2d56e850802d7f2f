//! Background Tasks Module
//!
//! Contains background tasks that run periodically during service operation.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired `MemoryStore` entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
