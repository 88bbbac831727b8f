//! Durable storage backing the conversation store.

pub mod durable_slot;
pub mod file_slot;
pub mod memory_slot;

pub use durable_slot::DurableSlot;
pub use file_slot::FileSlot;
pub use memory_slot::MemorySlot;
