//! Repository Implementations
//!
//! Concrete implementations of domain repository ports.

mod memory;

pub use memory::InMemoryRepository;
