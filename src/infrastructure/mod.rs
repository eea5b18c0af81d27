//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//!
//! ## Structure
//!
//! - `repositories/` - Repository implementations (InMemory)

pub mod repositories;

pub use repositories::InMemoryRepository;
