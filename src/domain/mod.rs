//! Domain Layer
//!
//! The layered definition model and the engines that resolve, extract and
//! cache it. Nothing here knows how definitions are persisted.
//!
//! ## Structure
//!
//! - `entities/` - Definition and its composable sub-traits
//! - `value_objects/` - Immutable value types (QualifiedName, Mode, Diagnostics)
//! - `services/` - Composition, Resolver, Extractor, CacheEngine
//! - `ports/` - The Repository contract implemented by infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - Storage goes through the `Repository` port
//! 2. **Explicit loaders** - Resolution takes its repository as a value, never a global
//! 3. **Ports & Adapters** - Repository formats live outside the domain

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
