//! Domain Entities
//!
//! The definition model and its composable sub-traits.
//! - `Definition` - A named, layered entity description (also type signatures)
//! - `Property`, `Behavior`, `Interface` - Keyed sub-traits of a definition
//! - `ReturnValue`, `Parameter` - Sub-traits of a behavior
//! - `Description` - Layered documentation text

mod behavior;
mod definition;
mod description;
mod interface;
mod property;

pub use behavior::{Behavior, Direction, Origin, Parameter, ReturnValue};
pub use definition::Definition;
pub use description::Description;
pub use interface::Interface;
pub use property::{Property, Visibility};
