//! Document compilers. Each entry point comes in three flavours: over an
//! explicit resolver, over a registered model name, and over a
//! [`Filterable`](crate::registry::Filterable) type.

pub mod order;
pub mod predicate;
pub mod select;
