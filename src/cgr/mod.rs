//! Condensed graphs of reaction: building them from reagents and
//! products, and taking them apart again.

mod balance;
mod compose;
mod decompose;
mod rules;
mod split;
mod union;

pub use balance::{BoundaryGroup, IdAllocator};
pub use compose::{compose, compose_with, ComposeOptions};
pub use decompose::decompose;
pub use rules::{Rule, RuleLog};
pub use split::split;
pub use union::union;
