//! Ergonomic constructors for filter trees.
//!
//! Two flavors: free functions (`eq("age", 30)`) and the fluent
//! `Where::field("age").gt(30)`. Both validate eagerly and return
//! `UqlResult<FilterExpr>`; combine the results with `&`, `|` and `!`.

mod conditions;
mod field;

pub use conditions::*;
pub use field::{FieldRef, Where};
