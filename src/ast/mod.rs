pub mod builders;
pub mod filter;
pub mod operators;
pub mod query;
pub mod values;
pub mod visitor;

pub use self::filter::{AndExpr, Condition, FilterExpr, NotExpr, OrExpr};
pub use self::operators::{FieldType, Operator, SortOrder, ValueShape};
pub use self::query::{OrderBy, Query, WhereClause};
pub use self::values::FilterValue;
pub use self::visitor::FilterVisitor;
