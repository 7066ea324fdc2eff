//! Visitor contract for filter trees.

use super::filter::{AndExpr, Condition, NotExpr, OrExpr};
use crate::error::UqlResult;

/// One implementation per target. `FilterExpr::accept` dispatches to the
/// method matching the node variant; composite handlers are expected to
/// visit their children in source order.
pub trait FilterVisitor {
    type Output;

    fn visit_condition(&mut self, condition: &Condition) -> UqlResult<Self::Output>;
    fn visit_and(&mut self, expr: &AndExpr) -> UqlResult<Self::Output>;
    fn visit_or(&mut self, expr: &OrExpr) -> UqlResult<Self::Output>;
    fn visit_not(&mut self, expr: &NotExpr) -> UqlResult<Self::Output>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FilterExpr, FilterValue, Operator};

    /// Counts leaves and records the order they were reached in.
    #[derive(Default)]
    struct LeafOrder(Vec<String>);

    impl FilterVisitor for LeafOrder {
        type Output = usize;

        fn visit_condition(&mut self, c: &Condition) -> UqlResult<usize> {
            self.0.push(c.field().to_string());
            Ok(1)
        }

        fn visit_and(&mut self, e: &AndExpr) -> UqlResult<usize> {
            let mut n = 0;
            for child in e.expressions() {
                n += child.accept(self)?;
            }
            Ok(n)
        }

        fn visit_or(&mut self, e: &OrExpr) -> UqlResult<usize> {
            let mut n = 0;
            for child in e.expressions() {
                n += child.accept(self)?;
            }
            Ok(n)
        }

        fn visit_not(&mut self, e: &NotExpr) -> UqlResult<usize> {
            e.expression().accept(self)
        }
    }

    #[test]
    fn test_children_visited_in_source_order() {
        let leaf = |f: &str| -> FilterExpr {
            Condition::new(f, Operator::Exists, FilterValue::null())
                .unwrap()
                .into()
        };
        let tree = FilterExpr::and([
            leaf("a"),
            FilterExpr::or([leaf("b"), !leaf("c")]).unwrap(),
            leaf("d"),
        ])
        .unwrap();

        let mut v = LeafOrder::default();
        assert_eq!(tree.accept(&mut v).unwrap(), 4);
        assert_eq!(v.0, vec!["a", "b", "c", "d"]);
    }
}
