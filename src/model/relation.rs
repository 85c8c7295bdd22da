// src/model/relation.rs
//
// Structural equality and compatibility for tabular (relation) shapes.
// Columns form a named multiset: order does not matter for comparison,
// and duplicate names are allowed (union does not dedupe).

use crate::compat::generic_types_equal;
use crate::model::Model;
use crate::multiplicity::multiplicities_equal;
use crate::types::{Column, RelationId};

impl Model {
    /// Structural equality: same column multiset by name, with equal types,
    /// multiplicities, and wildcard flags.
    pub fn relations_equal(&self, a: RelationId, b: RelationId) -> bool {
        let cols_a = &self.graph.relation(a).columns;
        let cols_b = &self.graph.relation(b).columns;
        if cols_a.len() != cols_b.len() {
            return false;
        }
        let sorted = |cols: &[Column]| {
            let mut idx: Vec<usize> = (0..cols.len()).collect();
            idx.sort_by(|&i, &j| cols[i].name.cmp(&cols[j].name));
            idx
        };
        let order_a = sorted(cols_a);
        let order_b = sorted(cols_b);
        order_a.iter().zip(order_b.iter()).all(|(&i, &j)| {
            let ca = &cols_a[i];
            let cb = &cols_b[j];
            ca.name == cb.name
                && ca.wildcard == cb.wildcard
                && self.column_types_equal(ca, cb)
                && match (&ca.mult, &cb.mult) {
                    (None, None) => true,
                    (Some(ma), Some(mb)) => multiplicities_equal(ma, mb, true),
                    _ => false,
                }
        })
    }

    fn column_types_equal(&self, a: &Column, b: &Column) -> bool {
        match (a.ty, b.ty) {
            (None, None) => true,
            (Some(x), Some(y)) => generic_types_equal(self, x, y),
            _ => false,
        }
    }

    /// Column-set compatibility: `sub` is usable where `sup` is expected iff
    /// every column `sup` requires is present in `sub` with a matching type.
    /// A wildcard column on the super side matches any column; a required
    /// column whose type is Top (or unstated) constrains the name only.
    pub fn relation_compatible(&self, sub: RelationId, sup: RelationId) -> bool {
        let sub_cols = &self.graph.relation(sub).columns;
        let sup_cols = &self.graph.relation(sup).columns;
        sup_cols.iter().all(|wanted| {
            if wanted.wildcard {
                return !sub_cols.is_empty();
            }
            sub_cols.iter().any(|have| {
                have.name == wanted.name
                    && match wanted.ty {
                        None => true,
                        Some(w) => {
                            self.raw_type_of(w).is_some_and(|r| self.raw_is_top(r))
                                || have.ty.is_some_and(|h| generic_types_equal(self, h, w))
                        }
                    }
            })
        })
    }
}
