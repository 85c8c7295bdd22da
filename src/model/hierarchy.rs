// src/model/hierarchy.rs
//
// Class-hierarchy navigation: C3-style linearization of the generalization
// graph and the nominal subtype check built on it.

use rustc_hash::FxHashSet;

use crate::model::{ClassId, ClassKind, Model};
use crate::types::RawType;

impl Model {
    /// C3-style linearization of a class's generalizations: the class itself
    /// first, then its ancestors, most specific first, ending at Top.
    ///
    /// If the hierarchy admits no consistent C3 order, falls back to a
    /// deduplicated depth-first order rather than failing; the walk callers
    /// only rely on "self first, Top last".
    pub fn linearization(&self, class: ClassId) -> Vec<ClassId> {
        self.linearize(class, &mut FxHashSet::default())
    }

    fn linearize(&self, class: ClassId, visiting: &mut FxHashSet<ClassId>) -> Vec<ClassId> {
        let mut result = vec![class];
        if !visiting.insert(class) {
            // Malformed cyclic hierarchy; break rather than recurse forever
            return result;
        }

        let parents: Vec<ClassId> = self
            .direct_superclasses(class)
            .filter(|&p| p != class)
            .collect();

        // Sequences to merge: each parent's linearization, then the parent
        // list itself (preserves local precedence order).
        let mut seqs: Vec<Vec<ClassId>> = parents
            .iter()
            .map(|&p| self.linearize(p, visiting))
            .collect();
        seqs.push(parents);

        loop {
            seqs.retain(|s| !s.is_empty());
            if seqs.is_empty() {
                break;
            }
            let candidate = seqs
                .iter()
                .map(|s| s[0])
                .find(|&head| !seqs.iter().any(|s| s[1..].contains(&head)));
            match candidate {
                Some(next) => {
                    if !result.contains(&next) {
                        result.push(next);
                    }
                    for s in &mut seqs {
                        if s.first() == Some(&next) {
                            s.remove(0);
                        }
                    }
                }
                None => {
                    // Inconsistent hierarchy: dedup in first-seen order
                    for s in &seqs {
                        for &c in s {
                            if !result.contains(&c) {
                                result.push(c);
                            }
                        }
                    }
                    break;
                }
            }
        }

        if self.class(class).kind != ClassKind::Top && !result.contains(&ClassId::TOP) {
            result.push(ClassId::TOP);
        }
        visiting.remove(&class);
        result
    }

    fn direct_superclasses(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.class(class)
            .generalizations
            .iter()
            .filter_map(|&g| self.raw_type_of(g).and_then(RawType::as_class))
    }

    /// Nominal subtype check between class declarations.
    pub fn is_subclass_of(&self, sub: ClassId, sup: ClassId) -> bool {
        if sub == sup || self.class(sup).kind == ClassKind::Top {
            return true;
        }
        if self.class(sub).kind == ClassKind::Bottom {
            return true;
        }
        self.linearization(sub).contains(&sup)
    }

    /// Nominal subtype check between raw types. Classes walk the hierarchy;
    /// ad-hoc function signatures and relation shapes are only subtypes of
    /// themselves (structurally) and of Top.
    pub fn raw_subtype_of(&self, sub: RawType, sup: RawType) -> bool {
        if self.raw_is_top(sup) {
            return true;
        }
        if self.raw_is_bottom(sub) {
            return true;
        }
        match (sub, sup) {
            (RawType::Class(a), RawType::Class(b)) => self.is_subclass_of(a, b),
            (RawType::Function(a), RawType::Function(b)) => {
                a == b || crate::compat::function_sigs_equal(self, a, b)
            }
            (RawType::Relation(a), RawType::Relation(b)) => {
                a == b || self.relations_equal(a, b)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::Fixture;
    use crate::model::ClassId;
    use crate::types::RawType;

    #[test]
    fn linearization_starts_with_self_and_ends_at_top() {
        let f = Fixture::new();
        let lin = f.model.linearization(f.siamese);
        assert_eq!(lin.first(), Some(&f.siamese));
        assert_eq!(lin.last(), Some(&ClassId::TOP));
        assert!(lin.contains(&f.cat));
        assert!(lin.contains(&f.animal));
    }

    #[test]
    fn diamond_linearization_keeps_each_ancestor_once() {
        let mut f = Fixture::new();
        // D extends B and C; B and C both extend Animal
        let b = f.add_plain_class("B", &["app"]);
        let c = f.add_plain_class("C", &["app"]);
        let d = f.add_plain_class("D", &["app"]);
        let animal_ty = f.class_ty(f.animal);
        f.model.add_generalization(b, animal_ty);
        let animal_ty = f.class_ty(f.animal);
        f.model.add_generalization(c, animal_ty);
        let b_ty = f.class_ty(b);
        f.model.add_generalization(d, b_ty);
        let c_ty = f.class_ty(c);
        f.model.add_generalization(d, c_ty);

        let lin = f.model.linearization(d);
        assert_eq!(lin.iter().filter(|&&x| x == f.animal).count(), 1);
        // Local precedence: B before C, both before Animal
        let pos = |x| lin.iter().position(|&y| y == x).unwrap();
        assert!(pos(b) < pos(c));
        assert!(pos(c) < pos(f.animal));
    }

    #[test]
    fn subclass_checks() {
        let f = Fixture::new();
        assert!(f.model.is_subclass_of(f.cat, f.animal));
        assert!(f.model.is_subclass_of(f.siamese, f.animal));
        assert!(!f.model.is_subclass_of(f.animal, f.cat));
        assert!(!f.model.is_subclass_of(f.cat, f.dog));
        // Everything is a subtype of Top; Bottom of everything
        assert!(f.model.is_subclass_of(f.cat, ClassId::TOP));
        assert!(f.model.is_subclass_of(ClassId::BOTTOM, f.cat));
    }

    #[test]
    fn raw_subtype_covers_sentinels() {
        let f = Fixture::new();
        assert!(
            f.model
                .raw_subtype_of(RawType::Class(f.cat), RawType::Class(ClassId::TOP))
        );
        assert!(
            f.model
                .raw_subtype_of(RawType::Class(ClassId::BOTTOM), RawType::Class(f.cat))
        );
        assert!(
            !f.model
                .raw_subtype_of(RawType::Class(f.animal), RawType::Class(f.cat))
        );
    }
}
