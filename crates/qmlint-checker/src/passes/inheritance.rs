//! Cycles in the base-type graph reachable from the document.

use crate::context::PassContext;
use fixedbitset::FixedBitSet;
use qmlint_common::{Diagnostic, category};
use qmlint_resolver::TypeId;

pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    let registry = ctx.registry;
    let tree = ctx.tree;
    let count = registry.type_count();

    let starts = tree
        .iter()
        .filter_map(|(_, node)| node.ty.known())
        .chain(tree.type_references.iter().map(|r| r.ty));

    // grey: on the current path; black: fully explored
    let mut grey = FixedBitSet::with_capacity(count);
    let mut black = FixedBitSet::with_capacity(count);
    let mut cycles: Vec<Vec<TypeId>> = Vec::new();

    for start in starts {
        let mut path = Vec::new();
        let mut current = Some(start);
        while let Some(ty) = current {
            if black.contains(ty.index()) {
                break;
            }
            if grey.contains(ty.index()) {
                if let Some(from) = path.iter().position(|t| *t == ty) {
                    cycles.push(path[from..].to_vec());
                }
                break;
            }
            grey.insert(ty.index());
            path.push(ty);
            current = registry.base(ty);
        }
        for ty in path {
            grey.set(ty.index(), false);
            black.insert(ty.index());
        }
    }

    let root_span = tree.get(tree.root).type_span;
    let mut diagnostics = Vec::new();
    for cycle in &cycles {
        for (offset, member) in cycle.iter().enumerate() {
            let mut names: Vec<&str> = cycle[offset..]
                .iter()
                .chain(&cycle[..offset])
                .map(|t| ctx.type_name(*t))
                .collect();
            names.push(ctx.type_name(*member));
            diagnostics.push(Diagnostic::new(
                category::INHERITANCE_CYCLE,
                root_span,
                format!(
                    "{} is part of an inheritance cycle: {}",
                    ctx.type_name(*member),
                    names.join(" -> ")
                ),
            ));
        }
    }
    diagnostics
}
