//! Alias properties: invalid expressions, unresolved targets and cycles.
//!
//! Every alias resolves in one step to either an end (an object or a
//! member that is not itself an alias), a failure, or another alias. The
//! alias-to-alias edges form a graph that must be acyclic; each member of
//! a cycle is reported with the cycle starting at itself.

use crate::context::{PassContext, Target};
use fixedbitset::FixedBitSet;
use qmlint_binder::{AliasRecord, ScopeId};
use qmlint_common::{Diagnostic, category};
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    /// The target exists and is not an alias.
    End,
    /// The expression is not `id` or `id.member...`.
    Invalid,
    Unresolved,
    /// The target is the alias at this index.
    Alias(usize),
}

pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    let aliases = &ctx.tree.aliases;
    if aliases.is_empty() {
        return Vec::new();
    }
    let by_owner: FxHashMap<(ScopeId, &str), usize> = aliases
        .iter()
        .enumerate()
        .map(|(i, a)| ((a.scope, a.name.as_str()), i))
        .collect();
    let steps: Vec<Step> = aliases.iter().map(|a| step(ctx, a, &by_owner)).collect();

    let mut diagnostics = Vec::new();
    for (index, alias) in aliases.iter().enumerate() {
        if !ctx.in_region(alias.scope) {
            continue;
        }
        match follow(&steps, index) {
            Outcome::Resolved => {}
            Outcome::Invalid if steps[index] == Step::Invalid => diagnostics.push(Diagnostic::new(
                category::SYNTAX,
                alias.value_span,
                "Invalid alias expression. Only IDs and field member expressions can be aliased.",
            )),
            Outcome::Cycle(cycle) if cycle.contains(&index) => {
                diagnostics.push(cycle_diagnostic(aliases, &cycle, index));
            }
            _ => diagnostics.push(Diagnostic::new(
                category::UNRESOLVED_ALIAS,
                alias.name_span,
                format!("Cannot resolve alias \"{}\"", alias.name),
            )),
        }
    }
    diagnostics
}

/// Resolve `alias` one step.
fn step(ctx: &PassContext<'_>, alias: &AliasRecord, by_owner: &FxHashMap<(ScopeId, &str), usize>) -> Step {
    let tree = ctx.tree;
    let Some(target) = &alias.target else {
        return Step::Invalid;
    };
    let region = tree.region_of(alias.scope);
    let entry = tree
        .lookup_id(region, &target.id)
        .or_else(|| tree.lookup_outer_id(region, &target.id).map(|(_, e)| e));
    let Some(entry) = entry else {
        return Step::Unresolved;
    };
    let Some((first, _)) = target.path.first() else {
        return Step::End;
    };
    if let Some(&next) = by_owner.get(&(entry.scope, first.as_str())) {
        return Step::Alias(next);
    }

    let mut current = Target::Scope(entry.scope);
    for (name, _) in &target.path {
        match ctx.member(current, name) {
            Some(member) => match ctx.member_target(&member) {
                Some(next) => current = next,
                None => return Step::End,
            },
            None if ctx.target_is_checkable(current) => return Step::Unresolved,
            None => return Step::End,
        }
    }
    Step::End
}

enum Outcome {
    Resolved,
    Invalid,
    Unresolved,
    /// Indices of the cycle reached from the start, in edge order.
    Cycle(Vec<usize>),
}

/// Follow alias edges from `start` until an end, a failure or a cycle.
fn follow(steps: &[Step], start: usize) -> Outcome {
    let mut on_path = FixedBitSet::with_capacity(steps.len());
    let mut path = Vec::new();
    let mut current = start;
    loop {
        if on_path.contains(current) {
            let from = path.iter().position(|&i| i == current).unwrap_or(0);
            return Outcome::Cycle(path.split_off(from));
        }
        on_path.insert(current);
        path.push(current);
        match steps[current] {
            Step::End => return Outcome::Resolved,
            Step::Invalid => return Outcome::Invalid,
            Step::Unresolved => return Outcome::Unresolved,
            Step::Alias(next) => current = next,
        }
    }
}

fn cycle_diagnostic(aliases: &[AliasRecord], cycle: &[usize], member: usize) -> Diagnostic {
    let offset = cycle.iter().position(|&i| i == member).unwrap_or(0);
    let mut names: Vec<&str> = cycle[offset..]
        .iter()
        .chain(&cycle[..offset])
        .map(|&i| aliases[i].name.as_str())
        .collect();
    names.push(aliases[member].name.as_str());
    let alias = &aliases[member];
    Diagnostic::new(
        category::ALIAS_CYCLE,
        alias.name_span,
        format!(
            "Alias \"{}\" is part of an alias cycle: {}",
            alias.name,
            names.join(" -> ")
        ),
    )
}
