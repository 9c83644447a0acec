//! FG-003: Needs/provides dependency resolution.
//!
//! Builds a provider index over the component cards, derives direct
//! dependency edges (a consumer depends on EVERY component providing a
//! resource it needs — multiple providers over-constrain the order on
//! purpose), and computes a linear execution order with Kahn's algorithm.
//! Ties break by original input order, so the result is deterministic for
//! a given card list. A resource provided by more than one component is
//! reported as a conflict entry; conflicts never block resolution.

use super::error::AssemblyError;
use super::types::{ComponentCard, PipelinePlan};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Resolve a component card list into a pipeline plan.
///
/// Fails only on an unresolved cycle; multi-provider conflicts come back
/// as data on the plan.
pub fn resolve(cards: &[ComponentCard]) -> Result<PipelinePlan, AssemblyError> {
    // Provider index: resource name → providing components, in input order.
    let mut providers: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for (i, card) in cards.iter().enumerate() {
        for resource in &card.provides {
            providers.entry(resource.as_str()).or_default().push(i);
        }
    }

    let mut conflicts = Vec::new();
    for (resource, who) in &providers {
        if who.len() > 1 {
            let names: Vec<&str> = who.iter().map(|&i| cards[i].name.as_str()).collect();
            conflicts.push(format!(
                "\"{}\" provided by [{}]",
                resource,
                names.join(", ")
            ));
        }
    }

    // Direct dependency set per component: the union of all providers of
    // each needed resource. A need nobody provides contributes no edge.
    let mut deps: Vec<Vec<usize>> = vec![Vec::new(); cards.len()];
    for (i, card) in cards.iter().enumerate() {
        let mut seen: FxHashSet<usize> = FxHashSet::default();
        for need in &card.needs {
            if let Some(who) = providers.get(need.as_str()) {
                for &p in who {
                    if seen.insert(p) {
                        deps[i].push(p);
                    }
                }
            }
        }
    }

    // Kahn's algorithm. The ready queue seeds with zero-in-degree
    // components in input order; dependents are discovered by scanning the
    // card list in input order as well.
    let mut in_degree: Vec<usize> = deps.iter().map(Vec::len).collect();
    let mut queue: VecDeque<usize> = (0..cards.len()).filter(|&i| in_degree[i] == 0).collect();

    let mut order: Vec<usize> = Vec::with_capacity(cards.len());
    while let Some(current) = queue.pop_front() {
        order.push(current);
        for (j, d) in deps.iter().enumerate() {
            if d.contains(&current) {
                in_degree[j] -= 1;
                if in_degree[j] == 0 {
                    queue.push_back(j);
                }
            }
        }
    }

    if order.len() != cards.len() {
        let scheduled: FxHashSet<usize> = order.iter().copied().collect();
        let remaining: Vec<String> = cards
            .iter()
            .enumerate()
            .filter(|(i, _)| !scheduled.contains(i))
            .map(|(_, c)| c.name.clone())
            .collect();
        return Err(AssemblyError::CycleDetected { remaining });
    }

    let execution_order: Vec<String> = order.iter().map(|&i| cards[i].name.clone()).collect();

    let mut dependency_graph: IndexMap<String, Vec<String>> = IndexMap::new();
    for card in cards {
        let mut needs: Vec<String> = Vec::new();
        for need in &card.needs {
            if !needs.contains(need) {
                needs.push(need.clone());
            }
        }
        dependency_graph.insert(card.name.clone(), needs);
    }

    Ok(PipelinePlan {
        execution_order,
        dependency_graph,
        conflicts,
    })
}
