//! Parent/child structure of a page of rules.

use petgraph::prelude::*;
use super::Rule;

/// Builds the rule tree of a page. Nodes hold rule indices; an edge goes
/// from each rule to the rules one level deeper that depend on it.
pub fn build(rules: &[Rule]) -> DiGraph<usize, ()> {
	let mut graph = DiGraph::<usize, ()>::with_capacity(rules.len(), rules.len());
	let mut rulestack = Vec::<(u32, NodeIndex)>::new();

	for (index, rule) in rules.iter().enumerate() {
		let node = graph.add_node(index);

		// Unwind to the closest shallower rule
		while let Some(&(level, parent)) = rulestack.last() {
			if level < rule.level {
				if level + 1 == rule.level {
					graph.add_edge(parent, node, ());
				}
				break;
			}
			rulestack.pop();
		}
		rulestack.push((rule.level, node));
	}

	graph
}

/// Indices of rules that sit below level 0 but have no parent, and so can
/// never be evaluated.
pub fn orphans(rules: &[Rule]) -> Vec<usize> {
	let graph = build(rules);

	graph
		.node_indices()
		.filter(|&node| rules[graph[node]].level > 0)
		.filter(|&node| graph.neighbors_directed(node, Incoming).next().is_none())
		.map(|node| graph[node])
		.collect()
}
