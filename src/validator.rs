//! Validator — structural and referential checks over a document.
//!
//! Pure and total: issues are diagnostics only and never block editing or
//! serialization.

use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::syntax::diagnostics::{IssueCode, IssueTarget, ValidationIssue};
use crate::syntax::types::{DiagramDocument, resolved_edge_ids};

/// Check a document and return every issue found, in a stable order.
pub fn validate(doc: &DiagramDocument) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_duplicates(doc, &mut issues);
    check_edges(doc, &mut issues);
    check_subgraphs(doc, &mut issues);
    issues
}

fn check_duplicates(doc: &DiagramDocument, issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for node in &doc.nodes {
        if !seen.insert(node.id.as_str()) {
            issues.push(ValidationIssue::error(
                IssueCode::DuplicateNodeId,
                IssueTarget::Node(node.id.clone()),
                format!("node id '{}' is used more than once", node.id),
            ));
        }
    }

    let mut seen = HashSet::new();
    for id in doc.edges.iter().filter_map(|e| e.id.as_deref()) {
        if !seen.insert(id) {
            issues.push(ValidationIssue::error(
                IssueCode::DuplicateEdgeId,
                IssueTarget::Edge(id.to_string()),
                format!("edge id '{id}' is used more than once"),
            ));
        }
    }

    let mut seen = HashSet::new();
    for sg in &doc.subgraphs {
        if !seen.insert(sg.id.as_str()) {
            issues.push(ValidationIssue::error(
                IssueCode::DuplicateSubgraphId,
                IssueTarget::Subgraph(sg.id.clone()),
                format!("subgraph id '{}' is used more than once", sg.id),
            ));
        }
    }
}

fn check_edges(doc: &DiagramDocument, issues: &mut Vec<ValidationIssue>) {
    let nodes: HashSet<&str> = doc.nodes.iter().map(|n| n.id.as_str()).collect();
    let groups: HashSet<&str> = doc.subgraphs.iter().map(|s| s.id.as_str()).collect();
    let resolves = |id: &str| nodes.contains(id) || groups.contains(id);

    for (edge, edge_id) in doc.edges.iter().zip(resolved_edge_ids(&doc.edges)) {
        let mut endpoints = vec![("source", &edge.source)];
        if edge.target != edge.source {
            endpoints.push(("target", &edge.target));
        }
        for (end, id) in endpoints {
            if !resolves(id.as_str()) {
                issues.push(ValidationIssue::error(
                    IssueCode::MissingEndpoint,
                    IssueTarget::Edge(edge_id.clone()),
                    format!("edge '{edge_id}' {end} references missing node '{id}'"),
                ));
            }
        }
        if edge.source == edge.target {
            issues.push(ValidationIssue::warning(
                IssueCode::SelfLoop,
                IssueTarget::Edge(edge_id.clone()),
                format!("edge '{edge_id}' connects '{}' to itself", edge.source),
            ));
        }
    }
}

fn check_subgraphs(doc: &DiagramDocument, issues: &mut Vec<ValidationIssue>) {
    let nodes: HashSet<&str> = doc.nodes.iter().map(|n| n.id.as_str()).collect();
    let mut owner: HashMap<&str, &str> = HashMap::new();

    for sg in &doc.subgraphs {
        if let Some(parent) = sg.parent.as_deref() {
            if doc.subgraph(parent).is_none() {
                issues.push(ValidationIssue::warning(
                    IssueCode::MissingParent,
                    IssueTarget::Subgraph(sg.id.clone()),
                    format!("subgraph '{}' names missing parent '{parent}'", sg.id),
                ));
            }
        }
        for member in &sg.nodes {
            if !nodes.contains(member.as_str()) {
                issues.push(ValidationIssue::warning(
                    IssueCode::MissingMember,
                    IssueTarget::Subgraph(sg.id.clone()),
                    format!("subgraph '{}' references missing node '{member}'", sg.id),
                ));
                continue;
            }
            match owner.get(member.as_str()) {
                Some(first) if *first != sg.id.as_str() => {
                    issues.push(ValidationIssue::warning(
                        IssueCode::SharedMember,
                        IssueTarget::Node(member.clone()),
                        format!("node '{member}' belongs to both '{first}' and '{}'", sg.id),
                    ));
                }
                Some(_) => {}
                None => {
                    owner.insert(member.as_str(), sg.id.as_str());
                }
            }
        }
    }

    check_nesting(doc, issues);
}

/// Report every subgraph that is its own ancestor.
fn check_nesting(doc: &DiagramDocument, issues: &mut Vec<ValidationIssue>) {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    for sg in &doc.subgraphs {
        index
            .entry(sg.id.as_str())
            .or_insert_with(|| graph.add_node(sg.id.as_str()));
    }
    for sg in &doc.subgraphs {
        let Some(parent) = sg.parent.as_deref() else {
            continue;
        };
        if let (Some(&from), Some(&to)) = (index.get(parent), index.get(sg.id.as_str())) {
            graph.add_edge(from, to, ());
        }
    }

    let mut cyclic: Vec<&str> = Vec::new();
    for component in tarjan_scc(&graph) {
        let looped = component.len() > 1
            || component
                .first()
                .is_some_and(|&n| graph.contains_edge(n, n));
        if looped {
            cyclic.extend(component.iter().map(|&n| graph[n]));
        }
    }
    cyclic.sort_unstable();
    for id in cyclic {
        issues.push(ValidationIssue::error(
            IssueCode::NestingCycle,
            IssueTarget::Subgraph(id.to_string()),
            format!("subgraph '{id}' is nested inside itself"),
        ));
    }
}

#[cfg(test)]
#[path = "../tests/rust/test_validator.rs"]
mod tests;
