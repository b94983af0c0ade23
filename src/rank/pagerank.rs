// src/rank/pagerank.rs
//! `PageRank` update rule.
//!
//! Ranks are held as integer counts of `10^-precision` units. Each update is
//! evaluated as an exact fraction and rounded half-up once, so ties resolve the
//! same way a decimal implementation would.

use rayon::prelude::*;

use super::graph::GraphNode;
use crate::numeric::{self, decimal_parts, div_half_up, unit_scale};

/// Constants of one iteration, shared by every node.
#[derive(Debug, Clone, Copy)]
struct UpdateRule {
    /// `N`
    nodes: u128,
    /// `10^precision`
    unit: u128,
    /// Damping factor as `damping / scale`.
    damping: u128,
    scale: u128,
    damping_f64: f64,
    precision: u32,
}

impl UpdateRule {
    fn new(node_count: usize, damping: f64, precision: u32) -> Self {
        let (damping_num, scale) = decimal_parts(damping)
            .filter(|&(num, scale)| num <= scale)
            .unwrap_or((0, 0));
        Self {
            nodes: node_count as u128,
            unit: unit_scale(precision),
            damping: damping_num,
            scale,
            damping_f64: damping,
            precision,
        }
    }
}

/// Recomputes every node's rank from the previous iteration's ranks.
///
/// `previous` is only read and `next` only written, so no node can observe a
/// value another node produced in the same iteration. Nodes are processed in
/// parallel; the call returns once all of them are done.
pub fn recompute_into(
    nodes: &[GraphNode],
    previous: &[u64],
    next: &mut [u64],
    damping: f64,
    precision: u32,
) {
    if nodes.is_empty() {
        return;
    }
    let rule = UpdateRule::new(nodes.len(), damping, precision);

    next.par_iter_mut()
        .zip(nodes.par_iter())
        .for_each(|(slot, node)| {
            *slot = exact_rank(node, nodes, previous, &rule)
                .unwrap_or_else(|| approximate_rank(node, nodes, previous, &rule));
        });
}

/// `(1-d)/N + d * Σ previous(from) / outDegree(from)`, in units, rounded half-up.
///
/// With `d = D/S` and the incoming sum `Σ = num/den` (in units) this is
/// `((S-D) * unit * den + D * num * N) / (S * N * den)`. `None` on overflow.
fn exact_rank(node: &GraphNode, nodes: &[GraphNode], previous: &[u64], rule: &UpdateRule) -> Option<u64> {
    if rule.scale == 0 {
        return None;
    }
    let (num, den) = incoming_fraction(node, nodes, previous)?;
    let teleport = (rule.scale - rule.damping)
        .checked_mul(rule.unit)?
        .checked_mul(den)?;
    let linked = rule.damping.checked_mul(num)?.checked_mul(rule.nodes)?;
    let numerator = teleport.checked_add(linked)?;
    let denominator = rule.scale.checked_mul(rule.nodes)?.checked_mul(den)?;
    u64::try_from(div_half_up(numerator, denominator)?).ok()
}

/// `Σ previous(from) / outDegree(from)` as a fraction `num / den`.
fn incoming_fraction(node: &GraphNode, nodes: &[GraphNode], previous: &[u64]) -> Option<(u128, u128)> {
    let mut num: u128 = 0;
    let mut den: u128 = 1;
    for edge in &node.incoming {
        let degree = nodes[edge.from].out_degree as u128;
        if degree == 0 {
            continue;
        }
        let common = den / gcd(den, degree) * degree;
        num = num
            .checked_mul(common / den)?
            .checked_add(u128::from(previous[edge.from]).checked_mul(common / degree)?)?;
        den = common;
        let g = gcd(num, den);
        if g > 1 {
            num /= g;
            den /= g;
        }
    }
    Some((num, den))
}

/// Float evaluation for graphs whose exact fractions do not fit in 128 bits.
#[allow(clippy::cast_precision_loss)]
fn approximate_rank(node: &GraphNode, nodes: &[GraphNode], previous: &[u64], rule: &UpdateRule) -> u64 {
    let d = rule.damping_f64;
    let incoming: f64 = node
        .incoming
        .iter()
        .map(|edge| edge.weight * numeric::from_units(previous[edge.from], rule.precision))
        .sum();
    let teleport = (1.0 - d) / nodes.len() as f64;
    numeric::to_units(teleport + d * incoming, rule.precision)
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

/// Uniform starting rank `1/N`, in units.
#[must_use]
pub fn initial_rank(node_count: usize, precision: u32) -> u64 {
    if node_count == 0 {
        return 0;
    }
    numeric::scaled_ratio(1, node_count as u64, precision)
        .and_then(|units| u64::try_from(units).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::graph::IncomingEdge;

    fn node(name: &str, out_degree: usize, incoming: Vec<IncomingEdge>) -> GraphNode {
        GraphNode {
            name: name.to_string(),
            out_degree,
            incoming,
        }
    }

    #[test]
    fn test_reads_only_previous_buffer() {
        // a <- b, b <- a
        let nodes = vec![
            node("a", 1, vec![IncomingEdge { from: 1, weight: 1.0 }]),
            node("b", 1, vec![IncomingEdge { from: 0, weight: 1.0 }]),
        ];
        let previous = vec![20_000, 80_000];
        let mut next = vec![0; 2];
        recompute_into(&nodes, &previous, &mut next, 0.85, 5);
        assert_eq!(next, vec![75_500, 24_500]);
    }

    #[test]
    fn test_source_only_node_gets_teleport() {
        let nodes = vec![node("a", 0, Vec::new()), node("b", 0, Vec::new())];
        let mut next = vec![0; 2];
        recompute_into(&nodes, &[50_000, 50_000], &mut next, 0.85, 5);
        assert_eq!(next, vec![7_500, 7_500]);
    }

    #[test]
    fn test_teleport_tie_rounds_up() {
        // 0.1 / 32 = 0.003125 exactly, which a float `1.0 - 0.9` lands below.
        let nodes: Vec<_> = (0..32).map(|i| node(&format!("n{i}"), 0, Vec::new())).collect();
        let mut next = vec![0; 32];
        recompute_into(&nodes, &[0; 32], &mut next, 0.9, 5);
        assert!(next.iter().all(|&units| units == 313));
    }

    #[test]
    fn test_incoming_sum_is_exact() {
        // c <- a (outDegree 3), c <- b (outDegree 3): 2 * 0.3 / 3 = 0.2 exactly.
        let nodes = vec![
            node("a", 3, Vec::new()),
            node("b", 3, Vec::new()),
            node(
                "c",
                0,
                vec![
                    IncomingEdge { from: 0, weight: 1.0 / 3.0 },
                    IncomingEdge { from: 1, weight: 1.0 / 3.0 },
                ],
            ),
        ];
        let mut next = vec![0; 3];
        recompute_into(&nodes, &[30_000, 30_000, 0], &mut next, 0.5, 5);
        // 0.5 / 3 + 0.5 * 0.2 = 0.2666666..
        assert_eq!(next[2], 26_667);
        assert_eq!(next[0], 16_667);
    }

    #[test]
    fn test_approximation_matches_exact_path() {
        let nodes = vec![
            node("a", 1, vec![IncomingEdge { from: 1, weight: 1.0 }]),
            node("b", 1, vec![IncomingEdge { from: 0, weight: 1.0 }]),
        ];
        let rule = UpdateRule::new(2, 0.85, 5);
        let previous = [20_000, 80_000];
        assert_eq!(
            approximate_rank(&nodes[0], &nodes, &previous, &rule),
            exact_rank(&nodes[0], &nodes, &previous, &rule).unwrap()
        );
    }

    #[test]
    fn test_initial_rank() {
        assert_eq!(initial_rank(4, 5), 25_000);
        assert_eq!(initial_rank(3, 5), 33_333);
        assert_eq!(initial_rank(0, 5), 0);
    }
}
