//! Property-based invariant tests for the keyed children diff.
//!
//! These tests verify, for any old/new key lists:
//!
//! 1. `longest_increasing_subsequence` returns strictly increasing,
//!    non-zero entries of maximal length (checked against a quadratic DP).
//! 2. After patching, the host children appear in the new key order.
//! 3. The diff moves exactly `matched - LIS` existing nodes, where `LIS` is
//!    the longest run of reused nodes already in relative order.
//! 4. Nodes present in both lists keep their host node.

use std::collections::HashMap;

use proptest::prelude::*;
use weft_core::renderer::{
    longest_increasing_subsequence, HostOp, MemNodeId, MemoryHost, Renderer, VNode,
};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Length of the longest strictly increasing run of non-zero values.
fn lis_len_quadratic(values: &[usize]) -> usize {
    let mut best = vec![0usize; values.len()];
    for i in 0..values.len() {
        if values[i] == 0 {
            continue;
        }
        best[i] = 1;
        for j in 0..i {
            if values[j] != 0 && values[j] < values[i] {
                best[i] = best[i].max(best[j] + 1);
            }
        }
    }
    best.into_iter().max().unwrap_or(0)
}

/// Old keys `0..n`, new keys a shuffled subset of them plus a few fresh ones.
fn key_lists() -> impl Strategy<Value = (Vec<u32>, Vec<u32>)> {
    (0usize..24)
        .prop_flat_map(|n| {
            let old: Vec<u32> = (0..n as u32).collect();
            (
                Just(old.clone()),
                proptest::sample::subsequence(old, 0..=n),
                0u32..6,
            )
        })
        .prop_flat_map(|(old, kept, fresh)| {
            let mut new = kept;
            new.extend((0..fresh).map(|i| 1000 + i));
            (Just(old), Just(new).prop_shuffle())
        })
}

fn list(keys: &[u32]) -> VNode<MemNodeId> {
    VNode::element("ul").with_children(
        keys.iter()
            .map(|&k| VNode::element("li").with_key(i64::from(k)).with_text(k.to_string()))
            .collect(),
    )
}

fn expected_html(keys: &[u32]) -> String {
    let items: String = keys.iter().map(|k| format!("<li>{k}</li>")).collect();
    format!("<ul>{items}</ul>")
}

// ═════════════════════════════════════════════════════════════════════════
// 1. LIS is valid and maximal
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn lis_is_increasing_and_maximal(values in proptest::collection::vec(0usize..12, 0..40)) {
        let lis = longest_increasing_subsequence(&values);

        prop_assert!(lis.iter().all(|&i| values[i] != 0), "LIS includes a zero entry");
        prop_assert!(
            lis.windows(2).all(|w| w[0] < w[1] && values[w[0]] < values[w[1]]),
            "LIS {:?} is not strictly increasing over {:?}", lis, values
        );
        prop_assert_eq!(lis.len(), lis_len_quadratic(&values));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2-4. Keyed diff produces the new order with minimal moves
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn keyed_diff_reorders_with_minimal_moves((old, new) in key_lists()) {
        let mut host = MemoryHost::new();
        let container = host.create_container("root");
        let renderer = Renderer::new(host);
        let mut root = renderer.create_root(container);

        root.render(list(&old));
        let existing = renderer.host().borrow().node_count();
        let ul = renderer.host().borrow().children(container)[0];
        let before: HashMap<u32, MemNodeId> = old
            .iter()
            .copied()
            .zip(renderer.host().borrow().children(ul).iter().copied())
            .collect();
        renderer.host().borrow_mut().clear_ops();

        root.render(list(&new));

        let host = renderer.host().borrow();
        prop_assert_eq!(host.inner_html(container), expected_html(&new));

        // Reused nodes keep their identity.
        for (position, key) in new.iter().enumerate() {
            if let Some(&node) = before.get(key) {
                prop_assert_eq!(host.children(ul)[position], node);
            }
        }

        let moves = host
            .ops()
            .iter()
            .filter(|op| matches!(op, HostOp::Insert { child, .. } if child.index() < existing))
            .count();
        let old_positions: Vec<usize> = new
            .iter()
            .filter_map(|key| old.iter().position(|k| k == key))
            .map(|index| index + 1)
            .collect();
        let matched = old_positions.len();
        let stable = longest_increasing_subsequence(&old_positions).len();
        prop_assert_eq!(moves, matched - stable);
    }
}
