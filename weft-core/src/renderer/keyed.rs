//! Keyed Children Diff
//!
//! Reconciles an old and a new list of sibling nodes with as few host moves
//! as possible.
//!
//! # Algorithm
//!
//! 1. Patch the common prefix of same-typed nodes.
//! 2. Patch the common suffix.
//! 3. If one side is exhausted, mount what is left of the new list (before
//!    the node that follows it) or unmount what is left of the old list.
//! 4. Otherwise, for the unknown middle:
//!    - index the new middle by key,
//!    - walk the old middle, patching matches and unmounting the rest, while
//!      recording for each new slot which old node (1-based) it reuses,
//!    - if matches were seen out of order, compute the longest increasing
//!      subsequence of that table; those nodes stay put,
//!    - walk the new middle back to front, mounting fresh slots and moving
//!      every reused slot that is not in the subsequence.
//!
//! Walking back to front means the node after the current slot is always
//! already in its final place, so it can serve as the insertion anchor.

use std::collections::HashMap;

use super::host::HostAdapter;
use super::patch::Renderer;
use super::sequence::longest_increasing_subsequence;
use super::vnode::{same_vnode_type, Key, VNode};

type NodeOf<A> = <A as HostAdapter>::Node;

/// Insertion anchor for a node placed at `index` of `nodes`: the first host
/// node of the next sibling, or the parent's anchor past the end.
fn anchor_at<N: Clone>(nodes: &[VNode<N>], index: usize, parent_anchor: Option<&N>) -> Option<N> {
    match nodes.get(index) {
        Some(next) => next.first_host_node(),
        None => parent_anchor.cloned(),
    }
}

impl<A: HostAdapter + 'static> Renderer<A> {
    pub(crate) fn patch_keyed_children(
        &self,
        c1: &[VNode<NodeOf<A>>],
        c2: &mut [VNode<NodeOf<A>>],
        container: &NodeOf<A>,
        parent_anchor: Option<&NodeOf<A>>,
    ) {
        let mut i = 0;
        // Exclusive ends.
        let mut end1 = c1.len();
        let mut end2 = c2.len();

        while i < end1 && i < end2 && same_vnode_type(&c1[i], &c2[i]) {
            self.patch(Some(&c1[i]), &mut c2[i], container, parent_anchor);
            i += 1;
        }

        while i < end1 && i < end2 && same_vnode_type(&c1[end1 - 1], &c2[end2 - 1]) {
            self.patch(Some(&c1[end1 - 1]), &mut c2[end2 - 1], container, parent_anchor);
            end1 -= 1;
            end2 -= 1;
        }

        if i >= end1 {
            if i < end2 {
                let anchor = anchor_at(c2, end2, parent_anchor);
                for node in &mut c2[i..end2] {
                    self.patch(None, node, container, anchor.as_ref());
                }
            }
            return;
        }

        if i >= end2 {
            for node in &c1[i..end1] {
                self.unmount(node, true);
            }
            return;
        }

        self.patch_unknown_sequence(c1, c2, i, end1, end2, container, parent_anchor);
    }

    #[allow(clippy::too_many_arguments)]
    fn patch_unknown_sequence(
        &self,
        c1: &[VNode<NodeOf<A>>],
        c2: &mut [VNode<NodeOf<A>>],
        start: usize,
        end1: usize,
        end2: usize,
        container: &NodeOf<A>,
        parent_anchor: Option<&NodeOf<A>>,
    ) {
        let to_be_patched = end2 - start;

        let key_to_new_index: HashMap<Key, usize> = (start..end2)
            .filter_map(|j| c2[j].key.clone().map(|key| (key, j)))
            .collect();

        // 1-based old index per new slot; 0 means mount fresh.
        let mut new_index_to_old_index = vec![0usize; to_be_patched];
        let mut moved = false;
        let mut max_new_index_so_far = 0;
        let mut patched = 0;

        for (old_index, prev) in c1.iter().enumerate().take(end1).skip(start) {
            if patched >= to_be_patched {
                self.unmount(prev, true);
                continue;
            }

            let unclaimed = |j: usize, table: &[usize]| table[j - start] == 0;
            let new_index = match &prev.key {
                Some(key) => key_to_new_index
                    .get(key)
                    .copied()
                    .filter(|&j| unclaimed(j, &new_index_to_old_index))
                    .filter(|&j| same_vnode_type(prev, &c2[j])),
                None => (start..end2).find(|&j| {
                    unclaimed(j, &new_index_to_old_index) && same_vnode_type(prev, &c2[j])
                }),
            };

            match new_index {
                None => self.unmount(prev, true),
                Some(j) => {
                    if j >= max_new_index_so_far {
                        max_new_index_so_far = j;
                    } else {
                        moved = true;
                    }
                    new_index_to_old_index[j - start] = old_index + 1;
                    self.patch(Some(prev), &mut c2[j], container, None);
                    patched += 1;
                }
            }
        }

        let stable = if moved {
            longest_increasing_subsequence(&new_index_to_old_index)
        } else {
            Vec::new()
        };
        let mut cursor = stable.len();
        let mut moves = 0usize;
        let mut mounts = 0usize;

        for offset in (0..to_be_patched).rev() {
            let index = start + offset;
            let anchor = anchor_at(c2, index + 1, parent_anchor);

            if new_index_to_old_index[offset] == 0 {
                self.patch(None, &mut c2[index], container, anchor.as_ref());
                mounts += 1;
            } else if moved {
                if cursor > 0 && stable[cursor - 1] == offset {
                    cursor -= 1;
                } else {
                    self.move_vnode(&c2[index], container, anchor.as_ref());
                    moves += 1;
                }
            }
        }

        tracing::trace!(
            reused = patched,
            mounted = mounts,
            moved = moves,
            "keyed middle reconciled"
        );
    }
}
