//! Merge trees over per-worker partial states
//!
//! Every tree here is generic over [`Combine`]: the shape of the tree and
//! the memory it communicates through are decided here, the merge itself is
//! not. Each function runs one phase for all participating workers before
//! starting the next one.

use crate::algorithm::Combine;
use crate::runtime::BlockShape;
use crate::runtime::cpu::block::{LaneGroup, SharedScratch};

/// Rotation tree inside one lane group
///
/// In round `r` lane `l` merges the value of lane `(l + 2^r) mod width`.
/// After `log2(width)` rounds lane 0 holds the merge of the whole group.
/// `shadow` receives the pre-round snapshot and must be as wide as `group`.
pub fn lane_rotate_reduce<S: Combine>(group: &mut [S], shadow: &mut [S]) {
    let width = group.len();
    let mut offset = 1;
    while offset < width {
        shadow.copy_from_slice(group);
        let lanes = LaneGroup::new(&shadow[..]);
        for (lane, state) in group.iter_mut().enumerate() {
            *state = state.combine(lanes.exchange(lane + offset));
        }
        offset <<= 1;
    }
}

/// Butterfly tree inside one lane group
///
/// In round `r` lane `l` merges lane `l ^ 2^r`; afterwards every lane holds
/// the merge of the whole group.
pub fn lane_butterfly_reduce<S: Combine>(group: &mut [S], shadow: &mut [S]) {
    let width = group.len();
    let mut mask = 1;
    while mask < width {
        shadow.copy_from_slice(group);
        let lanes = LaneGroup::new(&shadow[..]);
        for (lane, state) in group.iter_mut().enumerate() {
            *state = state.combine(lanes.exchange_xor(lane, mask));
        }
        mask <<= 1;
    }
}

/// Halving tree inside every lane group, through block scratch
///
/// Needs one scratch slot per worker. Afterwards lane 0 of each group holds
/// the merge of its group.
pub fn lane_scratch_reduce<S: Combine + Default>(
    regs: &mut [S],
    scratch: &mut SharedScratch<S>,
    shape: BlockShape,
) {
    let lanes = shape.lanes();
    for (thrx, state) in regs.iter().enumerate() {
        scratch.write(thrx, thrx, *state);
    }
    scratch.barrier();

    let mut offset = lanes / 2;
    while offset > 0 {
        for (thrx, state) in regs.iter_mut().enumerate() {
            if thrx % lanes < offset {
                *state = state.combine(scratch.read(thrx, thrx + offset));
            }
        }
        scratch.barrier();
        if offset > 1 {
            for (thrx, state) in regs.iter().enumerate() {
                if thrx % lanes < offset {
                    scratch.write(thrx, thrx, *state);
                }
            }
            scratch.barrier();
        }
        offset /= 2;
    }
}

/// Halving tree across lane groups, through block scratch
///
/// Each group's result is expected in its lane 0. With `offset` halving from
/// `groups / 2`, heads of groups `[offset, 2 * offset)` publish to slot
/// `g - offset` and heads of groups `[0, offset)` merge slot `g`.
/// Afterwards worker 0 holds the merge of the whole block.
pub fn group_tree_reduce<S: Combine + Default>(
    regs: &mut [S],
    scratch: &mut SharedScratch<S>,
    shape: BlockShape,
) {
    let lanes = shape.lanes();
    let mut offset = shape.groups() / 2;
    while offset > 0 {
        for g in offset..2 * offset {
            let head = g * lanes;
            scratch.write(head, g - offset, regs[head]);
        }
        scratch.barrier();
        for g in 0..offset {
            let head = g * lanes;
            regs[head] = regs[head].combine(scratch.read(head, g));
        }
        scratch.barrier();
        offset /= 2;
    }
}

/// Hand worker 0's value to every worker through scratch slot 0
pub fn block_broadcast<S: Copy + Default>(regs: &mut [S], scratch: &mut SharedScratch<S>) {
    scratch.write(0, 0, regs[0]);
    scratch.barrier();
    for (thrx, state) in regs.iter_mut().enumerate() {
        *state = scratch.read(thrx, 0);
    }
}

/// Hand lane 0's value to every lane of a single group by lane exchange
pub fn lane_broadcast<S: Copy>(group: &mut [S], shadow: &mut [S]) {
    shadow.copy_from_slice(group);
    let lanes = LaneGroup::new(&shadow[..]);
    for state in group.iter_mut() {
        *state = lanes.exchange(0);
    }
}
