//! Per-block execution state: worker registers, lane groups and shared scratch
//!
//! Worker `thrx = lane + group * lanes` owns `regs[thrx]`. Lane groups are
//! contiguous runs of `lanes` registers. The scratch is the only memory two
//! lane groups can communicate through.

use crate::algorithm::{RowMoments, WelfordState};
use crate::dtype::Accumulate;
use crate::runtime::{BlockShape, LaunchConfig};

const NO_WORKER: usize = usize::MAX;
const MANY_WORKERS: usize = usize::MAX - 1;

// ============================================================================
// Lane exchange
// ============================================================================

/// Lock-step view of one lane group's registers
///
/// A hardware shuffle reads every source lane's value as it was before the
/// shuffle executed, so the view is built over a snapshot of the group,
/// never over registers that are being overwritten in the same round.
#[derive(Clone, Copy, Debug)]
pub struct LaneGroup<'a, S> {
    regs: &'a [S],
}

impl<'a, S: Copy> LaneGroup<'a, S> {
    /// View `regs` as one lane group; its width must be a power of two
    #[inline]
    pub fn new(regs: &'a [S]) -> Self {
        debug_assert!(regs.len().is_power_of_two(), "lane group width must be a power of two");
        Self { regs }
    }

    /// Number of lanes in the group
    #[inline]
    pub fn width(&self) -> usize {
        self.regs.len()
    }

    /// Value held by `src_lane`, taken modulo the group width
    #[inline]
    pub fn exchange(&self, src_lane: usize) -> S {
        self.regs[src_lane & (self.regs.len() - 1)]
    }

    /// Value held by lane `lane ^ mask`
    #[inline]
    pub fn exchange_xor(&self, lane: usize, mask: usize) -> S {
        self.exchange(lane ^ mask)
    }
}

// ============================================================================
// Shared scratch
// ============================================================================

/// Block-shared scratch with phase tracking
///
/// Accesses are grouped into phases separated by [`barrier`](Self::barrier).
/// Within one phase a slot may be written by one worker or read by any
/// number of workers, never both by different workers: such an access
/// pattern is a data race on real hardware and panics here.
#[derive(Clone, Debug)]
pub struct SharedScratch<S> {
    slots: Vec<S>,
    epoch: u64,
    written_in: Vec<u64>,
    writer: Vec<usize>,
    read_in: Vec<u64>,
    reader: Vec<usize>,
}

impl<S: Copy + Default> SharedScratch<S> {
    /// Create a scratch buffer with `len` slots
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![S::default(); len],
            epoch: 1,
            written_in: vec![0; len],
            writer: vec![NO_WORKER; len],
            read_in: vec![0; len],
            reader: vec![NO_WORKER; len],
        }
    }

    /// Number of slots
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the scratch has no slots
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of barriers passed so far, plus one
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Block-wide barrier: every access before it completes before any after it
    #[inline]
    pub fn barrier(&mut self) {
        self.epoch += 1;
    }

    /// Store `value` into `slot` on behalf of `worker`
    pub fn write(&mut self, worker: usize, slot: usize, value: S) {
        self.check_slot(slot);
        assert!(
            !(self.written_in[slot] == self.epoch && self.writer[slot] != worker),
            "scratch slot {slot}: worker {worker} overwrites a value written by worker {} in the same phase",
            self.writer[slot]
        );
        assert!(
            !(self.read_in[slot] == self.epoch && self.reader[slot] != worker),
            "scratch slot {slot}: worker {worker} writes a value other workers read in the same phase"
        );
        self.slots[slot] = value;
        self.written_in[slot] = self.epoch;
        self.writer[slot] = worker;
    }

    /// Load `slot` on behalf of `worker`
    pub fn read(&mut self, worker: usize, slot: usize) -> S {
        self.check_slot(slot);
        assert!(
            !(self.written_in[slot] == self.epoch && self.writer[slot] != worker),
            "scratch slot {slot}: worker {worker} reads a value written by worker {} without a barrier",
            self.writer[slot]
        );
        if self.read_in[slot] == self.epoch && self.reader[slot] != worker {
            self.reader[slot] = MANY_WORKERS;
        } else if self.read_in[slot] != self.epoch {
            self.reader[slot] = worker;
        }
        self.read_in[slot] = self.epoch;
        self.slots[slot]
    }

    #[inline]
    fn check_slot(&self, slot: usize) {
        assert!(
            slot < self.slots.len(),
            "scratch slot {slot} exceeds capacity {}",
            self.slots.len()
        );
    }
}

// ============================================================================
// Block context
// ============================================================================

/// Everything one block owns while it works through its rows
///
/// Allocated once per block per launch; processing a row allocates nothing.
#[derive(Clone, Debug)]
pub struct BlockContext<U: Accumulate> {
    launch: LaunchConfig,
    pub(crate) regs: Vec<WelfordState<U>>,
    pub(crate) shadow: Vec<WelfordState<U>>,
    pub(crate) scratch: SharedScratch<WelfordState<U>>,
    pub(crate) moments: Vec<RowMoments<U>>,
}

impl<U: Accumulate> BlockContext<U> {
    /// Allocate the state of one block of `launch`
    pub fn new(launch: &LaunchConfig) -> Self {
        let shape = launch.block();
        Self {
            launch: *launch,
            regs: vec![WelfordState::empty(); shape.workers()],
            shadow: vec![WelfordState::empty(); shape.lanes()],
            scratch: SharedScratch::new(launch.scratch_len()),
            moments: vec![RowMoments::zero(); shape.workers()],
        }
    }

    /// Launch this block belongs to
    #[inline]
    pub fn launch(&self) -> &LaunchConfig {
        &self.launch
    }

    /// Shape of this block
    #[inline]
    pub fn shape(&self) -> BlockShape {
        self.launch.block()
    }

    /// Row statistics as received by each worker after the last broadcast
    #[inline]
    pub fn moments(&self) -> &[RowMoments<U>] {
        &self.moments
    }

    /// The block's shared scratch
    #[inline]
    pub fn scratch(&self) -> &SharedScratch<WelfordState<U>> {
        &self.scratch
    }

    /// Block-wide barrier closing a row
    ///
    /// Must separate consecutive rows processed with this context: the next
    /// row's first scratch writes would otherwise race with the reads of the
    /// previous broadcast.
    #[inline]
    pub fn barrier(&mut self) {
        self.scratch.barrier();
    }
}
