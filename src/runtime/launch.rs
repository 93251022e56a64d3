//! Launch configuration for block-structured kernels
//!
//! A block is `groups` lane groups of `lanes` workers each. A grid is
//! `grid_rows` independent blocks; block `b` processes rows
//! `b, b + grid_rows, b + 2 * grid_rows, ...` so a grid bounded by the
//! device's maximum extent still covers any number of rows.

use super::traits::DeviceCaps;
use crate::error::{Error, Result};

/// Lane groups per block used by [`LaunchConfig::for_rows`]
pub const DEFAULT_GROUPS_PER_BLOCK: usize = 4;

/// Shape of one block: `lanes` workers per lane group, `groups` lane groups
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockShape {
    lanes: usize,
    groups: usize,
}

impl BlockShape {
    /// Create a block shape
    ///
    /// Both extents must be non-zero powers of two; the merge trees halve
    /// them round by round.
    pub fn new(lanes: usize, groups: usize) -> Result<Self> {
        if !lanes.is_power_of_two() {
            return Err(Error::invalid_launch(format!(
                "lanes per group must be a power of two, got {lanes}"
            )));
        }
        if !groups.is_power_of_two() {
            return Err(Error::invalid_launch(format!(
                "groups per block must be a power of two, got {groups}"
            )));
        }
        Ok(Self { lanes, groups })
    }

    /// Workers per lane group
    #[inline]
    pub const fn lanes(&self) -> usize {
        self.lanes
    }

    /// Lane groups per block
    #[inline]
    pub const fn groups(&self) -> usize {
        self.groups
    }

    /// Total workers per block
    #[inline]
    pub const fn workers(&self) -> usize {
        self.lanes * self.groups
    }

    /// Merge rounds inside one lane group
    #[inline]
    pub const fn lane_rounds(&self) -> u32 {
        self.lanes.trailing_zeros()
    }
}

/// How lanes of one group merge their partial states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IntraGroupReduce {
    /// Lane `l` merges lane `(l + 2^r) mod lanes` in round `r`
    #[default]
    Rotate,
    /// Lane `l` merges lane `l ^ 2^r` in round `r`
    Butterfly,
    /// Halving tree through block scratch and barriers, no lane exchange
    Scratch,
}

impl IntraGroupReduce {
    /// Returns true if this strategy needs register exchange between lanes
    #[inline]
    pub const fn uses_lane_exchange(self) -> bool {
        !matches!(self, Self::Scratch)
    }
}

/// Complete launch description for one kernel invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LaunchConfig {
    block: BlockShape,
    grid_rows: usize,
    intra: IntraGroupReduce,
}

impl LaunchConfig {
    /// Create a launch configuration
    pub fn new(block: BlockShape, grid_rows: usize, intra: IntraGroupReduce) -> Result<Self> {
        if grid_rows == 0 {
            return Err(Error::invalid_launch("grid must contain at least one block row"));
        }
        Ok(Self {
            block,
            grid_rows,
            intra,
        })
    }

    /// Default launch for `n1` rows on `device`
    ///
    /// One lane group spans the device's lane-group width, four groups per
    /// block, one block per row up to the device's grid limit.
    pub fn for_rows<D: DeviceCaps>(device: &D, n1: usize) -> Result<Self> {
        let block = BlockShape::new(device.lane_group_width(), DEFAULT_GROUPS_PER_BLOCK)?;
        let grid_rows = n1.clamp(1, device.max_grid_rows().max(1));
        let intra = if device.supports_lane_exchange() {
            IntraGroupReduce::Rotate
        } else {
            IntraGroupReduce::Scratch
        };
        let config = Self::new(block, grid_rows, intra)?;
        log::debug!(
            "derived launch for {} rows on {}: block {}x{}, grid {}, {:?}",
            n1,
            device.name(),
            block.lanes(),
            block.groups(),
            grid_rows,
            intra
        );
        Ok(config)
    }

    /// Check that `device` can execute this configuration
    pub fn validate_for<D: DeviceCaps>(&self, device: &D) -> Result<()> {
        if self.grid_rows > device.max_grid_rows() {
            return Err(Error::invalid_launch(format!(
                "grid of {} block rows exceeds device limit {}",
                self.grid_rows,
                device.max_grid_rows()
            )));
        }
        if self.intra.uses_lane_exchange() {
            if !device.supports_lane_exchange() {
                return Err(Error::invalid_launch(format!(
                    "{:?} needs lane exchange, which {} does not support",
                    self.intra,
                    device.name()
                )));
            }
            if self.block.lanes() > device.lane_group_width() {
                return Err(Error::invalid_launch(format!(
                    "lane group of {} exceeds device lane-group width {}",
                    self.block.lanes(),
                    device.lane_group_width()
                )));
            }
        }
        Ok(())
    }

    /// Block shape
    #[inline]
    pub const fn block(&self) -> BlockShape {
        self.block
    }

    /// Number of block rows in the grid
    #[inline]
    pub const fn grid_rows(&self) -> usize {
        self.grid_rows
    }

    /// Intra-group merge strategy
    #[inline]
    pub const fn intra(&self) -> IntraGroupReduce {
        self.intra
    }

    /// Scratch capacity in accumulator states
    ///
    /// The scratch intra-group path needs one slot per worker; the
    /// inter-group tree needs `groups / 2` slots, the first of which also
    /// carries the final broadcast. A single lane group merging through
    /// lane exchange needs none.
    pub const fn scratch_len(&self) -> usize {
        let intra = match self.intra {
            IntraGroupReduce::Scratch => self.block.workers(),
            IntraGroupReduce::Rotate | IntraGroupReduce::Butterfly => 0,
        };
        let inter = if self.block.groups() > 1 {
            self.block.groups() / 2
        } else {
            0
        };
        if intra > inter { intra } else { inter }
    }

    /// Scratch capacity in bytes for accumulation type `U`
    ///
    /// Each state is a `(mean, m2, count)` triple.
    pub const fn scratch_bytes<U>(&self) -> usize {
        self.scratch_len() * 3 * std::mem::size_of::<U>()
    }
}
