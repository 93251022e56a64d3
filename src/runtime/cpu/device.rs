//! CPU device implementation

use crate::runtime::{Device, DeviceCaps};

/// Lane-group width of the default CPU profile
const DEFAULT_LANE_GROUP_WIDTH: usize = 32;

/// Grid extent of the default CPU profile
const DEFAULT_MAX_GRID_ROWS: usize = 65_535;

/// CPU device (there's only one: the host CPU)
///
/// The host has no hardware lane groups, so the capabilities reported here
/// are a profile: they shape launches exactly the way a GPU's attribute
/// queries would.
#[derive(Clone, Debug)]
pub struct CpuDevice {
    id: usize,
    lane_group_width: usize,
    max_grid_rows: usize,
    lane_exchange: bool,
}

impl CpuDevice {
    /// Create a new CPU device with the default profile
    pub fn new() -> Self {
        Self::with_caps(DEFAULT_LANE_GROUP_WIDTH, DEFAULT_MAX_GRID_ROWS)
    }

    /// Create a CPU device reporting the given lane-group width and grid extent
    pub fn with_caps(lane_group_width: usize, max_grid_rows: usize) -> Self {
        Self {
            id: 0,
            lane_group_width,
            max_grid_rows,
            lane_exchange: true,
        }
    }

    /// Report no lane exchange, forcing scratch-based intra-group merges
    pub fn without_lane_exchange(mut self) -> Self {
        self.lane_exchange = false;
        self
    }
}

impl Default for CpuDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for CpuDevice {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> String {
        "cpu".to_string()
    }
}

impl DeviceCaps for CpuDevice {
    fn lane_group_width(&self) -> usize {
        self.lane_group_width
    }

    fn max_grid_rows(&self) -> usize {
        self.max_grid_rows
    }

    fn supports_lane_exchange(&self) -> bool {
        self.lane_exchange
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let device = CpuDevice::new();
        assert_eq!(device.lane_group_width(), DEFAULT_LANE_GROUP_WIDTH);
        assert_eq!(device.max_grid_rows(), DEFAULT_MAX_GRID_ROWS);
        assert!(device.supports_lane_exchange());
        assert_eq!(device.name(), "cpu");
        assert!(device.is_same(&CpuDevice::default()));
    }

    #[test]
    fn test_custom_profile() {
        let device = CpuDevice::with_caps(8, 16).without_lane_exchange();
        assert_eq!(device.lane_group_width(), 8);
        assert_eq!(device.max_grid_rows(), 16);
        assert!(!device.supports_lane_exchange());
    }
}
