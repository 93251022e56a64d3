//! Traits for device identification and capability queries

/// Trait for device identification
pub trait Device: Clone + Send + Sync + 'static {
    /// Unique identifier for this device
    fn id(&self) -> usize;

    /// Check if two devices are the same
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Human-readable name
    fn name(&self) -> String {
        format!("Device({})", self.id())
    }
}

/// Capability queries a launch configuration is derived from
///
/// These are the only facts the layer-norm kernel needs from its host
/// environment.
pub trait DeviceCaps: Device {
    /// Number of workers executing in lock-step inside one lane group
    fn lane_group_width(&self) -> usize;

    /// Maximum number of block rows a single grid can hold
    fn max_grid_rows(&self) -> usize;

    /// Whether lanes of a group can exchange registers directly
    ///
    /// When false, intra-group merges go through the block scratch instead.
    fn supports_lane_exchange(&self) -> bool {
        true
    }
}
