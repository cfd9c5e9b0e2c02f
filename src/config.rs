/// Configuration for layout defaults and the composer's timers.
///
/// Plain structs with `Default`; the parser always uses the defaults so that
/// `parse(text)` stays a function of the text alone.
use std::time::Duration;

/// Grid unit positions snap to.
pub const GRID_UNIT: i32 = 10;
pub const DEFAULT_NODE_WIDTH: i32 = 160;
pub const DEFAULT_NODE_HEIGHT: i32 = 72;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Grid unit (in pixels) that positions snap to.
    pub grid: i32,
    /// Columns per row when placing new nodes on the grid.
    pub columns: usize,
    pub origin_x: i32,
    pub origin_y: i32,
    /// Distance between neighbouring columns.
    pub column_gap: i32,
    /// Distance between neighbouring rows.
    pub row_gap: i32,
    pub node_width: i32,
    pub node_height: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid: GRID_UNIT,
            columns: 4,
            origin_x: 120,
            origin_y: 100,
            column_gap: 240,
            row_gap: 140,
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    pub layout: LayoutConfig,
    /// Idle time after the last drag update before positions reach the cache.
    pub position_flush_delay: Duration,
    /// Idle time after the last text change before a render is requested.
    pub render_delay: Duration,
    /// Idle time after the last instance update before the store is persisted.
    pub persist_delay: Duration,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            position_flush_delay: Duration::from_millis(120),
            render_delay: Duration::from_millis(400),
            persist_delay: Duration::from_millis(300),
        }
    }
}

impl ComposerConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
