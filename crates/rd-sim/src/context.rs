//! The spatial world a dispatch run operates in.

use rd_graph::RoadGraph;
use rd_spatial::{GridConfig, NodeIndex, SpatialGrid};

use crate::error::SimResult;

/// Road graph, dispatch grid, and nearest-node index, built together so they
/// always describe the same network.
///
/// The graph and index stay immutable for the whole run; only the grid's
/// driver occupancy mutates.
pub struct SimulationContext {
    pub graph: RoadGraph,
    pub grid:  SpatialGrid,
    pub nodes: NodeIndex,
}

impl SimulationContext {
    /// Build the grid and node index over `graph`.
    pub fn build(
        graph: RoadGraph,
        grid_config: GridConfig,
        kd_max_depth: usize,
    ) -> SimResult<SimulationContext> {
        let grid = SpatialGrid::build(&graph, grid_config)?;
        let nodes = NodeIndex::build(&graph, kd_max_depth);
        log::debug!(
            "simulation context ready: {} road nodes indexed, {}x{} grid cells",
            nodes.len(),
            grid.lat_cells(),
            grid.lon_cells(),
        );
        Ok(SimulationContext { graph, grid, nodes })
    }
}
