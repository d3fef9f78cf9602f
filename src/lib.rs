//! Interactive graph-layout and view-transform engine.
//!
//! Positions a few hundred entities and their relations in 2D, keeps those
//! positions stable under interaction, and lets a host navigate them:
//!
//! - [`physics`]: force simulation (repulsion, springs, centering,
//!   collision, cluster attraction, radial layering) over a per-tick
//!   spatial index.
//! - [`pack`]: deterministic nested-circle layout of a hierarchy with
//!   focus-based semantic zoom.
//! - [`graph`]: arena binding of graph snapshots, expand-on-demand
//!   subgraphs, ancestor-chain lookups and fuzzy search.
//! - [`view`]: pan/zoom transform control, smooth zoom transitions,
//!   semantic sizing, highlighting and cluster hulls.
//!
//! The engine performs no rendering and no I/O. A host feeds it snapshots
//! and interaction gestures, drives ticks and transitions from its own
//! frame loop, and drains [`events::Event`]s for dependent panels.

pub mod events;
pub mod graph;
pub mod pack;
pub mod physics;
pub mod scale;
pub mod snapshot;
pub mod util;
pub mod view;

pub use events::Event;
pub use graph::expand::{ExpansionState, VisibleSubgraph, visible_subgraph};
pub use graph::{BindConfig, LayoutGraph, LayoutLink, LayoutNode};
pub use pack::{FocusView, PackConfig, PackRole, PackTree, pack};
pub use physics::{Force, SimState, Simulation, SimulationConfig, SpatialIndex};
pub use snapshot::{GraphSnapshot, HierarchySnapshot};
pub use view::{Highlight, ViewConfig, ViewTransform, Viewport};
