// ============================================================================
// LeanView monitoring library
// ============================================================================
//
// Turns the devnet backend's head-snapshot and block-header RPCs into
// continuously refreshed, paginated view models.

pub mod core;
pub mod client;
pub mod health;
pub mod query;
pub mod pagination;
pub mod view;
pub mod dashboard;

// Re-export main types for convenience
pub use crate::core::{
    BlockHeader, BlockHeaderPage, BlockHeaderWithRoot, ClientHeadsResponse, FetchError,
    GetBlockHeadersRequest, MonitorError, NetworkSummary, NodeHeadSnapshot, Result, SortOrder,
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};

pub use client::{
    BlockHeaderPageClient, BlockHeadersQuery, HeadSnapshotClient, HeadsQuery, QuerySource,
};
pub use health::aggregate;
pub use query::{PollingQueryCoordinator, QueryState, MIN_POLL_INTERVAL};
pub use pagination::{PageCursor, PaginationController};
pub use view::{
    assemble_block_table, assemble_dashboard, BlockRow, BlockTableView, DashboardView, NodeCard,
    PanelStatus,
};
pub use dashboard::{config::DashboardConfig, MonitoringDashboard};
