//! Pure projections from coordinator state to what the presentation layer draws.
//!
//! Nothing here holds state; callers re-run the assembly on every state change.

use crate::core::{BlockHeader, BlockHeaderPage, NetworkSummary, NodeHeadSnapshot};
use crate::health;
use crate::pagination::{self, PageCursor};
use crate::query::QueryState;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

const HASH_HEAD: usize = 10;
const HASH_TAIL: usize = 8;
const ROOT_BADGE_LEN: usize = 8;

/// Indicator flags shared by both panels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PanelStatus {
    /// Nothing has ever loaded: show the full loading indicator.
    pub loading: bool,
    /// A refetch runs over data that is still shown.
    pub refreshing: bool,
    /// Error annotation over the (possibly stale) content.
    pub error: Option<String>,
}

impl PanelStatus {
    pub fn from_state<T>(state: &QueryState<T>) -> Self {
        Self {
            loading: state.is_initial_loading(),
            refreshing: state.is_refreshing(),
            error: state.error().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockDetails {
    pub slot: u64,
    pub proposer_index: u64,
    pub block_root: String,
    /// First few characters of the root for the collapsed badge.
    pub block_root_badge: Option<String>,
    pub parent_root: String,
    pub state_root: String,
    pub body_root: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeCard {
    pub client_label: String,
    pub endpoint_url: String,
    pub is_healthy: bool,
    pub health_label: &'static str,
    pub last_update: Option<DateTime<Utc>>,
    pub block: Option<BlockDetails>,
}

impl NodeCard {
    fn from_snapshot(snapshot: &NodeHeadSnapshot) -> Self {
        Self {
            client_label: snapshot.client_label.clone(),
            endpoint_url: snapshot.endpoint_url.clone(),
            is_healthy: snapshot.is_healthy,
            health_label: if snapshot.is_healthy { "Healthy" } else { "Unhealthy" },
            last_update: Utc.timestamp_millis_opt(snapshot.last_update_ms).single(),
            block: snapshot
                .header
                .as_ref()
                .map(|header| block_details(header, &snapshot.block_root)),
        }
    }
}

fn block_details(header: &BlockHeader, block_root: &str) -> BlockDetails {
    BlockDetails {
        slot: header.slot,
        proposer_index: header.proposer_index,
        block_root: block_root.to_string(),
        block_root_badge: (!block_root.is_empty()).then(|| root_badge(block_root)),
        parent_root: header.parent_root.clone(),
        state_root: header.state_root.clone(),
        body_root: header.body_root.clone(),
    }
}

/// Network overview plus one card per tracked node, in producer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub status: PanelStatus,
    pub summary: Option<NetworkSummary>,
    pub cards: Vec<NodeCard>,
    pub last_update: Option<DateTime<Utc>>,
}

pub fn assemble_dashboard(state: &QueryState<Vec<NodeHeadSnapshot>>) -> DashboardView {
    let snapshots = state.latest_value();
    DashboardView {
        status: PanelStatus::from_state(state),
        summary: snapshots.map(|s| health::aggregate(s)),
        cards: snapshots
            .map(|s| s.iter().map(NodeCard::from_snapshot).collect())
            .unwrap_or_default(),
        last_update: state
            .fetched_at_ms()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockRow {
    pub slot: u64,
    pub proposer_index: u64,
    pub block_root: String,
    pub parent_root: String,
    pub state_root: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockTableView {
    pub status: PanelStatus,
    pub rows: Vec<BlockRow>,
    pub total_count: Option<u64>,
    pub page_number: u64,
    /// `(first, last)` 1-based item ordinals; absent while the table is empty.
    pub showing: Option<(u64, u64)>,
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

impl BlockTableView {
    /// Whether the pagination footer is drawn at all. An empty page past the
    /// first still needs it so the user can step back.
    pub fn shows_pagination(&self) -> bool {
        !self.rows.is_empty() || self.previous_enabled
    }
}

pub fn assemble_block_table(
    state: &QueryState<BlockHeaderPage>,
    cursor: &PageCursor,
) -> BlockTableView {
    let page = state.latest_value();
    BlockTableView {
        status: PanelStatus::from_state(state),
        rows: page
            .map(|p| {
                p.entries
                    .iter()
                    .map(|entry| BlockRow {
                        slot: entry.header.slot,
                        proposer_index: entry.header.proposer_index,
                        block_root: truncate_hash(&entry.block_root),
                        parent_root: truncate_hash(&entry.header.parent_root),
                        state_root: truncate_hash(&entry.header.state_root),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        total_count: page.map(|p| p.total_count),
        page_number: cursor.page_number(),
        showing: pagination::item_ordinals(cursor, page),
        previous_enabled: pagination::can_go_previous(cursor),
        next_enabled: pagination::can_go_next(cursor, page),
    }
}

/// `0x12345678...9abcdef0` style shortening for table cells.
pub fn truncate_hash(hash: &str) -> String {
    if hash.is_empty() {
        return "-".to_string();
    }
    if hash.len() <= HASH_HEAD + HASH_TAIL || !hash.is_ascii() {
        return hash.to_string();
    }
    format!("{}...{}", &hash[..HASH_HEAD], &hash[hash.len() - HASH_TAIL..])
}

fn root_badge(root: &str) -> String {
    let head: String = root.chars().take(ROOT_BADGE_LEN).collect();
    format!("{}...", head)
}
