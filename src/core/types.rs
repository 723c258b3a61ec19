use serde::{Deserialize, Serialize};

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Largest page the block service will serve.
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub slot: u64,
    pub proposer_index: u64,
    pub parent_root: String,
    pub state_root: String,
    pub body_root: String,
}

/// Latest head observed on one tracked client node.
///
/// Snapshots are replaced wholesale on every poll and never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeHeadSnapshot {
    pub client_label: String,
    pub endpoint_url: String,
    pub is_healthy: bool,
    pub last_update_ms: i64,
    /// Empty when the producer could not compute the root.
    #[serde(default)]
    pub block_root: String,
    #[serde(default, rename = "blockHeader")]
    pub header: Option<BlockHeader>,
}

impl NodeHeadSnapshot {
    pub fn has_block_root(&self) -> bool {
        !self.block_root.is_empty()
    }
}

/// Response of `GetAllClientsHeads`.
///
/// The producer's own counts are carried along but the dashboard always
/// recomputes them from `client_heads`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientHeadsResponse {
    pub total_clients: u32,
    pub healthy_clients: u32,
    pub client_heads: Vec<NodeHeadSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeaderWithRoot {
    pub header: BlockHeader,
    pub block_root: String,
}

/// One page of canonical block headers.
///
/// `has_more` is reported by the producer and is authoritative: it is never
/// derived from `entries.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeaderPage {
    #[serde(rename = "headers")]
    pub entries: Vec<BlockHeaderWithRoot>,
    pub total_count: u64,
    pub has_more: bool,
    /// Offset of the request this page answers. Not on the wire; stamped by
    /// the block-header query.
    #[serde(skip)]
    pub offset: u64,
}

impl BlockHeaderPage {
    /// An empty page that admits no further navigation.
    pub fn exhausted(offset: u64, total_count: u64) -> Self {
        Self {
            entries: Vec::new(),
            total_count,
            has_more: false,
            offset,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    SlotAsc,
    /// Most recent block first.
    #[default]
    SlotDesc,
}

/// Parameters of `GetBlockHeaders`. `offset` counts items, not pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBlockHeadersRequest {
    pub limit: u32,
    pub offset: u64,
    pub sort_order: SortOrder,
}

impl Default for GetBlockHeadersRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
            sort_order: SortOrder::SlotDesc,
        }
    }
}

/// Network-wide health derived from a head snapshot. Never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    pub total_clients: usize,
    pub healthy_clients: usize,
}

impl NetworkSummary {
    pub fn all_healthy(&self) -> bool {
        self.healthy_clients == self.total_clients
    }

    pub fn unhealthy_clients(&self) -> usize {
        self.total_clients.saturating_sub(self.healthy_clients)
    }
}
