pub mod error;
pub mod types;

pub use error::{FetchError, MonitorError, Result};
pub use types::{
    BlockHeader, BlockHeaderPage, BlockHeaderWithRoot, ClientHeadsResponse, GetBlockHeadersRequest,
    NetworkSummary, NodeHeadSnapshot, SortOrder, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
