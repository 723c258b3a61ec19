//! Backend RPC surface consumed by the dashboard.
//!
//! Transport and encoding live outside this crate: implementors of
//! [`HeadSnapshotClient`] and [`BlockHeaderPageClient`] issue exactly one RPC
//! per call and keep no state of their own. [`QuerySource`] is the seam the
//! polling coordinator drives.

mod sources;

pub use sources::{BlockHeadersQuery, HeadsQuery};

use crate::core::{BlockHeaderPage, ClientHeadsResponse, FetchError, GetBlockHeadersRequest};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// `GetAllClientsHeads`: the current head of every tracked node.
#[async_trait]
pub trait HeadSnapshotClient: Send + Sync + 'static {
    async fn get_all_clients_heads(&self) -> Result<ClientHeadsResponse, FetchError>;
}

/// `GetBlockHeaders`: one page of canonical headers.
#[async_trait]
pub trait BlockHeaderPageClient: Send + Sync + 'static {
    async fn get_block_headers(
        &self,
        request: &GetBlockHeadersRequest,
    ) -> Result<BlockHeaderPage, FetchError>;
}

#[async_trait]
impl<C: HeadSnapshotClient + ?Sized> HeadSnapshotClient for Arc<C> {
    async fn get_all_clients_heads(&self) -> Result<ClientHeadsResponse, FetchError> {
        (**self).get_all_clients_heads().await
    }
}

#[async_trait]
impl<C: BlockHeaderPageClient + ?Sized> BlockHeaderPageClient for Arc<C> {
    async fn get_block_headers(
        &self,
        request: &GetBlockHeadersRequest,
    ) -> Result<BlockHeaderPage, FetchError> {
        (**self).get_block_headers(request).await
    }
}

/// A parameterized fetch operation a coordinator can poll.
#[async_trait]
pub trait QuerySource: Send + Sync + 'static {
    type Params: Clone + Debug + Send + Sync + 'static;
    type Output: Clone + Send + Sync + 'static;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    async fn fetch(&self, params: &Self::Params) -> Result<Self::Output, FetchError>;
}
