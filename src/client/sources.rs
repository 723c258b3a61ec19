use super::{BlockHeaderPageClient, HeadSnapshotClient, QuerySource};
use crate::core::{BlockHeaderPage, FetchError, GetBlockHeadersRequest, NodeHeadSnapshot};
use crate::health;
use async_trait::async_trait;
use log::debug;

/// Polls `GetAllClientsHeads` and yields the snapshot list.
pub struct HeadsQuery<C> {
    client: C,
}

impl<C: HeadSnapshotClient> HeadsQuery<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: HeadSnapshotClient> QuerySource for HeadsQuery<C> {
    type Params = ();
    type Output = Vec<NodeHeadSnapshot>;

    fn name(&self) -> &'static str {
        "client_heads"
    }

    async fn fetch(&self, _params: &()) -> Result<Vec<NodeHeadSnapshot>, FetchError> {
        let response = self.client.get_all_clients_heads().await?;

        let local = health::aggregate(&response.client_heads);
        if local.total_clients != response.total_clients as usize
            || local.healthy_clients != response.healthy_clients as usize
        {
            debug!(
                "client_heads: producer reported {}/{} healthy, snapshot shows {}/{}",
                response.healthy_clients,
                response.total_clients,
                local.healthy_clients,
                local.total_clients
            );
        }

        Ok(response.client_heads)
    }
}

/// Polls `GetBlockHeaders` for whatever page the caller currently points at.
pub struct BlockHeadersQuery<C> {
    client: C,
}

impl<C: BlockHeaderPageClient> BlockHeadersQuery<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: BlockHeaderPageClient> QuerySource for BlockHeadersQuery<C> {
    type Params = GetBlockHeadersRequest;
    type Output = BlockHeaderPage;

    fn name(&self) -> &'static str {
        "block_headers"
    }

    async fn fetch(&self, request: &GetBlockHeadersRequest) -> Result<BlockHeaderPage, FetchError> {
        let mut page = self.client.get_block_headers(request).await?;

        if page.entries.len() > request.limit as usize {
            return Err(FetchError::InvalidResponse(format!(
                "page holds {} headers but limit was {}",
                page.entries.len(),
                request.limit
            )));
        }

        // Chain truncated under us: nothing left at this offset.
        if request.offset >= page.total_count {
            return Ok(BlockHeaderPage::exhausted(request.offset, page.total_count));
        }

        page.offset = request.offset;
        Ok(page)
    }
}
