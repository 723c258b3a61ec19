pub mod config;

use crate::client::{BlockHeaderPageClient, HeadSnapshotClient, HeadsQuery};
use crate::core::{BlockHeaderPage, MonitorError, NodeHeadSnapshot, Result};
use crate::pagination::PaginationController;
use crate::query::{PollingQueryCoordinator, QueryState};
use crate::view::{self, BlockTableView, DashboardView};
use config::DashboardConfig;
use tokio::sync::watch;
use tracing::{Level, event, info_span};

/// The monitoring dashboard: head-snapshot polling and the paginated
/// block-header table, each on its own coordinator.
///
/// The two loops share nothing; a failing head poll never touches the table
/// and vice versa.
///
/// # Examples
///
/// ```
/// # use async_trait::async_trait;
/// # use leanview::{
/// #     BlockHeaderPage, BlockHeaderPageClient, ClientHeadsResponse, DashboardConfig, FetchError,
/// #     GetBlockHeadersRequest, HeadSnapshotClient, MonitoringDashboard,
/// # };
/// # struct Heads;
/// # #[async_trait]
/// # impl HeadSnapshotClient for Heads {
/// #     async fn get_all_clients_heads(&self) -> Result<ClientHeadsResponse, FetchError> {
/// #         Ok(ClientHeadsResponse::default())
/// #     }
/// # }
/// # struct Blocks;
/// # #[async_trait]
/// # impl BlockHeaderPageClient for Blocks {
/// #     async fn get_block_headers(&self, _: &GetBlockHeadersRequest) -> Result<BlockHeaderPage, FetchError> {
/// #         Ok(BlockHeaderPage::default())
/// #     }
/// # }
/// # tokio_test::block_on(async {
/// let mut dashboard = MonitoringDashboard::new(Heads, Blocks, DashboardConfig::default())?;
/// dashboard.mount()?;
///
/// let view = dashboard.dashboard_view();
/// println!("healthy: {:?}", view.summary);
///
/// dashboard.unmount().await?;
/// # Ok::<(), leanview::MonitorError>(())
/// # }).unwrap();
/// ```
pub struct MonitoringDashboard<H: HeadSnapshotClient, B: BlockHeaderPageClient> {
    config: DashboardConfig,
    heads: PollingQueryCoordinator<HeadsQuery<H>>,
    blocks: PaginationController<B>,
}

impl<H: HeadSnapshotClient, B: BlockHeaderPageClient> MonitoringDashboard<H, B> {
    pub fn new(heads_client: H, blocks_client: B, config: DashboardConfig) -> Result<Self> {
        config.validate()?;

        let heads =
            PollingQueryCoordinator::new(HeadsQuery::new(heads_client), config.head_interval(), ());
        let blocks = PaginationController::new(
            blocks_client,
            config.header_interval(),
            config.page_limit,
            config.sort_order,
        );

        Ok(Self {
            config,
            heads,
            blocks,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Start both polling loops.
    pub fn mount(&mut self) -> Result<()> {
        let span = info_span!("dashboard_mount");
        let _guard = span.enter();

        if self.heads.is_running() || self.blocks.is_running() {
            return Err(MonitorError::AlreadyRunning("dashboard"));
        }
        self.heads.start()?;
        self.blocks.start()?;

        event!(
            Level::INFO,
            head_interval_ms = self.config.head_poll_interval_ms,
            header_interval_ms = self.config.header_poll_interval_ms,
            page_limit = self.config.page_limit,
            "dashboard mounted"
        );
        Ok(())
    }

    /// Stop both loops; results of fetches still in flight are dropped.
    pub async fn unmount(&mut self) -> Result<()> {
        let heads = self.heads.stop().await;
        let blocks = self.blocks.stop().await;
        event!(Level::INFO, "dashboard unmounted");
        heads.and(blocks)
    }

    pub fn is_mounted(&self) -> bool {
        self.heads.is_running() && self.blocks.is_running()
    }

    /// Fetch head snapshots now instead of waiting for the next tick.
    pub fn refresh_heads(&mut self) -> Result<()> {
        self.heads.refresh_now(())
    }

    pub fn next_page(&mut self) -> Result<bool> {
        self.blocks.next_page()
    }

    pub fn previous_page(&mut self) -> Result<bool> {
        self.blocks.previous_page()
    }

    pub fn pagination(&self) -> &PaginationController<B> {
        &self.blocks
    }

    pub fn heads_state(&self) -> QueryState<Vec<NodeHeadSnapshot>> {
        self.heads.state()
    }

    pub fn blocks_state(&self) -> QueryState<BlockHeaderPage> {
        self.blocks.state()
    }

    pub fn subscribe_heads(&self) -> watch::Receiver<QueryState<Vec<NodeHeadSnapshot>>> {
        self.heads.subscribe()
    }

    pub fn subscribe_blocks(&self) -> watch::Receiver<QueryState<BlockHeaderPage>> {
        self.blocks.subscribe()
    }

    pub fn dashboard_view(&self) -> DashboardView {
        self.heads.with_state(view::assemble_dashboard)
    }

    pub fn block_table_view(&self) -> BlockTableView {
        view::assemble_block_table(&self.blocks.state(), self.blocks.cursor())
    }
}
