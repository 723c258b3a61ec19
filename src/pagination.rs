use crate::client::{BlockHeaderPageClient, BlockHeadersQuery};
use crate::core::{BlockHeaderPage, GetBlockHeadersRequest, Result, SortOrder};
use crate::query::{PollingQueryCoordinator, QueryState};
use log::debug;
use std::time::Duration;
use tokio::sync::watch;

/// Position in the block-header listing.
///
/// `limit` and `sort_order` are fixed for the lifetime of the cursor; only
/// `page_index` moves, and never below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page_index: u64,
    limit: u32,
    sort_order: SortOrder,
}

impl PageCursor {
    pub fn new(limit: u32, sort_order: SortOrder) -> Self {
        Self {
            page_index: 0,
            limit: limit.max(1),
            sort_order,
        }
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    /// 1-based page number for display.
    pub fn page_number(&self) -> u64 {
        self.page_index + 1
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Same cursor placed on another page.
    pub fn with_page_index(mut self, page_index: u64) -> Self {
        self.page_index = page_index;
        self
    }

    pub fn offset(&self) -> u64 {
        self.page_index * u64::from(self.limit)
    }

    pub fn request(&self) -> GetBlockHeadersRequest {
        GetBlockHeadersRequest {
            limit: self.limit,
            offset: self.offset(),
            sort_order: self.sort_order,
        }
    }
}

pub fn can_go_previous(cursor: &PageCursor) -> bool {
    cursor.page_index > 0
}

/// The latest page, if it answers the cursor's current offset. While a
/// navigation fetch is in flight the latest page still belongs to the old
/// position and is not used for navigation or ordinals.
fn current_page<'a>(
    cursor: &PageCursor,
    latest: Option<&'a BlockHeaderPage>,
) -> Option<&'a BlockHeaderPage> {
    latest.filter(|page| page.offset == cursor.offset())
}

/// Next is only possible once the page at the cursor has arrived and the
/// producer says more headers exist past it.
pub fn can_go_next(cursor: &PageCursor, latest: Option<&BlockHeaderPage>) -> bool {
    current_page(cursor, latest).is_some_and(|page| page.has_more)
}

/// 1-based ordinals of the first and last item on the current page.
///
/// Absent until a page with entries has been fetched for the cursor.
pub fn item_ordinals(cursor: &PageCursor, latest: Option<&BlockHeaderPage>) -> Option<(u64, u64)> {
    let page = current_page(cursor, latest)
        .filter(|page| !page.is_empty() && page.offset < page.total_count)?;
    let limit = u64::from(cursor.limit);
    let first = cursor.page_index * limit + 1;
    let last = ((cursor.page_index + 1) * limit).min(page.total_count);
    Some((first, last))
}

/// Turns next/previous navigation into block-header requests.
///
/// Owns the block-header coordinator; every cursor move is followed by an
/// immediate `refresh_now` with the new offset.
pub struct PaginationController<C: BlockHeaderPageClient> {
    cursor: PageCursor,
    query: PollingQueryCoordinator<BlockHeadersQuery<C>>,
}

impl<C: BlockHeaderPageClient> PaginationController<C> {
    pub fn new(client: C, interval: Duration, limit: u32, sort_order: SortOrder) -> Self {
        let cursor = PageCursor::new(limit, sort_order);
        let query = PollingQueryCoordinator::new(
            BlockHeadersQuery::new(client),
            interval,
            cursor.request(),
        );
        Self { cursor, query }
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn start(&mut self) -> Result<()> {
        self.query.start()
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.query.stop().await
    }

    pub fn is_running(&self) -> bool {
        self.query.is_running()
    }

    pub fn state(&self) -> QueryState<BlockHeaderPage> {
        self.query.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<BlockHeaderPage>> {
        self.query.subscribe()
    }

    /// Last successfully fetched page, possibly for a previous cursor position.
    pub fn latest_page(&self) -> Option<BlockHeaderPage> {
        self.query.with_state(|state| state.latest_value().cloned())
    }

    pub fn can_go_previous(&self) -> bool {
        can_go_previous(&self.cursor)
    }

    pub fn can_go_next(&self) -> bool {
        self.query
            .with_state(|state| can_go_next(&self.cursor, state.latest_value()))
    }

    pub fn first_item_ordinal(&self) -> Option<u64> {
        self.item_ordinals().map(|(first, _)| first)
    }

    pub fn last_item_ordinal(&self) -> Option<u64> {
        self.item_ordinals().map(|(_, last)| last)
    }

    fn item_ordinals(&self) -> Option<(u64, u64)> {
        self.query
            .with_state(|state| item_ordinals(&self.cursor, state.latest_value()))
    }

    /// Move one page forward. Returns `false` without fetching when the page
    /// at the cursor has not arrived yet or reports nothing more.
    pub fn next_page(&mut self) -> Result<bool> {
        if !self.can_go_next() {
            debug!("next page ignored at page {}", self.cursor.page_number());
            return Ok(false);
        }
        self.move_to(self.cursor.page_index + 1)
    }

    /// Move one page back. Returns `false` without fetching on the first page.
    pub fn previous_page(&mut self) -> Result<bool> {
        if !self.can_go_previous() {
            return Ok(false);
        }
        self.move_to(self.cursor.page_index - 1)
    }

    fn move_to(&mut self, page_index: u64) -> Result<bool> {
        let previous = self.cursor;
        self.cursor.page_index = page_index;

        if let Err(err) = self.query.refresh_now(self.cursor.request()) {
            self.cursor = previous;
            return Err(err);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(offset: u64, entries: usize, total_count: u64, has_more: bool) -> BlockHeaderPage {
        use crate::core::{BlockHeader, BlockHeaderWithRoot};

        BlockHeaderPage {
            entries: (0..entries as u64)
                .map(|slot| BlockHeaderWithRoot {
                    header: BlockHeader {
                        slot,
                        proposer_index: 0,
                        parent_root: String::new(),
                        state_root: String::new(),
                        body_root: String::new(),
                    },
                    block_root: String::new(),
                })
                .collect(),
            total_count,
            has_more,
            offset,
        }
    }

    #[test]
    fn test_offset_is_page_times_limit() {
        let cursor = PageCursor::new(50, SortOrder::SlotDesc);
        assert_eq!(cursor.offset(), 0);
        let cursor = cursor.with_page_index(3);
        assert_eq!(cursor.offset(), 150);
        assert_eq!(
            cursor.request(),
            GetBlockHeadersRequest {
                limit: 50,
                offset: 150,
                sort_order: SortOrder::SlotDesc
            }
        );
        assert_eq!(cursor.page_number(), 4);
    }

    #[test]
    fn test_zero_limit_is_raised_to_one() {
        assert_eq!(PageCursor::new(0, SortOrder::SlotAsc).limit(), 1);
    }

    #[test]
    fn test_navigation_availability() {
        let cursor = PageCursor::new(50, SortOrder::SlotDesc);
        assert!(!can_go_previous(&cursor));
        assert!(can_go_previous(&cursor.with_page_index(1)));

        assert!(!can_go_next(&cursor, None));
        assert!(!can_go_next(&cursor, Some(&page(0, 50, 50, false))));
        assert!(can_go_next(&cursor, Some(&page(0, 50, 1000, true))));
    }

    #[test]
    fn test_page_from_earlier_position_is_not_current() {
        let cursor = PageCursor::new(50, SortOrder::SlotDesc).with_page_index(1);
        let stale = page(0, 50, 60, true);

        assert!(!can_go_next(&cursor, Some(&stale)));
        assert_eq!(item_ordinals(&cursor, Some(&stale)), None);

        let current = page(50, 10, 60, false);
        assert!(!can_go_next(&cursor, Some(&current)));
        assert_eq!(item_ordinals(&cursor, Some(&current)), Some((51, 60)));
    }

    #[test]
    fn test_ordinals_on_full_and_partial_pages() {
        let cursor = PageCursor::new(50, SortOrder::SlotDesc);
        assert_eq!(item_ordinals(&cursor, None), None);
        assert_eq!(item_ordinals(&cursor, Some(&page(0, 50, 1000, true))), Some((1, 50)));

        let cursor = cursor.with_page_index(19);
        assert_eq!(
            item_ordinals(&cursor, Some(&page(950, 50, 1000, false))),
            Some((951, 1000))
        );

        let cursor = PageCursor::new(50, SortOrder::SlotDesc).with_page_index(2);
        assert_eq!(
            item_ordinals(&cursor, Some(&page(100, 20, 120, false))),
            Some((101, 120))
        );
    }

    #[test]
    fn test_ordinals_absent_for_empty_page() {
        let cursor = PageCursor::new(50, SortOrder::SlotDesc);
        assert_eq!(item_ordinals(&cursor, Some(&BlockHeaderPage::exhausted(0, 0))), None);

        let cursor = cursor.with_page_index(2);
        assert_eq!(
            item_ordinals(&cursor, Some(&BlockHeaderPage::exhausted(100, 60))),
            None
        );
    }

    #[test]
    fn test_first_ordinal_not_after_last_when_total_positive() {
        let limit = 7u32;
        for total in 1..60u64 {
            let pages = total.div_ceil(u64::from(limit));
            for index in 0..pages {
                let cursor = PageCursor::new(limit, SortOrder::SlotAsc).with_page_index(index);
                let on_page = (total - cursor.offset()).min(u64::from(limit));
                let latest = page(cursor.offset(), on_page as usize, total, index + 1 < pages);
                let (first, last) = item_ordinals(&cursor, Some(&latest)).unwrap();
                assert!(first <= last, "page {} of total {}", index, total);
                assert!(latest.len() <= limit as usize);
            }

            // cursor one page past the end never yields ordinals
            let beyond = PageCursor::new(limit, SortOrder::SlotAsc).with_page_index(pages);
            let stale = page(0, limit.min(total as u32) as usize, total, pages > 1);
            assert_eq!(item_ordinals(&beyond, Some(&stale)), None);
        }
    }
}
