//! Translation between fixed-size client pages and upstream batches.
//!
//! Clients always page in units of `page_size`. Upstream catalogs are read in
//! batches of `batch_size` (a multiple of `page_size`), so one upstream batch
//! can back several consecutive client pages.

use serde::{Deserialize, Serialize};

/// TMDB refuses to serve pages past this number.
pub const TMDB_MAX_PAGES: u64 = 500;
/// Fixed TMDB result page length.
pub const TMDB_PAGE_LEN: u32 = 20;

/// Position inside an upstream listing, in the unit the upstream understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpstreamCursor {
    /// 1-based page number (TMDB).
    Page(u32),
    /// 0-based item offset (Google Books, Open Library).
    Offset(u32),
}

/// The slice of one upstream batch that backs a client page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub batch_index: u32,
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn for_page(page: u32, page_size: u32, batch_size: u32) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let batch_size = batch_size.max(page_size);

        let offset = u64::from(page - 1) * u64::from(page_size);
        let batch_index = (offset / u64::from(batch_size)) as u32;
        let start = (offset % u64::from(batch_size)) as usize;

        Self {
            batch_index,
            start,
            end: start + page_size as usize,
        }
    }

    /// Clamp the window to the items actually present in a batch.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.start.min(items.len());
        let end = self.end.min(items.len());
        &items[start..end]
    }
}

/// `hasNext` from an authoritative upstream total.
pub fn has_next_from_total(page: u32, page_size: u32, total: u64) -> bool {
    u64::from(page) * u64::from(page_size) < total
}

/// Approximate `hasNext` for sources without a trustworthy total: more
/// items remain in the current batch, or the batch came back full and the
/// upstream offered another cursor. A full final batch yields one extra
/// empty page before paging stops.
pub fn has_next_heuristic(
    window: &PageWindow,
    batch_len: usize,
    raw_len: usize,
    batch_size: u32,
    next_cursor: Option<UpstreamCursor>,
) -> bool {
    if window.end < batch_len {
        return true;
    }
    raw_len >= batch_size as usize && next_cursor.is_some()
}
