use crate::filter::{apply_filters, FilterSpec};
use crate::record::ListRecord;
use crate::sort::{apply_sort, SortSpec};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One slice of an ordered list plus the numbers needed for page controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-indexed, always within `1..=total_pages`.
    pub current_page: usize,
    /// Never zero, so page controls stay stable on empty lists.
    pub total_pages: usize,
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Slices `ordered` to the requested page. Out-of-range page numbers clamp
/// into `1..=total_pages`; a page size of zero is treated as one.
pub fn paginate<T: Clone>(ordered: &[T], page_size: usize, page_number: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(ordered.len(), page_size);
    let current_page = page_number.clamp(1, total_pages);
    let start = (current_page - 1) * page_size;
    let end = (start + page_size).min(ordered.len());
    let items = ordered.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
    Page {
        items,
        current_page,
        total_pages,
    }
}

/// Why a page has no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The collection itself is empty.
    NoRecords,
    /// Records exist but none pass the active filters.
    NoMatches,
}

/// Result of running the whole filter, sort and paginate pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<'a, R> {
    pub items: Vec<&'a R>,
    pub current_page: usize,
    pub total_pages: usize,
    /// Records passing the filters, across all pages.
    pub matching: usize,
    /// Records in the collection before filtering.
    pub total: usize,
    pub filters_active: bool,
}

impl<R> ListPage<'_, R> {
    pub fn empty_reason(&self) -> Option<EmptyReason> {
        if !self.items.is_empty() {
            None
        } else if self.total == 0 {
            Some(EmptyReason::NoRecords)
        } else {
            Some(EmptyReason::NoMatches)
        }
    }
}

pub fn run<'a, R: ListRecord>(
    records: &'a [R],
    filter: &FilterSpec,
    sort: &SortSpec,
    page_size: usize,
    page_number: usize,
) -> ListPage<'a, R> {
    let filtered = apply_filters(records, filter);
    let matching = filtered.len();
    let ordered = apply_sort(filtered, sort);
    let page = paginate(&ordered, page_size, page_number);
    ListPage {
        items: page.items,
        current_page: page.current_page,
        total_pages: page.total_pages,
        matching,
        total: records.len(),
        filters_active: filter.is_active(),
    }
}
