use serde::Serialize;

/// Window width of the compact pager.
pub const COMPACT_WINDOW: usize = 5;
/// Window width of the wide pager.
pub const WIDE_WINDOW: usize = 7;

/// One page of a remote collection.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> PagedResult<T> {
    /// Builds a page, deriving `total_pages` from `total_items` and dropping
    /// items beyond `page_size`.
    pub fn new(mut items: Vec<T>, page: usize, page_size: usize, total_items: usize) -> Self {
        let page_size = page_size.max(1);
        if items.len() > page_size {
            log::warn!(
                "Received {} items for a page of {page_size}, truncating",
                items.len()
            );
            items.truncate(page_size);
        }

        Self {
            items,
            page: page.max(1),
            page_size,
            total_items,
            total_pages: Self::pages_for(total_items, page_size),
        }
    }

    pub fn empty(page_size: usize) -> Self {
        Self::new(Vec::new(), 1, page_size, 0)
    }

    /// `ceil(total_items / page_size)`, never less than one.
    pub fn pages_for(total_items: usize, page_size: usize) -> usize {
        total_items.div_ceil(page_size.max(1)).max(1)
    }
}

/// Page buttons for `last_page >= 1`.
fn get_pages(last_page: usize, current_page: usize, window: usize) -> Vec<Option<usize>> {
    let window = window.max(1);
    if last_page <= window {
        return (1..=last_page).map(Some).collect();
    }

    let current_page = current_page.clamp(1, last_page);
    let mut start = current_page.saturating_sub(window / 2).max(1);
    let mut end = start + window - 1;
    if end > last_page {
        end = last_page;
        start = last_page + 1 - window;
    }

    let mut pages = Vec::with_capacity(window + 2);
    if start > 1 {
        pages.push(None);
    }
    pages.extend((start..=end).map(Some));
    if end < last_page {
        pages.push(None);
    }

    pages
}

/// Target page of a directional pager control.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct NavControl {
    pub page: usize,
    pub enabled: bool,
}

/// Everything a pager needs to render: page buttons (`None` marks an
/// ellipsis), the four directional controls and a summary label.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PaginationView {
    pub pages: Vec<Option<usize>>,
    pub current: usize,
    pub total_pages: usize,
    pub first: NavControl,
    pub prev: NavControl,
    pub next: NavControl,
    pub last: NavControl,
    /// 1-based inclusive range of items on the current page.
    pub item_range: Option<(usize, usize)>,
    pub summary: String,
}

/// Computes the pager for the given position.
pub fn pagination_view(
    current_page: usize,
    total_pages: usize,
    total_items: usize,
    page_size: usize,
    window: usize,
) -> PaginationView {
    if total_items == 0 {
        let disabled = NavControl {
            page: 1,
            enabled: false,
        };
        return PaginationView {
            pages: vec![],
            current: 0,
            total_pages: 0,
            first: disabled,
            prev: disabled,
            next: disabled,
            last: disabled,
            item_range: None,
            summary: "0 / 0".to_string(),
        };
    }

    let total_pages = total_pages.max(1);
    let current = current_page.clamp(1, total_pages);
    let at_start = current == 1;
    let at_end = current == total_pages;

    let page_size = page_size.max(1);
    let first_item = (current - 1) * page_size + 1;
    let last_item = (current * page_size).min(total_items);
    let item_range = (first_item <= last_item).then_some((first_item, last_item));

    PaginationView {
        pages: get_pages(total_pages, current, window),
        current,
        total_pages,
        first: NavControl {
            page: 1,
            enabled: !at_start,
        },
        prev: NavControl {
            page: current.saturating_sub(1).max(1),
            enabled: !at_start,
        },
        next: NavControl {
            page: (current + 1).min(total_pages),
            enabled: !at_end,
        },
        last: NavControl {
            page: total_pages,
            enabled: !at_end,
        },
        item_range,
        summary: format!("{current} / {total_pages}"),
    }
}
