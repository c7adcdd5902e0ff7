//! Common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The number of transactions to display per page.
    pub page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_pages: 5,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// Build the row of pagination indicators for the current page: a window of
/// up to `max_pages` page numbers around `curr_page`, with the first and last
/// page pinned behind ellipses when the window does not reach them, and
/// back/next buttons when there is somewhere to go.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let half_window = max_pages / 2;

    let (start, end) = if page_count <= max_pages {
        (1, page_count)
    } else if curr_page <= half_window {
        (1, max_pages)
    } else if curr_page > page_count - half_window {
        (page_count - max_pages + 1, page_count)
    } else {
        (curr_page - half_window, curr_page + half_window)
    };

    let mut indicators: Vec<PaginationIndicator> = (start..=end)
        .map(|page| {
            if page == curr_page {
                PaginationIndicator::CurrPage(page)
            } else {
                PaginationIndicator::Page(page)
            }
        })
        .collect();

    if start > 1 {
        indicators.insert(0, PaginationIndicator::Ellipsis);
        indicators.insert(0, PaginationIndicator::Page(1));
    }

    if end < page_count {
        indicators.push(PaginationIndicator::Ellipsis);
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}
