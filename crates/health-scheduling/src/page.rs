//! 1-based pagination over listed appointments

use mediflow_validation::{validate_page, ValidationErrors};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        PageRequest { page, page_size }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_page(self.page, self.page_size).into_result()
    }

    fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }
}

/// One page of results plus the totals needed to render a pager
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Cut `request`'s page out of an already ordered result set
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let size = request.page_size.max(1) as usize;
        let total_pages = u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX);
        let items = all.into_iter().skip(request.offset()).take(size).collect();

        Page {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
            total_pages,
        }
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}
