//! Page arithmetic for the public listings.
//!
//! Page numbers are 1-based and resolved leniently: a missing or unparsable
//! page is page 1, anything past the end is the last page, and an empty
//! collection still has one (empty) page.

use serde::Serialize;

pub const PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total_items: i64,
    per_page: i64,
}

impl Paginator {
    pub fn new(total_items: i64) -> Self {
        Self::with_page_size(total_items, PAGE_SIZE)
    }

    pub fn with_page_size(total_items: i64, per_page: i64) -> Self {
        Self {
            total_items: total_items.max(0),
            per_page: per_page.max(1),
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.total_items == 0 {
            1
        } else {
            (self.total_items + self.per_page - 1) / self.per_page
        }
    }

    /// Resolve a raw `page` query value to a valid page number.
    pub fn resolve(&self, requested: Option<&str>) -> Page {
        let number = match requested.and_then(|raw| raw.trim().parse::<i64>().ok()) {
            None => 1,
            Some(n) if n < 1 => self.total_pages(),
            Some(n) => n.min(self.total_pages()),
        };

        Page {
            number,
            total_pages: self.total_pages(),
            limit: self.per_page,
            offset: (number - 1) * self.per_page,
        }
    }
}

/// A resolved page: its number plus the rows it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub total_pages: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response envelope shared by the paginated endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PageEnvelope<T: Serialize> {
    pub total_pages: i64,
    pub current_page: i64,
    #[serde(flatten)]
    pub items: T,
}

impl<T: Serialize> PageEnvelope<T> {
    pub fn new(page: Page, items: T) -> Self {
        Self {
            total_pages: page.total_pages,
            current_page: page.number,
            items,
        }
    }
}
