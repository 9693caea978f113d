pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }

    pub fn next(self) -> Self {
        Self::new(self.page.saturating_add(1), self.limit)
    }

    /// Previous page, staying on page 1.
    pub fn prev(self) -> Self {
        Self::new(self.page.saturating_sub(1), self.limit)
    }

    /// Number of rows on the pages before this one.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }

    pub fn query(&self) -> String {
        format!("page={}&limit={}", self.page, self.limit)
    }
}
