use medialib_core::MediaRecord;
use std::collections::HashSet;
use uuid::Uuid;

/// Default number of records per page
pub const DEFAULT_PAGE_SIZE: usize = 24;

/// One page of the filtered view
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<MediaRecord>,
    /// Zero-based page index; equals the number of pages before this one
    pub page: usize,
    pub has_more: bool,
}

/// Fixed-size page cursor over a filtered result set
///
/// The cursor remembers which record IDs it has handed out, so records inserted or
/// removed between pages never shift later pages into duplicates or gaps. It is exhausted
/// once a page comes back shorter than `page_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    pages_loaded: usize,
    handed_out: HashSet<Uuid>,
    exhausted: bool,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            pages_loaded: 0,
            handed_out: HashSet::new(),
            exhausted: false,
        }
    }

    pub fn reset(&mut self) {
        self.pages_loaded = 0;
        self.handed_out.clear();
        self.exhausted = false;
    }

    /// Take the next `page_size` records of `filtered` not handed out yet
    ///
    /// Once exhausted, returns an empty page without moving the cursor.
    pub fn next_page(&mut self, filtered: &[MediaRecord]) -> Page {
        if self.exhausted {
            return Page {
                items: Vec::new(),
                page: self.pages_loaded,
                has_more: false,
            };
        }

        let page = self.pages_loaded;
        let items: Vec<MediaRecord> = filtered
            .iter()
            .filter(|r| !self.handed_out.contains(&r.id))
            .take(self.page_size)
            .cloned()
            .collect();

        self.handed_out.extend(items.iter().map(|r| r.id));
        self.pages_loaded += 1;
        if items.len() < self.page_size {
            self.exhausted = true;
        }

        Page {
            items,
            page,
            has_more: !self.exhausted,
        }
    }

    /// Number of records handed out so far
    pub fn visible_len(&self) -> usize {
        self.handed_out.len()
    }

    pub fn is_handed_out(&self, id: Uuid) -> bool {
        self.handed_out.contains(&id)
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
