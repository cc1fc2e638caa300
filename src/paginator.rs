/// Splits a list into 1-based pages of `page_size` items.
pub struct Paginator<'a, T> {
    items: &'a [T],
    page_size: usize,
}

impl<'a, T> Paginator<'a, T> {
    pub fn from(items: &'a [T], page_size: usize) -> Self {
        Paginator {
            items,
            page_size: page_size.max(1),
        }
    }

    /// Every page in order, always at least one (possibly empty) page.
    pub fn pages(&self) -> Vec<&'a [T]> {
        if self.items.is_empty() {
            return vec![self.items];
        }
        self.items.chunks(self.page_size).collect()
    }
}

/// Url of the n-th index page, `/` for the first one.
pub fn page_url(page: usize) -> String {
    match page {
        0 | 1 => "/".to_string(),
        n => format!("/page/{}/", n),
    }
}
