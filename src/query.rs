//! Search, category filtering, and pagination over loaded posts. Filtering
//! is a linear scan; the collection is a personal blog's post list, not a
//! search index.

use crate::post::Post;

/// A search term plus a category, both optional (empty matches everything).
#[derive(Clone, Debug, Default)]
pub struct Query {
    pub search: String,
    pub category: String,
}

impl Query {
    pub fn matches(&self, post: &Post) -> bool {
        self.matches_search(post) && self.matches_category(post)
    }

    /// A post matches the search term if its title, excerpt, or any tag
    /// contains the term, case-insensitively.
    fn matches_search(&self, post: &Post) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let term = self.search.to_lowercase();
        post.title.to_lowercase().contains(&term)
            || post.excerpt.to_lowercase().contains(&term)
            || post.tags.iter().any(|tag| tag.name.contains(&term))
    }

    /// A post matches a category if one of its tags equals the slugified
    /// category. "all" is the no-op category.
    fn matches_category(&self, post: &Post) -> bool {
        if self.category.is_empty() || self.category == "all" {
            return true;
        }
        let category = slug::slugify(&self.category);
        post.tags.iter().any(|tag| tag.name == category)
    }
}

/// Filters posts against a query, preserving order.
pub fn filter<'a>(posts: &'a [Post], query: &Query) -> Vec<&'a Post> {
    posts.iter().filter(|post| query.matches(post)).collect()
}

/// The number of pages needed for `len` items at `page_size` per page.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    match len % page_size {
        0 => len / page_size,
        _ => len / page_size + 1,
    }
}

/// The slice of items belonging to 1-indexed `page`. Out-of-range pages are
/// empty.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1) * page_size;
    if start >= items.len() {
        return &[];
    }
    let stop = std::cmp::min(start + page_size, items.len());
    &items[start..stop]
}

/// One entry of the pager widget under a page of cards.
#[derive(Debug, PartialEq)]
pub enum PageLink {
    /// Link to the previous page; `None` on the first page.
    Prev(Option<usize>),

    /// A numbered page link.
    Page { number: usize, current: bool },

    /// A disabled gap marker between the window and the first/last page.
    Ellipsis,

    /// Link to the next page; `None` on the last page.
    Next(Option<usize>),
}

/// Number of page links shown either side of the gaps.
const MAX_VISIBLE_PAGES: usize = 5;

/// Lays out the pager for `current` of `total` pages: prev/next at the
/// edges, a window of up to [`MAX_VISIBLE_PAGES`] numbers centered on the
/// current page, and first/last links behind ellipses when the window
/// doesn't reach them. With at most one page the pager disappears entirely.
pub fn page_links(current: usize, total: usize) -> Vec<PageLink> {
    if total <= 1 {
        return Vec::new();
    }

    let mut start = std::cmp::max(1, current.saturating_sub(MAX_VISIBLE_PAGES / 2));
    let stop = std::cmp::min(total, start + MAX_VISIBLE_PAGES - 1);
    if stop - start < MAX_VISIBLE_PAGES - 1 {
        start = std::cmp::max(1, (stop + 1).saturating_sub(MAX_VISIBLE_PAGES));
    }

    let mut links = Vec::new();
    links.push(PageLink::Prev(match current > 1 {
        true => Some(current - 1),
        false => None,
    }));

    if start > 1 {
        links.push(PageLink::Page {
            number: 1,
            current: false,
        });
        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
    }

    for number in start..=stop {
        links.push(PageLink::Page {
            number,
            current: number == current,
        });
    }

    if stop < total {
        if stop < total - 1 {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page {
            number: total,
            current: false,
        });
    }

    links.push(PageLink::Next(match current < total {
        true => Some(current + 1),
        false => None,
    }));
    links
}
