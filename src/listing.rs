//! Search, status tabs and pagination shared by every list view.
//!
//! A list view fetches the whole collection once, narrows it with the status
//! tab and the search term, then slices out the requested page.

use serde::{Deserialize, Serialize};

pub const MAX_PER_PAGE: usize = 100;
pub const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];
const PAGE_WINDOW: usize = 5;

/// Query string of a list view. Numbers are kept as text so that an empty or
/// garbled `page=` falls back to the defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl ListQuery {
    pub fn term(&self) -> &str {
        self.q.as_deref().map(str::trim).unwrap_or("")
    }

    pub fn status_filter(&self) -> &str {
        self.status.as_deref().map(str::trim).unwrap_or("")
    }

    pub fn page(&self) -> usize {
        parse_positive(self.page.as_deref()).unwrap_or(1)
    }

    pub fn per_page(&self, default: usize) -> usize {
        parse_positive(self.per_page.as_deref())
            .unwrap_or(default)
            .clamp(1, MAX_PER_PAGE)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
}

/// A record that can be shown as a row of a list view.
pub trait Listable {
    /// Column headers, in the order `cells` returns values.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;

    /// Status used by the tab filter.
    fn status(&self) -> &str;

    /// Fields the search box matches against.
    fn search_fields(&self) -> Vec<&str>;

    fn cells(&self) -> Vec<String>;
}

pub fn matches_search(fields: &[&str], term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn matches_status(status: &str, filter: &str) -> bool {
    let filter = filter.trim();
    filter.is_empty() || filter.eq_ignore_ascii_case("all") || status.eq_ignore_ascii_case(filter)
}

/// Applies the status tab and then the search term, keeping the input order.
pub fn filter_items<T: Listable>(items: Vec<T>, query: &ListQuery) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            matches_status(item.status(), query.status_filter())
                && matches_search(&item.search_fields(), query.term())
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Tab {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub active: bool,
}

/// Builds the `all` tab plus one tab per status. Counts honour the search
/// term but not the status filter, so every tab shows what it would list.
pub fn build_tabs<T: Listable>(items: &[T], statuses: &[&str], query: &ListQuery) -> Vec<Tab> {
    let searched: Vec<&T> = items
        .iter()
        .filter(|item| matches_search(&item.search_fields(), query.term()))
        .collect();
    let active = query.status_filter();

    let mut tabs = Vec::with_capacity(statuses.len() + 1);
    tabs.push(Tab {
        key: "all".to_owned(),
        label: "All".to_owned(),
        count: searched.len(),
        active: active.is_empty() || active.eq_ignore_ascii_case("all"),
    });
    for status in statuses {
        tabs.push(Tab {
            key: (*status).to_owned(),
            label: humanize(status),
            count: searched
                .iter()
                .filter(|item| item.status().eq_ignore_ascii_case(status))
                .count(),
            active: active.eq_ignore_ascii_case(status),
        });
    }
    tabs
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// 1-based index of the first item shown, 0 when the page is empty.
    pub first_index: usize,
    pub last_index: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_page: usize,
    pub next_page: usize,
    pub page_numbers: Vec<usize>,
}

impl<T> Page<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
            first_index: self.first_index,
            last_index: self.last_index,
            has_prev: self.has_prev,
            has_next: self.has_next,
            prev_page: self.prev_page,
            next_page: self.next_page,
            page_numbers: self.page_numbers,
        }
    }
}

/// Slices out page `page` (1-based). Out of range pages are clamped to the
/// nearest existing page; an empty collection still has one (empty) page.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.clamp(1, MAX_PER_PAGE);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * per_page;

    let items: Vec<T> = items.into_iter().skip(start).take(per_page).collect();
    let first_index = if items.is_empty() { 0 } else { start + 1 };
    let last_index = start + items.len();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
        first_index,
        last_index,
        has_prev: page > 1,
        has_next: page < total_pages,
        prev_page: page.saturating_sub(1).max(1),
        next_page: (page + 1).min(total_pages),
        page_numbers: page_window(page, total_pages),
    }
}

fn page_window(page: usize, total_pages: usize) -> Vec<usize> {
    let end = (page.saturating_sub(PAGE_WINDOW / 2).max(1) + PAGE_WINDOW - 1).min(total_pages);
    let start = end.saturating_sub(PAGE_WINDOW - 1).max(1);
    (start..=end).collect()
}

/// Turns `out_of_stock` or `joinedAt` into `Out of stock` / `Joined at`.
pub fn humanize(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c == '_' || c == '-' {
            out.push(' ');
        } else if c.is_uppercase() && !out.is_empty() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    let mut chars = out.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
