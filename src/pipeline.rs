//! Record view pipeline.
//!
//! Turns the immutable record list plus the user chosen [`ViewParameters`]
//! into the rows of the current page. The steps always run in the same order:
//! tab, text query, status filter, section filter, stable sort, pagination.
//! Nothing in here mutates the records or keeps state between calls.

use derive_setters::Setters;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::roster::{Record, Section, Status};

/// Coarse preset on top of the explicit status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    All,
    Active,
    Inactive,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::All, Tab::Active, Tab::Inactive];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::All => "All Users",
            Tab::Active => "Active",
            Tab::Inactive => "Inactive",
        }
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(&self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    fn keeps(&self, record: &Record) -> bool {
        match self {
            Tab::All => true,
            Tab::Active => record.status == Status::Active,
            Tab::Inactive => record.status == Status::Inactive,
        }
    }
}

/// Either everything or exactly one value of a closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: PartialEq + Copy> Filter<T> {
    pub fn keeps(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    /// All -> first option -> ... -> last option -> All.
    pub fn cycle(&self, options: &[T]) -> Filter<T> {
        match self {
            Filter::All => options.first().map_or(Filter::All, |&o| Filter::Only(o)),
            Filter::Only(current) => options
                .iter()
                .position(|o| o == current)
                .and_then(|idx| options.get(idx + 1))
                .map_or(Filter::All, |&o| Filter::Only(o)),
        }
    }
}

impl<T: fmt::Display> Filter<T> {
    pub fn label(&self, all_label: &str) -> String {
        match self {
            Filter::All => all_label.to_string(),
            Filter::Only(v) => v.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Id,
    Name,
    Email,
    Section,
    Status,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Id,
        SortKey::Name,
        SortKey::Email,
        SortKey::Section,
        SortKey::Status,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Id => "ID",
            SortKey::Name => "Name",
            SortKey::Email => "Email",
            SortKey::Section => "Section",
            SortKey::Status => "Status",
        }
    }

    /// Column number as typed by the user, starting at 1.
    pub fn from_column(number: u8) -> Option<SortKey> {
        SortKey::ALL.get((number as usize).checked_sub(1)?).copied()
    }

    fn text(&self, record: &Record) -> String {
        match self {
            SortKey::Id => record.id.to_string(),
            SortKey::Name => record.name.to_lowercase(),
            SortKey::Email => record.email.to_lowercase(),
            SortKey::Section => record.section.as_str().to_lowercase(),
            SortKey::Status => record.status.to_string().to_lowercase(),
        }
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            _ => self.text(a).cmp(&self.text(b)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Five,
    Ten,
    Twenty,
}

impl PageSize {
    pub fn rows(&self) -> usize {
        match self {
            PageSize::Five => 5,
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
        }
    }

    pub fn next(&self) -> PageSize {
        match self {
            PageSize::Five => PageSize::Ten,
            PageSize::Ten => PageSize::Twenty,
            PageSize::Twenty => PageSize::Five,
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rows())
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5" => Ok(PageSize::Five),
            "10" => Ok(PageSize::Ten),
            "20" => Ok(PageSize::Twenty),
            other => Err(format!("rows per page must be 5, 10 or 20, got {other}")),
        }
    }
}

/// Everything the user can change about the table. Owned by the model,
/// read by [`compute_view`].
#[derive(Debug, Clone, PartialEq, Eq, Setters)]
#[setters(prefix = "with_")]
pub struct ViewParameters {
    #[setters(into)]
    pub query: String,
    pub status_filter: Filter<Status>,
    pub section_filter: Filter<Section>,
    pub tab: Tab,
    pub sort: SortConfig,
    pub page: usize,
    pub page_size: PageSize,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            query: String::new(),
            status_filter: Filter::All,
            section_filter: Filter::All,
            tab: Tab::All,
            sort: SortConfig::default(),
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl ViewParameters {
    // Changing what is filtered always starts over on the first page.

    pub fn set_query(&mut self, query: &str) {
        if self.query != query {
            self.query = query.to_string();
            self.page = 1;
        }
    }

    pub fn set_status_filter(&mut self, filter: Filter<Status>) {
        if self.status_filter != filter {
            self.status_filter = filter;
            self.page = 1;
        }
    }

    pub fn set_section_filter(&mut self, filter: Filter<Section>) {
        if self.section_filter != filter {
            self.section_filter = filter;
            self.page = 1;
        }
    }

    pub fn set_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.page = 1;
        }
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Clicking the active column while ascending flips to descending,
    /// anything else sorts the column ascending.
    pub fn request_sort(&mut self, key: SortKey) {
        let direction =
            if self.sort.key == key && self.sort.direction == SortDirection::Ascending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
        self.sort = SortConfig { key, direction };
    }

    /// Tab and page size survive a reset.
    pub fn reset_filters(&mut self) {
        self.query.clear();
        self.status_filter = Filter::All;
        self.section_filter = Filter::All;
        self.sort = SortConfig::default();
        self.page = 1;
    }

    pub fn active_filter_count(&self) -> usize {
        [
            !self.query.is_empty(),
            !self.status_filter.is_all(),
            !self.section_filter.is_all(),
        ]
        .iter()
        .filter(|&&active| active)
        .count()
    }

    pub fn first_page(&mut self) {
        self.page = 1;
    }

    pub fn previous_page(&mut self) {
        self.page = std::cmp::max(1, self.page.saturating_sub(1));
    }

    pub fn next_page(&mut self, total_pages: usize) {
        if self.has_next_page(total_pages) {
            self.page += 1;
        }
    }

    pub fn last_page(&mut self, total_pages: usize) {
        if total_pages > 0 {
            self.page = total_pages;
        }
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    pub fn has_next_page(&self, total_pages: usize) -> bool {
        total_pages > 0 && self.page < total_pages
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct View {
    pub rows: Vec<Record>,
    pub total_filtered: usize,
    pub total_pages: usize,
}

impl View {
    /// First and last position (1-based, inclusive) of the current page within
    /// the filtered records, `(0, 0)` when nothing matched.
    pub fn display_range(&self, params: &ViewParameters) -> (usize, usize) {
        let start = page_start(params.page, params.page_size);
        if start >= self.total_filtered {
            return (0, 0);
        }
        let end = std::cmp::min(start + params.page_size.rows(), self.total_filtered);
        (start + 1, end)
    }
}

/// Offset of the first record on `page`. Saturates for pages far past the end.
fn page_start(page: usize, page_size: PageSize) -> usize {
    page.saturating_sub(1).saturating_mul(page_size.rows())
}

/// Steps one to four: keep the records matching tab, query, status and section.
pub fn filter_records(records: &[Record], params: &ViewParameters) -> Vec<Record> {
    let query = params.query.to_lowercase();
    records
        .iter()
        .filter(|r| params.tab.keeps(r))
        .filter(|r| {
            query.is_empty()
                || r.name.to_lowercase().contains(&query)
                || r.email.to_lowercase().contains(&query)
        })
        .filter(|r| params.status_filter.keeps(&r.status))
        .filter(|r| params.section_filter.keeps(&r.section))
        .cloned()
        .collect()
}

/// Step five. `sort_by` is stable, so equal keys keep their input order in
/// both directions.
pub fn sort_records(records: &mut [Record], sort: SortConfig) {
    records.sort_by(|a, b| {
        let ord = sort.key.compare(a, b);
        match sort.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

pub fn compute_view(records: &[Record], params: &ViewParameters) -> View {
    let mut filtered = filter_records(records, params);
    sort_records(&mut filtered, params.sort);

    let size = params.page_size.rows();
    let total_filtered = filtered.len();
    let total_pages = total_filtered.div_ceil(size);

    let start = page_start(params.page, params.page_size);
    let rows = filtered.into_iter().skip(start).take(size).collect();

    View {
        rows,
        total_filtered,
        total_pages,
    }
}

/// Up to three page numbers to offer as direct jumps, keeping the current
/// page in the window.
pub fn page_window(page: usize, total_pages: usize) -> Vec<usize> {
    let first = if total_pages <= 3 || page <= 2 {
        1
    } else if page >= total_pages - 1 {
        total_pages - 2
    } else {
        page - 1
    };
    (first..first + std::cmp::min(total_pages, 3)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::seed_records;

    fn ids(rows: &[Record]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn default_view_is_first_page_by_id() {
        let view = compute_view(&seed_records(), &ViewParameters::default());
        assert_eq!(ids(&view.rows), vec![1, 2, 3, 4, 5]);
        assert_eq!(view.total_filtered, 11);
        assert_eq!(view.total_pages, 3);
    }

    #[test]
    fn active_tab_keeps_only_active_records() {
        let params = ViewParameters::default().with_tab(Tab::Active);
        let view = compute_view(&seed_records(), &params);
        assert_eq!(ids(&view.rows), vec![1, 2, 4, 5, 7]);
        // Records 3, 6 and 9 are the inactive ones.
        assert_eq!(view.total_filtered, 8);
        assert_eq!(view.total_pages, 2);

        let view = compute_view(&seed_records(), &params.clone().with_page(2));
        assert_eq!(ids(&view.rows), vec![8, 10, 11]);
    }

    #[test]
    fn inactive_tab_and_status_filter_can_exclude_everything() {
        let params = ViewParameters::default()
            .with_tab(Tab::Inactive)
            .with_status_filter(Filter::Only(Status::Active));
        let view = compute_view(&seed_records(), &params);
        assert!(view.rows.is_empty());
        assert_eq!(view.total_filtered, 0);
        assert_eq!(view.total_pages, 0);
        assert_eq!(view.display_range(&params), (0, 0));
    }

    #[test]
    fn query_matches_name_case_insensitively() {
        let params = ViewParameters::default().with_query("jane");
        let view = compute_view(&seed_records(), &params);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].name, "Jane Smith");
        assert_eq!(view.total_filtered, 1);

        let params = ViewParameters::default().with_query("SMITH");
        assert_eq!(compute_view(&seed_records(), &params).total_filtered, 1);
    }

    #[test]
    fn query_matches_email() {
        // Only jennifer@example.com has an "r" before the "@".
        let params = ViewParameters::default().with_query("r@EXAMPLE");
        let view = compute_view(&seed_records(), &params);
        assert_eq!(ids(&view.rows), vec![8]);

        let params = ViewParameters::default().with_query("example.com");
        assert_eq!(compute_view(&seed_records(), &params).total_filtered, 11);
    }

    #[test]
    fn section_filter_selects_single_record() {
        let params = ViewParameters::default().with_section_filter(Filter::Only(Section::S3F));
        let view = compute_view(&seed_records(), &params);
        assert_eq!(ids(&view.rows), vec![6]);
        assert_eq!(view.rows[0].section, Section::S3F);
        assert_eq!(view.total_filtered, 1);
    }

    #[test]
    fn filters_combine() {
        let params = ViewParameters::default()
            .with_status_filter(Filter::Only(Status::Inactive))
            .with_section_filter(Filter::Only(Section::S3C));
        let view = compute_view(&seed_records(), &params);
        assert_eq!(ids(&view.rows), vec![3, 9]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let records = seed_records();
        for tab in Tab::ALL {
            for query in ["", "a", "j", "example", "zz"] {
                let params = ViewParameters::default()
                    .with_tab(tab)
                    .with_query(query)
                    .with_section_filter(Filter::Only(Section::S3A));
                let once = filter_records(&records, &params);
                let twice = filter_records(&once, &params);
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn sort_by_id_is_strictly_increasing() {
        let params = ViewParameters::default().with_page_size(PageSize::Twenty);
        let view = compute_view(&seed_records(), &params);
        assert!(view.rows.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn sort_by_id_descending() {
        let params = ViewParameters::default().with_sort(SortConfig {
            key: SortKey::Id,
            direction: SortDirection::Descending,
        });
        let view = compute_view(&seed_records(), &params);
        assert_eq!(ids(&view.rows), vec![11, 10, 9, 8, 7]);
    }

    #[test]
    fn sort_by_name_ignores_case() {
        let mut records = seed_records();
        records.push(Record::new(12, "aaron lower", "aaron@example.com", Section::S3B, Status::Active));
        let params = ViewParameters::default().with_sort(SortConfig {
            key: SortKey::Name,
            direction: SortDirection::Ascending,
        });
        let view = compute_view(&records, &params);
        let names: Vec<&str> = view.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["aaron lower", "Daniel White", "David Miller", "Emily Davis", "James Anderson"]
        );
    }

    #[test]
    fn sort_is_stable_in_both_directions() {
        let mut params = ViewParameters::default()
            .with_page_size(PageSize::Twenty)
            .with_sort(SortConfig {
                key: SortKey::Section,
                direction: SortDirection::Ascending,
            });
        let view = compute_view(&seed_records(), &params);
        assert_eq!(ids(&view.rows), vec![1, 7, 2, 8, 3, 9, 4, 10, 5, 11, 6]);

        params.sort.direction = SortDirection::Descending;
        let view = compute_view(&seed_records(), &params);
        assert_eq!(ids(&view.rows), vec![6, 5, 11, 4, 10, 3, 9, 2, 8, 1, 7]);
    }

    #[test]
    fn sort_by_status_groups_active_first() {
        let params = ViewParameters::default()
            .with_page_size(PageSize::Twenty)
            .with_sort(SortConfig {
                key: SortKey::Status,
                direction: SortDirection::Ascending,
            });
        let view = compute_view(&seed_records(), &params);
        assert_eq!(ids(&view.rows), vec![1, 2, 4, 5, 7, 8, 10, 11, 3, 6, 9]);
    }

    #[test]
    fn page_length_matches_remaining_records() {
        let records = seed_records();
        let sections: Vec<Filter<Section>> = std::iter::once(Filter::All)
            .chain(Section::ALL.into_iter().map(Filter::Only))
            .collect();
        for tab in Tab::ALL {
            for section in &sections {
                for size in [PageSize::Five, PageSize::Ten, PageSize::Twenty] {
                    for key in SortKey::ALL {
                        for page in 1..=4 {
                            let params = ViewParameters::default()
                                .with_tab(tab)
                                .with_section_filter(*section)
                                .with_page_size(size)
                                .with_sort(SortConfig {
                                    key,
                                    direction: SortDirection::Descending,
                                })
                                .with_page(page);
                            let view = compute_view(&records, &params);
                            let n = size.rows();
                            assert!(view.rows.len() <= n);
                            let expected = if page <= view.total_pages {
                                std::cmp::min(n, view.total_filtered - (page - 1) * n)
                            } else {
                                0
                            };
                            assert_eq!(view.rows.len(), expected, "{params:?}");
                            assert_eq!(view.total_pages, view.total_filtered.div_ceil(n));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn huge_page_yields_no_rows() {
        let records = seed_records();
        for page in [usize::MAX, (1 << 62) + 1, 4] {
            let params = ViewParameters::default()
                .with_page_size(PageSize::Twenty)
                .with_page(page);
            let view = compute_view(&records, &params);
            assert!(view.rows.is_empty(), "page {page}");
            assert_eq!(view.total_filtered, 11);
            assert_eq!(view.display_range(&params), (0, 0));
        }
    }

    #[test]
    fn filter_changes_reset_page() {
        let mut params = ViewParameters::default().with_page(3);
        params.set_status_filter(Filter::Only(Status::Active));
        assert_eq!(params.page, 1);

        params.page = 3;
        params.set_section_filter(Filter::Only(Section::S3A));
        assert_eq!(params.page, 1);

        params.page = 3;
        params.set_tab(Tab::Inactive);
        assert_eq!(params.page, 1);

        params.page = 3;
        params.set_query("jo");
        assert_eq!(params.page, 1);

        params.page = 2;
        params.set_page_size(PageSize::Ten);
        assert_eq!(params.page, 1);
    }

    #[test]
    fn unchanged_filter_keeps_page() {
        let mut params = ViewParameters::default().with_page(2);
        params.set_status_filter(Filter::All);
        params.set_query("");
        params.set_tab(Tab::All);
        assert_eq!(params.page, 2);
    }

    #[test]
    fn sort_and_navigation_keep_page() {
        let mut params = ViewParameters::default().with_page(2);
        params.request_sort(SortKey::Name);
        assert_eq!(params.page, 2);
        params.next_page(3);
        assert_eq!(params.page, 3);
        params.next_page(3);
        assert_eq!(params.page, 3);
        params.previous_page();
        params.previous_page();
        params.previous_page();
        assert_eq!(params.page, 1);
        params.last_page(3);
        assert_eq!(params.page, 3);
        params.last_page(0);
        assert_eq!(params.page, 3);
        params.first_page();
        assert_eq!(params.page, 1);
    }

    #[test]
    fn request_sort_toggles_direction() {
        let mut params = ViewParameters::default();
        params.request_sort(SortKey::Id);
        assert_eq!(params.sort.direction, SortDirection::Descending);
        params.request_sort(SortKey::Id);
        assert_eq!(params.sort.direction, SortDirection::Ascending);
        params.request_sort(SortKey::Id);
        params.request_sort(SortKey::Email);
        assert_eq!(
            params.sort,
            SortConfig {
                key: SortKey::Email,
                direction: SortDirection::Ascending
            }
        );
    }

    #[test]
    fn reset_filters_keeps_tab() {
        let mut params = ViewParameters::default()
            .with_query("jo")
            .with_status_filter(Filter::Only(Status::Inactive))
            .with_section_filter(Filter::Only(Section::S3B))
            .with_tab(Tab::Active)
            .with_page(2);
        params.request_sort(SortKey::Name);
        assert_eq!(params.active_filter_count(), 3);

        params.reset_filters();
        assert_eq!(params.active_filter_count(), 0);
        assert_eq!(params.tab, Tab::Active);
        assert_eq!(params.sort, SortConfig::default());
        assert_eq!(params.page, 1);
    }

    #[test]
    fn filter_cycles_through_options() {
        let mut filter = Filter::All;
        let mut seen = Vec::new();
        for _ in 0..3 {
            filter = filter.cycle(&Status::ALL);
            seen.push(filter);
        }
        assert_eq!(
            seen,
            vec![
                Filter::Only(Status::Active),
                Filter::Only(Status::Inactive),
                Filter::All
            ]
        );
        assert_eq!(Filter::Only(Section::S3F).cycle(&Section::ALL), Filter::All);
        assert_eq!(Filter::<Section>::All.label("All Sections"), "All Sections");
    }

    #[test]
    fn tabs_and_page_sizes_wrap_around() {
        assert_eq!(Tab::Inactive.next(), Tab::All);
        assert_eq!(Tab::All.previous(), Tab::Inactive);
        assert_eq!(PageSize::Twenty.next(), PageSize::Five);
        assert_eq!("10".parse::<PageSize>(), Ok(PageSize::Ten));
        assert!("7".parse::<PageSize>().is_err());
        assert_eq!(SortKey::from_column(2), Some(SortKey::Name));
        assert_eq!(SortKey::from_column(0), None);
        assert_eq!(SortKey::from_column(6), None);
    }

    #[test]
    fn page_window_tracks_current_page() {
        assert_eq!(page_window(1, 0), Vec::<usize>::new());
        assert_eq!(page_window(1, 2), vec![1, 2]);
        assert_eq!(page_window(2, 3), vec![1, 2, 3]);
        assert_eq!(page_window(2, 6), vec![1, 2, 3]);
        assert_eq!(page_window(4, 6), vec![3, 4, 5]);
        assert_eq!(page_window(5, 6), vec![4, 5, 6]);
        assert_eq!(page_window(6, 6), vec![4, 5, 6]);
    }

    #[test]
    fn display_range_covers_last_partial_page() {
        let params = ViewParameters::default().with_page(3);
        let view = compute_view(&seed_records(), &params);
        assert_eq!(ids(&view.rows), vec![11]);
        assert_eq!(view.display_range(&params), (11, 11));
        assert!(!params.has_next_page(view.total_pages));
        assert!(params.has_previous_page());
    }
}
