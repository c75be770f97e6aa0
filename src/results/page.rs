//! Paginated result views

use super::types::{
    FacetFieldEntry, FacetFieldResult, FacetPivotResult, FacetQueryEntry, FieldStatsResult,
    GroupResult, Highlight, RangeFacetResult,
};
use crate::query::PageRequest;
use serde::Serialize;

/// A slice of results plus the information needed to page through them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    content: Vec<T>,
    pageable: Option<PageRequest>,
    total: u64,
    max_score: Option<f32>,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: Option<PageRequest>, total: u64) -> Self {
        Self {
            content,
            pageable,
            total,
            max_score: None,
        }
    }

    pub fn with_max_score(mut self, max_score: Option<f32>) -> Self {
        self.max_score = max_score;
        self
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), None, 0)
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.content.iter()
    }

    pub fn pageable(&self) -> Option<PageRequest> {
        self.pageable
    }

    /// Total matches across all pages
    pub fn total_elements(&self) -> u64 {
        self.total
    }

    pub fn max_score(&self) -> Option<f32> {
        self.max_score
    }

    /// Requested page size, or the content length when unpaged
    pub fn size(&self) -> u32 {
        self.pageable
            .map(|p| p.size)
            .unwrap_or(self.content.len() as u32)
    }

    /// 0-indexed page number
    pub fn number(&self) -> u64 {
        self.pageable.map(|p| p.page_number()).unwrap_or(0)
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn total_pages(&self) -> u64 {
        match self.size() {
            0 => 1,
            size => self.total.div_ceil(size as u64).max(1),
        }
    }

    pub fn has_next(&self) -> bool {
        self.number() + 1 < self.total_pages()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Convert the content, keeping paging information
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            pageable: self.pageable,
            total: self.total,
            max_score: self.max_score,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.iter()
    }
}

/// Result of a criteria query with whatever facet, group, highlight and
/// stats sections the engine returned
#[derive(Debug, Clone)]
pub struct ResultPage<T> {
    pub page: Page<T>,
    pub facet_fields: Vec<FacetFieldResult>,
    pub facet_pivots: Vec<FacetPivotResult>,
    pub facet_ranges: Vec<RangeFacetResult>,
    pub facet_queries: Vec<FacetQueryEntry>,
    pub groups: Vec<GroupResult<T>>,
    /// One entry per document of `page`, in the same order
    pub highlights: Vec<Highlight>,
    pub field_stats: Vec<FieldStatsResult>,
}

/// Plain query result
pub type ScoredPage<T> = ResultPage<T>;
/// Facet query result
pub type FacetPage<T> = ResultPage<T>;
/// Grouped query result
pub type GroupPage<T> = ResultPage<T>;
/// Highlight query result
pub type HighlightPage<T> = ResultPage<T>;
/// Stats query result
pub type StatsPage<T> = ResultPage<T>;

impl<T> ResultPage<T> {
    pub fn new(page: Page<T>) -> Self {
        Self {
            page,
            facet_fields: Vec::new(),
            facet_pivots: Vec::new(),
            facet_ranges: Vec::new(),
            facet_queries: Vec::new(),
            groups: Vec::new(),
            highlights: Vec::new(),
            field_stats: Vec::new(),
        }
    }

    pub fn content(&self) -> &[T] {
        self.page.content()
    }

    pub fn into_content(self) -> Vec<T> {
        self.page.into_content()
    }

    pub fn total_elements(&self) -> u64 {
        self.page.total_elements()
    }

    pub fn max_score(&self) -> Option<f32> {
        self.page.max_score()
    }

    /// Facet entries of the field facet on `field`
    pub fn facet_result_page(&self, field: &str) -> Option<&Page<FacetFieldEntry>> {
        self.facet_fields
            .iter()
            .find(|r| r.field.name == field)
            .map(|r| &r.entries)
    }

    /// Pivot result whose comma separated field list is `name`
    pub fn pivot(&self, name: &str) -> Option<&FacetPivotResult> {
        self.facet_pivots.iter().find(|r| r.pivot.name() == name)
    }

    pub fn range_facet(&self, field: &str) -> Option<&RangeFacetResult> {
        self.facet_ranges.iter().find(|r| r.range.field == field)
    }

    /// Group result of the command the engine reports as `name`
    pub fn group_result(&self, name: &str) -> Option<&GroupResult<T>> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn field_stats(&self, field: &str) -> Option<&FieldStatsResult> {
        self.field_stats.iter().find(|s| s.name == field)
    }

    /// Highlight of the document at `index` of the content
    pub fn highlights_for(&self, index: usize) -> Option<&Highlight> {
        self.highlights.get(index)
    }

    /// Documents paired with their highlight
    pub fn highlighted(&self) -> impl Iterator<Item = (&T, &Highlight)> {
        self.page.iter().zip(self.highlights.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_math() {
        let page = Page::new(vec![1, 2, 3], Some(PageRequest::of(1, 3)), 10);
        assert_eq!(page.number(), 1);
        assert_eq!(page.total_pages(), 4);
        assert!(page.has_next());

        let last = Page::new(vec![10], Some(PageRequest::of(3, 3)), 10);
        assert!(!last.has_next());
    }

    #[test]
    fn test_unpaged() {
        let page: Page<u32> = Page::new(vec![1, 2], None, 2);
        assert_eq!(page.size(), 2);
        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_next());

        let empty: Page<u32> = Page::empty();
        assert_eq!(empty.total_pages(), 1);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_map_keeps_paging() {
        let page = Page::new(vec![1, 2], Some(PageRequest::of(0, 2)), 5).with_max_score(Some(1.5));
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.content(), ["1", "2"]);
        assert_eq!(mapped.total_elements(), 5);
        assert_eq!(mapped.max_score(), Some(1.5));
    }
}
