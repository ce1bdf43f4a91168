//! Pagination, sorting and limits supplied outside the query text.
//!
//! Repository-style callers pass these next to the ordinary arguments of a
//! method; [`SpecialParameters::of`] picks them out and
//! [`SpecialParameters::apply`] folds them into a resolved select.

use crate::ast::{SelectQuery, Sort};
use crate::observer::ObserverParser;
use crate::value::Value;

/// One page of results, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sorts: Vec<Sort>,
}

impl PageRequest {
    pub fn of(page: u64, size: u64) -> Self {
        PageRequest {
            page,
            size,
            sorts: vec![],
        }
    }

    pub fn sort_by(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    /// Entities skipped before this page.
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.size)
    }
}

/// A window of results; `start` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub start: u64,
    pub max_results: u64,
}

impl Limit {
    pub fn of(max_results: u64) -> Self {
        Limit {
            start: 1,
            max_results,
        }
    }

    pub fn range(start: u64, end: u64) -> Self {
        Limit {
            start,
            max_results: end.saturating_sub(start).saturating_add(1),
        }
    }
}

/// An argument of a repository call.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    PageRequest(PageRequest),
    Sort(Sort),
    Sorts(Vec<Sort>),
    Limit(Limit),
    /// An ordinary argument, ignored here
    Value(Value),
}

/// Special parameters collected from a call's arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecialParameters {
    page_request: Option<PageRequest>,
    sorts: Vec<Sort>,
    limit: Option<Limit>,
}

impl SpecialParameters {
    /// Collects in argument order. The last page request and the last limit
    /// win; sorts accumulate, including the sorts of page requests.
    pub fn of(arguments: &[Argument]) -> Self {
        let mut special = SpecialParameters::default();
        for argument in arguments {
            match argument {
                Argument::PageRequest(page) => {
                    special.sorts.extend(page.sorts.iter().cloned());
                    special.page_request = Some(page.clone());
                }
                Argument::Sort(sort) => special.sorts.push(sort.clone()),
                Argument::Sorts(sorts) => special.sorts.extend(sorts.iter().cloned()),
                Argument::Limit(limit) => special.limit = Some(*limit),
                Argument::Value(_) => {}
            }
        }
        special
    }

    pub fn page_request(&self) -> Option<&PageRequest> {
        self.page_request.as_ref()
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn limit(&self) -> Option<Limit> {
        self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.page_request.is_none() && self.sorts.is_empty() && self.limit.is_none()
    }

    pub fn is_sort_empty(&self) -> bool {
        self.sorts.is_empty()
    }

    /// Sorts without a page request. A limit does not count.
    pub fn has_only_sort(&self) -> bool {
        self.page_request.is_none() && !self.sorts.is_empty()
    }

    /// Appends sorts after the textual ones and overrides the window.
    /// A limit takes precedence over a page request.
    ///
    /// Sort fields are logical names of `entity` and go through `observer`
    /// the same way the fields of the query text do.
    pub fn apply<V>(
        &self,
        select: &mut SelectQuery<V>,
        observer: &dyn ObserverParser,
        entity: &str,
    ) {
        select.sorts.extend(self.sorts.iter().map(|sort| Sort {
            field: observer.field(entity, &sort.field),
            direction: sort.direction,
        }));

        if let Some(limit) = self.limit {
            select.skip = Some(limit.start.saturating_sub(1));
            select.limit = Some(limit.max_results);
        } else if let Some(page) = &self.page_request {
            select.skip = Some(page.skip());
            select.limit = Some(page.size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Query;
    use crate::observer::IdentityObserver;
    use crate::parser::parse;

    #[test]
    fn test_last_page_request_wins() {
        let special = SpecialParameters::of(&[
            Argument::PageRequest(PageRequest::of(1, 10).sort_by(Sort::asc("name"))),
            Argument::Value(Value::from("ignored")),
            Argument::Sort(Sort::desc("age")),
            Argument::PageRequest(PageRequest::of(3, 5)),
        ]);

        assert_eq!(special.page_request(), Some(&PageRequest::of(3, 5)));
        assert_eq!(special.sorts(), [Sort::asc("name"), Sort::desc("age")]);
        assert!(!special.has_only_sort());
    }

    #[test]
    fn test_only_sort() {
        let special = SpecialParameters::of(&[Argument::Sorts(vec![Sort::asc("name")])]);
        assert!(special.has_only_sort());
        assert!(!special.is_sort_empty());
        assert!(SpecialParameters::of(&[]).is_empty());
    }

    #[test]
    fn test_apply_page_and_limit() {
        let Query::Select(mut select) = parse("select * from Person order by name").unwrap() else {
            panic!("Expected select");
        };

        let special = SpecialParameters::of(&[
            Argument::PageRequest(PageRequest::of(3, 10)),
            Argument::Sort(Sort::desc("age")),
        ]);
        special.apply(&mut select, &IdentityObserver, "Person");
        assert_eq!(select.skip, Some(20));
        assert_eq!(select.limit, Some(10));
        assert_eq!(select.sorts, vec![Sort::asc("name"), Sort::desc("age")]);

        let special = SpecialParameters::of(&[
            Argument::PageRequest(PageRequest::of(3, 10)),
            Argument::Limit(Limit::range(2, 4)),
        ]);
        special.apply(&mut select, &IdentityObserver, "Person");
        assert_eq!(select.skip, Some(1));
        assert_eq!(select.limit, Some(3));
    }

    #[test]
    fn test_limit_range_saturates() {
        assert_eq!(Limit::range(2, 4).max_results, 3);
        assert_eq!(Limit::range(0, u64::MAX).max_results, u64::MAX);
        assert_eq!(Limit::range(5, 1).max_results, 1);
    }

    #[test]
    fn test_limit_keeps_only_sort() {
        let special = SpecialParameters::of(&[
            Argument::Sort(Sort::asc("name")),
            Argument::Limit(Limit::of(5)),
        ]);
        assert!(special.has_only_sort());

        let special = SpecialParameters::of(&[Argument::Limit(Limit::of(5))]);
        assert!(!special.has_only_sort());
    }
}
