//! Query parsers: abstract query → native parameters

use super::facet::{FacetOptions, FacetQuery};
use super::highlight::{HighlightField, HighlightQuery};
use super::models::{DataQuery, GroupOptions, Query, SortField, StatsOptions};
use super::named::{keyed, NamedObject, NamedObjects};
use super::native::{NativeQuery, DEFAULT_REQUEST_HANDLER};
use super::terms::TermsQuery;
use crate::error::{Result, SolrError};

/// Default terms handler
pub const DEFAULT_TERMS_HANDLER: &str = "/terms";

/// Translates one query variant into engine parameters
pub trait QueryParser: Send + Sync {
    /// Build the native query, recording named sub-queries in `names`
    fn construct_query(&self, query: &DataQuery<'_>, names: &mut NamedObjects) -> Result<NativeQuery>;

    /// Main query string (`q`) of the query
    fn query_string(&self, query: &DataQuery<'_>) -> Result<String>;
}

/// Parser for criteria-bearing queries: simple, facet, group, highlight, stats
/// and custom kinds built on [`Query`]
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultQueryParser;

impl DefaultQueryParser {
    pub fn new() -> Self {
        Self
    }

    fn base<'a>(&self, query: &DataQuery<'a>) -> Result<&'a Query> {
        query
            .base()
            .ok_or_else(|| SolrError::UnsupportedQueryKind(query.kind()))
    }

    fn append_base(&self, query: &Query, native: &mut NativeQuery) {
        native.set(
            "q",
            query
                .criteria
                .as_ref()
                .map(|c| c.to_query_string())
                .unwrap_or_else(|| "*:*".to_string()),
        );
        for filter in &query.filter_queries {
            native.add("fq", filter.to_query_string());
        }
        if !query.sort.is_empty() {
            native.set("sort", join_sort(&query.sort));
        }
        if !query.projection.is_empty() {
            native.set("fl", query.projection.join(","));
        }
        if let Some(page) = query.page_request {
            native.set_start(page.offset);
            native.set_rows(page.size);
        }
        if let Some(operator) = query.default_operator {
            native.set("q.op", operator.as_str());
        }
        if let Some(def_type) = &query.def_type {
            native.set("defType", def_type.as_str());
        }
        if let Some(millis) = query.time_allowed {
            native.set("timeAllowed", millis.to_string());
        }
    }

    fn append_group(&self, options: &GroupOptions, native: &mut NativeQuery, names: &mut NamedObjects) {
        if options.is_empty() {
            return;
        }
        native.set("group", "true");
        for field in &options.fields {
            native.add("group.field", field.as_str());
        }
        for function in &options.functions {
            native.add("group.func", function.as_str());
        }
        for query in &options.queries {
            native.add("group.query", query.to_query_string());
        }
        // the engine keys each command by its literal parameter value
        for spec in options.specs() {
            names.bind(spec.native_name(), NamedObject::Group(spec));
        }
        if let Some(offset) = options.offset {
            native.set("group.offset", offset.to_string());
        }
        if let Some(limit) = options.limit {
            native.set("group.limit", limit.to_string());
        }
        if options.total_count {
            native.set("group.ngroups", "true");
        }
        if options.truncate_facets {
            native.set("group.truncate", "true");
        }
        if options.group_facets {
            native.set("group.facet", "true");
        }
        if !options.sort.is_empty() {
            native.set("group.sort", join_sort(&options.sort));
        }
    }

    fn append_stats(&self, options: &StatsOptions, native: &mut NativeQuery) {
        if options.fields.is_empty() {
            return;
        }
        native.set("stats", "true");
        for field in &options.fields {
            native.add("stats.field", field.name.as_str());
            for facet in &field.facets {
                native.add(format!("f.{}.stats.facet", field.name), facet.as_str());
            }
            if let Some(calc_distinct) = field.calc_distinct {
                native.set(
                    format!("f.{}.stats.calcdistinct", field.name),
                    calc_distinct.to_string(),
                );
            }
        }
        for facet in &options.facets {
            native.add("stats.facet", facet.as_str());
        }
        if options.calc_distinct {
            native.set("stats.calcdistinct", "true");
        }
    }

    fn append_facets(&self, options: &FacetOptions, native: &mut NativeQuery, names: &mut NamedObjects) {
        if !options.has_facets() {
            return;
        }
        native.set("facet", "true");
        native.set("facet.mincount", options.min_count.to_string());
        native.set("facet.limit", options.limit.to_string());
        if let Some(offset) = options.offset {
            native.set("facet.offset", offset.to_string());
        }
        native.set("facet.sort", options.sort.as_str());
        if let Some(prefix) = &options.prefix {
            native.set("facet.prefix", prefix.as_str());
        }
        if options.missing {
            native.set("facet.missing", "true");
        }

        for field in &options.fields {
            let name = names.assign("f", NamedObject::FacetField(field.clone()));
            native.add("facet.field", keyed(name.as_deref(), &field.name));

            let scope = format!("f.{}.facet", field.name);
            if let Some(prefix) = &field.prefix {
                native.set(format!("{}.prefix", scope), prefix.as_str());
            }
            if let Some(limit) = field.limit {
                native.set(format!("{}.limit", scope), limit.to_string());
            }
            if let Some(min_count) = field.min_count {
                native.set(format!("{}.mincount", scope), min_count.to_string());
            }
            if let Some(sort) = field.sort {
                native.set(format!("{}.sort", scope), sort.as_str());
            }
            if let Some(missing) = field.missing {
                native.set(format!("{}.missing", scope), missing.to_string());
            }
        }

        for pivot in &options.pivots {
            let name = names.assign("p", NamedObject::Pivot(pivot.clone()));
            native.add("facet.pivot", keyed(name.as_deref(), &pivot.name()));
        }

        for range in &options.ranges {
            let name = names.assign("r", NamedObject::Range(range.clone()));
            native.add("facet.range", keyed(name.as_deref(), &range.field));

            let scope = format!("f.{}.facet.range", range.field);
            native.set(format!("{}.start", scope), range.start.to_string());
            native.set(format!("{}.end", scope), range.end.to_string());
            native.set(format!("{}.gap", scope), range.gap.as_str());
            if range.hard_end {
                native.set(format!("{}.hardend", scope), "true");
            }
            if let Some(include) = range.include {
                native.set(format!("{}.include", scope), include.as_str());
            }
            if let Some(other) = range.other {
                native.set(format!("{}.other", scope), other.as_str());
            }
        }

        for query in &options.queries {
            let name = names.assign("q", NamedObject::FacetQuery(query.clone()));
            native.add("facet.query", keyed(name.as_deref(), &query.to_query_string()));
        }
    }

    fn append_highlight(&self, query: &HighlightQuery, native: &mut NativeQuery, names: &mut NamedObjects) {
        let options = &query.highlight_options;
        native.set("hl", "true");

        let fields: Vec<HighlightField> = if !options.fields.is_empty() {
            options.fields.clone()
        } else if !query.query.projection.is_empty() {
            query
                .query
                .projection
                .iter()
                .filter(|f| f.as_str() != "score")
                .map(HighlightField::new)
                .collect()
        } else {
            vec![HighlightField::new("*")]
        };

        let field_list: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        native.set("hl.fl", field_list.join(","));

        if let Some(prefix) = &options.simple_prefix {
            native.set("hl.simple.pre", prefix.as_str());
        }
        if let Some(postfix) = &options.simple_postfix {
            native.set("hl.simple.post", postfix.as_str());
        }
        if let Some(fragsize) = options.fragsize {
            native.set("hl.fragsize", fragsize.to_string());
        }
        if let Some(snippets) = options.snippets {
            native.set("hl.snippets", snippets.to_string());
        }
        if let Some(formatter) = &options.formatter {
            native.set("hl.formatter", formatter.as_str());
        }
        if let Some(criteria) = &options.query {
            native.set("hl.q", criteria.to_query_string());
        }
        for (key, value) in &options.params {
            native.set(hl_param(key), value.as_str());
        }

        for field in fields {
            let scope = format!("f.{}", field.name);
            if let Some(fragsize) = field.fragsize {
                native.set(format!("{}.hl.fragsize", scope), fragsize.to_string());
            }
            if let Some(snippets) = field.snippets {
                native.set(format!("{}.hl.snippets", scope), snippets.to_string());
            }
            if let Some(prefix) = &field.simple_prefix {
                native.set(format!("{}.hl.simple.pre", scope), prefix.as_str());
            }
            if let Some(postfix) = &field.simple_postfix {
                native.set(format!("{}.hl.simple.post", scope), postfix.as_str());
            }
            for (key, value) in &field.params {
                native.set(format!("{}.{}", scope, hl_param(key)), value.as_str());
            }
            if field.name != "*" {
                names.bind(field.name.clone(), NamedObject::Highlight(field));
            }
        }
    }
}

impl QueryParser for DefaultQueryParser {
    fn construct_query(&self, query: &DataQuery<'_>, names: &mut NamedObjects) -> Result<NativeQuery> {
        let base = self.base(query)?;
        let mut native = NativeQuery::new(
            base.request_handler
                .as_deref()
                .unwrap_or(DEFAULT_REQUEST_HANDLER),
        );
        self.append_base(base, &mut native);

        if let Some(options) = &base.group_options {
            self.append_group(options, &mut native, names);
        }
        if let Some(options) = &base.stats_options {
            self.append_stats(options, &mut native);
        }
        match query {
            DataQuery::Facet(FacetQuery { facet_options, .. }) => {
                self.append_facets(facet_options, &mut native, names)
            }
            DataQuery::Highlight(highlight) => self.append_highlight(highlight, &mut native, names),
            _ => {}
        }

        Ok(native)
    }

    fn query_string(&self, query: &DataQuery<'_>) -> Result<String> {
        let base = self.base(query)?;
        Ok(base
            .criteria
            .as_ref()
            .map(|c| c.to_query_string())
            .unwrap_or_else(|| "*:*".to_string()))
    }
}

/// Parser for terms queries
#[derive(Debug, Default, Clone, Copy)]
pub struct TermsQueryParser;

impl TermsQueryParser {
    pub fn new() -> Self {
        Self
    }

    fn terms<'a>(&self, query: &DataQuery<'a>) -> Result<&'a TermsQuery> {
        match *query {
            DataQuery::Terms(terms) => Ok(terms),
            _ => Err(SolrError::UnsupportedQueryKind(query.kind())),
        }
    }
}

impl QueryParser for TermsQueryParser {
    fn construct_query(&self, query: &DataQuery<'_>, _names: &mut NamedObjects) -> Result<NativeQuery> {
        let terms = self.terms(query)?;
        if terms.fields.is_empty() {
            return Err(SolrError::invalid_argument(
                "terms query requires at least one field",
            ));
        }

        let mut native = NativeQuery::new(
            terms
                .request_handler
                .as_deref()
                .unwrap_or(DEFAULT_TERMS_HANDLER),
        );
        native.set("terms", "true");
        for field in &terms.fields {
            native.add("terms.fl", field.as_str());
        }
        if let Some(limit) = terms.limit {
            native.set("terms.limit", limit.to_string());
        }
        if let Some(min_count) = terms.min_count {
            native.set("terms.mincount", min_count.to_string());
        }
        if let Some(max_count) = terms.max_count {
            native.set("terms.maxcount", max_count.to_string());
        }
        if let Some(prefix) = &terms.prefix {
            native.set("terms.prefix", prefix.as_str());
        }
        if let Some(regex) = &terms.regex {
            native.set("terms.regex", regex.as_str());
        }
        native.set("terms.sort", terms.sort.as_str());

        Ok(native)
    }

    fn query_string(&self, query: &DataQuery<'_>) -> Result<String> {
        self.terms(query)?;
        Err(SolrError::invalid_argument("terms queries have no query string"))
    }
}

fn join_sort(sort: &[SortField]) -> String {
    sort.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn hl_param(key: &str) -> String {
    if key.starts_with("hl.") {
        key.to_string()
    } else {
        format!("hl.{}", key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::criteria::Criteria;
    use crate::query::facet::{FacetField, FacetRange, PivotField, RangeOther};
    use crate::query::highlight::HighlightOptions;
    use crate::query::models::{Operator, PageRequest, QueryKind, StatsField};

    fn construct(query: DataQuery<'_>) -> (NativeQuery, NamedObjects) {
        let mut names = NamedObjects::new();
        let native = DefaultQueryParser
            .construct_query(&query, &mut names)
            .unwrap();
        (native, names)
    }

    #[test]
    fn test_simple_query_params() {
        let query = Query::new(Criteria::is("cat", "book"))
            .add_filter(Criteria::is("inStock", true))
            .add_filter(Criteria::exists("price"))
            .add_sort(SortField::desc("price"))
            .add_sort(SortField::asc("id"))
            .add_projection("id")
            .add_projection("name")
            .with_page(PageRequest::of(1, 20))
            .with_operator(Operator::And)
            .with_time_allowed(500);
        let (native, names) = construct(DataQuery::Simple(&query));

        assert_eq!(native.handler(), "/select");
        assert_eq!(native.get("q"), Some("cat:book"));
        assert_eq!(native.get_all("fq"), vec!["inStock:true", "price:[* TO *]"]);
        assert_eq!(native.get("sort"), Some("price desc,id asc"));
        assert_eq!(native.get("fl"), Some("id,name"));
        assert_eq!(native.get("start"), Some("20"));
        assert_eq!(native.get("rows"), Some("20"));
        assert_eq!(native.get("q.op"), Some("AND"));
        assert_eq!(native.get("timeAllowed"), Some("500"));
        assert!(names.is_empty());
    }

    #[test]
    fn test_unpaged_query_has_no_rows() {
        let query = Query::default();
        let (native, _) = construct(DataQuery::Simple(&query));
        assert_eq!(native.get("q"), Some("*:*"));
        assert!(!native.contains("start"));
        assert!(!native.contains("rows"));
    }

    #[test]
    fn test_construction_is_deterministic() {
        let query = FacetQuery::new(
            Query::all(),
            FacetOptions::on_fields(["cat", "brand"]).add_pivot(PivotField::new(["cat", "brand"])),
        );
        let (first, _) = construct(DataQuery::Facet(&query));
        let (second, _) = construct(DataQuery::Facet(&query));
        assert_eq!(first, second);
    }

    #[test]
    fn test_facet_params_use_synthetic_keys() {
        let query = FacetQuery::new(
            Query::all(),
            FacetOptions::new()
                .add_facet_field(FacetField::new("cat").with_limit(5).with_prefix("bo"))
                .add_pivot(PivotField::new(["cat", "brand"]))
                .add_range(FacetRange::new("price", 0i64, 100i64, "10").with_other(RangeOther::All))
                .add_query(Criteria::between("price", Some(0), Some(10))),
        );
        let (native, names) = construct(DataQuery::Facet(&query));

        assert_eq!(native.get("facet"), Some("true"));
        assert_eq!(native.get("facet.mincount"), Some("1"));
        assert_eq!(native.get("facet.field"), Some("{!key=f0}cat"));
        assert_eq!(native.get("f.cat.facet.limit"), Some("5"));
        assert_eq!(native.get("f.cat.facet.prefix"), Some("bo"));
        assert_eq!(native.get("facet.pivot"), Some("{!key=p1}cat,brand"));
        assert_eq!(native.get("facet.range"), Some("{!key=r2}price"));
        assert_eq!(native.get("f.price.facet.range.gap"), Some("10"));
        assert_eq!(native.get("f.price.facet.range.other"), Some("all"));
        assert_eq!(native.get("facet.query"), Some("{!key=q3}price:[0 TO 10]"));

        assert_eq!(names.len(), 4);
        assert_eq!(names.facet_field("f0").unwrap().name, "cat");
        assert!(names.range("r2").is_some());
    }

    #[test]
    fn test_facet_without_facets_sends_no_facet_params() {
        let query = FacetQuery::new(Query::all(), FacetOptions::new());
        let (native, _) = construct(DataQuery::Facet(&query));
        assert!(!native.contains("facet"));
    }

    #[test]
    fn test_facet_names_disabled() {
        let query = FacetQuery::new(Query::all(), FacetOptions::on_fields(["cat"]));
        let mut names = NamedObjects::disabled();
        let native = DefaultQueryParser
            .construct_query(&DataQuery::Facet(&query), &mut names)
            .unwrap();
        assert_eq!(native.get("facet.field"), Some("cat"));
    }

    #[test]
    fn test_group_params() {
        let query = Query::all().with_group_options(
            GroupOptions::new()
                .add_field("cat")
                .add_query(Criteria::is("inStock", true))
                .with_limit(3)
                .with_total_count(true),
        );
        let (native, names) = construct(DataQuery::Group(&query));

        assert_eq!(native.get("group"), Some("true"));
        assert_eq!(native.get("group.field"), Some("cat"));
        assert_eq!(native.get("group.query"), Some("inStock:true"));
        assert_eq!(native.get("group.limit"), Some("3"));
        assert_eq!(native.get("group.ngroups"), Some("true"));
        assert!(names.group("cat").is_some());
        assert!(names.group("inStock:true").is_some());
    }

    #[test]
    fn test_stats_params() {
        let query = Query::all().with_stats_options(
            StatsOptions::new()
                .add_stats_field(StatsField::new("price").add_facet("cat").with_calc_distinct(true))
                .add_field("weight")
                .add_facet("inStock"),
        );
        let (native, _) = construct(DataQuery::Stats(&query));

        assert_eq!(native.get("stats"), Some("true"));
        assert_eq!(native.get_all("stats.field"), vec!["price", "weight"]);
        assert_eq!(native.get("f.price.stats.facet"), Some("cat"));
        assert_eq!(native.get("f.price.stats.calcdistinct"), Some("true"));
        assert_eq!(native.get("stats.facet"), Some("inStock"));
        assert!(!native.contains("stats.calcdistinct"));
    }

    #[test]
    fn test_highlight_params() {
        let query = HighlightQuery::new(
            Query::new(Criteria::contains("name", "ipod")),
            HighlightOptions::new()
                .add_highlight_field(HighlightField::new("name").with_snippets(2))
                .add_field("features")
                .with_simple_tags("<b>", "</b>")
                .with_param("requireFieldMatch", "true"),
        );
        let (native, names) = construct(DataQuery::Highlight(&query));

        assert_eq!(native.get("hl"), Some("true"));
        assert_eq!(native.get("hl.fl"), Some("name,features"));
        assert_eq!(native.get("hl.simple.pre"), Some("<b>"));
        assert_eq!(native.get("hl.simple.post"), Some("</b>"));
        assert_eq!(native.get("hl.requireFieldMatch"), Some("true"));
        assert_eq!(native.get("f.name.hl.snippets"), Some("2"));
        assert!(names.highlight("name").is_some());
        assert!(names.highlight("features").is_some());
    }

    #[test]
    fn test_highlight_fields_fall_back() {
        let query = HighlightQuery::new(
            Query::all().add_projection("name").add_projection("score"),
            HighlightOptions::new(),
        );
        let (native, _) = construct(DataQuery::Highlight(&query));
        assert_eq!(native.get("hl.fl"), Some("name"));

        let query = HighlightQuery::new(Query::all(), HighlightOptions::new());
        let (native, names) = construct(DataQuery::Highlight(&query));
        assert_eq!(native.get("hl.fl"), Some("*"));
        assert!(names.is_empty());
    }

    #[test]
    fn test_default_parser_rejects_terms() {
        let query = TermsQuery::on_fields(["name"]);
        let err = DefaultQueryParser
            .construct_query(&DataQuery::Terms(&query), &mut NamedObjects::new())
            .unwrap_err();
        assert!(matches!(err, SolrError::UnsupportedQueryKind(QueryKind::Terms)));
    }

    #[test]
    fn test_terms_params() {
        let query = TermsQuery::on_fields(["name", "cat"])
            .with_limit(5)
            .with_prefix("ip")
            .with_min_count(2);
        let native = TermsQueryParser
            .construct_query(&DataQuery::Terms(&query), &mut NamedObjects::disabled())
            .unwrap();

        assert_eq!(native.handler(), "/terms");
        assert_eq!(native.get("terms"), Some("true"));
        assert_eq!(native.get_all("terms.fl"), vec!["name", "cat"]);
        assert_eq!(native.get("terms.limit"), Some("5"));
        assert_eq!(native.get("terms.prefix"), Some("ip"));
        assert_eq!(native.get("terms.mincount"), Some("2"));
        assert_eq!(native.get("terms.sort"), Some("count"));
    }

    #[test]
    fn test_terms_without_fields() {
        let query = TermsQuery::default();
        let err = TermsQueryParser
            .construct_query(&DataQuery::Terms(&query), &mut NamedObjects::disabled())
            .unwrap_err();
        assert!(matches!(err, SolrError::InvalidArgument(_)));

        let err = TermsQueryParser
            .query_string(&DataQuery::Terms(&query))
            .unwrap_err();
        assert!(matches!(err, SolrError::InvalidArgument(_)));
    }

    #[test]
    fn test_query_string() {
        let query = Query::new(Criteria::is("cat", "book").and(Criteria::is("inStock", true)));
        assert_eq!(
            DefaultQueryParser
                .query_string(&DataQuery::Simple(&query))
                .unwrap(),
            "cat:book AND inStock:true"
        );
    }
}
