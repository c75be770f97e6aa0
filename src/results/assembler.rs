//! Rebuild typed pages from engine responses
//!
//! Facet, group and highlight fragments come back keyed by the name they were
//! requested under. The [`NamedObjects`] association built by the parser maps
//! each name back to the sub-query that produced it; fragments whose name is
//! unknown fall back to a spec derived from the name itself.

use super::page::{Page, ResultPage};
use super::types::*;
use crate::client::{
    value_to_string, ClientError, FacetCounts, FieldStatsResponse, FlatCounts, GroupCommandResponse,
    PivotResponse, QueryResponse, SolrDocumentList, StatsResponse,
};
use crate::convert::{SolrConverter, SolrEntity};
use crate::query::{
    Criteria, DataQuery, FacetField, FacetOptions, GroupSpec, HighlightField, NamedObjects,
    PageRequest, PivotField, TermsQuery,
};
use serde_json::Value;
use tracing::warn;

/// Build the result page of a criteria query
pub fn create_page<T, C>(
    query: &DataQuery<'_>,
    response: &QueryResponse,
    names: &NamedObjects,
    converter: &C,
) -> Result<ResultPage<T>, ClientError>
where
    T: SolrEntity,
    C: SolrConverter,
{
    let content: Vec<T> = converter.read_all(response.documents())?;
    let page = Page::new(content, query.page_request(), response.num_found())
        .with_max_score(response.max_score());
    let mut result = ResultPage::new(page);

    if let Some(stats) = &response.stats {
        result.field_stats = stats_results(stats);
    }

    if let Some(grouped) = &response.grouped {
        let specs = query
            .base()
            .and_then(|q| q.group_options.as_ref())
            .map(|o| o.specs())
            .unwrap_or_default();
        let group_page = query
            .base()
            .and_then(|q| q.group_options.as_ref())
            .and_then(|o| o.page_request());

        for (name, command) in grouped.iter() {
            let spec = names
                .group(name)
                .cloned()
                .or_else(|| specs.iter().find(|s| s.native_name() == name).cloned())
                .unwrap_or_else(|| GroupSpec::Field(name.to_string()));
            result.groups.push(group_result(
                name,
                spec,
                command,
                query.page_request(),
                group_page,
                converter,
            )?);
        }
    }

    if let Some(facets) = &response.facet_counts {
        let options = match query {
            DataQuery::Facet(facet) => Some(&facet.facet_options),
            _ => None,
        };
        facet_results(&mut result, facets, names, options);
    }

    if let Some(highlighting) = &response.highlighting {
        let id_field = T::id_field();
        result.highlights = response
            .documents()
            .iter()
            .map(|doc| {
                let id = doc.get(id_field).and_then(value_to_string);
                let entries = id
                    .as_deref()
                    .and_then(|id| highlighting.get(id))
                    .map(|fields| {
                        fields
                            .iter()
                            .map(|(field, snippets)| HighlightEntry {
                                field: names
                                    .highlight(field)
                                    .cloned()
                                    .unwrap_or_else(|| HighlightField::new(field)),
                                snippets: snippets.clone(),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                Highlight { id, entries }
            })
            .collect();
    }

    Ok(result)
}

/// Build the terms page of a terms query, one entry list per requested field
pub fn create_terms_page(query: &TermsQuery, response: &QueryResponse) -> TermsPage {
    let mut page = TermsPage::new();
    for field in &query.fields {
        let entries = response
            .terms
            .as_ref()
            .and_then(|terms| terms.get(field))
            .map(|counts| {
                counts
                    .iter()
                    .filter_map(|(value, count)| {
                        value.map(|value| TermsFieldEntry {
                            field: field.clone(),
                            value: value.to_string(),
                            count,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        page.add_field(field.as_str(), entries);
    }
    page
}

fn group_result<T, C>(
    name: &str,
    spec: GroupSpec,
    command: &GroupCommandResponse,
    pageable: Option<PageRequest>,
    group_page: Option<PageRequest>,
    converter: &C,
) -> Result<GroupResult<T>, ClientError>
where
    T: SolrEntity,
    C: SolrConverter,
{
    let doc_page = |list: &SolrDocumentList| -> Result<Page<T>, ClientError> {
        Ok(Page::new(converter.read_all(&list.docs)?, group_page, list.num_found)
            .with_max_score(list.max_score))
    };

    let mut entries = Vec::with_capacity(command.groups.len().max(1));
    match &command.doclist {
        // group.query commands answer with a single document list
        Some(list) => entries.push(GroupEntry {
            group_value: Some(name.to_string()),
            result: doc_page(list)?,
        }),
        None => {
            for group in &command.groups {
                entries.push(GroupEntry {
                    group_value: value_to_string(&group.group_value),
                    result: doc_page(&group.doclist)?,
                });
            }
        }
    }

    let total = command.ngroups.unwrap_or(entries.len() as u64);
    Ok(GroupResult {
        spec,
        name: name.to_string(),
        matches: command.matches,
        group_count: command.ngroups,
        entries: Page::new(entries, pageable, total),
    })
}

fn facet_results<T>(
    result: &mut ResultPage<T>,
    facets: &FacetCounts,
    names: &NamedObjects,
    options: Option<&FacetOptions>,
) {
    let facet_page = options.map(|o| o.page_request());

    for (name, counts) in facets.facet_fields.iter() {
        let field = names
            .facet_field(name)
            .cloned()
            .or_else(|| options.and_then(|o| o.fields.iter().find(|f| f.name == name).cloned()))
            .unwrap_or_else(|| FacetField::new(name));
        let entries = field_entries(&field.name, counts);
        let total = entries.len() as u64;
        result.facet_fields.push(FacetFieldResult {
            field,
            entries: Page::new(entries, facet_page, total),
        });
    }

    for (name, nodes) in facets.facet_pivot.iter() {
        let pivot = names
            .pivot(name)
            .cloned()
            .unwrap_or_else(|| PivotField::new(name.split(',')));
        result.facet_pivots.push(FacetPivotResult {
            pivot,
            entries: nodes.iter().map(pivot_entry).collect(),
        });
    }

    for (name, range_response) in facets.facet_ranges.iter() {
        let range = names.range(name).cloned().or_else(|| {
            options.and_then(|o| o.ranges.iter().find(|r| r.field == name).cloned())
        });
        let Some(range) = range else {
            warn!("Dropping range facet '{}' with no matching request", name);
            continue;
        };
        let entries: Vec<RangeFacetEntry> = range_response
            .counts
            .iter()
            .filter_map(|(value, count)| {
                value.map(|value| RangeFacetEntry {
                    value: value.to_string(),
                    count,
                })
            })
            .collect();
        let total = entries.len() as u64;
        result.facet_ranges.push(RangeFacetResult {
            range,
            entries: Page::new(entries, facet_page, total),
            gap: value_to_string(&range_response.gap),
            start: value_to_string(&range_response.start),
            end: value_to_string(&range_response.end),
            before: range_response.before,
            after: range_response.after,
            between: range_response.between,
        });
    }

    for (name, count) in facets.facet_queries.iter() {
        let query = names
            .facet_query(name)
            .cloned()
            .unwrap_or_else(|| Criteria::raw(name));
        result.facet_queries.push(FacetQueryEntry {
            query,
            count: *count,
        });
    }
}

fn field_entries(field: &str, counts: &FlatCounts) -> Vec<FacetFieldEntry> {
    counts
        .iter()
        .map(|(value, count)| FacetFieldEntry {
            field: field.to_string(),
            value: value.map(str::to_string),
            count,
        })
        .collect()
}

fn pivot_entry(node: &PivotResponse) -> FacetPivotEntry {
    FacetPivotEntry {
        field: node.field.clone(),
        value: value_to_string(&node.value),
        count: node.count,
        pivot: node.pivot.iter().map(pivot_entry).collect(),
    }
}

fn stats_results(stats: &StatsResponse) -> Vec<FieldStatsResult> {
    stats
        .stats_fields
        .iter()
        .filter_map(|(name, field)| field.as_ref().map(|f| field_stats(name, f)))
        .collect()
}

fn field_stats(name: &str, stats: &FieldStatsResponse) -> FieldStatsResult {
    FieldStatsResult {
        name: name.to_string(),
        min: non_null(&stats.min),
        max: non_null(&stats.max),
        sum: non_null(&stats.sum),
        count: stats.count,
        missing: stats.missing,
        mean: non_null(&stats.mean),
        stddev: stats.stddev,
        sum_of_squares: stats.sum_of_squares,
        count_distinct: stats.count_distinct,
        distinct_values: stats.distinct_values.clone(),
        facets: stats
            .facets
            .iter()
            .map(|(field, values)| StatsFacetResult {
                field: field.to_string(),
                values: values
                    .iter()
                    .map(|(value, s)| (value.to_string(), field_stats(name, s)))
                    .collect(),
            })
            .collect(),
    }
}

fn non_null(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        other => Some(other.clone()),
    }
}
