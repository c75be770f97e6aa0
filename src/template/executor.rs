//! The template: every operation runs through one execute wrapper

use super::builder::SolrTemplateBuilder;
use super::translator::{translate_or_wrap, ExceptionTranslator, SolrExceptionTranslator};
use crate::client::{
    ClientError, HttpSolrClientFactory, PingResponse, QueryResponse, SolrClient, SolrClientFactory,
    SolrInputDocument, UpdateResponse,
};
use crate::config::{CursorSettings, Settings, TemplateSettings};
use crate::convert::{MappingSolrConverter, SolrConverter, SolrEntity};
use crate::cursor::{Cursor, CursorLoader, PartialResult};
use crate::error::{Result, SolrError};
use crate::query::{
    DataQuery, FacetQuery, HighlightQuery, NamedObjects, NativeQuery, PageRequest, Query, QueryKind,
    QueryParser, QueryParsers, SortField, TermsQuery, CURSOR_MARK_PARAM,
};
use crate::results::{
    create_page, create_terms_page, FacetPage, GroupPage, HighlightPage, ResultPage, ScoredPage,
    StatsPage, TermsPage,
};
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Typed access to one engine core
pub struct SolrTemplate<C = MappingSolrConverter> {
    factory: Arc<dyn SolrClientFactory>,
    converter: C,
    parsers: QueryParsers,
    translator: Arc<dyn ExceptionTranslator>,
    settings: TemplateSettings,
    cursor: CursorSettings,
    core: Option<String>,
}

impl SolrTemplate<MappingSolrConverter> {
    /// Build a template for the engine described by `settings`
    pub fn initialize(settings: &Settings) -> Result<Self> {
        let client = SolrClient::with_settings(&settings.solr).map_err(|e| match e {
            ClientError::InvalidSettings(message) => SolrError::InvalidArgument(message),
            e => translate_or_wrap(&SolrExceptionTranslator, e),
        })?;
        info!(
            "Initialized Solr template for {} (core: {}, server version {})",
            settings.solr.base_url,
            settings.solr.core.as_deref().unwrap_or("-"),
            settings.template.server_version
        );
        Ok(Self::builder(Arc::new(HttpSolrClientFactory::new(client)))
            .settings(settings)
            .build())
    }

    pub fn builder(factory: Arc<dyn SolrClientFactory>) -> SolrTemplateBuilder<MappingSolrConverter> {
        SolrTemplateBuilder::new(factory)
    }
}

impl<C: SolrConverter> SolrTemplate<C> {
    pub(crate) fn from_parts(
        factory: Arc<dyn SolrClientFactory>,
        converter: C,
        parsers: QueryParsers,
        translator: Arc<dyn ExceptionTranslator>,
        settings: TemplateSettings,
        cursor: CursorSettings,
        core: Option<String>,
    ) -> Self {
        Self {
            factory,
            converter,
            parsers,
            translator,
            settings,
            cursor,
            core,
        }
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    pub fn settings(&self) -> &TemplateSettings {
        &self.settings
    }

    pub fn query_parsers(&self) -> &QueryParsers {
        &self.parsers
    }

    /// Register or override a parser. Needs exclusive access, so the
    /// registry cannot change while the template is shared.
    pub fn register_query_parser(&mut self, kind: QueryKind, parser: Arc<dyn QueryParser>) {
        self.parsers.register_parser(kind, parser);
    }

    /// Run `action` against a client for the template's core, translating
    /// every failure it returns
    pub async fn execute<F, Fut, R>(&self, action: F) -> Result<R>
    where
        F: FnOnce(SolrClient) -> Fut,
        Fut: Future<Output = std::result::Result<R, ClientError>>,
    {
        self.execute_on(self.core.as_deref(), action).await
    }

    /// Same as [`execute`](Self::execute) against another core
    pub async fn execute_on<F, Fut, R>(&self, core: Option<&str>, action: F) -> Result<R>
    where
        F: FnOnce(SolrClient) -> Fut,
        Fut: Future<Output = std::result::Result<R, ClientError>>,
    {
        let client = self.factory.client(core).map_err(|e| self.translate(e))?;

        let start = Instant::now();
        let result = action(client).await;
        debug!("Solr call finished in {:?}", start.elapsed());

        result.map_err(|e| self.translate(e))
    }

    fn translate(&self, error: ClientError) -> SolrError {
        translate_or_wrap(self.translator.as_ref(), error)
    }

    fn construct(&self, query: &DataQuery<'_>, names: &mut NamedObjects) -> Result<NativeQuery> {
        self.parsers
            .get_for_kind(&query.kind())?
            .construct_query(query, names)
    }

    /// Raw response of a query; `include_score` adds the score pseudo-field
    pub async fn query(&self, query: &DataQuery<'_>, include_score: bool) -> Result<QueryResponse> {
        let mut native = self.construct(query, &mut NamedObjects::disabled())?;
        if include_score {
            native.include_score();
        }
        self.query_native(&native).await
    }

    /// Execute caller-built native parameters as they are
    pub async fn query_native(&self, query: &NativeQuery) -> Result<QueryResponse> {
        debug!("Executing query {}", query);
        self.execute(|client| async move { client.query(query).await })
            .await
    }

    /// Number of documents matching the query
    pub async fn count(&self, query: &Query) -> Result<u64> {
        let mut native = self.construct(&DataQuery::Simple(query), &mut NamedObjects::disabled())?;
        native.set_start(0).set_rows(0);
        Ok(self.query_native(&native).await?.num_found())
    }

    /// Typed page of any criteria-bearing query kind
    pub async fn query_for_result_page<T: SolrEntity>(&self, query: &DataQuery<'_>) -> Result<ResultPage<T>> {
        let mut names = NamedObjects::new();
        let mut native = self.construct(query, &mut names)?;
        if T::has_score_property() {
            native.include_score();
        }
        debug!("Executing {} query {}", query.kind(), native);

        let names = &names;
        let converter = &self.converter;
        self.execute(|client| async move {
            let response = client.query(&native).await?;
            create_page(query, &response, names, converter)
        })
        .await
    }

    pub async fn query_for_page<T: SolrEntity>(&self, query: &Query) -> Result<ScoredPage<T>> {
        self.query_for_result_page(&DataQuery::Simple(query)).await
    }

    pub async fn query_for_group_page<T: SolrEntity>(&self, query: &Query) -> Result<GroupPage<T>> {
        self.query_for_result_page(&DataQuery::Group(query)).await
    }

    pub async fn query_for_stats_page<T: SolrEntity>(&self, query: &Query) -> Result<StatsPage<T>> {
        self.query_for_result_page(&DataQuery::Stats(query)).await
    }

    pub async fn query_for_facet_page<T: SolrEntity>(&self, query: &FacetQuery) -> Result<FacetPage<T>> {
        self.query_for_result_page(&DataQuery::Facet(query)).await
    }

    pub async fn query_for_highlight_page<T: SolrEntity>(
        &self,
        query: &HighlightQuery,
    ) -> Result<HighlightPage<T>> {
        self.query_for_result_page(&DataQuery::Highlight(query)).await
    }

    pub async fn query_for_terms_page(&self, query: &TermsQuery) -> Result<TermsPage> {
        let native = self.construct(&DataQuery::Terms(query), &mut NamedObjects::disabled())?;
        debug!("Executing terms query {}", native);
        self.execute(|client| async move {
            let response = client.query(&native).await?;
            Ok(create_terms_page(query, &response))
        })
        .await
    }

    /// First match of the query, or `None`.
    ///
    /// The query is limited to one row; should the engine return more, the
    /// first is kept and a warning logged.
    pub async fn query_for_object<T: SolrEntity>(&self, query: &Query) -> Result<Option<T>> {
        let single = query.clone().with_page(PageRequest::of(0, 1));
        let mut content = self.query_for_page::<T>(&single).await?.into_content();
        if content.len() > 1 {
            warn!(
                "Single result query returned {} documents, using the first",
                content.len()
            );
            content.truncate(1);
        }
        Ok(content.into_iter().next())
    }

    /// Open a cursor over every match of the query.
    ///
    /// The batch size is the query's page size or `cursor.batch_size`. A sort
    /// on the entity's id field is appended when missing, as the engine
    /// requires one for cursor pagination.
    pub async fn query_for_cursor<T: SolrEntity>(
        &self,
        query: &Query,
    ) -> Result<Cursor<T, TemplateCursorLoader<'_, C>>> {
        let mut query = query.clone();
        let rows = query
            .page_request
            .take()
            .map(|p| p.size)
            .unwrap_or(self.cursor.batch_size);
        if !query.sort.iter().any(|s| s.field == T::id_field()) {
            query.sort.push(SortField::asc(T::id_field()));
        }

        let mut native = self.construct(&DataQuery::Simple(&query), &mut NamedObjects::disabled())?;
        native.set_start(0).set_rows(rows);
        if T::has_score_property() {
            native.include_score();
        }

        let mut cursor = Cursor::new(TemplateCursorLoader {
            template: self,
            query: native,
        });
        cursor.open().await?;
        Ok(cursor)
    }

    /// Convert a bean into the document that would be indexed
    pub fn convert_bean_to_document<T: Serialize>(&self, bean: &T) -> Result<SolrInputDocument> {
        match self.converter.write(bean) {
            Ok(document) => Ok(document),
            // a bean that is not a single object is a caller error
            Err(ClientError::Conversion(message)) => Err(SolrError::InvalidArgument(message)),
            Err(e) => Err(self.translate(e)),
        }
    }

    /// Index a bean using the configured default commit window
    pub async fn save_bean<T: Serialize>(&self, bean: &T) -> Result<UpdateResponse> {
        self.save_bean_within(bean, self.settings.default_commit_within())
            .await
    }

    /// Index a bean; `None` leaves it invisible until an explicit commit
    pub async fn save_bean_within<T: Serialize>(
        &self,
        bean: &T,
        commit_within: Option<Duration>,
    ) -> Result<UpdateResponse> {
        let document = self.convert_bean_to_document(bean)?;
        self.save_documents_within(vec![document], commit_within)
            .await
    }

    pub async fn save_beans<T: Serialize>(&self, beans: &[T]) -> Result<UpdateResponse> {
        self.save_beans_within(beans, self.settings.default_commit_within())
            .await
    }

    pub async fn save_beans_within<T: Serialize>(
        &self,
        beans: &[T],
        commit_within: Option<Duration>,
    ) -> Result<UpdateResponse> {
        let documents = beans
            .iter()
            .map(|bean| self.convert_bean_to_document(bean))
            .collect::<Result<Vec<_>>>()?;
        self.save_documents_within(documents, commit_within).await
    }

    pub async fn save_document(&self, document: SolrInputDocument) -> Result<UpdateResponse> {
        self.save_document_within(document, self.settings.default_commit_within())
            .await
    }

    pub async fn save_document_within(
        &self,
        document: SolrInputDocument,
        commit_within: Option<Duration>,
    ) -> Result<UpdateResponse> {
        self.save_documents_within(vec![document], commit_within)
            .await
    }

    pub async fn save_documents(&self, documents: Vec<SolrInputDocument>) -> Result<UpdateResponse> {
        self.save_documents_within(documents, self.settings.default_commit_within())
            .await
    }

    pub async fn save_documents_within(
        &self,
        documents: Vec<SolrInputDocument>,
        commit_within: Option<Duration>,
    ) -> Result<UpdateResponse> {
        if documents.is_empty() {
            return Ok(UpdateResponse::default());
        }
        debug!(
            "Adding {} documents (commit within {:?})",
            documents.len(),
            commit_within
        );
        self.execute(|client| async move { client.add(documents, commit_within).await })
            .await
    }

    /// Delete every document matching the query's main criteria
    pub async fn delete(&self, query: &Query) -> Result<UpdateResponse> {
        let data = DataQuery::Simple(query);
        let query_string = self.parsers.get_for_kind(&data.kind())?.query_string(&data)?;
        debug!("Deleting by query {}", query_string);
        self.execute(|client| async move { client.delete_by_query(&query_string).await })
            .await
    }

    /// Delete one document; a missing id is not an error
    pub async fn delete_by_id(&self, id: &str) -> Result<UpdateResponse> {
        let id = require_id(id)?;
        self.execute(|client| async move { client.delete_by_id(id).await })
            .await
    }

    pub async fn delete_by_ids<I, S>(&self, ids: I) -> Result<UpdateResponse>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = require_ids(ids)?;
        if ids.is_empty() {
            return Ok(UpdateResponse::default());
        }
        self.execute(|client| async move { client.delete_by_ids(&ids).await })
            .await
    }

    pub async fn commit(&self) -> Result<UpdateResponse> {
        self.execute(|client| async move { client.commit().await })
            .await
    }

    /// Make pending changes visible without flushing them to disk
    pub async fn soft_commit(&self) -> Result<UpdateResponse> {
        if !self.settings.supports_soft_commit() {
            return Err(SolrError::UnsupportedOperation(format!(
                "soft commit requires Solr 4.0 or later, server version is {}",
                self.settings.server_version
            )));
        }
        self.execute(|client| async move { client.soft_commit().await })
            .await
    }

    pub async fn rollback(&self) -> Result<UpdateResponse> {
        self.execute(|client| async move { client.rollback().await })
            .await
    }

    pub async fn ping(&self) -> Result<PingResponse> {
        self.execute(|client| async move { client.ping().await })
            .await
    }

    /// Schema name of `core`, or of the template's core when `None`
    pub async fn schema_name(&self, core: Option<&str>) -> Result<Option<String>> {
        let core = core.or(self.core.as_deref());
        self.execute_on(core, |client| async move { client.schema_name().await })
            .await
    }

    /// Real-time get of one document, including uncommitted updates
    pub async fn get_by_id<T: SolrEntity>(&self, id: &str) -> Result<Option<T>> {
        let id = require_id(id)?;
        Ok(self.get_by_ids::<T, _, _>([id]).await?.into_iter().next())
    }

    /// Real-time get; documents that do not exist are left out
    pub async fn get_by_ids<T, I, S>(&self, ids: I) -> Result<Vec<T>>
    where
        T: SolrEntity,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = require_ids(ids)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let converter = &self.converter;
        self.execute(|client| async move {
            let response = client.realtime_get(&ids).await?;
            converter.read_all(response.documents())
        })
        .await
    }
}

/// Loads cursor batches through the template's execute wrapper
pub struct TemplateCursorLoader<'a, C> {
    template: &'a SolrTemplate<C>,
    query: NativeQuery,
}

impl<C> TemplateCursorLoader<'_, C> {
    /// Parameters shared by every batch request
    pub fn query(&self) -> &NativeQuery {
        &self.query
    }
}

#[async_trait]
impl<'a, T, C> CursorLoader<T> for TemplateCursorLoader<'a, C>
where
    T: SolrEntity,
    C: SolrConverter,
{
    async fn load(&self, cursor_mark: &str) -> Result<PartialResult<T>> {
        let mut native = self.query.clone();
        native.set(CURSOR_MARK_PARAM, cursor_mark);
        debug!("Loading cursor batch {}", native);

        let converter = &self.template.converter;
        self.template
            .execute(|client| async move {
                let response = client.query(&native).await?;
                let items = converter.read_all(response.documents())?;
                Ok(PartialResult::new(items, response.next_cursor_mark.clone())
                    .with_total(response.num_found()))
            })
            .await
    }
}

fn require_id(id: &str) -> Result<&str> {
    if id.trim().is_empty() {
        return Err(SolrError::invalid_argument("id must not be blank"));
    }
    Ok(id)
}

fn require_ids<I, S>(ids: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter()
        .map(|id| require_id(id.as_ref()).map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SolrDocument;
    use crate::config::SolrSettings;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts client requests; every client points at a closed port
    struct CountingFactory {
        calls: AtomicUsize,
    }

    impl SolrClientFactory for CountingFactory {
        fn client(&self, core: Option<&str>) -> std::result::Result<SolrClient, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SolrClient::new("http://127.0.0.1:9/solr")?.with_core(core))
        }
    }

    fn template() -> (Arc<CountingFactory>, SolrTemplate) {
        let factory = Arc::new(CountingFactory {
            calls: AtomicUsize::new(0),
        });
        let template = SolrTemplate::builder(factory.clone()).build();
        (factory, template)
    }

    #[tokio::test]
    async fn test_blank_id_fails_before_any_call() {
        let (factory, template) = template();

        let err = template.delete_by_id("  ").await.unwrap_err();
        assert!(matches!(err, SolrError::InvalidArgument(_)));

        let err = template.get_by_id::<SolrDocument>("").await.unwrap_err();
        assert!(matches!(err, SolrError::InvalidArgument(_)));

        let err = template.delete_by_ids(["a", ""]).await.unwrap_err();
        assert!(matches!(err, SolrError::InvalidArgument(_)));

        assert_eq!(factory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_batches_skip_the_engine() {
        let (factory, template) = template();

        let docs: Vec<SolrDocument> = template.get_by_ids(Vec::<String>::new()).await.unwrap();
        assert!(docs.is_empty());
        template.delete_by_ids(Vec::<String>::new()).await.unwrap();
        template.save_documents(Vec::new()).await.unwrap();

        assert_eq!(factory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_collection_bean_is_invalid() {
        let (factory, template) = template();
        let err = template.save_bean(&vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, SolrError::InvalidArgument(_)));
        assert_eq!(factory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unregistered_kind() {
        let (factory, template) = template();
        let query = Query::all();
        let data = DataQuery::Custom {
            kind: "geo",
            query: &query,
        };

        let err = template
            .query_for_result_page::<SolrDocument>(&data)
            .await
            .unwrap_err();
        assert!(matches!(err, SolrError::UnsupportedQueryKind(QueryKind::Custom(ref k)) if k == "geo"));
        assert_eq!(factory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_soft_commit_on_old_server() {
        let factory = Arc::new(CountingFactory {
            calls: AtomicUsize::new(0),
        });
        let template = SolrTemplate::builder(factory.clone())
            .template_settings(TemplateSettings {
                server_version: "3.6.2".to_string(),
                ..TemplateSettings::default()
            })
            .build();

        let err = template.soft_commit().await.unwrap_err();
        assert!(matches!(err, SolrError::UnsupportedOperation(_)));
        assert_eq!(factory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport() {
        let (factory, template) = template();
        let err = template.ping().await.unwrap_err();
        assert!(matches!(err, SolrError::Transport { .. }));
        assert_eq!(factory.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_initialize_rejects_bad_url() {
        let settings = Settings {
            solr: SolrSettings {
                base_url: "not a url".to_string(),
                ..SolrSettings::default()
            },
            ..Settings::default()
        };
        let err = SolrTemplate::initialize(&settings).err().unwrap();
        assert!(matches!(err, SolrError::Transport { .. }));
    }

    #[test]
    fn test_initialize_rejects_bad_timeout() {
        for timeout in [-1.0, f64::NAN] {
            let settings = Settings {
                solr: SolrSettings {
                    request_timeout: timeout,
                    ..SolrSettings::default()
                },
                ..Settings::default()
            };
            let err = SolrTemplate::initialize(&settings).err().unwrap();
            assert!(matches!(err, SolrError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_register_query_parser() {
        let (_, mut template) = template();
        let kind = QueryKind::Custom("geo".to_string());
        assert!(!template.query_parsers().contains(&kind));

        template.register_query_parser(kind.clone(), Arc::new(crate::query::DefaultQueryParser));
        assert!(template.query_parsers().contains(&kind));
    }
}
