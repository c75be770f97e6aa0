//! Explicit construction of a template

use super::executor::SolrTemplate;
use super::translator::{ExceptionTranslator, SolrExceptionTranslator};
use crate::client::SolrClientFactory;
use crate::config::{CursorSettings, Settings, TemplateSettings};
use crate::convert::{MappingSolrConverter, SolrConverter};
use crate::query::{QueryKind, QueryParser, QueryParsers};
use std::sync::Arc;

/// Wires the client factory, converter, parser registry and translator of a
/// [`SolrTemplate`]. Everything is fixed once [`build`](Self::build) returns.
pub struct SolrTemplateBuilder<C = MappingSolrConverter> {
    factory: Arc<dyn SolrClientFactory>,
    converter: C,
    parsers: QueryParsers,
    translator: Arc<dyn ExceptionTranslator>,
    settings: TemplateSettings,
    cursor: CursorSettings,
    core: Option<String>,
}

impl SolrTemplateBuilder<MappingSolrConverter> {
    pub fn new(factory: Arc<dyn SolrClientFactory>) -> Self {
        Self {
            factory,
            converter: MappingSolrConverter::new(),
            parsers: QueryParsers::with_defaults(),
            translator: Arc::new(SolrExceptionTranslator::new()),
            settings: TemplateSettings::default(),
            cursor: CursorSettings::default(),
            core: None,
        }
    }
}

impl<C: SolrConverter> SolrTemplateBuilder<C> {
    /// Use another converter
    pub fn converter<D: SolrConverter>(self, converter: D) -> SolrTemplateBuilder<D> {
        SolrTemplateBuilder {
            factory: self.factory,
            converter,
            parsers: self.parsers,
            translator: self.translator,
            settings: self.settings,
            cursor: self.cursor,
            core: self.core,
        }
    }

    /// Register or override the parser for a query kind
    pub fn query_parser(mut self, kind: QueryKind, parser: Arc<dyn QueryParser>) -> Self {
        self.parsers.register_parser(kind, parser);
        self
    }

    /// Replace the whole parser registry
    pub fn query_parsers(mut self, parsers: QueryParsers) -> Self {
        self.parsers = parsers;
        self
    }

    pub fn exception_translator(mut self, translator: Arc<dyn ExceptionTranslator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn template_settings(mut self, settings: TemplateSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn cursor_settings(mut self, cursor: CursorSettings) -> Self {
        self.cursor = cursor;
        self
    }

    /// Take template and cursor settings from a loaded settings file
    pub fn settings(self, settings: &Settings) -> Self {
        self.template_settings(settings.template.clone())
            .cursor_settings(settings.cursor.clone())
    }

    /// Core passed to the client factory; the factory's default when unset
    pub fn core(mut self, core: impl Into<String>) -> Self {
        self.core = Some(core.into());
        self
    }

    pub fn build(self) -> SolrTemplate<C> {
        SolrTemplate::from_parts(
            self.factory,
            self.converter,
            self.parsers,
            self.translator,
            self.settings,
            self.cursor,
            self.core,
        )
    }
}
