//! Lazy, mark-driven iteration over large result sets
//!
//! A [`Cursor`] pulls results in batches through a [`CursorLoader`], threading
//! the continuation mark the engine returned with the previous batch into the
//! next request.

use crate::error::{Result, SolrError};
use crate::query::CURSOR_MARK_START;
use async_trait::async_trait;
use futures::Stream;
use std::collections::VecDeque;
use tracing::debug;

/// One batch returned by a loader
#[derive(Debug, Clone, PartialEq)]
pub struct PartialResult<T> {
    pub items: Vec<T>,
    /// Mark to resume after this batch
    pub next_cursor_mark: Option<String>,
    /// Total matches reported by the engine, if known
    pub total: Option<u64>,
}

impl<T> PartialResult<T> {
    pub fn new(items: Vec<T>, next_cursor_mark: Option<String>) -> Self {
        Self {
            items,
            next_cursor_mark,
            total: None,
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

/// Fetches the batch that starts at a continuation mark
#[async_trait]
pub trait CursorLoader<T: Send>: Send + Sync {
    /// Load the batch after `cursor_mark` (the engine's start mark on the first call)
    async fn load(&self, cursor_mark: &str) -> Result<PartialResult<T>>;
}

/// Lifecycle of a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Created, no batch loaded yet
    Ready,
    Open,
    /// Every batch was consumed; no further round trips
    Finished,
    Closed,
}

/// Single-owner sequence of results loaded batch by batch
pub struct Cursor<T, L> {
    loader: L,
    state: CursorState,
    /// Mark the current batch was loaded with; empty for the start mark
    cursor_mark: String,
    next_cursor_mark: Option<String>,
    batch: VecDeque<T>,
    /// Items handed out so far
    position: u64,
    /// Items loaded so far
    loaded: u64,
    exhausted: bool,
}

impl<T, L> Cursor<T, L>
where
    T: Send,
    L: CursorLoader<T>,
{
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            state: CursorState::Ready,
            cursor_mark: String::new(),
            next_cursor_mark: None,
            batch: VecDeque::new(),
            position: 0,
            loaded: 0,
            exhausted: false,
        }
    }

    /// Load the first batch. A finished or closed cursor restarts from the
    /// beginning.
    pub async fn open(&mut self) -> Result<()> {
        if self.state == CursorState::Open {
            return Err(SolrError::UnsupportedOperation(
                "cursor is already open".to_string(),
            ));
        }

        let batch = self.fetch(String::new(), 0).await?;
        self.position = 0;
        self.apply(batch);
        self.state = CursorState::Open;
        Ok(())
    }

    /// Next item, loading a new batch when the current one is drained.
    ///
    /// A cursor that was never opened is opened first. A failed load leaves
    /// the cursor untouched so the call can be retried.
    pub async fn next(&mut self) -> Result<Option<T>> {
        match self.state {
            CursorState::Ready => self.open().await?,
            CursorState::Finished => return Ok(None),
            CursorState::Closed => {
                return Err(SolrError::UnsupportedOperation(
                    "cursor is closed".to_string(),
                ))
            }
            CursorState::Open => {}
        }

        loop {
            if let Some(item) = self.batch.pop_front() {
                self.position += 1;
                return Ok(Some(item));
            }
            if self.exhausted {
                self.state = CursorState::Finished;
                return Ok(None);
            }
            let mark = self.next_cursor_mark.clone().unwrap_or_default();
            let batch = self.fetch(mark, self.loaded).await?;
            self.apply(batch);
        }
    }

    /// Drop the buffered batch; no further loads until reopened
    pub fn close(&mut self) {
        self.batch.clear();
        self.state = CursorState::Closed;
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == CursorState::Open
    }

    /// Items returned by `next` since the last open
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Mark the current batch was requested with, as sent to the engine
    pub fn cursor_mark(&self) -> &str {
        wire_mark(&self.cursor_mark)
    }

    /// Mark the next batch will be requested with, while more data is expected
    pub fn next_cursor_mark(&self) -> Option<&str> {
        self.next_cursor_mark.as_deref()
    }

    /// Stream over the remaining items
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> {
        futures::stream::try_unfold(self, |mut cursor| async move {
            let item = cursor.next().await?;
            Ok::<_, SolrError>(item.map(|item| (item, cursor)))
        })
    }

    async fn fetch(&self, mark: String, loaded: u64) -> Result<LoadedBatch<T>> {
        let wire = wire_mark(&mark);
        let result = self.loader.load(wire).await?;
        debug!(
            "Cursor loaded {} items at mark '{}', next mark {:?}",
            result.items.len(),
            wire,
            result.next_cursor_mark
        );

        let loaded = loaded + result.items.len() as u64;
        let exhausted = result.items.is_empty()
            || result.total.is_some_and(|total| loaded >= total)
            || match result.next_cursor_mark.as_deref() {
                None | Some("") => true,
                Some(next) => next == wire,
            };

        Ok(LoadedBatch {
            mark,
            next_cursor_mark: result.next_cursor_mark,
            items: result.items,
            loaded,
            exhausted,
        })
    }

    fn apply(&mut self, batch: LoadedBatch<T>) {
        self.cursor_mark = batch.mark;
        self.next_cursor_mark = if batch.exhausted {
            None
        } else {
            batch.next_cursor_mark
        };
        self.batch = batch.items.into();
        self.loaded = batch.loaded;
        self.exhausted = batch.exhausted;
    }
}

struct LoadedBatch<T> {
    mark: String,
    next_cursor_mark: Option<String>,
    items: Vec<T>,
    loaded: u64,
    exhausted: bool,
}

fn wire_mark(mark: &str) -> &str {
    if mark.is_empty() {
        CURSOR_MARK_START
    } else {
        mark
    }
}
