use std::path::{Path, PathBuf};

use vigil_common::Record;

use crate::session::FieldSession;

/// Errors from a record source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// A paginated dataset of records.
pub trait RecordSource {
    /// Total number of records the field will hold.
    fn total_count(&mut self) -> Result<usize, SourceError>;

    /// Up to `limit` records starting at `offset`. An empty result means
    /// the source has nothing more.
    fn fetch(&mut self, offset: usize, limit: usize) -> Result<Vec<Record>, SourceError>;
}

/// In-memory source. Can be told to fail from a given offset on.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<Record>,
    fail_from: Option<usize>,
}

impl MemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            fail_from: None,
        }
    }

    /// Every fetch at or past `offset` returns [`SourceError::Unavailable`].
    pub fn failing_from(mut self, offset: usize) -> Self {
        self.fail_from = Some(offset);
        self
    }
}

impl RecordSource for MemorySource {
    fn total_count(&mut self) -> Result<usize, SourceError> {
        Ok(self.records.len())
    }

    fn fetch(&mut self, offset: usize, limit: usize) -> Result<Vec<Record>, SourceError> {
        if self.fail_from.is_some_and(|at| offset >= at) {
            return Err(SourceError::Unavailable(format!("fetch at offset {offset} refused")));
        }
        Ok(page(&self.records, offset, limit))
    }
}

/// A JSON array of records on disk, read once on first use.
#[derive(Debug)]
pub struct JsonFileSource {
    path: PathBuf,
    records: Option<Vec<Record>>,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            records: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn records(&mut self) -> Result<&[Record], SourceError> {
        if self.records.is_none() {
            let text = std::fs::read_to_string(&self.path)?;
            let parsed: Vec<Record> = serde_json::from_str(&text)?;
            tracing::debug!(path = %self.path.display(), count = parsed.len(), "dataset read");
            self.records = Some(parsed);
        }
        Ok(self.records.as_deref().unwrap_or_default())
    }
}

impl RecordSource for JsonFileSource {
    fn total_count(&mut self) -> Result<usize, SourceError> {
        Ok(self.records()?.len())
    }

    fn fetch(&mut self, offset: usize, limit: usize) -> Result<Vec<Record>, SourceError> {
        Ok(page(self.records()?, offset, limit))
    }
}

fn page(records: &[Record], offset: usize, limit: usize) -> Vec<Record> {
    let start = offset.min(records.len());
    let end = offset.saturating_add(limit).min(records.len());
    records[start..end].to_vec()
}

/// Where a [`ChunkedLoader`] stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderStatus {
    /// More chunks to fetch.
    Loading,
    /// The field is full, or the source ran dry.
    Complete,
    /// A fetch failed at `offset`; no further chunks are requested.
    Halted { offset: usize },
}

impl LoaderStatus {
    pub fn is_finished(self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// Feeds a session one chunk per [`pump`](Self::pump).
#[derive(Debug)]
pub struct ChunkedLoader<S> {
    source: S,
    chunk_size: usize,
    status: LoaderStatus,
    chunks: usize,
}

impl<S: RecordSource> ChunkedLoader<S> {
    pub fn new(source: S, chunk_size: usize) -> Self {
        Self {
            source,
            chunk_size: chunk_size.max(1),
            status: LoaderStatus::Loading,
            chunks: 0,
        }
    }

    pub fn status(&self) -> LoaderStatus {
        self.status
    }

    /// Chunks ingested so far.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Fetch and ingest the next chunk, if any.
    pub fn pump(&mut self, session: &mut FieldSession) -> LoaderStatus {
        if self.status.is_finished() {
            return self.status;
        }
        let offset = session.field().next_index();
        let remaining = session.field().remaining();
        if remaining == 0 {
            return self.finish(LoaderStatus::Complete, session);
        }

        let limit = self.chunk_size.min(remaining);
        let chunk = match self.source.fetch(offset, limit) {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(offset, error = %e, "chunk fetch failed, ingest halted");
                return self.finish(LoaderStatus::Halted { offset }, session);
            }
        };
        if chunk.is_empty() {
            tracing::warn!(
                offset,
                expected = session.field().layout().total_count(),
                "source ran dry before the field filled"
            );
            return self.finish(LoaderStatus::Complete, session);
        }

        let mut chunk = chunk;
        chunk.truncate(limit);
        if let Err(e) = session.ingest_batch(chunk) {
            tracing::warn!(offset, error = %e, "chunk rejected, ingest halted");
            return self.finish(LoaderStatus::Halted { offset }, session);
        }
        self.chunks += 1;

        if session.field().is_complete() {
            self.finish(LoaderStatus::Complete, session)
        } else {
            self.status
        }
    }

    /// Pump until the loader finishes.
    pub fn run(&mut self, session: &mut FieldSession) -> LoaderStatus {
        while !self.pump(session).is_finished() {}
        self.status
    }

    fn finish(&mut self, status: LoaderStatus, session: &FieldSession) -> LoaderStatus {
        self.status = status;
        tracing::info!(
            ?status,
            placed = session.field().len(),
            chunks = self.chunks,
            "ingest finished"
        );
        status
    }
}
