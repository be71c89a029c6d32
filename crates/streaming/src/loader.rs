//! Sequential page pump for flow rows.
//!
//! The source's paging is modeled as an explicit poll-style state machine
//! rather than recursion: the session asks for the next page window,
//! forwards it to the transport, and feeds the result back in. Exactly one
//! page is ever outstanding, the page counter is observable from outside,
//! and the point limit is a hard stop independent of how the transport
//! delivers.

use runtime::cancel::{Epoch, Stamp};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::rows::FlowRow;

/// Rows fetched per page.
pub const PAGE_SIZE: usize = 1000;

/// One page window. Width is fixed by the row shape; only the vertical
/// window moves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub height: usize,
}

/// Why loading ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The source ran out of rows.
    Exhausted,
    /// The configured point limit cut the load short.
    Truncated { limit: usize },
    /// The source rejected a page; no retry is attempted.
    Failed(FetchError),
}

/// Result of feeding one page result into the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderStep {
    /// More pages to fetch; ask `next_request` again.
    Continue,
    /// Loading ended; the rows so far are final.
    Finished(LoadOutcome),
    /// The session epoch moved on (surface torn down); the page was
    /// dropped without touching any state.
    Stale,
}

/// The transport half of the data source.
///
/// Implementations fetch one window of rows; they are driven strictly
/// sequentially, a new window only after the previous one resolved.
pub trait RowSource {
    fn fetch(&mut self, request: PageRequest) -> Result<Vec<FlowRow>, FetchError>;
}

#[derive(Debug)]
pub struct FlowLoader {
    rows: Vec<FlowRow>,
    pages_fetched: usize,
    point_limit: usize,
    page_size: usize,
    finished: Option<LoadOutcome>,
    stamp: Stamp,
}

impl FlowLoader {
    pub fn new(point_limit: usize, stamp: Stamp) -> Self {
        Self::with_page_size(point_limit, PAGE_SIZE, stamp)
    }

    pub fn with_page_size(point_limit: usize, page_size: usize, stamp: Stamp) -> Self {
        Self {
            rows: Vec::new(),
            pages_fetched: 0,
            point_limit: point_limit.max(1),
            page_size: page_size.max(1),
            finished: None,
            stamp,
        }
    }

    pub fn rows(&self) -> &[FlowRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<FlowRow> {
        self.rows
    }

    /// Pages successfully ingested so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// The epoch stamp this loader was issued under.
    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    pub fn outcome(&self) -> Option<&LoadOutcome> {
        self.finished.as_ref()
    }

    /// The next window to fetch, or `None` once loading has ended.
    pub fn next_request(&self) -> Option<PageRequest> {
        if self.finished.is_some() {
            return None;
        }
        let remaining = self.point_limit - self.rows.len();
        Some(PageRequest {
            offset: self.rows.len(),
            height: self.page_size.min(remaining),
        })
    }

    /// Ingest one page result.
    ///
    /// A short page ends the load as `Exhausted`; reaching the point limit
    /// ends it as `Truncated`; an error ends it as `Failed`. A stale stamp
    /// drops the page entirely.
    pub fn apply_page(
        &mut self,
        epoch: &Epoch,
        page: Result<Vec<FlowRow>, FetchError>,
    ) -> LoaderStep {
        if !epoch.is_current(self.stamp) {
            debug!(pages = self.pages_fetched, "dropping stale page");
            return LoaderStep::Stale;
        }
        if let Some(outcome) = &self.finished {
            return LoaderStep::Finished(outcome.clone());
        }

        let requested = match self.next_request() {
            Some(r) => r.height,
            None => 0,
        };

        match page {
            Ok(rows) => {
                let got = rows.len();
                self.rows.extend(rows);
                self.pages_fetched += 1;
                debug!(
                    page = self.pages_fetched,
                    rows = got,
                    total = self.rows.len(),
                    "ingested page"
                );

                if self.rows.len() >= self.point_limit {
                    self.rows.truncate(self.point_limit);
                    self.finished = Some(LoadOutcome::Truncated {
                        limit: self.point_limit,
                    });
                } else if got < requested {
                    self.finished = Some(LoadOutcome::Exhausted);
                }
            }
            Err(err) => {
                warn!(error = %err, "page fetch failed, stopping load");
                self.finished = Some(LoadOutcome::Failed(err));
            }
        }

        match &self.finished {
            Some(outcome) => LoaderStep::Finished(outcome.clone()),
            None => LoaderStep::Continue,
        }
    }

    /// Drive a synchronous source to completion.
    ///
    /// Asynchronous hosts call `next_request`/`apply_page` themselves; this
    /// is the convenience pump for blocking transports and tests.
    pub fn run(&mut self, epoch: &Epoch, source: &mut dyn RowSource) -> LoadOutcome {
        loop {
            let Some(request) = self.next_request() else {
                return self.finished.clone().unwrap_or(LoadOutcome::Exhausted);
            };
            let page = source.fetch(request);
            match self.apply_page(epoch, page) {
                LoaderStep::Continue => {}
                LoaderStep::Finished(outcome) => return outcome,
                LoaderStep::Stale => {
                    return self.finished.clone().unwrap_or(LoadOutcome::Exhausted);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FlowLoader, LoadOutcome, LoaderStep, PageRequest, RowSource};
    use crate::error::FetchError;
    use crate::rows::FlowRow;
    use runtime::cancel::Epoch;

    struct FixedSource {
        total: usize,
        fetches: usize,
    }

    impl RowSource for FixedSource {
        fn fetch(&mut self, request: PageRequest) -> Result<Vec<FlowRow>, FetchError> {
            self.fetches += 1;
            let available = self.total.saturating_sub(request.offset);
            let n = available.min(request.height);
            Ok(vec![FlowRow::default(); n])
        }
    }

    #[test]
    fn windows_advance_by_rows_ingested() {
        let epoch = Epoch::new();
        let mut loader = FlowLoader::with_page_size(10, 4, epoch.stamp());

        assert_eq!(
            loader.next_request(),
            Some(PageRequest { offset: 0, height: 4 })
        );
        loader.apply_page(&epoch, Ok(vec![FlowRow::default(); 4]));
        assert_eq!(
            loader.next_request(),
            Some(PageRequest { offset: 4, height: 4 })
        );
        loader.apply_page(&epoch, Ok(vec![FlowRow::default(); 4]));
        // Only 2 rows of budget left: the window shrinks.
        assert_eq!(
            loader.next_request(),
            Some(PageRequest { offset: 8, height: 2 })
        );
    }

    #[test]
    fn short_page_ends_as_exhausted() {
        let epoch = Epoch::new();
        let mut loader = FlowLoader::with_page_size(100, 4, epoch.stamp());
        let mut source = FixedSource { total: 6, fetches: 0 };

        let outcome = loader.run(&epoch, &mut source);
        assert_eq!(outcome, LoadOutcome::Exhausted);
        assert_eq!(loader.rows().len(), 6);
        assert_eq!(loader.pages_fetched(), 2);
        assert_eq!(source.fetches, 2);
        assert!(loader.next_request().is_none());
    }

    #[test]
    fn point_limit_is_a_hard_stop() {
        let epoch = Epoch::new();
        let mut loader = FlowLoader::with_page_size(10, 4, epoch.stamp());
        let mut source = FixedSource { total: 1000, fetches: 0 };

        let outcome = loader.run(&epoch, &mut source);
        assert_eq!(outcome, LoadOutcome::Truncated { limit: 10 });
        assert_eq!(loader.rows().len(), 10);
        // 4 + 4 + 2: never a request past the limit.
        assert_eq!(source.fetches, 3);
    }

    #[test]
    fn fetch_failure_stops_without_retry() {
        let epoch = Epoch::new();
        let mut loader = FlowLoader::with_page_size(10, 4, epoch.stamp());

        loader.apply_page(&epoch, Ok(vec![FlowRow::default(); 4]));
        let err = FetchError::PageRejected {
            offset: 4,
            message: "boom".into(),
        };
        let step = loader.apply_page(&epoch, Err(err.clone()));
        assert_eq!(step, LoaderStep::Finished(LoadOutcome::Failed(err)));
        assert_eq!(loader.rows().len(), 4);
        assert!(loader.next_request().is_none());
    }

    #[test]
    fn stale_epoch_drops_the_page() {
        let mut epoch = Epoch::new();
        let mut loader = FlowLoader::with_page_size(10, 4, epoch.stamp());

        epoch.invalidate();
        let step = loader.apply_page(&epoch, Ok(vec![FlowRow::default(); 4]));
        assert_eq!(step, LoaderStep::Stale);
        assert!(loader.rows().is_empty());
        assert_eq!(loader.pages_fetched(), 0);
    }
}
