//! Mock `VerseService` implementations for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use verseguessr_core::error::GameError;
use verseguessr_core::service::VerseService;
use verseguessr_core::verse::GlobalIndex;
use verseguessr_core::wire::{CatalogPayload, ContextWindow};

/// A verse service that answers from canned data and records every call.
///
/// Context windows are served in the order they were scripted; the last one
/// repeats once the queue is down to a single entry. Global indices are
/// computed from the catalog's verse-count table (`-1` when the reference
/// is outside it).
#[derive(Debug)]
pub struct ScriptedVerseService {
    catalog: CatalogPayload,
    contexts: Mutex<VecDeque<ContextWindow>>,
    fail_contexts: AtomicBool,
    fail_resolutions: AtomicBool,
    unresolved_answers: AtomicBool,
    catalog_fetches: AtomicUsize,
    context_requests: Mutex<Vec<(String, u32)>>,
    resolve_requests: Mutex<Vec<(usize, u32, u32)>>,
}

impl ScriptedVerseService {
    /// Creates a service backed by `catalog` with no scripted contexts.
    #[must_use]
    pub fn new(catalog: CatalogPayload) -> Self {
        Self {
            catalog,
            contexts: Mutex::new(VecDeque::new()),
            fail_contexts: AtomicBool::new(false),
            fail_resolutions: AtomicBool::new(false),
            unresolved_answers: AtomicBool::new(false),
            catalog_fetches: AtomicUsize::new(0),
            context_requests: Mutex::new(Vec::new()),
            resolve_requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues context windows to serve.
    #[must_use]
    pub fn with_contexts(self, windows: Vec<ContextWindow>) -> Self {
        self.contexts.lock().unwrap().extend(windows);
        self
    }

    /// Makes every context fetch fail from now on.
    pub fn fail_contexts(&self) {
        self.fail_contexts.store(true, Ordering::SeqCst);
    }

    /// Makes every global-index resolution fail from now on.
    pub fn fail_resolutions(&self) {
        self.fail_resolutions.store(true, Ordering::SeqCst);
    }

    /// Makes every global-index resolution succeed with
    /// [`GlobalIndex::UNRESOLVED`] from now on, whatever the reference.
    pub fn answer_unresolved(&self) {
        self.unresolved_answers.store(true, Ordering::SeqCst);
    }

    /// Number of catalog fetches served.
    pub fn catalog_fetches(&self) -> usize {
        self.catalog_fetches.load(Ordering::SeqCst)
    }

    /// `(version, context_radius)` of every context request, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn context_requests(&self) -> Vec<(String, u32)> {
        self.context_requests.lock().unwrap().clone()
    }

    /// `(book_index, chapter, verse)` of every resolution request.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn resolve_requests(&self) -> Vec<(usize, u32, u32)> {
        self.resolve_requests.lock().unwrap().clone()
    }

    fn next_context(&self) -> Result<ContextWindow, GameError> {
        let mut contexts = self.contexts.lock().unwrap();
        match contexts.len() {
            0 => Err(GameError::Service("no context scripted".into())),
            1 => Ok(contexts[0].clone()),
            _ => Ok(contexts.pop_front().unwrap()),
        }
    }

    fn ordinal(&self, book_index: usize, chapter: u32, verse_number: u32) -> GlobalIndex {
        let rows = &self.catalog.verse_counts;
        let Some(row) = rows.get(book_index) else {
            return GlobalIndex::UNRESOLVED;
        };
        let chapter_index = chapter as usize;
        if chapter_index == 0 || chapter_index > row.len() {
            return GlobalIndex::UNRESOLVED;
        }
        if verse_number == 0 || verse_number > row[chapter_index - 1] {
            return GlobalIndex::UNRESOLVED;
        }
        let before_book: u32 = rows[..book_index].iter().flatten().sum();
        let before_chapter: u32 = row[..chapter_index - 1].iter().sum();
        GlobalIndex::resolved(before_book + before_chapter + verse_number - 1)
    }
}

#[async_trait]
impl VerseService for ScriptedVerseService {
    async fn fetch_catalog(&self) -> Result<CatalogPayload, GameError> {
        self.catalog_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.catalog.clone())
    }

    async fn fetch_random_context(
        &self,
        version: &str,
        context_radius: u32,
    ) -> Result<ContextWindow, GameError> {
        self.context_requests
            .lock()
            .unwrap()
            .push((version.to_owned(), context_radius));
        if self.fail_contexts.load(Ordering::SeqCst) {
            return Err(GameError::Service("context fetch timed out".into()));
        }
        self.next_context()
    }

    async fn resolve_global_index(
        &self,
        book_index: usize,
        chapter: u32,
        verse_number: u32,
    ) -> Result<GlobalIndex, GameError> {
        self.resolve_requests
            .lock()
            .unwrap()
            .push((book_index, chapter, verse_number));
        if self.fail_resolutions.load(Ordering::SeqCst) {
            return Err(GameError::Service("index lookup timed out".into()));
        }
        if self.unresolved_answers.load(Ordering::SeqCst) {
            return Ok(GlobalIndex::UNRESOLVED);
        }
        Ok(self.ordinal(book_index, chapter, verse_number))
    }
}

/// A verse service that always returns a service error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingVerseService;

#[async_trait]
impl VerseService for FailingVerseService {
    async fn fetch_catalog(&self) -> Result<CatalogPayload, GameError> {
        Err(GameError::Service("connection refused".into()))
    }

    async fn fetch_random_context(
        &self,
        _version: &str,
        _context_radius: u32,
    ) -> Result<ContextWindow, GameError> {
        Err(GameError::Service("connection refused".into()))
    }

    async fn resolve_global_index(
        &self,
        _book_index: usize,
        _chapter: u32,
        _verse_number: u32,
    ) -> Result<GlobalIndex, GameError> {
        Err(GameError::Service("connection refused".into()))
    }
}

/// A [`ScriptedVerseService`] whose context fetches and index resolutions
/// block until the test releases them, in request order.
///
/// The response for each request is chosen when the request arrives, so
/// the first waiter gets the first scripted window. Catalog fetches pass
/// straight through unless [`GatedVerseService::with_gated_catalog`] was
/// used.
#[derive(Debug)]
pub struct GatedVerseService {
    inner: ScriptedVerseService,
    catalog_gate: Option<Semaphore>,
    context_gate: Semaphore,
    resolve_gate: Semaphore,
    waiting_contexts: AtomicUsize,
    waiting_resolutions: AtomicUsize,
    waiting_catalogs: AtomicUsize,
}

impl GatedVerseService {
    /// Wraps `inner` with closed gates.
    #[must_use]
    pub fn new(inner: ScriptedVerseService) -> Self {
        Self {
            inner,
            catalog_gate: None,
            context_gate: Semaphore::new(0),
            resolve_gate: Semaphore::new(0),
            waiting_contexts: AtomicUsize::new(0),
            waiting_resolutions: AtomicUsize::new(0),
            waiting_catalogs: AtomicUsize::new(0),
        }
    }

    /// Also holds catalog fetches until released.
    #[must_use]
    pub fn with_gated_catalog(mut self) -> Self {
        self.catalog_gate = Some(Semaphore::new(0));
        self
    }

    /// The wrapped service, for call assertions.
    pub fn inner(&self) -> &ScriptedVerseService {
        &self.inner
    }

    /// Lets `n` pending or future catalog fetches complete. No effect
    /// without [`GatedVerseService::with_gated_catalog`].
    pub fn release_catalogs(&self, n: usize) {
        if let Some(gate) = &self.catalog_gate {
            gate.add_permits(n);
        }
    }

    /// Lets `n` pending or future context fetches complete.
    pub fn release_contexts(&self, n: usize) {
        self.context_gate.add_permits(n);
    }

    /// Lets `n` pending or future resolutions complete.
    pub fn release_resolutions(&self, n: usize) {
        self.resolve_gate.add_permits(n);
    }

    /// Catalog fetches currently parked at the gate.
    pub fn waiting_catalogs(&self) -> usize {
        self.waiting_catalogs.load(Ordering::SeqCst)
    }

    /// Context fetches currently parked at the gate.
    pub fn waiting_contexts(&self) -> usize {
        self.waiting_contexts.load(Ordering::SeqCst)
    }

    /// Resolutions currently parked at the gate.
    pub fn waiting_resolutions(&self) -> usize {
        self.waiting_resolutions.load(Ordering::SeqCst)
    }

    async fn pass(gate: &Semaphore, waiting: &AtomicUsize) -> Result<(), GameError> {
        waiting.fetch_add(1, Ordering::SeqCst);
        let permit = gate.acquire().await;
        waiting.fetch_sub(1, Ordering::SeqCst);
        permit
            .map(tokio::sync::SemaphorePermit::forget)
            .map_err(|e| GameError::Service(format!("gate closed: {e}")))
    }
}

#[async_trait]
impl VerseService for GatedVerseService {
    async fn fetch_catalog(&self) -> Result<CatalogPayload, GameError> {
        let response = self.inner.fetch_catalog().await;
        if let Some(gate) = &self.catalog_gate {
            Self::pass(gate, &self.waiting_catalogs).await?;
        }
        response
    }

    async fn fetch_random_context(
        &self,
        version: &str,
        context_radius: u32,
    ) -> Result<ContextWindow, GameError> {
        let response = self.inner.fetch_random_context(version, context_radius).await;
        Self::pass(&self.context_gate, &self.waiting_contexts).await?;
        response
    }

    async fn resolve_global_index(
        &self,
        book_index: usize,
        chapter: u32,
        verse_number: u32,
    ) -> Result<GlobalIndex, GameError> {
        let response = self
            .inner
            .resolve_global_index(book_index, chapter, verse_number)
            .await;
        Self::pass(&self.resolve_gate, &self.waiting_resolutions).await?;
        response
    }
}
