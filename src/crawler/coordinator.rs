//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl sequence that ties the other crawler
//! pieces together:
//! - Fetching the homepage and discovering category pages
//! - Gathering question pages from every category (or from the homepage)
//! - Extracting one pair per question page, or falling back to the homepage
//! - Polling the cancellation token between fetches
//! - Reporting progress and handing the pairs to the result sink

use crate::config::{Config, MarkerConfig};
use crate::crawler::extract::{ContentSelectors, QaPair};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{extract_links, parse_html};
use crate::crawler::progress::{percent, ProgressEvent, ProgressSink};
use crate::crawler::session::CrawlSession;
use crate::output::ResultSink;
use crate::storage::RunStatus;
use crate::{CardinalityMismatch, HarvestError};
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How a crawl that did not fail came to an end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// All targets were processed
    Completed(Vec<QaPair>),

    /// The cancellation token was set before the crawl finished
    Cancelled,

    /// The homepage fallback could not pair questions with answers
    CountMismatch(CardinalityMismatch),
}

/// Main crawler coordinator structure
pub struct Coordinator {
    fetcher: Fetcher,
    markers: MarkerConfig,
    selectors: ContentSelectors,
    politeness_delay: Duration,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The HTTP client or content selectors could not be built
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::from_config(&config.crawler, &config.user_agent)?;
        Self::with_fetcher(config, fetcher)
    }

    /// Creates a coordinator around an existing fetcher
    pub fn with_fetcher(config: &Config, fetcher: Fetcher) -> Result<Self, HarvestError> {
        Ok(Self {
            fetcher,
            markers: config.markers.clone(),
            selectors: ContentSelectors::from_markers(&config.markers)?,
            politeness_delay: Duration::from_millis(config.crawler.politeness_delay_ms),
        })
    }

    /// Runs one crawl of `site_base`
    ///
    /// Any fetch failure aborts the whole crawl. Cancellation is checked at
    /// the top of every category and question iteration, so a fetch that has
    /// already started always finishes first.
    ///
    /// Documents are parsed inside synchronous helpers and never held across
    /// an `.await`, which keeps the returned future `Send`.
    pub async fn run(
        &self,
        site_base: &str,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<CrawlOutcome, HarvestError> {
        let mut session = CrawlSession::new(site_base, cancel.clone());

        tracing::info!("Fetching homepage {}", site_base);
        let homepage = self.fetcher.fetch(site_base).await?;

        let categories = self.links(&homepage.body, &self.markers.category_path, site_base);
        session.add_categories(categories);

        if session.category_count() > 0 {
            progress.report(ProgressEvent::CategoriesFound(session.category_count()));
            if self.visit_categories(&mut session).await?.is_break() {
                return Ok(CrawlOutcome::Cancelled);
            }
        } else {
            tracing::info!("No category links found, looking for questions on the homepage");
            let questions = self.links(&homepage.body, &self.markers.question_path, site_base);
            session.add_questions(questions);
        }

        if session.question_count() > 0 {
            progress.report(ProgressEvent::QuestionsFound(session.question_count()));
            if self.visit_questions(&mut session, progress).await?.is_break() {
                return Ok(CrawlOutcome::Cancelled);
            }
        } else {
            tracing::info!("No question links found, extracting directly from the homepage");
            match self.homepage_pairs(&homepage.body) {
                Ok(pairs) => session.extend_pairs(pairs),
                Err(mismatch) => {
                    tracing::warn!("{}", mismatch);
                    return Ok(CrawlOutcome::CountMismatch(mismatch));
                }
            }
        }

        let pairs = session.into_pairs();
        tracing::info!("Extracted {} question/answer pairs", pairs.len());
        Ok(CrawlOutcome::Completed(pairs))
    }

    /// Fetches every category page and collects its question links
    async fn visit_categories(
        &self,
        session: &mut CrawlSession,
    ) -> Result<ControlFlow<()>, HarvestError> {
        for url in session.category_targets() {
            if session.is_cancelled() {
                tracing::info!("Crawl cancelled during category discovery");
                return Ok(ControlFlow::Break(()));
            }

            self.pause().await;
            let page = self.fetcher.fetch(&url).await?;

            let questions = self.links(&page.body, &self.markers.question_path, session.site_base());
            let found = questions.len();
            let added = session.add_questions(questions);
            tracing::debug!("{}: {} question links ({} new)", url, found, added);
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Fetches every question page and extracts one pair from each
    async fn visit_questions(
        &self,
        session: &mut CrawlSession,
        progress: &dyn ProgressSink,
    ) -> Result<ControlFlow<()>, HarvestError> {
        let targets = session.question_targets();
        let total = targets.len();

        for (index, url) in targets.iter().enumerate() {
            if session.is_cancelled() {
                tracing::info!("Crawl cancelled after {} of {} questions", index, total);
                return Ok(ControlFlow::Break(()));
            }

            self.pause().await;
            let page = self.fetcher.fetch(url).await?;

            let pair = self.selectors.extract_single(&parse_html(&page.body));
            if pair.question.is_empty() {
                tracing::debug!("No question container on {}", url);
            }
            session.push_pair(pair);

            progress.report(ProgressEvent::Progress(percent(index + 1, total)));
        }

        Ok(ControlFlow::Continue(()))
    }

    fn links(&self, body: &str, marker: &str, site_base: &str) -> HashSet<String> {
        extract_links(&parse_html(body), marker, site_base)
    }

    fn homepage_pairs(&self, body: &str) -> Result<Vec<QaPair>, CardinalityMismatch> {
        self.selectors.extract_list(&parse_html(body))
    }

    async fn pause(&self) {
        if !self.politeness_delay.is_zero() {
            tokio::time::sleep(self.politeness_delay).await;
        }
    }
}

/// Runs one crawl end to end and reports exactly one terminal event
///
/// Errors never escape: a failure is logged, reported as
/// [`ProgressEvent::Failed`] and reflected in the returned status.
///
/// # Flow
///
/// 1. Report `Started`
/// 2. Run the coordinator
/// 3. On success, persist the pairs to `results`
/// 4. Finalize `results` with the terminal status
/// 5. Report the terminal event
pub async fn run_crawl(
    coordinator: &Coordinator,
    site_base: &str,
    progress: &dyn ProgressSink,
    results: &dyn ResultSink,
    cancel: &CancellationToken,
) -> RunStatus {
    progress.report(ProgressEvent::Started);

    let (status, event) = match coordinator.run(site_base, progress, cancel).await {
        Ok(CrawlOutcome::Completed(pairs)) => match results.persist(&pairs) {
            Ok(()) => (
                RunStatus::Completed,
                ProgressEvent::Completed { pairs: pairs.len() },
            ),
            Err(e) => {
                let e = HarvestError::from(e);
                tracing::error!("Failed to save results: {}", e);
                (RunStatus::Failed, ProgressEvent::Failed(e.to_string()))
            }
        },
        Ok(CrawlOutcome::Cancelled) => (RunStatus::Cancelled, ProgressEvent::Cancelled),
        Ok(CrawlOutcome::CountMismatch(mismatch)) => (
            RunStatus::CountMismatch,
            ProgressEvent::CountMismatch {
                questions: mismatch.questions,
                answers: mismatch.answers,
            },
        ),
        Err(e) => {
            tracing::error!("Crawl of {} failed: {}", site_base, e);
            (RunStatus::Failed, ProgressEvent::Failed(e.to_string()))
        }
    };

    if let Err(e) = results.finalize(status) {
        tracing::warn!("Failed to finalize results: {}", e);
    }

    progress.report(event);
    status
}

/// A crawl running on its own task
pub struct CrawlHandle {
    cancel: CancellationToken,
    progress: Arc<dyn ProgressSink>,
    results: Arc<dyn ResultSink>,
    task: JoinHandle<RunStatus>,
}

impl CrawlHandle {
    /// Token that stops the crawl at its next checkpoint when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the crawl to finish
    ///
    /// A panicking worker is reported as a failure on the progress sink so
    /// the caller still sees one terminal event.
    pub async fn wait(self) -> RunStatus {
        match self.task.await {
            Ok(status) => status,
            Err(e) => {
                let err = HarvestError::Worker(e.to_string());
                tracing::error!("{}", err);
                if let Err(e) = self.results.finalize(RunStatus::Failed) {
                    tracing::warn!("Failed to finalize results: {}", e);
                }
                self.progress.report(ProgressEvent::Failed(err.to_string()));
                RunStatus::Failed
            }
        }
    }
}

/// Starts a crawl on a dedicated tokio task
///
/// Fetches inside the task stay strictly sequential; the caller remains
/// free to consume progress events and to cancel.
///
/// # Example
///
/// ```no_run
/// use faq_harvester::config::Config;
/// use faq_harvester::crawler::{spawn_crawl, Coordinator, ProgressEvent};
/// use faq_harvester::output::MarkdownTableSink;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ProgressEvent>();
/// let handle = spawn_crawl(
///     Arc::new(Coordinator::new(&config)?),
///     "https://faq.example.com".to_string(),
///     Arc::new(tx),
///     Arc::new(MarkdownTableSink::new("qa.md")),
///     CancellationToken::new(),
/// );
/// let status = handle.wait().await;
/// while let Some(event) = rx.recv().await {
///     println!("{}", event);
/// }
/// println!("{}", status);
/// # Ok(())
/// # }
/// ```
pub fn spawn_crawl(
    coordinator: Arc<Coordinator>,
    site_base: String,
    progress: Arc<dyn ProgressSink>,
    results: Arc<dyn ResultSink>,
    cancel: CancellationToken,
) -> CrawlHandle {
    let task = tokio::spawn({
        let progress = Arc::clone(&progress);
        let results = Arc::clone(&results);
        let cancel = cancel.clone();
        async move {
            run_crawl(
                &coordinator,
                &site_base,
                progress.as_ref(),
                results.as_ref(),
                &cancel,
            )
            .await
        }
    });

    CrawlHandle {
        cancel,
        progress,
        results,
        task,
    }
}
