//! End-to-end crawl tests against mock FAQ sites

use faq_harvester::config::Config;
use faq_harvester::crawler::{run_crawl, spawn_crawl, Coordinator, ProgressEvent, ProgressSink};
use faq_harvester::output::{OutputResult, ResultSink, SqliteResultSink};
use faq_harvester::storage::{RunStatus, SqliteStorage, Storage};
use faq_harvester::QaPair;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no politeness delay and fast retries
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.politeness_delay_ms = 0;
    config.crawler.retry_delay_ms = 10;
    config.crawler.request_timeout_ms = 2_000;
    config
}

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    fn percents(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Progress(percent) => Some(percent),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Cancels the crawl as soon as the first question page is processed
struct CancelOnFirstProgress {
    recorder: RecordingProgress,
    cancel: CancellationToken,
}

impl ProgressSink for CancelOnFirstProgress {
    fn report(&self, event: ProgressEvent) {
        if matches!(event, ProgressEvent::Progress(_)) {
            self.cancel.cancel();
        }
        self.recorder.report(event);
    }
}

#[derive(Default)]
struct RecordingResults {
    persisted: Mutex<Vec<QaPair>>,
    finalized: Mutex<Vec<RunStatus>>,
}

impl RecordingResults {
    fn sorted_pairs(&self) -> Vec<QaPair> {
        let mut pairs = self.persisted.lock().unwrap().clone();
        pairs.sort_by(|a, b| a.question.cmp(&b.question));
        pairs
    }
}

impl ResultSink for RecordingResults {
    fn persist(&self, pairs: &[QaPair]) -> OutputResult<()> {
        self.persisted.lock().unwrap().extend_from_slice(pairs);
        Ok(())
    }

    fn finalize(&self, status: RunStatus) -> OutputResult<()> {
        self.finalized.lock().unwrap().push(status);
        Ok(())
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn question_page(question: &str, answer: &str) -> ResponseTemplate {
    html(&format!(
        r#"<div class="faq_qstCont_ttl">
             {}
           </div>
           <div class="faq_ansCont_txt"><p>{}</p></div>"#,
        question, answer
    ))
}

async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(hits)
        .mount(server)
        .await;
}

async fn crawl(
    server: &MockServer,
    progress: &RecordingProgress,
    results: &RecordingResults,
    cancel: &CancellationToken,
) -> RunStatus {
    let coordinator = Coordinator::new(&create_test_config()).expect("Failed to create coordinator");
    run_crawl(&coordinator, &server.uri(), progress, results, cancel).await
}

fn terminal_events(events: &[ProgressEvent]) -> usize {
    events.iter().filter(|event| event.is_terminal()).count()
}

#[tokio::test]
async fn test_categories_share_question_pages() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html(
            r#"<a href="/category/show/1">Billing</a>
               <a href="/category/show/2">Accounts</a>
               <a href="/about">About</a>"#,
        ),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/category/show/1",
        html(r#"<a href="/faq/show/10">Pay?</a><a href="/faq/show/11">Refund?</a>"#),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/category/show/2",
        html(r#"<a href="/faq/show/11">Refund?</a>"#),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/faq/show/10",
        question_page("How do I pay?", "By card."),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/faq/show/11",
        question_page("Can I get a refund?", "Within 30 days."),
        1,
    )
    .await;

    let progress = RecordingProgress::default();
    let results = RecordingResults::default();
    let status = crawl(&mock_server, &progress, &results, &CancellationToken::new()).await;

    assert_eq!(status, RunStatus::Completed);

    let events = progress.events();
    assert_eq!(events[0], ProgressEvent::Started);
    assert_eq!(events[1], ProgressEvent::CategoriesFound(2));
    assert_eq!(events[2], ProgressEvent::QuestionsFound(2));
    assert_eq!(progress.percents(), vec![50, 100]);
    assert_eq!(events.last(), Some(&ProgressEvent::Completed { pairs: 2 }));
    assert_eq!(terminal_events(&events), 1);

    assert_eq!(
        results.sorted_pairs(),
        vec![
            QaPair::new("Can I get a refund?", "Within 30 days."),
            QaPair::new("How do I pay?", "By card."),
        ]
    );
    assert_eq!(*results.finalized.lock().unwrap(), vec![RunStatus::Completed]);
}

#[tokio::test]
async fn test_questions_on_homepage_without_categories() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html(
            r#"<a href="/faq/show/1">One</a>
               <a href="/faq/show/2">Two</a>
               <a href="/faq/show/3">Three</a>
               <a href="/faq/show/3">Three again</a>"#,
        ),
        1,
    )
    .await;
    for id in 1..=3 {
        mount_page(
            &mock_server,
            &format!("/faq/show/{}", id),
            question_page(&format!("Question {}", id), &format!("Answer {}", id)),
            1,
        )
        .await;
    }

    let progress = RecordingProgress::default();
    let results = RecordingResults::default();
    let status = crawl(&mock_server, &progress, &results, &CancellationToken::new()).await;

    assert_eq!(status, RunStatus::Completed);
    assert!(!progress
        .events()
        .iter()
        .any(|event| matches!(event, ProgressEvent::CategoriesFound(_))));
    assert!(progress.events().contains(&ProgressEvent::QuestionsFound(3)));
    assert_eq!(progress.percents(), vec![33, 67, 100]);
    assert_eq!(results.sorted_pairs()[0], QaPair::new("Question 1", "Answer 1"));
}

#[tokio::test]
async fn test_question_page_without_containers_yields_empty_pair() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", html(r#"<a href="/faq/show/1">One</a>"#), 1).await;
    mount_page(&mock_server, "/faq/show/1", html("<p>Moved</p>"), 1).await;

    let progress = RecordingProgress::default();
    let results = RecordingResults::default();
    let status = crawl(&mock_server, &progress, &results, &CancellationToken::new()).await;

    assert_eq!(status, RunStatus::Completed);
    assert_eq!(results.sorted_pairs(), vec![QaPair::new("", "")]);
}

#[tokio::test]
async fn test_homepage_list_mode() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html(
            r#"<div class="faq_qstCont_ttl">Q1</div>
               <div class="faq_ansCont_txt">A1</div>
               <div class="faq_qstCont_ttl">Q2</div>
               <div class="faq_ansCont_txt">A2</div>"#,
        ),
        1,
    )
    .await;

    let progress = RecordingProgress::default();
    let results = RecordingResults::default();
    let status = crawl(&mock_server, &progress, &results, &CancellationToken::new()).await;

    assert_eq!(status, RunStatus::Completed);
    // List mode does not report per-page progress
    assert!(progress.percents().is_empty());
    assert_eq!(
        *results.persisted.lock().unwrap(),
        vec![QaPair::new("Q1", "A1"), QaPair::new("Q2", "A2")]
    );
}

#[tokio::test]
async fn test_homepage_list_mode_count_mismatch() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html(
            r#"<div class="faq_qstCont_ttl">Q1</div>
               <div class="faq_qstCont_ttl">Q2</div>
               <div class="faq_ansCont_txt">A1</div>"#,
        ),
        1,
    )
    .await;

    let progress = RecordingProgress::default();
    let results = RecordingResults::default();
    let status = crawl(&mock_server, &progress, &results, &CancellationToken::new()).await;

    assert_eq!(status, RunStatus::CountMismatch);

    let events = progress.events();
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::CountMismatch {
            questions: 2,
            answers: 1
        })
    );
    assert_eq!(terminal_events(&events), 1);
    assert!(results.persisted.lock().unwrap().is_empty());
    assert_eq!(
        *results.finalized.lock().unwrap(),
        vec![RunStatus::CountMismatch]
    );
}

#[tokio::test]
async fn test_cancel_before_categories_are_visited() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html(r#"<a href="/category/show/1">Billing</a>"#),
        1,
    )
    .await;
    mount_page(&mock_server, "/category/show/1", html(""), 0).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let progress = RecordingProgress::default();
    let results = RecordingResults::default();
    let status = crawl(&mock_server, &progress, &results, &cancel).await;

    assert_eq!(status, RunStatus::Cancelled);
    assert_eq!(progress.events().last(), Some(&ProgressEvent::Cancelled));
    assert_eq!(terminal_events(&progress.events()), 1);
    assert!(results.persisted.lock().unwrap().is_empty());
    assert_eq!(*results.finalized.lock().unwrap(), vec![RunStatus::Cancelled]);
}

#[tokio::test]
async fn test_cancel_before_questions_are_visited() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html(r#"<a href="/faq/show/1">One</a><a href="/faq/show/2">Two</a>"#),
        1,
    )
    .await;
    mount_page(&mock_server, "/faq/show/1", question_page("Q1", "A1"), 0).await;
    mount_page(&mock_server, "/faq/show/2", question_page("Q2", "A2"), 0).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let progress = RecordingProgress::default();
    let results = RecordingResults::default();
    let status = crawl(&mock_server, &progress, &results, &cancel).await;

    assert_eq!(status, RunStatus::Cancelled);
    assert_eq!(
        progress.events(),
        vec![
            ProgressEvent::Started,
            ProgressEvent::QuestionsFound(2),
            ProgressEvent::Cancelled
        ]
    );
    assert!(results.persisted.lock().unwrap().is_empty());
    assert_eq!(*results.finalized.lock().unwrap(), vec![RunStatus::Cancelled]);
}

#[tokio::test]
async fn test_cancel_during_question_loop() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html(
            r#"<a href="/faq/show/1">One</a>
               <a href="/faq/show/2">Two</a>
               <a href="/faq/show/3">Three</a>"#,
        ),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex("^/faq/show/[0-9]+$"))
        .respond_with(question_page("Question", "Answer"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cancel = CancellationToken::new();
    let progress = CancelOnFirstProgress {
        recorder: RecordingProgress::default(),
        cancel: cancel.clone(),
    };
    let results = RecordingResults::default();
    let coordinator = Coordinator::new(&create_test_config()).expect("Failed to create coordinator");
    let status = run_crawl(&coordinator, &mock_server.uri(), &progress, &results, &cancel).await;

    assert_eq!(status, RunStatus::Cancelled);

    let events = progress.recorder.events();
    assert_eq!(progress.recorder.percents(), vec![33]);
    assert_eq!(events.last(), Some(&ProgressEvent::Cancelled));
    assert_eq!(terminal_events(&events), 1);
    assert!(results.persisted.lock().unwrap().is_empty());
    assert_eq!(*results.finalized.lock().unwrap(), vec![RunStatus::Cancelled]);
}

#[tokio::test]
async fn test_shift_jis_homepage_declared_in_meta() {
    let mock_server = MockServer::start().await;

    let page = r#"<html><head><meta charset="Shift_JIS"></head><body>
        <div class="faq_qstCont_ttl">質問</div>
        <div class="faq_ansCont_txt">回答</div>
        </body></html>"#;
    let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(page);
    mount_page(
        &mock_server,
        "/",
        ResponseTemplate::new(200).set_body_raw(bytes.into_owned(), "text/html"),
        1,
    )
    .await;

    let progress = RecordingProgress::default();
    let results = RecordingResults::default();
    let status = crawl(&mock_server, &progress, &results, &CancellationToken::new()).await;

    assert_eq!(status, RunStatus::Completed);
    assert_eq!(
        *results.persisted.lock().unwrap(),
        vec![QaPair::new("質問", "回答")]
    );
}

#[tokio::test]
async fn test_homepage_failure_is_fatal() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", ResponseTemplate::new(500), 3).await;

    let progress = RecordingProgress::default();
    let results = RecordingResults::default();
    let status = crawl(&mock_server, &progress, &results, &CancellationToken::new()).await;

    assert_eq!(status, RunStatus::Failed);

    let events = progress.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[1], ProgressEvent::Failed(message) if message.contains("3 attempt")));
    assert!(results.persisted.lock().unwrap().is_empty());
    assert_eq!(*results.finalized.lock().unwrap(), vec![RunStatus::Failed]);
}

#[tokio::test]
async fn test_category_failure_aborts_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html(r#"<a href="/category/show/1">Billing</a>"#),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/category/show/1",
        ResponseTemplate::new(502),
        3,
    )
    .await;

    let progress = RecordingProgress::default();
    let results = RecordingResults::default();
    let status = crawl(&mock_server, &progress, &results, &CancellationToken::new()).await;

    assert_eq!(status, RunStatus::Failed);
    assert!(matches!(
        progress.events().last(),
        Some(ProgressEvent::Failed(_))
    ));
    assert!(!progress
        .events()
        .iter()
        .any(|event| matches!(event, ProgressEvent::QuestionsFound(_))));
}

#[tokio::test]
async fn test_spawned_crawl_stores_run() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", html(r#"<a href="/faq/show/7">Seven</a>"#), 1).await;
    mount_page(
        &mock_server,
        "/faq/show/7",
        question_page("Where is my order?", "On its way."),
        1,
    )
    .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("faq.db");

    let mut storage = SqliteStorage::new(&db_path).expect("Failed to open DB");
    let run_id = storage
        .create_run(&mock_server.uri(), "test")
        .expect("Failed to create run");
    let storage: Arc<Mutex<dyn Storage>> = Arc::new(Mutex::new(storage));

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = spawn_crawl(
        Arc::new(Coordinator::new(&create_test_config()).expect("Failed to create coordinator")),
        mock_server.uri(),
        Arc::new(tx),
        Arc::new(SqliteResultSink::new(Arc::clone(&storage), run_id)),
        CancellationToken::new(),
    );

    assert_eq!(handle.wait().await, RunStatus::Completed);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert_eq!(events.first(), Some(&ProgressEvent::Started));
    assert_eq!(events.last(), Some(&ProgressEvent::Completed { pairs: 1 }));

    let storage = storage.lock().unwrap();
    let run = storage.get_run(run_id).expect("Failed to load run");
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.finished_at.is_some());
    assert_eq!(
        storage.load_pairs(run_id).expect("Failed to load pairs"),
        vec![QaPair::new("Where is my order?", "On its way.")]
    );
}
