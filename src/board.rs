//! The job board controller.
//!
//! [`JobBoard`] owns two query managers: one for the list of job ids and one
//! for batches of job details. It subscribes once to each; listeners push a
//! snapshot of the new state onto a channel and the board reacts to those
//! events in order: rendering, reporting errors, or loading the next batch
//! once the id list arrives.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::hn::{HnClient, Job};
use crate::query::{QueryManager, QueryState, Subscription};

pub const DEFAULT_BATCH_SIZE: usize = 6;

/// Which of the two resources an indicator refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    JobIds,
    JobDetails,
}

/// Output surface of the board.
pub trait BoardView {
    /// A query for `resource` started (`true`) or settled (`false`).
    fn set_loading(&mut self, resource: Resource, loading: bool);
    /// Append a freshly loaded batch.
    fn render_jobs(&mut self, jobs: &[Job]);
    fn show_error(&mut self, message: &str);
    /// Whether another batch can be requested.
    fn set_load_more(&mut self, enabled: bool);
}

#[derive(Debug)]
enum BoardEvent {
    JobIds(QueryState<Vec<u64>>),
    JobDetails(QueryState<Vec<Job>>),
}

pub struct JobBoard<V: BoardView> {
    job_ids: QueryManager<Vec<u64>>,
    job_details: QueryManager<Vec<Job>, Vec<u64>>,
    events: mpsc::UnboundedReceiver<BoardEvent>,
    subscriptions: Vec<Subscription>,
    view: V,
    batch_size: usize,
    current_index: usize,
    load_more: bool,
}

impl<V: BoardView> JobBoard<V> {
    pub fn new(client: HnClient, batch_size: usize, view: V) -> Self {
        let ids_client = client.clone();
        let job_ids = QueryManager::new(move |()| {
            let client = ids_client.clone();
            async move { client.fetch_job_ids().await }
        })
        .with_name("job_ids");

        let job_details = QueryManager::new(move |ids: Vec<u64>| {
            let client = client.clone();
            async move { client.fetch_jobs(&ids).await }
        })
        .with_name("job_details");

        let (tx, events) = mpsc::unbounded_channel();

        let ids_tx = tx.clone();
        let ids_reader = job_ids.reader();
        let details_reader = job_details.reader();
        let subscriptions = vec![
            job_ids.subscribe(move || {
                if let Some(state) = ids_reader.snapshot() {
                    let _ = ids_tx.send(BoardEvent::JobIds(state));
                }
            }),
            job_details.subscribe(move || {
                if let Some(state) = details_reader.snapshot() {
                    let _ = tx.send(BoardEvent::JobDetails(state));
                }
            }),
        ];

        Self {
            job_ids,
            job_details,
            events,
            subscriptions,
            view,
            batch_size: batch_size.max(1),
            current_index: 0,
            load_more: false,
        }
    }

    /// Fetch the id list; on success the first batch of details follows.
    pub async fn start(&mut self) {
        self.job_ids.fetch(()).await;
        self.process_events().await;
    }

    /// Request the next batch and react to its outcome.
    ///
    /// Returns `false` when there was nothing left to load.
    pub async fn next_page(&mut self) -> bool {
        let requested = self.load_more().await;
        self.process_events().await;
        requested
    }

    /// Whether the last batch left more ids to load.
    pub fn has_more(&self) -> bool {
        self.load_more
    }

    /// Index of the first id not yet requested.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn job_ids(&self) -> &QueryManager<Vec<u64>> {
        &self.job_ids
    }

    pub fn job_details(&self) -> &QueryManager<Vec<Job>, Vec<u64>> {
        &self.job_details
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    async fn process_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                BoardEvent::JobIds(state) => self.handle_job_ids_update(state).await,
                BoardEvent::JobDetails(state) => self.handle_job_details_update(state),
            }
        }
    }

    async fn handle_job_ids_update(&mut self, state: QueryState<Vec<u64>>) {
        self.view.set_loading(Resource::JobIds, state.is_loading);
        if state.is_loading {
            return;
        }

        if let Some(err) = &state.error {
            warn!(error = %err, "job id fetch failed");
            self.view.show_error("Failed to fetch job IDs");
        } else if state.is_success() {
            self.load_more().await;
        }
    }

    fn handle_job_details_update(&mut self, state: QueryState<Vec<Job>>) {
        self.view.set_loading(Resource::JobDetails, state.is_loading);
        // The previous batch is still in `data` while loading; it was already rendered.
        if state.is_loading {
            return;
        }

        if let Some(err) = &state.error {
            warn!(error = %err, "job details fetch failed");
            self.view.show_error("Failed to fetch job details");
        } else if let Some(jobs) = &state.data {
            self.view.render_jobs(jobs);
        }
    }

    async fn load_more(&mut self) -> bool {
        let Some(ids) = self.job_ids.state().data else {
            return false;
        };

        let start = self.current_index.min(ids.len());
        let end = (self.current_index + self.batch_size).min(ids.len());
        let next_batch = ids[start..end].to_vec();
        if next_batch.is_empty() {
            self.set_load_more(false);
            return false;
        }

        debug!(from = start, count = next_batch.len(), "loading job batch");
        self.job_details.fetch(next_batch).await;
        // The cursor advances even when the batch failed.
        self.current_index += self.batch_size;
        self.set_load_more(self.current_index < ids.len());
        true
    }

    fn set_load_more(&mut self, enabled: bool) {
        self.load_more = enabled;
        self.view.set_load_more(enabled);
    }
}

impl<V: BoardView> Drop for JobBoard<V> {
    fn drop(&mut self) {
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Loading(Resource, bool),
        Render(Vec<u64>),
        Error(String),
        LoadMore(bool),
    }

    #[derive(Default)]
    struct RecordingView {
        calls: Vec<Call>,
    }

    impl RecordingView {
        fn renders(&self) -> Vec<Vec<u64>> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Render(ids) => Some(ids.clone()),
                    _ => None,
                })
                .collect()
        }

        fn errors(&self) -> Vec<String> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Error(msg) => Some(msg.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl BoardView for RecordingView {
        fn set_loading(&mut self, resource: Resource, loading: bool) {
            self.calls.push(Call::Loading(resource, loading));
        }

        fn render_jobs(&mut self, jobs: &[Job]) {
            self.calls.push(Call::Render(jobs.iter().map(|j| j.id).collect()));
        }

        fn show_error(&mut self, message: &str) {
            self.calls.push(Call::Error(message.to_string()));
        }

        fn set_load_more(&mut self, enabled: bool) {
            self.calls.push(Call::LoadMore(enabled));
        }
    }

    async fn mount_ids(server: &MockServer, ids: &[u64]) {
        Mock::given(method("GET"))
            .and(path("/jobstories.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ids))
            .mount(server)
            .await;
    }

    async fn mount_jobs(server: &MockServer, ids: &[u64]) {
        for &id in ids {
            Mock::given(method("GET"))
                .and(path(format!("/item/{id}.json")))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "by": "poster",
                    "id": id,
                    "score": 1,
                    "time": 1_700_000_000,
                    "title": format!("Job {id}"),
                    "type": "job"
                })))
                .mount(server)
                .await;
        }
    }

    fn board(server: &MockServer, batch_size: usize) -> JobBoard<RecordingView> {
        JobBoard::new(
            HnClient::with_base_url(server.uri()),
            batch_size,
            RecordingView::default(),
        )
    }

    #[tokio::test]
    async fn start_renders_first_batch() {
        let server = MockServer::start().await;
        let ids: Vec<u64> = (1..=8).collect();
        mount_ids(&server, &ids).await;
        mount_jobs(&server, &ids).await;

        let mut board = board(&server, 3);
        board.start().await;

        assert_eq!(board.view().renders(), vec![vec![1, 2, 3]]);
        assert!(board.view().errors().is_empty());
        assert!(board.has_more());
        assert_eq!(board.current_index(), 3);
    }

    #[tokio::test]
    async fn loading_indicators_bracket_each_query() {
        let server = MockServer::start().await;
        mount_ids(&server, &[1]).await;
        mount_jobs(&server, &[1]).await;

        let mut board = board(&server, 6);
        board.start().await;

        let loading: Vec<Call> = board
            .view()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Loading(..)))
            .cloned()
            .collect();
        assert_eq!(
            loading,
            vec![
                Call::Loading(Resource::JobIds, true),
                Call::Loading(Resource::JobIds, false),
                Call::Loading(Resource::JobDetails, true),
                Call::Loading(Resource::JobDetails, false),
            ]
        );
    }

    #[tokio::test]
    async fn paging_until_exhausted() {
        let server = MockServer::start().await;
        let ids: Vec<u64> = (1..=8).collect();
        mount_ids(&server, &ids).await;
        mount_jobs(&server, &ids).await;

        let mut board = board(&server, 3);
        board.start().await;
        assert!(board.next_page().await);
        assert!(board.next_page().await);
        assert!(!board.has_more());

        assert!(!board.next_page().await);
        assert_eq!(
            board.view().renders(),
            vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8]]
        );
        assert_eq!(board.view().calls.last(), Some(&Call::LoadMore(false)));
    }

    #[tokio::test]
    async fn previous_batch_is_not_rendered_twice() {
        let server = MockServer::start().await;
        let ids: Vec<u64> = (1..=4).collect();
        mount_ids(&server, &ids).await;
        mount_jobs(&server, &ids).await;

        let mut board = board(&server, 2);
        board.start().await;
        board.next_page().await;

        assert_eq!(board.view().renders(), vec![vec![1, 2], vec![3, 4]]);
    }

    #[tokio::test]
    async fn job_ids_failure_shows_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobstories.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut board = board(&server, 6);
        board.start().await;

        assert_eq!(board.view().errors(), vec!["Failed to fetch job IDs"]);
        assert!(board.view().renders().is_empty());
        assert!(board.job_ids().state().error.is_some());
        assert!(!board.has_more());
        assert!(!board.next_page().await);
    }

    #[tokio::test]
    async fn job_details_failure_shows_error() {
        let server = MockServer::start().await;
        mount_ids(&server, &[1, 2]).await;
        mount_jobs(&server, &[1]).await;
        Mock::given(method("GET"))
            .and(path("/item/2.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut board = board(&server, 6);
        board.start().await;

        assert_eq!(board.view().errors(), vec!["Failed to fetch job details"]);
        assert!(board.view().renders().is_empty());
        assert_eq!(board.job_details().state().data, None);
        assert_eq!(board.current_index(), 6);
    }

    #[tokio::test]
    async fn empty_id_list_disables_load_more() {
        let server = MockServer::start().await;
        mount_ids(&server, &[]).await;

        let mut board = board(&server, 6);
        board.start().await;

        assert!(board.view().renders().is_empty());
        assert_eq!(board.view().calls.last(), Some(&Call::LoadMore(false)));
    }

    #[tokio::test]
    async fn next_page_before_start_does_nothing() {
        let server = MockServer::start().await;
        let mut board = board(&server, 6);
        assert!(!board.next_page().await);
        assert!(board.view().calls.is_empty());
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let board = JobBoard::new(HnClient::new(), 0, RecordingView::default());
        assert_eq!(board.batch_size(), 1);
    }

    #[test]
    fn drop_unsubscribes_listeners() {
        let board = JobBoard::new(HnClient::new(), DEFAULT_BATCH_SIZE, RecordingView::default());
        let ids = board.job_ids().clone();
        let details = board.job_details().clone();
        assert_eq!(ids.subscriber_count(), 1);
        assert_eq!(details.subscriber_count(), 1);

        drop(board);
        assert_eq!(ids.subscriber_count(), 0);
        assert_eq!(details.subscriber_count(), 0);
    }
}
