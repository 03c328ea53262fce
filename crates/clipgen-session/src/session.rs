//! Session state machine.
//!
//! Phases: `UPLOAD` → `PROCESSING` → `RESULT`, with a rollback to `UPLOAD`
//! when the strategy request fails and an explicit [`Session::reset`] from
//! any phase.
//!
//! Every processing run is tagged with the session generation current at
//! start. `reset` bumps the generation and aborts the run; any outcome that
//! still arrives for an older generation is discarded. The progress ticker
//! belongs to the run and is aborted on every way out of it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use clipgen_gemini::{StrategyClient, StrategyError};
use clipgen_media::{DurationProbe, MediaHandle, PreviewHandle};
use clipgen_models::{
    AggregateRequest, AssetId, AssetSummary, ProcessingResult, ProcessingStep, SessionEvent,
    SessionPhase,
};
use serde::Serialize;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::logging::SessionLogger;
use crate::metrics;
use crate::progress::next_progress;
use crate::registry::{AssetRegistry, VideoAsset};

/// The single notice shown for every failed strategy request.
pub const FAILURE_NOTICE: &str =
    "AI analysis failed. Check your API key or network connection and try again.";

/// Result of [`Session::start_processing`].
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    /// A strategy request was issued for this aggregate.
    Started { aggregate: AggregateRequest },
    /// Nothing happened.
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoAssets,
    /// Start is only accepted in `UPLOAD`.
    WrongPhase(SessionPhase),
}

/// Point-in-time copy of the session state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: SessionPhase,
    pub assets: Vec<AssetSummary>,
    pub progress: u8,
    pub result: Option<ProcessingResult>,
}

struct SessionState {
    phase: SessionPhase,
    registry: AssetRegistry,
    result: Option<ProcessingResult>,
    progress: u8,
    generation: u64,
    processing: Option<JoinHandle<()>>,
    probes: HashMap<AssetId, JoinHandle<()>>,
}

struct Inner {
    id: String,
    config: SessionConfig,
    client: Arc<dyn StrategyClient>,
    probe: Arc<dyn DurationProbe>,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
    phase_tx: watch::Sender<SessionPhase>,
    pending_probes: watch::Sender<usize>,
}

/// One user session.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Create an empty session in `UPLOAD`.
    ///
    /// # Arguments
    /// * `config` - Timing and defaults
    /// * `client` - Strategy service used by [`Session::start_processing`]
    /// * `probe` - Duration probe run once per added asset
    pub fn new(
        config: SessionConfig,
        client: Arc<dyn StrategyClient>,
        probe: Arc<dyn DurationProbe>,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let (phase_tx, _) = watch::channel(SessionPhase::Upload);
        let (pending_probes, _) = watch::channel(0usize);

        let id = Uuid::new_v4().to_string();
        debug!(session_id = %id, "Session opened");

        Self {
            inner: Arc::new(Inner {
                id,
                config,
                client,
                probe,
                state: Mutex::new(SessionState {
                    phase: SessionPhase::Upload,
                    registry: AssetRegistry::new(),
                    result: None,
                    progress: 0,
                    generation: 0,
                    processing: None,
                    probes: HashMap::new(),
                }),
                events,
                phase_tx,
                pending_probes,
            }),
        }
    }

    /// Unique id of this session, carried on every log line.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Configuration the session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Receive every event published from now on.
    ///
    /// A lagging receiver loses events; [`Session::snapshot`] recovers the
    /// full state.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Current phase.
    pub async fn phase(&self) -> SessionPhase {
        self.inner.state.lock().await.phase
    }

    /// Current progress, 0-100.
    pub async fn progress(&self) -> u8 {
        self.inner.state.lock().await.progress
    }

    /// Copy of phase, assets, progress and result.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.lock().await;
        SessionSnapshot {
            session_id: self.inner.id.clone(),
            phase: state.phase,
            assets: state.registry.summaries(),
            progress: state.progress,
            result: state.result.clone(),
        }
    }

    /// Open and register videos, starting one metadata probe per asset.
    ///
    /// Either every path is added or none is.
    pub async fn add_assets<I, P>(&self, paths: I) -> SessionResult<Vec<AssetId>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut handles = Vec::new();
        for path in paths {
            handles.push(MediaHandle::open(path).await?);
        }

        let mut state = self.inner.state.lock().await;
        if state.phase != SessionPhase::Upload {
            return Err(SessionError::invalid_phase(SessionPhase::Upload, state.phase));
        }

        state.probes.retain(|_, task| !task.is_finished());

        let mut ids = Vec::with_capacity(handles.len());
        for handle in handles {
            let asset = VideoAsset::new(handle, self.inner.config.default_duration);
            let preview = asset.preview().clone();
            let id = state.registry.add(asset)?;

            let task = self.inner.spawn_probe(id.clone(), preview);
            state.probes.insert(id.clone(), task);
            ids.push(id);
        }

        info!(
            session_id = %self.inner.id,
            added = ids.len(),
            total = state.registry.len(),
            total_duration = state.registry.total_duration(),
            "Assets added"
        );
        self.inner.emit(SessionEvent::AssetsChanged {
            count: state.registry.len(),
        });
        Ok(ids)
    }

    /// Remove one asset, revoking its preview and cancelling its probe.
    pub async fn remove_asset(&self, id: &AssetId) -> SessionResult<()> {
        let mut state = self.inner.state.lock().await;
        if state.phase != SessionPhase::Upload {
            return Err(SessionError::invalid_phase(SessionPhase::Upload, state.phase));
        }

        let asset = state
            .registry
            .remove(id)
            .ok_or_else(|| SessionError::AssetNotFound(id.clone()))?;
        drop(asset);

        if let Some(task) = state.probes.remove(id) {
            task.abort();
        }

        debug!(session_id = %self.inner.id, asset_id = %id, "Asset removed");
        self.inner.emit(SessionEvent::AssetsChanged {
            count: state.registry.len(),
        });
        Ok(())
    }

    /// Wait until every outstanding metadata probe has settled.
    pub async fn settle_probes(&self) {
        let mut rx = self.inner.pending_probes.subscribe();
        let _ = rx.wait_for(|pending| *pending == 0).await;
    }

    /// Start the strategy request.
    ///
    /// Only accepted in `UPLOAD` with at least one asset; otherwise nothing
    /// happens and no request is issued. Durations are taken as they stand:
    /// assets whose probe has not resolved contribute the default duration.
    pub async fn start_processing(&self, user_prompt: Option<String>) -> StartOutcome {
        let mut state = self.inner.state.lock().await;

        if state.phase != SessionPhase::Upload {
            debug!(session_id = %self.inner.id, phase = %state.phase, "Start ignored");
            return StartOutcome::Ignored(IgnoreReason::WrongPhase(state.phase));
        }
        let Some(aggregate) = state.registry.aggregate() else {
            debug!(session_id = %self.inner.id, "Start ignored: no assets");
            return StartOutcome::Ignored(IgnoreReason::NoAssets);
        };

        state.generation += 1;
        let generation = state.generation;
        state.result = None;
        state.progress = self.inner.config.progress_start;
        self.inner.set_phase(&mut state, SessionPhase::Processing);
        self.inner.emit(SessionEvent::progress(state.progress));

        let inner = Arc::clone(&self.inner);
        let request = aggregate.clone();
        let span = SessionLogger::new(&self.inner.id, "strategy_request")
            .for_run(generation)
            .span();
        state.processing = Some(tokio::spawn(
            inner
                .run_processing(generation, request, user_prompt)
                .instrument(span),
        ));

        StartOutcome::Started { aggregate }
    }

    /// Wait until the session is no longer `PROCESSING` and return the phase.
    pub async fn wait_for_outcome(&self) -> SessionPhase {
        let mut rx = self.inner.phase_tx.subscribe();
        let phase = match rx.wait_for(|phase| *phase != SessionPhase::Processing).await {
            Ok(phase) => *phase,
            Err(_) => SessionPhase::Upload,
        };
        phase
    }

    /// Return to a fresh `UPLOAD` state from any phase.
    ///
    /// Cancels the in-flight request and its ticker, cancels probes, and
    /// releases every asset.
    pub async fn reset(&self) {
        let mut state = self.inner.state.lock().await;

        state.generation += 1;
        if let Some(task) = state.processing.take() {
            task.abort();
        }
        for (_, task) in state.probes.drain() {
            task.abort();
        }
        state.registry.clear();
        state.result = None;
        state.progress = 0;

        info!(session_id = %self.inner.id, "Session reset");
        self.inner.emit(SessionEvent::AssetsChanged { count: 0 });
        self.inner.emit(SessionEvent::progress(0));
        self.inner.set_phase(&mut state, SessionPhase::Upload);
    }
}

impl Inner {
    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn set_phase(&self, state: &mut SessionState, phase: SessionPhase) {
        let previous = state.phase;
        state.phase = phase;
        self.phase_tx.send_replace(phase);
        if previous != phase {
            debug!(session_id = %self.id, from = %previous, to = %phase, "Phase changed");
        }
        self.emit(SessionEvent::phase(phase));
    }

    fn spawn_probe(self: &Arc<Self>, id: AssetId, preview: PreviewHandle) -> JoinHandle<()> {
        self.pending_probes.send_modify(|n| *n += 1);

        // Owned by the future, so it is released even if the task is aborted
        // before its first poll.
        let pending = scopeguard::guard(Arc::clone(self), |inner| {
            inner
                .pending_probes
                .send_modify(|n| *n = n.saturating_sub(1));
        });

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let _pending = pending;

            match inner.probe.probe_duration(&preview).await {
                Ok(duration) => inner.apply_probe(&id, duration).await,
                Err(e) if e.is_cancelled() => {
                    debug!(session_id = %inner.id, asset_id = %id, "Probe cancelled");
                }
                Err(e) => {
                    metrics::record_probe_failure();
                    warn!(
                        session_id = %inner.id,
                        asset_id = %id,
                        "Metadata probe failed, keeping default duration: {}", e
                    );
                }
            }
        })
    }

    async fn apply_probe(&self, id: &AssetId, duration: f64) {
        let mut state = self.state.lock().await;
        if state.registry.patch_duration(id, duration) {
            debug!(session_id = %self.id, asset_id = %id, duration, "Duration probed");
            self.emit(SessionEvent::AssetProbed {
                asset_id: id.clone(),
                duration,
            });
        } else {
            debug!(session_id = %self.id, asset_id = %id, "Probe result dropped");
        }
    }

    async fn run_processing(
        self: Arc<Self>,
        generation: u64,
        aggregate: AggregateRequest,
        user_prompt: Option<String>,
    ) {
        let logger = SessionLogger::new(&self.id, "strategy_request").for_run(generation);
        logger.log_start(&format!(
            "{} ({:.1}s total)",
            aggregate.name, aggregate.total_duration
        ));

        let ticker = tokio::spawn(Arc::clone(&self).run_ticker(generation, logger.clone()));
        let ticker = scopeguard::guard(ticker, |ticker| ticker.abort());

        let started = Instant::now();
        let outcome = self
            .client
            .request_strategy(&aggregate, user_prompt.as_deref())
            .await;
        metrics::record_strategy_request(
            outcome.as_ref().err().map(StrategyError::kind),
            started.elapsed().as_secs_f64(),
        );

        // The ticker stops before the outcome is applied.
        drop(ticker);

        match outcome {
            Ok(result) => self.complete(generation, result, &logger).await,
            Err(e) => self.fail(generation, e, &logger).await,
        }
    }

    async fn run_ticker(self: Arc<Self>, generation: u64, logger: SessionLogger) {
        let tick = self.config.progress_tick;
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let mut state = self.state.lock().await;
            if state.generation != generation || state.phase != SessionPhase::Processing {
                break;
            }
            let next = next_progress(
                state.progress,
                self.config.progress_step,
                self.config.progress_cap,
            );
            if next != state.progress {
                for step in ProcessingStep::ALL {
                    if step.is_reached(next) && !step.is_reached(state.progress) {
                        logger.log_progress(step, next);
                    }
                }
                state.progress = next;
                self.emit(SessionEvent::progress(next));
            }
        }
    }

    fn is_current(&self, state: &SessionState, generation: u64) -> bool {
        state.generation == generation && state.phase == SessionPhase::Processing
    }

    async fn complete(&self, generation: u64, result: ProcessingResult, logger: &SessionLogger) {
        {
            let mut state = self.state.lock().await;
            if !self.is_current(&state, generation) {
                logger.log_warning("discarding strategy for a superseded run");
                return;
            }
            state.progress = 100;
            state.result = Some(result);
            self.emit(SessionEvent::progress(100));
            self.emit(SessionEvent::ResultReady);
        }

        // Let 100% render before switching views.
        tokio::time::sleep(self.config.completion_delay).await;

        let mut state = self.state.lock().await;
        if !self.is_current(&state, generation) {
            return;
        }
        state.processing = None;
        self.set_phase(&mut state, SessionPhase::Result);
        logger.log_completion("strategy ready");
    }

    async fn fail(&self, generation: u64, error: StrategyError, logger: &SessionLogger) {
        let mut state = self.state.lock().await;
        if !self.is_current(&state, generation) {
            logger.log_warning(&format!("discarding failure for a superseded run: {}", error));
            return;
        }

        let kind = error.kind();
        logger.log_error(kind, &error.to_string());

        state.processing = None;
        state.progress = 0;
        self.emit(SessionEvent::failure(FAILURE_NOTICE, kind));
        self.emit(SessionEvent::progress(0));
        self.set_phase(&mut state, SessionPhase::Upload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clipgen_gemini::StrategyResult;
    use clipgen_media::{MediaError, MediaResult};
    use clipgen_models::{
        FailureKind, HighlightSegment, PlatformMetadata, Strategy, TiktokMetadata,
        YoutubeMetadata,
    };
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tempfile::TempDir;

    // =========================================================================
    // Fakes
    // =========================================================================

    /// Resolves durations by file name after a fixed delay.
    struct FakeProbe {
        durations: HashMap<String, f64>,
        delay: Duration,
    }

    impl FakeProbe {
        fn new(durations: &[(&str, f64)], delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                durations: durations
                    .iter()
                    .map(|(name, d)| (name.to_string(), *d))
                    .collect(),
                delay,
            })
        }
    }

    #[async_trait]
    impl DurationProbe for FakeProbe {
        async fn probe_duration(&self, preview: &PreviewHandle) -> MediaResult<f64> {
            tokio::time::sleep(self.delay).await;
            let path = preview.path()?;
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            self.durations
                .get(&name)
                .copied()
                .ok_or_else(|| MediaError::InvalidVideo(name))
        }
    }

    enum Reply {
        Ok,
        Err(fn() -> StrategyError),
    }

    struct FakeStrategy {
        reply: Reply,
        delay: Duration,
        calls: StdMutex<Vec<AggregateRequest>>,
    }

    impl FakeStrategy {
        fn ok(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: Reply::Ok,
                delay,
                calls: StdMutex::new(Vec::new()),
            })
        }

        fn failing(delay: Duration, error: fn() -> StrategyError) -> Arc<Self> {
            Arc::new(Self {
                reply: Reply::Err(error),
                delay,
                calls: StdMutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<AggregateRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn strategy() -> Strategy {
        Strategy {
            title: "Title".to_string(),
            description: "Description".to_string(),
            hashtags: vec!["#a".to_string()],
            viral_score: 80.0,
            platforms: PlatformMetadata {
                youtube: YoutubeMetadata {
                    title: "YT".to_string(),
                    tags: vec![],
                },
                tiktok: TiktokMetadata {
                    caption: "TT".to_string(),
                    tags: vec![],
                },
            },
            highlight_segments: vec![HighlightSegment {
                start: 0.0,
                end: 10.0,
                description: "Hook".to_string(),
            }],
        }
    }

    #[async_trait]
    impl StrategyClient for FakeStrategy {
        async fn request_strategy(
            &self,
            aggregate: &AggregateRequest,
            _user_prompt: Option<&str>,
        ) -> StrategyResult<ProcessingResult> {
            self.calls.lock().unwrap().push(aggregate.clone());
            tokio::time::sleep(self.delay).await;
            match &self.reply {
                Reply::Ok => Ok(ProcessingResult::new(strategy(), aggregate.total_duration)),
                Reply::Err(make) => Err(make()),
            }
        }
    }

    fn files(names: &[&str]) -> (TempDir, Vec<std::path::PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let paths = names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                std::fs::write(&path, vec![0u8; 256]).unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    fn session(client: Arc<FakeStrategy>, probe: Arc<FakeProbe>) -> Session {
        Session::new(SessionConfig::default(), client, probe)
    }

    fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    // =========================================================================
    // Start guard
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_start_without_assets_is_noop() {
        let client = FakeStrategy::ok(Duration::from_secs(1));
        let session = session(client.clone(), FakeProbe::new(&[], Duration::ZERO));

        let outcome = session.start_processing(None).await;
        assert_eq!(outcome, StartOutcome::Ignored(IgnoreReason::NoAssets));
        assert_eq!(session.phase().await, SessionPhase::Upload);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(client.calls().is_empty());
        assert_eq!(session.progress().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_while_processing_is_noop() {
        let (_dir, paths) = files(&["a.mp4"]);
        let client = FakeStrategy::ok(Duration::from_secs(10));
        let session = session(client.clone(), FakeProbe::new(&[], Duration::from_secs(60)));
        session.add_assets(&paths).await.unwrap();

        assert!(matches!(
            session.start_processing(None).await,
            StartOutcome::Started { .. }
        ));
        assert_eq!(
            session.start_processing(None).await,
            StartOutcome::Ignored(IgnoreReason::WrongPhase(SessionPhase::Processing))
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(client.calls().len(), 1);
    }

    // =========================================================================
    // Progress
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_progress_ticks_and_caps() {
        let (_dir, paths) = files(&["a.mp4"]);
        let client = FakeStrategy::ok(Duration::from_secs(60));
        let session = session(client, FakeProbe::new(&[], Duration::from_secs(120)));
        session.add_assets(&paths).await.unwrap();

        session.start_processing(None).await;
        assert_eq!(session.phase().await, SessionPhase::Processing);
        assert_eq!(session.progress().await, 10);

        tokio::time::sleep(Duration::from_millis(810)).await;
        assert_eq!(session.progress().await, 15);

        tokio::time::sleep(Duration::from_millis(800)).await;
        assert_eq!(session.progress().await, 20);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(session.progress().await, 90);
        assert_eq!(session.phase().await, SessionPhase::Processing);
    }

    // =========================================================================
    // Success
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_success_passes_through_processing() {
        let (_dir, paths) = files(&["a.mp4"]);
        let client = FakeStrategy::ok(Duration::from_secs(2));
        let session = session(client, FakeProbe::new(&[], Duration::from_secs(60)));
        session.add_assets(&paths).await.unwrap();
        let mut rx = session.subscribe();

        session.start_processing(None).await;

        // Result stored and 100% shown, view not switched yet.
        tokio::time::sleep(Duration::from_millis(2100)).await;
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Processing);
        assert_eq!(snapshot.progress, 100);
        assert!(snapshot.result.is_some());

        assert_eq!(session.wait_for_outcome().await, SessionPhase::Result);

        let phases: Vec<SessionPhase> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::PhaseChanged { phase } => Some(phase),
                _ => None,
            })
            .collect();
        assert_eq!(phases, vec![SessionPhase::Processing, SessionPhase::Result]);

        // Ticker is gone: progress stays at 100.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(session.progress().await, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_totals_use_probed_durations() {
        let (_dir, paths) = files(&["long.mp4", "short.mp4"]);
        let client = FakeStrategy::ok(Duration::from_millis(100));
        let probe = FakeProbe::new(
            &[("long.mp4", 180.0), ("short.mp4", 60.0)],
            Duration::from_millis(50),
        );
        let session = session(client.clone(), probe);
        session.add_assets(&paths).await.unwrap();

        session.settle_probes().await;
        let outcome = session.start_processing(None).await;
        let StartOutcome::Started { aggregate } = outcome else {
            panic!("expected start");
        };
        assert_eq!(aggregate.total_duration, 240.0);
        assert_eq!(aggregate.name, "long.mp4");

        assert_eq!(session.wait_for_outcome().await, SessionPhase::Result);
        let result = session.snapshot().await.result.unwrap();
        assert_eq!(result.original_duration, 240.0);
        assert_eq!(result.target_duration, 60.0);
        assert_eq!(client.calls()[0].total_duration, 240.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolved_probe_uses_default() {
        let (_dir, paths) = files(&["a.mp4"]);
        let client = FakeStrategy::ok(Duration::from_millis(100));
        let probe = FakeProbe::new(&[("a.mp4", 333.0)], Duration::from_secs(10));
        let session = session(client, probe);
        session.add_assets(&paths).await.unwrap();

        let StartOutcome::Started { aggregate } = session.start_processing(None).await else {
            panic!("expected start");
        };
        assert_eq!(aggregate.total_duration, 120.0);

        session.wait_for_outcome().await;
        let result = session.snapshot().await.result.unwrap();
        assert_eq!(result.target_duration, 30.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_probe_keeps_default() {
        let (_dir, paths) = files(&["unknown.mp4"]);
        let session = session(
            FakeStrategy::ok(Duration::ZERO),
            FakeProbe::new(&[], Duration::from_millis(10)),
        );
        session.add_assets(&paths).await.unwrap();
        session.settle_probes().await;

        let asset = &session.snapshot().await.assets[0];
        assert_eq!(asset.duration, 120.0);
        assert!(!asset.probed);
    }

    // =========================================================================
    // Failure
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_contract_failure_rolls_back() {
        let (_dir, paths) = files(&["a.mp4"]);
        let client = FakeStrategy::failing(Duration::from_secs(3), || {
            StrategyError::contract("missing required field `viralScore`")
        });
        let session = session(client, FakeProbe::new(&[], Duration::from_secs(60)));
        session.add_assets(&paths).await.unwrap();
        let mut rx = session.subscribe();

        session.start_processing(None).await;
        assert_eq!(session.wait_for_outcome().await, SessionPhase::Upload);

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.progress, 0);
        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.assets.len(), 1);

        let failure = drain(&mut rx).into_iter().find_map(|e| match e {
            SessionEvent::Failure { message, kind, .. } => Some((message, kind)),
            _ => None,
        });
        assert_eq!(
            failure,
            Some((FAILURE_NOTICE.to_string(), FailureKind::Contract))
        );

        // Ticker cancelled: progress does not creep back up.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(session.progress().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_failure_same_notice() {
        let (_dir, paths) = files(&["a.mp4"]);
        let client = FakeStrategy::failing(Duration::from_millis(200), || {
            StrategyError::from_http_status(401, "bad key")
        });
        let session = session(client, FakeProbe::new(&[], Duration::from_secs(60)));
        session.add_assets(&paths).await.unwrap();
        let mut rx = session.subscribe();

        session.start_processing(None).await;
        session.wait_for_outcome().await;

        let failure = drain(&mut rx).into_iter().find_map(|e| match e {
            SessionEvent::Failure { message, kind, .. } => Some((message, kind)),
            _ => None,
        });
        assert_eq!(failure, Some((FAILURE_NOTICE.to_string(), FailureKind::Auth)));

        // Retry is allowed after rollback.
        assert!(matches!(
            session.start_processing(None).await,
            StartOutcome::Started { .. }
        ));
    }

    // =========================================================================
    // Removal and reset
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_remove_asset_is_not_resurrected() {
        let (_dir, paths) = files(&["a.mp4", "b.mp4"]);
        let probe = FakeProbe::new(&[("a.mp4", 10.0), ("b.mp4", 20.0)], Duration::from_secs(1));
        let session = session(FakeStrategy::ok(Duration::ZERO), probe);
        let ids = session.add_assets(&paths).await.unwrap();

        session.remove_asset(&ids[0]).await.unwrap();
        session.settle_probes().await;

        let assets = session.snapshot().await.assets;
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, ids[1]);
        assert_eq!(assets[0].duration, 20.0);

        assert!(matches!(
            session.remove_asset(&ids[0]).await,
            Err(SessionError::AssetNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_from_result_clears_everything() {
        let (_dir, paths) = files(&["a.mp4"]);
        let client = FakeStrategy::ok(Duration::from_millis(100));
        let session = session(client.clone(), FakeProbe::new(&[], Duration::ZERO));
        session.add_assets(&paths).await.unwrap();
        session.start_processing(None).await;
        assert_eq!(session.wait_for_outcome().await, SessionPhase::Result);

        assert!(matches!(
            session.add_assets(&paths).await,
            Err(SessionError::InvalidPhase { .. })
        ));

        session.reset().await;
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Upload);
        assert!(snapshot.assets.is_empty());
        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.progress, 0);

        assert_eq!(
            session.start_processing(None).await,
            StartOutcome::Ignored(IgnoreReason::NoAssets)
        );
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_processing_discards_late_result() {
        let (_dir, paths) = files(&["a.mp4", "b.mp4"]);
        let client = FakeStrategy::ok(Duration::from_secs(5));
        let session = session(client, FakeProbe::new(&[], Duration::from_secs(60)));
        session.add_assets(&paths[..1]).await.unwrap();
        session.start_processing(None).await;

        tokio::time::sleep(Duration::from_secs(1)).await;
        session.reset().await;
        session.add_assets(&paths[1..]).await.unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Upload);
        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.progress, 0);
        assert_eq!(snapshot.assets.len(), 1);
        assert_eq!(snapshot.assets[0].name, "b.mp4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_completion_delay_keeps_upload() {
        let (_dir, paths) = files(&["a.mp4"]);
        let client = FakeStrategy::ok(Duration::from_secs(1));
        let session = session(client, FakeProbe::new(&[], Duration::from_secs(60)));
        session.add_assets(&paths).await.unwrap();
        let mut rx = session.subscribe();
        session.start_processing(None).await;

        // Client has answered; the switch to RESULT is still pending.
        tokio::time::sleep(Duration::from_millis(1100)).await;
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Processing);
        assert_eq!(snapshot.progress, 100);
        assert!(snapshot.result.is_some());

        session.reset().await;
        tokio::time::sleep(Duration::from_secs(2)).await;

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Upload);
        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.progress, 0);
        assert!(!drain(&mut rx).iter().any(|e| matches!(
            e,
            SessionEvent::PhaseChanged {
                phase: SessionPhase::Result
            }
        )));
    }

    // =========================================================================
    // Probe settling
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_settle_after_immediate_remove() {
        let (_dir, paths) = files(&["a.mp4"]);
        let probe = FakeProbe::new(&[("a.mp4", 10.0)], Duration::from_secs(5));
        let session = session(FakeStrategy::ok(Duration::ZERO), probe);
        let ids = session.add_assets(&paths).await.unwrap();

        // Removed before the spawned task is ever polled.
        session.remove_asset(&ids[0]).await.unwrap();

        tokio::time::timeout(Duration::from_secs(60), session.settle_probes())
            .await
            .expect("pending probe count never returned to zero");
        assert!(session.snapshot().await.assets.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_after_immediate_reset() {
        let (_dir, paths) = files(&["a.mp4", "b.mp4"]);
        let probe = FakeProbe::new(&[("a.mp4", 10.0), ("b.mp4", 20.0)], Duration::from_secs(5));
        let session = session(FakeStrategy::ok(Duration::ZERO), probe);
        session.add_assets(&paths).await.unwrap();

        session.reset().await;

        tokio::time::timeout(Duration::from_secs(60), session.settle_probes())
            .await
            .expect("pending probe count never returned to zero");
        assert!(session.snapshot().await.assets.is_empty());
    }
}
