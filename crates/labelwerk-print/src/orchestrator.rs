// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job orchestration.
//
// Each job runs on its own tokio task through
// Validating -> Connecting -> Configuring -> Printing -> Closing and ends in
// exactly one `JobOutcome`. Driver calls run on the blocking pool. Jobs to the
// same printer are serialized by a per-address lock held from Connecting
// through Closing.
//
// When a channel-open or print call overruns its timeout the job reports at
// once, but the abandoned call keeps the address lock: a reaper task waits
// for it to return, closes whatever session it produced, and only then lets
// the next job at that printer proceed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use labelwerk_bridge::{NativeAdapter, PlatformBridge, PrinterDriver};
use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{
    AppConfig, ConnectionType, JobId, JobOutcome, JobStage, OutcomeStatus, PrintJob,
    PrintSettings, check_address, normalize_address,
};
use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::artifact::resolve_artifact;
use crate::session::ChannelSession;
use crate::settings::SettingsResolver;
use crate::translate::outcome_for_error;

type AddressLock = Arc<tokio::sync::Mutex<()>>;

struct Inner {
    adapter: Arc<dyn NativeAdapter>,
    driver: Arc<dyn PrinterDriver>,
    resolver: SettingsResolver,
    open_timeout: Duration,
    print_timeout: Duration,
    /// Normalized address -> lock. Entries live as long as the orchestrator.
    locks: Mutex<HashMap<String, AddressLock>>,
}

impl Inner {
    fn lock_for(&self, connection: ConnectionType, address: &str) -> AddressLock {
        let key = format!("{connection}:{}", normalize_address(connection, address));
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(key).or_default().clone()
    }
}

/// Runs print jobs against an injected adapter and driver.
#[derive(Clone)]
pub struct JobOrchestrator {
    inner: Arc<Inner>,
}

/// Handle to a submitted job.
pub struct PendingJob {
    job_id: JobId,
    cancel: CancellationToken,
    task: JoinHandle<JobOutcome>,
}

impl PendingJob {
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Ask the job to stop at the next stage boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the terminal outcome.
    pub async fn outcome(self) -> JobOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(job_id = %self.job_id, error = %e, "job task ended abnormally");
                outcome_for_error(
                    self.job_id,
                    JobStage::Created,
                    &LabelwerkError::Driver(format!("job task failed: {e}")),
                )
            }
        }
    }
}

/// How a blocking driver call ended. The address lock comes back unless
/// the call was abandoned.
enum Bounded<T> {
    Done(T, OwnedMutexGuard<()>),
    Panicked(String),
    TimedOut,
}

impl JobOrchestrator {
    pub fn new(
        adapter: Arc<dyn NativeAdapter>,
        driver: Arc<dyn PrinterDriver>,
        config: &AppConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                adapter,
                driver,
                resolver: SettingsResolver::from_config(config),
                open_timeout: config.open_timeout(),
                print_timeout: config.print_timeout(),
                locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Use one bridge for both capabilities.
    pub fn with_bridge<B: PlatformBridge + 'static>(bridge: Arc<B>, config: &AppConfig) -> Self {
        Self::new(bridge.clone(), bridge, config)
    }

    pub fn resolver(&self) -> &SettingsResolver {
        &self.inner.resolver
    }

    /// Start `job` on a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, job: PrintJob) -> PendingJob {
        self.submit_with_cancel(job, CancellationToken::new())
    }

    /// Start `job`, stopping at the next stage boundary once `cancel` fires.
    pub fn submit_with_cancel(&self, job: PrintJob, cancel: CancellationToken) -> PendingJob {
        let job_id = job.id;
        let inner = self.inner.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move { execute(inner, job, token).await });
        PendingJob {
            job_id,
            cancel,
            task,
        }
    }

    /// Submit and wait.
    pub async fn run(&self, job: PrintJob) -> JobOutcome {
        self.submit(job).outcome().await
    }

    /// Check that the printer at `address` can be reached: validate, open,
    /// close. Uses the same lock and timeout as a print job.
    pub async fn probe(&self, connection: ConnectionType, address: &str) -> JobOutcome {
        let job_id = JobId::new();
        let inner = &self.inner;
        info!(%job_id, %connection, address, "probing printer");

        if let Err(e) = check_address(connection, address) {
            return finish(job_id, JobStage::Validating, e);
        }

        let guard = inner.lock_for(connection, address).lock_owned().await;
        match open_session(inner, connection, address, guard).await {
            Ok((session, guard)) => {
                close_session(session, guard).await;
                info!(%job_id, address, "printer reachable");
                JobOutcome::succeeded(job_id, format!("Printer at {address} is reachable."))
            }
            Err(e) => finish(job_id, JobStage::Connecting, e),
        }
    }
}

fn finish(job_id: JobId, stage: JobStage, err: LabelwerkError) -> JobOutcome {
    let outcome = outcome_for_error(job_id, stage, &err);
    match outcome.status {
        OutcomeStatus::Cancelled => info!(%job_id, %stage, "job cancelled"),
        _ => warn!(
            %job_id,
            %stage,
            kind = ?outcome.error_kind,
            vendor_code = ?outcome.vendor_code,
            error = %err,
            "job failed"
        ),
    }
    outcome
}

fn enter(job_id: JobId, stage: JobStage, cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(LabelwerkError::Cancelled);
    }
    debug!(%job_id, %stage, "entering stage");
    Ok(())
}

/// Run `f` on the blocking pool, bounded by `limit` when given.
///
/// On timeout the still-running call is handed to a reaper that drops its
/// output on the blocking pool (closing any session it holds) and then
/// releases `guard`.
async fn bounded<T, F>(f: F, limit: Option<Duration>, guard: OwnedMutexGuard<()>) -> Bounded<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let mut task = tokio::task::spawn_blocking(f);
    let joined = match limit {
        Some(limit) => match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                tokio::spawn(async move {
                    if let Ok(late) = task.await {
                        let _ = tokio::task::spawn_blocking(move || drop(late)).await;
                    }
                    drop(guard);
                    debug!("abandoned driver call finished, address released");
                });
                return Bounded::TimedOut;
            }
        },
        None => task.await,
    };
    match joined {
        Ok(value) => Bounded::Done(value, guard),
        // The session was dropped, and so closed, while unwinding.
        Err(e) => Bounded::Panicked(e.to_string()),
    }
}

async fn open_session(
    inner: &Arc<Inner>,
    connection: ConnectionType,
    address: &str,
    guard: OwnedMutexGuard<()>,
) -> Result<(ChannelSession, OwnedMutexGuard<()>)> {
    let adapter = inner.adapter.clone();
    let driver = inner.driver.clone();
    let target = address.to_string();
    let open = move || ChannelSession::open(adapter.as_ref(), driver, connection, &target);

    match bounded(open, Some(inner.open_timeout), guard).await {
        Bounded::Done(Ok(session), guard) => Ok((session, guard)),
        Bounded::Done(Err(e), _) => Err(e),
        Bounded::Panicked(msg) => Err(LabelwerkError::Driver(format!(
            "channel open panicked: {msg}"
        ))),
        Bounded::TimedOut => Err(LabelwerkError::ConnectionTimeout {
            address: address.to_string(),
            timeout_ms: inner.open_timeout.as_millis() as u64,
        }),
    }
}

async fn close_session(mut session: ChannelSession, guard: OwnedMutexGuard<()>) {
    let address = session.address().to_string();
    let closed = tokio::task::spawn_blocking(move || session.close()).await;
    if let Err(e) = closed {
        warn!(%address, error = %e, "channel close panicked");
    }
    drop(guard);
}

/// Session and lock held between Connecting and Closing.
struct Held {
    session: ChannelSession,
    guard: OwnedMutexGuard<()>,
}

/// Settings are applied locally by the SDK, so this call is not bounded.
async fn configure(held: Held, settings: PrintSettings) -> Result<Held> {
    let Held { session, guard } = held;
    let apply = move || {
        let result = session.apply_settings(&settings);
        (session, result)
    };
    match bounded(apply, None, guard).await {
        Bounded::Done((session, Ok(())), guard) => Ok(Held { session, guard }),
        Bounded::Done((session, Err(e)), guard) => {
            close_session(session, guard).await;
            Err(e)
        }
        Bounded::Panicked(msg) => Err(LabelwerkError::Driver(format!(
            "applying settings panicked: {msg}"
        ))),
        Bounded::TimedOut => Err(LabelwerkError::Driver("applying settings did not return".into())),
    }
}

async fn submit_artifact(
    inner: &Arc<Inner>,
    held: Held,
    artifact: PathBuf,
    job: &PrintJob,
) -> Result<Held> {
    let Held { session, guard } = held;
    let kind = job.artifact_kind;
    let submit = move || {
        let result = session.print(&artifact, kind);
        (session, result)
    };
    match bounded(submit, Some(inner.print_timeout), guard).await {
        Bounded::Done((session, Ok(())), guard) => Ok(Held { session, guard }),
        Bounded::Done((session, Err(e)), guard) => {
            close_session(session, guard).await;
            Err(e)
        }
        Bounded::Panicked(msg) => Err(LabelwerkError::Driver(format!("printing panicked: {msg}"))),
        Bounded::TimedOut => Err(LabelwerkError::PrintTimeout {
            timeout_ms: inner.print_timeout.as_millis() as u64,
        }),
    }
}

async fn execute(inner: Arc<Inner>, job: PrintJob, cancel: CancellationToken) -> JobOutcome {
    let job_id = job.id;
    info!(
        %job_id,
        connection = %job.connection_type,
        address = %job.address,
        kind = %job.artifact_kind,
        model = %job.printer_model,
        label = %job.label_size,
        "job created"
    );

    // -- Validating --------------------------------------------------------
    let validated = enter(job_id, JobStage::Validating, &cancel).and_then(|()| {
        check_address(job.connection_type, &job.address)?;
        resolve_artifact(&job.artifact_path, job.artifact_kind)
    });
    let artifact = match validated {
        Ok(path) => path,
        Err(e) => return finish(job_id, JobStage::Validating, e),
    };
    let settings = inner.resolver.resolve(
        job.printer_model,
        job.label_size,
        job.artifact_kind,
        job.orientation,
        job.copies,
    );

    // -- Connecting --------------------------------------------------------
    if let Err(e) = enter(job_id, JobStage::Connecting, &cancel) {
        return finish(job_id, JobStage::Connecting, e);
    }
    let lock = inner.lock_for(job.connection_type, &job.address);
    let guard = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return finish(job_id, JobStage::Connecting, LabelwerkError::Cancelled);
        }
        guard = lock.lock_owned() => guard,
    };
    debug!(%job_id, address = %job.address, "address lock acquired");

    let held = match open_session(&inner, job.connection_type, &job.address, guard).await {
        Ok((session, guard)) => Held { session, guard },
        Err(e) => return finish(job_id, JobStage::Connecting, e),
    };

    // -- Configuring -------------------------------------------------------
    if let Err(e) = enter(job_id, JobStage::Configuring, &cancel) {
        close_session(held.session, held.guard).await;
        return finish(job_id, JobStage::Configuring, e);
    }
    let held = match configure(held, settings).await {
        Ok(held) => held,
        Err(e) => return finish(job_id, JobStage::Configuring, e),
    };

    // -- Printing ----------------------------------------------------------
    if let Err(e) = enter(job_id, JobStage::Printing, &cancel) {
        close_session(held.session, held.guard).await;
        return finish(job_id, JobStage::Printing, e);
    }
    let held = match submit_artifact(&inner, held, artifact, &job).await {
        Ok(held) => held,
        Err(e) => return finish(job_id, JobStage::Printing, e),
    };

    // -- Closing -----------------------------------------------------------
    debug!(%job_id, stage = %JobStage::Closing, "entering stage");
    close_session(held.session, held.guard).await;

    info!(%job_id, address = %job.address, copies = job.copies, "job succeeded");
    JobOutcome::succeeded(
        job_id,
        format!(
            "Printed {} on {} ({}).",
            job.artifact_kind,
            job.printer_model,
            job.label_size.describe()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelwerk_bridge::{CallCounts, ScriptedBridge};
    use labelwerk_core::{
        ArtifactKind, ErrorKind, LabelSize, OpenChannelCode, PrintErrorCode, PrinterModel,
    };
    use tempfile::TempDir;

    const MAC: &str = "6C:B2:FD:94:22:2F";

    struct Fixture {
        _dir: TempDir,
        image: PathBuf,
        config: AppConfig,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let image = dir.path().join("label.png");
        std::fs::write(&image, b"\x89PNG").expect("write image");
        let config = AppConfig {
            work_dir: Some(dir.path().to_path_buf()),
            open_timeout_ms: 2_000,
            print_timeout_ms: 2_000,
            ..AppConfig::default()
        };
        Fixture {
            _dir: dir,
            image,
            config,
        }
    }

    fn bt_job(fx: &Fixture) -> PrintJob {
        PrintJob::new(ConnectionType::Bluetooth, MAC, &fx.image, ArtifactKind::Image)
    }

    /// Wait (bounded) until the bridge has seen `n` closes.
    async fn wait_for_closes(bridge: &ScriptedBridge, n: usize) {
        for _ in 0..200 {
            if bridge.calls().close >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn bluetooth_job_succeeds() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new());
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let job = bt_job(&fx)
            .with_model(PrinterModel::Ql820Nwb)
            .with_label_size(LabelSize::DieCutW29H90);
        let outcome = orchestrator.run(job).await;

        assert_eq!(outcome.status, OutcomeStatus::Succeeded);
        assert_eq!(outcome.message, "Printed image on QL-820NWB (29 x 90 mm die-cut).");
        let calls = bridge.calls();
        assert_eq!((calls.open, calls.apply, calls.print, calls.close), (1, 1, 1, 1));
        assert_eq!(bridge.printed(), vec![(fx.image.clone(), ArtifactKind::Image)]);
        let settings = bridge.last_settings().expect("settings applied");
        assert_eq!(settings.label_size, LabelSize::DieCutW29H90);
        assert_eq!(settings.work_path, fx.config.work_path());
    }

    #[tokio::test]
    async fn open_failure_never_closes() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new().fail_open(OpenChannelCode::OpenStreamFailure));
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let outcome = orchestrator.run(bt_job(&fx)).await;

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.error_kind, Some(ErrorKind::ChannelOpenFailed));
        assert_eq!(outcome.failed_stage, Some(JobStage::Connecting));
        assert_eq!(outcome.vendor_code.as_deref(), Some("OpenStreamFailure"));
        assert_eq!(bridge.calls().close, 0);
        assert_eq!(bridge.calls().print, 0);
    }

    #[tokio::test]
    async fn print_failure_closes_exactly_once() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new().fail_print(PrintErrorCode::PaperEmpty));
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let outcome = orchestrator.run(bt_job(&fx)).await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::PrintFailed));
        assert_eq!(outcome.failed_stage, Some(JobStage::Printing));
        assert_eq!(outcome.vendor_code.as_deref(), Some("PrinterStatusErrorPaperEmpty"));
        assert_eq!(bridge.calls().close, 1);
        assert_eq!(bridge.open_channels(), 0);
    }

    #[tokio::test]
    async fn settings_failure_closes_exactly_once() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new().fail_apply(PrintErrorCode::SetLabelSizeError));
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let outcome = orchestrator.run(bt_job(&fx)).await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::PrintFailed));
        assert_eq!(outcome.failed_stage, Some(JobStage::Configuring));
        assert_eq!(bridge.calls().print, 0);
        assert_eq!(bridge.calls().close, 1);
    }

    #[tokio::test]
    async fn disabled_adapter_never_reaches_the_driver() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new().adapter_disabled(ConnectionType::Bluetooth));
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let outcome = orchestrator.run(bt_job(&fx)).await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::AdapterDisabled));
        let calls = bridge.calls();
        assert_eq!((calls.open, calls.apply, calls.print, calls.close), (0, 0, 0, 0));
    }

    #[tokio::test]
    async fn permission_and_support_are_reported() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new().permission_denied(ConnectionType::Bluetooth));
        let outcome = JobOrchestrator::with_bridge(bridge.clone(), &fx.config)
            .run(bt_job(&fx))
            .await;
        assert_eq!(outcome.error_kind, Some(ErrorKind::PermissionDenied));

        let bridge = Arc::new(ScriptedBridge::new().adapter_unsupported(ConnectionType::Bluetooth));
        let outcome = JobOrchestrator::with_bridge(bridge.clone(), &fx.config)
            .run(bt_job(&fx))
            .await;
        assert_eq!(outcome.error_kind, Some(ErrorKind::AdapterUnsupported));
        assert_eq!(bridge.calls().open, 0);
    }

    #[tokio::test]
    async fn malformed_addresses_never_touch_the_adapter() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new());
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        for address in ["6C:B2:FD:94:22", "6C:B2:FD:94:22:ZZ", "6CB2FD94222F"] {
            let job =
                PrintJob::new(ConnectionType::Bluetooth, address, &fx.image, ArtifactKind::Image);
            let outcome = orchestrator.run(job).await;
            assert_eq!(outcome.error_kind, Some(ErrorKind::InvalidAddress), "{address}");
            assert_eq!(outcome.failed_stage, Some(JobStage::Validating));
        }
        assert_eq!(bridge.calls(), CallCounts::default());
    }

    #[tokio::test]
    async fn missing_artifact_fails_before_connecting() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new());
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let job = PrintJob::new(
            ConnectionType::Wifi,
            "192.168.1.40",
            fx.image.with_file_name("missing.png"),
            ArtifactKind::Image,
        );
        let outcome = orchestrator.run(job).await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::FileNotFound));
        assert_eq!(bridge.calls().open, 0);
    }

    #[tokio::test]
    async fn driver_exception_is_unknown_with_its_message() {
        let fx = fixture();
        let bridge = Arc::new(
            ScriptedBridge::new().throw_on_print("java.lang.IllegalStateException: stream closed"),
        );
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let outcome = orchestrator.run(bt_job(&fx)).await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::Unknown));
        assert!(outcome.detail.unwrap_or_default().contains("stream closed"));
        assert_eq!(bridge.calls().close, 1);
    }

    #[tokio::test]
    async fn exception_during_open_is_unknown_and_never_closes() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new().throw_on_open("java.io.IOException: socket"));
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let outcome = orchestrator.run(bt_job(&fx)).await;

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.error_kind, Some(ErrorKind::Unknown));
        assert_eq!(outcome.failed_stage, Some(JobStage::Connecting));
        assert_eq!(outcome.vendor_code, None);
        assert!(outcome.detail.unwrap_or_default().contains("java.io.IOException: socket"));
        let calls = bridge.calls();
        assert_eq!((calls.open, calls.apply, calls.print, calls.close), (1, 0, 0, 0));
    }

    #[tokio::test]
    async fn failed_adapter_query_is_unknown() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new().fail_adapter_query("DeadObjectException"));
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let outcome = orchestrator.run(bt_job(&fx)).await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::Unknown));
        assert!(outcome.detail.unwrap_or_default().contains("DeadObjectException"));
        assert_eq!(bridge.calls().open, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn open_timeout_reports_and_late_channel_is_closed() {
        let mut fx = fixture();
        fx.config.open_timeout_ms = 50;
        let bridge = Arc::new(ScriptedBridge::new().open_delay(Duration::from_millis(300)));
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let outcome = orchestrator.run(bt_job(&fx)).await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::ConnectionTimeout));
        assert_eq!(outcome.failed_stage, Some(JobStage::Connecting));
        assert_eq!(bridge.calls().print, 0);

        wait_for_closes(&bridge, 1).await;
        assert_eq!(bridge.calls().close, 1);
        assert_eq!(bridge.open_channels(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn print_timeout_holds_the_address_until_the_call_returns() {
        let mut fx = fixture();
        fx.config.print_timeout_ms = 50;
        let bridge = Arc::new(ScriptedBridge::new().print_delay(Duration::from_millis(200)));
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let outcome = orchestrator.run(bt_job(&fx)).await;
        assert_eq!(outcome.error_kind, Some(ErrorKind::PrintFailed));
        assert_eq!(outcome.vendor_code, None);

        // A second job to the same printer must wait for the reaper.
        let _ = orchestrator.run(bt_job(&fx)).await;

        assert_eq!(bridge.peak_channels(MAC), 1);
        assert_eq!(bridge.calls().open, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn same_address_jobs_never_overlap() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new().print_delay(Duration::from_millis(50)));
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let a = orchestrator.submit(bt_job(&fx));
        // Same printer, different spelling.
        let b = orchestrator.submit(PrintJob::new(
            ConnectionType::Bluetooth,
            MAC.to_ascii_lowercase(),
            &fx.image,
            ArtifactKind::Image,
        ));
        let (a, b) = (a.outcome().await, b.outcome().await);

        assert!(a.is_success() && b.is_success());
        assert_eq!(bridge.peak_open(), 1);
        assert_eq!(bridge.calls().close, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn distinct_addresses_print_concurrently() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new().print_delay(Duration::from_millis(300)));
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let wifi_job =
            |ip: &str| PrintJob::new(ConnectionType::Wifi, ip, &fx.image, ArtifactKind::Image);
        let a = orchestrator.submit(wifi_job("192.168.1.40"));
        let b = orchestrator.submit(wifi_job("192.168.1.41"));

        assert!(a.outcome().await.is_success());
        assert!(b.outcome().await.is_success());
        assert_eq!(bridge.peak_open(), 2);
        assert_eq!(bridge.open_channels(), 0);
    }

    #[tokio::test]
    async fn cancelled_before_start_makes_no_calls() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new());
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let token = CancellationToken::new();
        token.cancel();
        let outcome = orchestrator.submit_with_cancel(bt_job(&fx), token).outcome().await;

        assert_eq!(outcome.status, OutcomeStatus::Cancelled);
        assert_eq!(outcome.failed_stage, Some(JobStage::Validating));
        assert_eq!(bridge.calls(), CallCounts::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancel_while_waiting_for_the_printer() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new().print_delay(Duration::from_millis(300)));
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let first = orchestrator.submit(bt_job(&fx));
        // Let the first job take the lock.
        for _ in 0..100 {
            if bridge.calls().open == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let second = orchestrator.submit(bt_job(&fx));
        tokio::time::sleep(Duration::from_millis(20)).await;
        second.cancel();

        let second = second.outcome().await;
        assert_eq!(second.status, OutcomeStatus::Cancelled);
        assert_eq!(second.failed_stage, Some(JobStage::Connecting));

        assert!(first.outcome().await.is_success());
        assert_eq!(bridge.calls().open, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancel_after_open_still_closes_the_channel() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new().open_delay(Duration::from_millis(200)));
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let pending = orchestrator.submit(bt_job(&fx));
        tokio::time::sleep(Duration::from_millis(50)).await;
        pending.cancel();
        let outcome = pending.outcome().await;

        assert_eq!(outcome.status, OutcomeStatus::Cancelled);
        assert_eq!(outcome.error_kind, None);
        assert_eq!(outcome.failed_stage, Some(JobStage::Configuring));
        let calls = bridge.calls();
        assert_eq!((calls.open, calls.apply, calls.print, calls.close), (1, 0, 0, 1));
        assert_eq!(bridge.open_channels(), 0);
    }

    #[tokio::test]
    async fn probe_opens_and_closes_without_printing() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new());
        let orchestrator = JobOrchestrator::with_bridge(bridge.clone(), &fx.config);

        let outcome = orchestrator.probe(ConnectionType::Wifi, "ql820.local").await;

        assert!(outcome.is_success());
        let calls = bridge.calls();
        assert_eq!((calls.open, calls.print, calls.close), (1, 0, 1));
    }

    #[tokio::test]
    async fn outcome_serializes_for_the_host() {
        let fx = fixture();
        let bridge = Arc::new(ScriptedBridge::new().fail_print(PrintErrorCode::CoverOpen));
        let outcome = JobOrchestrator::with_bridge(bridge, &fx.config)
            .run(bt_job(&fx))
            .await;

        let json = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error_kind"], "print_failed");
        assert_eq!(json["failed_stage"], "printing");
        assert_eq!(json["vendor_code"], "PrinterStatusErrorCoverOpen");
    }
}
