//! Monitor loop integration over a real log file: startup alert, live
//! tailing, and crash reporting.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use media_log_warden::core::config::MonitorConfig;
use media_log_warden::core::alert::Severity;
use media_log_warden::engine::cooldown::CooldownGate;
use media_log_warden::monitor::MonitorLoop;
use media_log_warden::notify::channel::NotificationChannel;
use media_log_warden::notify::dispatch::{self, NotificationDispatcher};
use media_log_warden::store::{AlertStore, StoredAlert};

struct Harness {
    store: Arc<AlertStore>,
    shutdown: Arc<AtomicBool>,
    monitor_thread: std::thread::JoinHandle<media_log_warden::Result<()>>,
    worker: std::thread::JoinHandle<()>,
}

fn start_monitor(config: MonitorConfig) -> Harness {
    let store = Arc::new(AlertStore::default());
    let channels: Vec<Box<dyn NotificationChannel>> = Vec::new();
    let dispatcher = NotificationDispatcher::new(
        Arc::new(channels),
        CooldownGate::new(config.alert_cooldown_minutes),
        store.clone(),
    );
    let (handle, worker) =
        dispatch::spawn(dispatcher, config.dispatch_queue_capacity).expect("spawn dispatcher");
    let shutdown = Arc::new(AtomicBool::new(false));
    let monitor_shutdown = shutdown.clone();
    let monitor_thread = std::thread::spawn(move || {
        let mut monitor =
            MonitorLoop::new(config, handle, monitor_shutdown).expect("build monitor");
        monitor.run()
    });
    Harness {
        store,
        shutdown,
        monitor_thread,
        worker,
    }
}

fn wait_for_alert(
    store: &AlertStore,
    timeout: Duration,
    predicate: impl Fn(&StoredAlert) -> bool,
) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if store.list().iter().any(&predicate) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

fn config_for(log_path: PathBuf) -> MonitorConfig {
    MonitorConfig {
        log_path,
        error_threshold: 3,
        poll_interval_ms: 25,
        ..MonitorConfig::default()
    }
}

#[test]
fn live_appends_raise_a_burst_alert_but_history_does_not() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("Media Server.log");
    // History present before the monitor starts must never be replayed.
    std::fs::write(&log, "ERROR: database old failure\n").expect("seed log");

    let harness = start_monitor(config_for(dir.path().to_path_buf()));
    assert!(
        wait_for_alert(&harness.store, Duration::from_secs(5), |stored| {
            stored.alert.title == "Log Monitor Started"
        }),
        "startup alert missing"
    );

    let mut contents = String::new();
    for i in 0..3 {
        contents.push_str(&format!("ERROR: database live failure {i}\n"));
    }
    use std::io::Write as _;
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(&log)
        .expect("open log for append");
    file.write_all(contents.as_bytes()).expect("append lines");
    file.flush().expect("flush");

    assert!(
        wait_for_alert(&harness.store, Duration::from_secs(5), |stored| {
            stored.alert.title == "Multiple Database Error Detected"
        }),
        "burst alert missing"
    );

    harness
        .shutdown
        .store(true, std::sync::atomic::Ordering::Relaxed);
    let result = harness.monitor_thread.join().expect("monitor thread joins");
    assert!(result.is_ok(), "clean shutdown expected: {result:?}");
    harness.worker.join().expect("worker joins");

    let alerts = harness.store.list();
    assert!(
        alerts
            .iter()
            .filter(|stored| stored.alert.severity == Severity::Error)
            .count()
            <= 1,
        "pre-existing history must not produce extra alerts"
    );
}

#[test]
fn missing_log_directory_fails_with_a_crash_alert() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("no-such-logs");

    let harness = start_monitor(config_for(missing));
    let result = harness.monitor_thread.join().expect("monitor thread joins");
    assert!(result.is_err(), "monitor must surface the discovery failure");
    harness.worker.join().expect("worker joins");

    let alerts = harness.store.list();
    assert!(
        alerts
            .iter()
            .any(|stored| stored.alert.title == "Log Monitor Crashed"
                && stored.alert.severity == Severity::Critical),
        "crash alert missing; alerts: {:?}",
        alerts.iter().map(|a| a.alert.title.clone()).collect::<Vec<_>>()
    );
}
