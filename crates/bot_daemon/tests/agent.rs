mod common;

use std::path::Path;
use std::time::{Duration, SystemTime};

use bot_config::SettingsWatcher;
use bot_core::test_fixtures::at;
use bot_core::Feature;
use bot_daemon::agent;
use common::{pinned, settings, snapshot, two_planets, Harness};

const DEFENDER_ONLY: &str = r#"{ "features": { "defender": true } }"#;
const WITH_RESEARCH: &str = r#"{ "features": { "defender": true, "brain": true, "auto_research": true } }"#;

fn write(path: &Path, body: &str, modified: SystemTime) {
    std::fs::write(path, body).unwrap();
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(modified).unwrap();
}

#[tokio::test(start_paused = true)]
async fn settings_edits_are_applied_and_shutdown_clears_timers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    write(&path, DEFENDER_ONLY, t0);

    let h = Harness::new(snapshot(two_planets()), pinned(600, 10), settings(DEFENDER_ONLY), at(12, 0)).await;
    let mut watcher = SettingsWatcher::new(&path);
    watcher.load().unwrap();
    let scheduler = agent::scheduler_for(h.ctx.clone());
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let running = tokio::spawn(agent::run(
        scheduler.clone(),
        Some(watcher),
        Duration::from_secs(10),
        async {
            let _ = stopped.await;
        },
    ));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(scheduler.is_running(Feature::Defender));
    assert!(!scheduler.is_running(Feature::AutoResearch));

    write(&path, WITH_RESEARCH, t0 + Duration::from_secs(5));
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert!(scheduler.is_running(Feature::AutoResearch));

    stop.send(()).unwrap();
    running.await.unwrap();
    assert!(scheduler.armed_keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn broken_edit_keeps_the_running_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    write(&path, DEFENDER_ONLY, t0);

    let h = Harness::new(snapshot(two_planets()), pinned(600, 10), settings(DEFENDER_ONLY), at(12, 0)).await;
    let mut watcher = SettingsWatcher::new(&path);
    watcher.load().unwrap();
    let scheduler = agent::scheduler_for(h.ctx.clone());
    let reloader = tokio::spawn(agent::run_reload_loop(
        scheduler.clone(),
        watcher,
        Duration::from_secs(10),
    ));

    write(&path, "{ \"features\": ", t0 + Duration::from_secs(5));
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert!(h.ctx.settings().features.defender);

    reloader.abort();
}
