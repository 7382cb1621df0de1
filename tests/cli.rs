use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::NamedTempFile;

fn create_minimal_config() -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        config.path(),
        b"search:\n  location: Hyderabad\n  min_followers: 50\n",
    )
    .expect("Writing temp config failed");
    config
}

#[test]
fn harvest_cli_fails_without_token() {
    let config = create_minimal_config();
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("forge-harvest").expect("Binary exists");

    cmd.current_dir(dir.path())
        .arg("harvest")
        .arg("--config")
        .arg(config.path())
        .env_remove("GITHUB_TOKEN");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn harvest_cli_fails_for_missing_config() {
    let mut cmd = Command::cargo_bin("forge-harvest").expect("Binary exists");

    cmd.arg("harvest")
        .arg("--config")
        .arg("/definitely/not/here.yaml")
        .env("GITHUB_TOKEN", "present");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn harvest_cli_help_lists_overrides() {
    let mut cmd = Command::cargo_bin("forge-harvest").expect("Binary exists");
    cmd.arg("harvest").arg("--help");

    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("--min-followers")
                .and(predicate::str::contains("--location")),
        );
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use forge_harvest::cli::{run, Cli, Commands};

    let cli = Cli {
        command: Commands::Harvest {
            config: std::path::PathBuf::from("dummy.yaml"),
            location: None,
            min_followers: None,
        },
    };

    let result = run(cli).await;
    assert!(result.is_err(), "dummy config must not load");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
    assert!(
        event_msgs.iter().any(|msg| msg.contains("Failed to read config file")),
        "Expected the config read failure to be logged, got: {:?}",
        event_msgs
    );
}
