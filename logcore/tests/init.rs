mod common;

use common::wait_for;
use fibre_logcore::config::{ConfigInternal, SinkInternal};
use fibre_logcore::{init_from_config, init_from_file, record_general, DispatcherState, Severity};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
#[serial]
fn file_sink_from_config_receives_global_records() {
  let dir = tempdir().unwrap();
  let log_path = dir.path().join("logs").join("access.log");

  let config = ConfigInternal {
    sink: SinkInternal::File {
      path: log_path.clone(),
    },
    ..ConfigInternal::default()
  };
  let init = init_from_config(config).unwrap();

  record_general(Severity::Info, "accepted tcp:example.com:443 [proxy]");
  record_general(Severity::Error, "dial failed");

  assert!(wait_for(|| fs::read_to_string(&log_path)
    .map(|s| s.lines().count() == 2)
    .unwrap_or(false)));

  let contents = fs::read_to_string(&log_path).unwrap();
  let bodies: Vec<&str> = contents
    .lines()
    .map(|line| line.splitn(3, ' ').nth(2).unwrap())
    .collect();
  assert_eq!(
    bodies,
    vec!["[Info] accepted tcp:example.com:443 [proxy]", "[Error] dial failed"]
  );
  // File output is never styled.
  assert!(!contents.contains('\x1b'));

  let dispatcher = init.dispatcher.clone();
  drop(init);
  assert!(wait_for(|| dispatcher.state() == DispatcherState::Closed));
}

#[test]
#[serial]
fn yaml_file_configures_the_dispatcher_and_error_channel() {
  let dir = tempdir().unwrap();
  let config_path = dir.path().join("fibre_logcore.yaml");
  let log_path = dir.path().join("app.log");
  fs::write(
    &config_path,
    format!(
      "version: 1\n\
       sink:\n  kind: file\n  path: {:?}\n\
       buffer_capacity: 4\n\
       idle_timeout: 50ms\n\
       internal_error_reporting:\n  enabled: true\n",
      log_path
    ),
  )
  .unwrap();

  let init = init_from_file(&config_path).unwrap();
  assert_eq!(init.dispatcher.capacity(), 4);
  assert!(init.internal_error_rx.is_some());

  record_general(Severity::Debug, "hello");
  assert!(wait_for(|| fs::read_to_string(&log_path)
    .map(|s| s.ends_with("[Debug] hello\n"))
    .unwrap_or(false)));

  // The short idle timeout lets the drain task wind down.
  assert!(wait_for(|| init.dispatcher.state() == DispatcherState::Idle));
  std::thread::sleep(Duration::from_millis(10));
  assert!(init.internal_error_rx.as_ref().unwrap().try_recv().is_err());
}

#[test]
#[serial]
fn missing_config_file_is_reported() {
  let dir = tempdir().unwrap();
  let result = init_from_file(&dir.path().join("absent.yaml"));
  assert!(matches!(result, Err(fibre_logcore::Error::ConfigRead { .. })));
}
