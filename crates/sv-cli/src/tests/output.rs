use crate::logging::{current_log_path, file_appender};
use crate::{locate_artifact, render_event};

use std::io::Write;

use googletest::assert_that;
use googletest::prelude::{contains_substring, eq, none, some};
use sv_config::{Config, LoggingConfig};
use sv_core::ServerEvent;
use tempfile::TempDir;

// =========================================================================
// Event Rendering
// =========================================================================

#[test]
fn given_progress_event_when_rendered_plain_then_line_verbatim() {
    let event = ServerEvent::Progress(String::from("Tomcat started on port(s): 8080"));

    assert_that!(
        render_event(&event, false),
        eq("Tomcat started on port(s): 8080")
    );
}

#[test]
fn given_error_event_when_rendered_plain_then_message_included() {
    let event = ServerEvent::Error(String::from("exit code = 1"));

    assert_that!(render_event(&event, false), contains_substring("exit code = 1"));
}

#[test]
fn given_events_when_rendered_json_then_tagged_objects() {
    assert_that!(
        render_event(&ServerEvent::Started, true),
        eq(r#"{"event":"started"}"#)
    );
    assert_that!(
        render_event(&ServerEvent::Progress(String::from("Booting")), true),
        eq(r#"{"event":"progress","message":"Booting"}"#)
    );
}

// =========================================================================
// Artifact Lookup
// =========================================================================

#[test]
fn given_artifact_in_configured_private_dir_when_located_then_found() {
    // Given
    let external = TempDir::new().unwrap();
    let private = TempDir::new().unwrap();
    let mut config = Config::default();
    config.artifact.external_dir = Some(external.path().to_string_lossy().into_owned());
    config.artifact.private_dir = Some(private.path().to_string_lossy().into_owned());
    let jar = private.path().join(&config.artifact.file_name);
    std::fs::write(&jar, b"jar").unwrap();

    // When
    let found = locate_artifact(&config);

    // Then
    assert_that!(found, some(eq(&jar)));
}

#[test]
fn given_empty_storage_when_located_then_none() {
    // Given
    let external = TempDir::new().unwrap();
    let private = TempDir::new().unwrap();
    let mut config = Config::default();
    config.artifact.external_dir = Some(external.path().to_string_lossy().into_owned());
    config.artifact.private_dir = Some(private.path().to_string_lossy().into_owned());

    // When
    let found = locate_artifact(&config);

    // Then
    assert_that!(found, none());
}

// =========================================================================
// Log File Path
// =========================================================================

#[test]
fn given_file_logging_disabled_when_current_log_path_then_none() {
    let config = LoggingConfig::default();

    assert_that!(current_log_path(&config, std::path::Path::new(".sv")), none());
}

#[test]
fn given_file_logging_enabled_when_current_log_path_then_dated_file_in_log_dir() {
    // Given
    let config = LoggingConfig {
        file: true,
        ..LoggingConfig::default()
    };
    let config_dir = std::path::Path::new(".sv");

    // When
    let path = current_log_path(&config, config_dir).unwrap();

    // Then
    assert!(path.starts_with(config_dir.join("logs")));
    let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert_that!(file_name, contains_substring("sv."));
    assert!(file_name.ends_with(".log"));
}

#[test]
fn given_rolling_appender_when_written_then_current_log_path_names_its_file() {
    // Given
    let temp = TempDir::new().unwrap();
    let config = LoggingConfig {
        file: true,
        ..LoggingConfig::default()
    };
    let logs_dir = temp.path().join(&config.dir);
    std::fs::create_dir_all(&logs_dir).unwrap();
    let mut appender = file_appender(&logs_dir).unwrap();

    // When
    appender.write_all(b"line\n").unwrap();
    appender.flush().unwrap();
    let path = current_log_path(&config, temp.path()).unwrap();

    // Then
    assert!(path.is_file(), "no log file at {}", path.display());
}
