use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir, write_config};

use googletest::assert_that;
use googletest::prelude::{anything, contains_substring, eq, none, ok, some};
use log::LevelFilter;
use serial_test::serial;

// =========================================================================
// Happy Path Tests
// =========================================================================

#[test]
#[serial]
fn given_no_config_file_when_load_then_ok_with_defaults() {
    // Given
    let (_temp, _guard) = setup_config_dir();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.supervisor.max_attempts, eq(3));
    assert_that!(config.supervisor.retry_backoff_ms, eq(1000));
    assert_that!(config.supervisor.shutdown_timeout_secs, eq(5));
    assert_that!(config.launch.runtime.as_str(), eq("java"));
    assert_eq!(config.launch.runtime_args, vec!["-jar".to_string()]);
    assert_that!(config.launch.port, eq(8080));
    assert_that!(config.launch.port_env_var.as_str(), eq("PORT"));
    assert_that!(config.artifact.external_dir, none());
}

#[test]
#[serial]
fn given_no_config_file_when_load_and_validate_then_ok() {
    // Given
    let (_temp, _guard) = setup_config_dir();

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_defaults_when_loaded_then_both_readiness_markers_present() {
    // Given
    let (_temp, _guard) = setup_config_dir();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.launch.readiness_markers.len(), eq(2));
    assert!(
        config
            .launch
            .readiness_markers
            .iter()
            .any(|m| m == "Tomcat started on port(s): {port}")
    );
    assert!(
        config
            .launch
            .readiness_markers
            .iter()
            .any(|m| m == "Started WebSocketServerApplication")
    );
}

#[test]
#[serial]
fn given_valid_toml_file_when_load_then_uses_toml_values() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(
        &temp,
        r#"
            [supervisor]
            max_attempts = 5
            retry_backoff_ms = 250

            [launch]
            runtime = "/opt/jdk/bin/java"
            readiness_markers = ["Listening on"]

            [launch.env]
            SPRING_PROFILES_ACTIVE = "dev"

            [logging]
            level = "debug"
        "#,
    );

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.supervisor.max_attempts, eq(5));
    assert_that!(config.supervisor.retry_backoff_ms, eq(250));
    assert_that!(config.supervisor.shutdown_timeout_secs, eq(5));
    assert_that!(config.launch.runtime.as_str(), eq("/opt/jdk/bin/java"));
    assert_eq!(
        config.launch.readiness_markers,
        vec!["Listening on".to_string()]
    );
    assert_that!(
        config.launch.env.get("SPRING_PROFILES_ACTIVE").cloned(),
        some(eq("dev"))
    );
    assert_that!(config.logging.level.0, eq(LevelFilter::Debug));
}

#[test]
#[serial]
fn given_env_var_and_toml_when_load_then_env_var_overrides_toml() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(&temp, "[supervisor]\nmax_attempts = 5");
    let _attempts = EnvGuard::set("SV_MAX_ATTEMPTS", "7");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.supervisor.max_attempts, eq(7));
}

#[test]
#[serial]
fn given_multiple_env_overrides_when_load_then_all_apply() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _runtime = EnvGuard::set("SV_RUNTIME", "sh");
    let _args = EnvGuard::set("SV_RUNTIME_ARGS", "-e -u");
    let _port = EnvGuard::set("SV_PORT", "9090");
    let _external = EnvGuard::set("SV_ARTIFACT_EXTERNAL_DIR", "/mnt/sdcard/app");
    let _colored = EnvGuard::set("SV_LOG_COLORED", "false");
    let _level = EnvGuard::set("SV_LOG_LEVEL", "TRACE");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.launch.runtime.as_str(), eq("sh"));
    assert_eq!(
        config.launch.runtime_args,
        vec!["-e".to_string(), "-u".to_string()]
    );
    assert_that!(config.launch.port, eq(9090));
    assert_that!(config.artifact.external_dir, some(eq("/mnt/sdcard/app")));
    assert_that!(config.logging.colored, eq(false));
    assert_that!(config.logging.level.0, eq(LevelFilter::Trace));
}

#[test]
#[serial]
fn given_empty_runtime_args_env_when_load_then_args_cleared() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _args = EnvGuard::set("SV_RUNTIME_ARGS", "");

    // When
    let config = Config::load().unwrap();

    // Then
    assert!(config.launch.runtime_args.is_empty());
}

#[test]
#[serial]
fn given_missing_config_dir_when_load_from_then_directory_created() {
    // Given
    let temp = tempfile::TempDir::new().unwrap();
    let nested = temp.path().join("a").join("b");

    // When
    let result = Config::load_from(&nested);

    // Then
    assert_that!(result, ok(anything()));
    assert!(nested.is_dir());
}

#[test]
#[serial]
fn given_loaded_config_when_rendered_to_toml_then_reloads_same_values() {
    // Given
    let (temp, _guard) = setup_config_dir();
    let mut config = Config::load().unwrap();
    config.supervisor.max_attempts = 4;
    config.logging.level = crate::LogLevel(LevelFilter::Warn);

    // When
    let rendered = config.to_toml().unwrap();
    write_config(&temp, &rendered);
    let reloaded = Config::load().unwrap();

    // Then
    assert_that!(rendered, contains_substring("max_attempts = 4"));
    assert_that!(rendered, contains_substring("level = \"warn\""));
    assert_that!(reloaded.supervisor.max_attempts, eq(4));
    assert_that!(reloaded.logging.level.0, eq(LevelFilter::Warn));
}
