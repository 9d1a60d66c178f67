use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir};

use googletest::assert_that;
use googletest::prelude::{anything, err, ok};
use serial_test::serial;

// =========================================================================
// Validation Tests - Artifact
// =========================================================================

#[test]
#[serial]
fn given_empty_file_name_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _name = EnvGuard::set("SV_ARTIFACT_FILE_NAME", "");

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_file_name_with_separator_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _name = EnvGuard::set("SV_ARTIFACT_FILE_NAME", "libs/server.jar");

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_custom_file_name_when_validate_then_ok() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _name = EnvGuard::set("SV_ARTIFACT_FILE_NAME", "server-1.2.jar");

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}
