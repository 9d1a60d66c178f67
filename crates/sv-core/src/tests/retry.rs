use crate::{RetryController, RetryDecision, RetryState};

use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::{eq, none, some};
use proptest::prelude::*;

const BACKOFF: Duration = Duration::from_millis(1000);

// =========================================================================
// Unit Tests - RetryController
// =========================================================================

#[test]
fn given_new_controller_when_created_then_first_attempt_in_progress() {
    // Given / When
    let retry = RetryController::new(3, BACKOFF);

    // Then
    assert_that!(retry.attempt(), eq(1));
    assert_that!(retry.state(), eq(RetryState::Attempting));
    assert_that!(retry.last_detail(), none());
}

#[test]
fn given_attempts_remaining_when_premature_exit_then_retry_after_backoff() {
    // Given
    let mut retry = RetryController::new(3, BACKOFF);

    // When
    let decision = retry.record_premature_exit("exit code = 1");

    // Then
    assert_eq!(decision, RetryDecision::RetryAfter(BACKOFF));
    assert_that!(retry.state(), eq(RetryState::Retrying));
    assert_that!(retry.last_detail(), some(eq("exit code = 1")));
}

#[test]
fn given_final_attempt_when_premature_exit_then_give_up_with_last_detail() {
    // Given
    let mut retry = RetryController::new(2, BACKOFF);
    retry.record_premature_exit("exit code = 1");
    retry.begin_next_attempt();

    // When
    let decision = retry.record_premature_exit("exit code = 2");

    // Then
    assert_eq!(
        decision,
        RetryDecision::GiveUp {
            detail: String::from("exit code = 2")
        }
    );
    assert_that!(retry.state(), eq(RetryState::GivenUp));
    assert_that!(retry.attempt(), eq(2));
}

#[test]
fn given_zero_max_attempts_when_created_then_raised_to_one() {
    // Given / When
    let mut retry = RetryController::new(0, BACKOFF);

    // Then
    assert_that!(retry.max_attempts(), eq(1));
    assert!(matches!(
        retry.record_premature_exit("exit code = 1"),
        RetryDecision::GiveUp { .. }
    ));
}

#[test]
fn given_readiness_when_recorded_then_succeeded() {
    let mut retry = RetryController::new(3, BACKOFF);

    retry.record_success();

    assert_that!(retry.state(), eq(RetryState::Succeeded));
}

#[cfg(unix)]
#[test]
fn given_exit_statuses_when_described_then_code_or_signal() {
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    // Given
    let exited = ExitStatus::from_raw(3 << 8);
    let signalled = ExitStatus::from_raw(9);

    // When / Then
    assert_that!(RetryController::exit_detail(&exited), eq("exit code = 3"));
    assert_that!(
        RetryController::exit_detail(&signalled),
        eq("terminated by signal")
    );
}

// =========================================================================
// Property-Based Tests - Attempt Bound
// =========================================================================

proptest! {
    #[test]
    fn given_always_failing_attempts_when_retried_then_exactly_max_attempts(max_attempts in 1u32..=10) {
        let mut retry = RetryController::new(max_attempts, Duration::ZERO);
        let mut launches = 1;

        while let RetryDecision::RetryAfter(_) = retry.record_premature_exit("exit code = 1") {
            retry.begin_next_attempt();
            launches += 1;
        }

        prop_assert_eq!(launches, max_attempts);
        prop_assert_eq!(retry.state(), RetryState::GivenUp);
    }

    #[test]
    fn given_any_backoff_when_retrying_then_same_backoff_every_time(backoff_ms in 0u64..=60_000) {
        let backoff = Duration::from_millis(backoff_ms);
        let mut retry = RetryController::new(10, backoff);

        for _ in 0..9 {
            prop_assert_eq!(retry.record_premature_exit("exit code = 1"), RetryDecision::RetryAfter(backoff));
            retry.begin_next_attempt();
        }
    }
}
