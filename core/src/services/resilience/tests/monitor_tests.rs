//! Unit tests for the health-probe state machine

use crate::services::resilience::{HealthMonitor, ResilienceState, Transition};

#[test]
fn test_starts_normal_and_accepting() {
    let monitor = HealthMonitor::new(3, 3);
    assert_eq!(monitor.state(), ResilienceState::Normal);
    assert!(monitor.accepts_requests());
}

#[test]
fn test_single_failure_degrades_without_fallback() {
    let monitor = HealthMonitor::new(3, 3);

    assert_eq!(monitor.record_failure(), None);
    assert_eq!(monitor.state(), ResilienceState::Degraded);
    // Degraded still serves requests
    assert!(monitor.accepts_requests());
}

#[test]
fn test_sustained_failure_enters_fallback() {
    let monitor = HealthMonitor::new(3, 3);

    assert_eq!(monitor.record_failure(), None);
    assert_eq!(monitor.record_failure(), None);
    assert_eq!(monitor.record_failure(), Some(Transition::EnterFallback));

    assert_eq!(monitor.state(), ResilienceState::FallbackActive);
    assert!(!monitor.accepts_requests());

    // Further failures while down do not re-trigger the dump
    assert_eq!(monitor.record_failure(), None);
}

#[test]
fn test_success_while_degraded_returns_to_normal() {
    let monitor = HealthMonitor::new(3, 3);

    monitor.record_failure();
    monitor.record_failure();
    assert_eq!(monitor.record_success(), None);

    assert_eq!(monitor.state(), ResilienceState::Normal);
    // The failure streak was reset: three more are needed again
    monitor.record_failure();
    monitor.record_failure();
    assert_eq!(monitor.state(), ResilienceState::Degraded);
}

#[test]
fn test_sustained_success_begins_recovery() {
    let monitor = HealthMonitor::new(1, 3);
    assert_eq!(monitor.record_failure(), Some(Transition::EnterFallback));

    assert_eq!(monitor.record_success(), None);
    assert_eq!(monitor.record_success(), None);
    assert_eq!(monitor.record_success(), Some(Transition::BeginRecovery));

    assert_eq!(monitor.state(), ResilienceState::Recovering);
    // Replay must not interleave with live writes
    assert!(!monitor.accepts_requests());
}

#[test]
fn test_failure_resets_recovery_streak() {
    let monitor = HealthMonitor::new(1, 3);
    monitor.record_failure();

    monitor.record_success();
    monitor.record_success();
    monitor.record_failure();

    assert_eq!(monitor.state(), ResilienceState::FallbackActive);
    // The streak starts over
    assert_eq!(monitor.record_success(), None);
    assert_eq!(monitor.record_success(), None);
    assert_eq!(monitor.record_success(), Some(Transition::BeginRecovery));
}

#[test]
fn test_mark_recovered_completes_the_cycle() {
    let monitor = HealthMonitor::new(1, 1);
    monitor.record_failure();
    assert_eq!(monitor.record_success(), Some(Transition::BeginRecovery));

    monitor.mark_recovered();
    assert_eq!(monitor.state(), ResilienceState::Normal);
    assert!(monitor.accepts_requests());
}

#[test]
fn test_abort_recovery_falls_back_again() {
    let monitor = HealthMonitor::new(1, 1);
    monitor.record_failure();
    monitor.record_success();
    assert_eq!(monitor.state(), ResilienceState::Recovering);

    monitor.abort_recovery();
    assert_eq!(monitor.state(), ResilienceState::FallbackActive);

    // The probe can drive another recovery attempt
    assert_eq!(monitor.record_success(), Some(Transition::BeginRecovery));
}

#[test]
fn test_probe_results_ignored_while_recovering() {
    let monitor = HealthMonitor::new(1, 1);
    monitor.record_failure();
    monitor.record_success();
    assert_eq!(monitor.state(), ResilienceState::Recovering);

    // The replay outcome decides the next state, not the probe
    assert_eq!(monitor.record_success(), None);
    assert_eq!(monitor.record_failure(), None);
    assert_eq!(monitor.state(), ResilienceState::Recovering);
}
