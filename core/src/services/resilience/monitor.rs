//! Fast-store health state machine
//!
//! States: Normal -> Degraded -> FallbackActive -> Recovering -> Normal.
//! Transitions are driven by a single periodic probe task; request
//! handlers only read the current state. All fields are atomics so reads
//! never contend with the probe.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Current operating state of the resilience manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResilienceState {
    /// Fast store healthy, full service
    Normal,
    /// Probe failures observed, not yet sustained
    Degraded,
    /// Fast store considered down; restricted fallback service
    FallbackActive,
    /// Probe healthy again; dump replay in progress
    Recovering,
}

impl ResilienceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResilienceState::Normal => "normal",
            ResilienceState::Degraded => "degraded",
            ResilienceState::FallbackActive => "fallback_active",
            ResilienceState::Recovering => "recovering",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => ResilienceState::Degraded,
            2 => ResilienceState::FallbackActive,
            3 => ResilienceState::Recovering,
            _ => ResilienceState::Normal,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ResilienceState::Normal => 0,
            ResilienceState::Degraded => 1,
            ResilienceState::FallbackActive => 2,
            ResilienceState::Recovering => 3,
        }
    }
}

/// Transition the probe caller must act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Dump fast-store state and switch request handling to fallback
    EnterFallback,
    /// Replay the dump and the pending SMS rows
    BeginRecovery,
}

/// Lock-free health monitor shared between the probe task and request
/// handlers.
pub struct HealthMonitor {
    state: AtomicU8,
    consecutive_failures: AtomicU32,
    consecutive_successes: AtomicU32,
    failure_threshold: u32,
    recovery_threshold: u32,
}

impl HealthMonitor {
    pub fn new(failure_threshold: u32, recovery_threshold: u32) -> Self {
        Self {
            state: AtomicU8::new(ResilienceState::Normal.as_u8()),
            consecutive_failures: AtomicU32::new(0),
            consecutive_successes: AtomicU32::new(0),
            failure_threshold: failure_threshold.max(1),
            recovery_threshold: recovery_threshold.max(1),
        }
    }

    pub fn state(&self) -> ResilienceState {
        ResilienceState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Whether fast-store-dependent requests may be served.
    ///
    /// Degraded still serves: the store answered recently and individual
    /// operations carry their own timeouts. FallbackActive and Recovering
    /// reject, so replay never interleaves with live writes.
    pub fn accepts_requests(&self) -> bool {
        matches!(
            self.state(),
            ResilienceState::Normal | ResilienceState::Degraded
        )
    }

    /// Record a successful probe. Returns a transition the caller must
    /// perform, if any.
    pub fn record_success(&self) -> Option<Transition> {
        self.consecutive_failures.store(0, Ordering::SeqCst);
        match self.state() {
            ResilienceState::Normal => None,
            ResilienceState::Degraded => {
                self.set_state(ResilienceState::Normal);
                tracing::info!(
                    event = "probe_recovered",
                    "Fast store answered before fallback threshold; back to normal"
                );
                None
            }
            ResilienceState::FallbackActive => {
                let successes = self.consecutive_successes.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.recovery_threshold {
                    self.set_state(ResilienceState::Recovering);
                    Some(Transition::BeginRecovery)
                } else {
                    None
                }
            }
            ResilienceState::Recovering => None,
        }
    }

    /// Record a failed probe. Returns a transition the caller must
    /// perform, if any.
    pub fn record_failure(&self) -> Option<Transition> {
        self.consecutive_successes.store(0, Ordering::SeqCst);
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        match self.state() {
            ResilienceState::Normal => {
                self.set_state(ResilienceState::Degraded);
                tracing::warn!(
                    failures = failures,
                    event = "probe_degraded",
                    "Fast store probe failed"
                );
                self.check_fallback(failures)
            }
            ResilienceState::Degraded => self.check_fallback(failures),
            ResilienceState::FallbackActive => None,
            // Recovery is already running against a store that answered;
            // the replay outcome decides the next state.
            ResilienceState::Recovering => None,
        }
    }

    /// Recovery replay finished successfully
    pub fn mark_recovered(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
        self.consecutive_successes.store(0, Ordering::SeqCst);
        self.set_state(ResilienceState::Normal);
    }

    /// Recovery replay failed; fall back again and wait for the probe
    pub fn abort_recovery(&self) {
        self.consecutive_successes.store(0, Ordering::SeqCst);
        self.set_state(ResilienceState::FallbackActive);
    }

    fn check_fallback(&self, failures: u32) -> Option<Transition> {
        if failures >= self.failure_threshold {
            self.set_state(ResilienceState::FallbackActive);
            self.consecutive_successes.store(0, Ordering::SeqCst);
            tracing::error!(
                failures = failures,
                event = "fallback_entered",
                "Sustained fast-store failure; entering fallback mode"
            );
            Some(Transition::EnterFallback)
        } else {
            None
        }
    }

    fn set_state(&self, state: ResilienceState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new(3, 3)
    }
}
