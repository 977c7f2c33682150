use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters tracking share lifecycle outcomes.
///
/// All counters use relaxed ordering. For a consistent point-in-time view,
/// call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct ShareMetrics {
    /// Taps received, whatever their outcome.
    pub taps: AtomicU64,
    /// Taps routed to onboarding.
    pub taps_setup: AtomicU64,
    /// Taps routed to the owner dashboard.
    pub taps_dashboard: AtomicU64,
    /// Disclosure tokens minted.
    pub tokens_minted: AtomicU64,
    /// Taps that fell back to the dashboard because a store call failed.
    pub tap_fail_open: AtomicU64,
    /// Successful arm calls.
    pub arms: AtomicU64,
    /// Successful owner disarm calls.
    pub disarms: AtomicU64,
    /// Disclosures that claimed a token and returned a snapshot.
    pub disclosures_served: AtomicU64,
    /// Disclosure views answered with the expired state.
    pub disclosures_expired: AtomicU64,
    /// Token claims that failed in the store and were shown as expired.
    pub claim_failures: AtomicU64,
    /// Forced disarms after consumption that failed and were skipped.
    pub forced_disarm_failures: AtomicU64,
    /// Contact cards served.
    pub cards_served: AtomicU64,
    /// Contact card requests for missing or expired tokens.
    pub cards_missing: AtomicU64,
}

impl ShareMetrics {
    pub fn increment_taps(&self) {
        self.taps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_taps_setup(&self) {
        self.taps_setup.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_taps_dashboard(&self) {
        self.taps_dashboard.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tokens_minted(&self) {
        self.tokens_minted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tap_fail_open(&self) {
        self.tap_fail_open.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_arms(&self) {
        self.arms.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_disarms(&self) {
        self.disarms.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_disclosures_served(&self) {
        self.disclosures_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_disclosures_expired(&self) {
        self.disclosures_expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_claim_failures(&self) {
        self.claim_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_forced_disarm_failures(&self) {
        self.forced_disarm_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cards_served(&self) {
        self.cards_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cards_missing(&self) {
        self.cards_missing.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            taps: self.taps.load(Ordering::Relaxed),
            taps_setup: self.taps_setup.load(Ordering::Relaxed),
            taps_dashboard: self.taps_dashboard.load(Ordering::Relaxed),
            tokens_minted: self.tokens_minted.load(Ordering::Relaxed),
            tap_fail_open: self.tap_fail_open.load(Ordering::Relaxed),
            arms: self.arms.load(Ordering::Relaxed),
            disarms: self.disarms.load(Ordering::Relaxed),
            disclosures_served: self.disclosures_served.load(Ordering::Relaxed),
            disclosures_expired: self.disclosures_expired.load(Ordering::Relaxed),
            claim_failures: self.claim_failures.load(Ordering::Relaxed),
            forced_disarm_failures: self.forced_disarm_failures.load(Ordering::Relaxed),
            cards_served: self.cards_served.load(Ordering::Relaxed),
            cards_missing: self.cards_missing.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`ShareMetrics`] at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub taps: u64,
    pub taps_setup: u64,
    pub taps_dashboard: u64,
    pub tokens_minted: u64,
    pub tap_fail_open: u64,
    pub arms: u64,
    pub disarms: u64,
    pub disclosures_served: u64,
    pub disclosures_expired: u64,
    pub claim_failures: u64,
    pub forced_disarm_failures: u64,
    pub cards_served: u64,
    pub cards_missing: u64,
}
