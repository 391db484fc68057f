//! Metrics recorder for relay operations
//!
//! Records message intake, delivery outcomes and connection counts.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize metric descriptions (call once at startup)
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return; // Already initialized
    }

    // Intake counters
    describe_counter!(
        "mms_messages_submitted_total",
        "Total number of messages accepted for delivery"
    );
    describe_counter!(
        "mms_frames_rejected_total",
        "Total number of inbound frames rejected at validation"
    );

    // Delivery counters
    describe_counter!(
        "mms_deliveries_total",
        "Terminal delivery outcomes by channel"
    );
    describe_counter!(
        "mms_send_failures_total",
        "Direct forwards that failed and fell back to routing"
    );

    // Gauges
    describe_gauge!(
        "mms_active_connections",
        "Number of identifiers with a live connection"
    );
    describe_gauge!(
        "mms_pending_resolutions",
        "Routed messages waiting for their simulated resolution"
    );

    // Histograms
    describe_histogram!(
        "mms_routed_resolution_seconds",
        "Time from routing to terminal state"
    );
}

// ============== Intake ==============

/// Record a message accepted into the store
pub fn record_message_submitted(message_type: &str) {
    counter!("mms_messages_submitted_total", "message_type" => message_type.to_string())
        .increment(1);
}

/// Record a frame rejected before persistence
pub fn record_frame_rejected(reason: &str) {
    counter!("mms_frames_rejected_total", "reason" => reason.to_string()).increment(1);
}

// ============== Delivery ==============

/// Record a terminal delivery outcome
pub fn record_delivery(channel: &str, outcome: &str) {
    counter!("mms_deliveries_total", "channel" => channel.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

/// Record a failed direct forward
pub fn record_send_failure() {
    counter!("mms_send_failures_total").increment(1);
}

/// Update the pending resolution gauge
pub fn set_pending_resolutions(pending: usize) {
    gauge!("mms_pending_resolutions").set(pending as f64);
}

// ============== Presence ==============

/// Update the active connection gauge
pub fn set_active_connections(count: usize) {
    gauge!("mms_active_connections").set(count as f64);
}

/// Times a routed resolution from scheduling to terminal state
pub struct ResolutionTimer {
    start_time: Instant,
}

impl ResolutionTimer {
    pub fn start() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Stop timing and record the duration
    pub fn stop(self) {
        histogram!("mms_routed_resolution_seconds").record(self.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics() {
        // Should not panic when called multiple times
        init_metrics();
        init_metrics();
    }

    #[test]
    fn test_recording_without_exporter() {
        record_message_submitted("distress");
        record_frame_rejected("missing_field");
        record_delivery("satellite", "delivered");
        record_send_failure();
        set_pending_resolutions(3);
        set_active_connections(2);
    }

    #[test]
    fn test_resolution_timer() {
        let timer = ResolutionTimer::start();
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed() >= Duration::from_millis(10));
        timer.stop(); // Should not panic
    }
}
