//! Location fix types and the sink that receives them.
//!
//! - [`RawFix`] - what the fix stream hands us, carrying the provider's own timestamp
//! - [`LocationFix`] - what the sink receives, stamped with the time we received it
//! - [`FixSink`] - consumer of delivered fixes (display, logging)

use std::fmt;

use chrono::{DateTime, Local, Utc};

/// A position as reported by the fix stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFix {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,

    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,

    /// When the provider computed the fix.
    pub reported_at: DateTime<Utc>,
}

impl RawFix {
    /// Create a raw fix reported now.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            reported_at: Utc::now(),
        }
    }
}

/// A delivered location update.
///
/// `timestamp` is the wall-clock time of receipt, not the provider's fix
/// time, so consecutive fixes read in arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    /// Latitude in degrees.
    pub latitude: f64,

    /// Longitude in degrees.
    pub longitude: f64,

    /// Wall-clock time the fix was received.
    pub timestamp: DateTime<Utc>,

    /// Provider timestamp, kept for diagnostics.
    pub reported_at: DateTime<Utc>,
}

impl LocationFix {
    /// Stamp a raw fix with the current time.
    pub fn received(raw: RawFix) -> Self {
        Self::received_at(raw, Utc::now())
    }

    /// Stamp a raw fix with an explicit receipt time.
    pub fn received_at(raw: RawFix, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude: raw.latitude,
            longitude: raw.longitude,
            timestamp,
            reported_at: raw.reported_at,
        }
    }
}

impl fmt::Display for LocationFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  lat {:.6}, lon {:.6}",
            self.timestamp.with_timezone(&Local).format("%H:%M:%S"),
            self.latitude,
            self.longitude
        )
    }
}

/// Receiver of delivered fixes.
///
/// Called once per fix, in receipt order, from the subscription's forwarding
/// task. Implementations must not block.
pub trait FixSink: Send + Sync {
    /// Handle one delivered fix.
    fn on_fix(&self, fix: LocationFix);
}

impl<F> FixSink for F
where
    F: Fn(LocationFix) + Send + Sync,
{
    fn on_fix(&self, fix: LocationFix) {
        self(fix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_received_uses_receipt_time() {
        let reported = Utc::now() - chrono::Duration::seconds(30);
        let raw = RawFix {
            latitude: 53.5,
            longitude: 10.0,
            reported_at: reported,
        };

        let fix = LocationFix::received(raw);

        assert_eq!(fix.reported_at, reported);
        assert!(fix.timestamp > reported);
        assert_eq!(fix.latitude, 53.5);
        assert_eq!(fix.longitude, 10.0);
    }

    #[test]
    fn test_display_includes_coordinates() {
        let fix = LocationFix::received(RawFix::new(53.630278, 9.988333));
        let text = fix.to_string();

        assert!(text.contains("lat 53.630278"), "got: {}", text);
        assert!(text.contains("lon 9.988333"), "got: {}", text);
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let sink: Arc<dyn FixSink> = Arc::new(move |fix: LocationFix| {
            seen_clone.lock().unwrap().push(fix.latitude);
        });

        sink.on_fix(LocationFix::received(RawFix::new(1.0, 2.0)));
        sink.on_fix(LocationFix::received(RawFix::new(3.0, 4.0)));

        assert_eq!(*seen.lock().unwrap(), vec![1.0, 3.0]);
    }
}
