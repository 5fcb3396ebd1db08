use chrono::Local;

/// Source of the caller's current local UTC offset.
///
/// Queried once per fetch so that two calls straddling a DST transition may
/// observe different offsets.
pub trait UtcOffsetSource: Send + Sync {
    /// Seconds to add to a UTC epoch to obtain local wall-clock seconds.
    fn offset_seconds(&self) -> i64;
}

/// Reads the offset of the host's local time zone at call time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOffset;

impl UtcOffsetSource for LocalOffset {
    fn offset_seconds(&self) -> i64 {
        i64::from(Local::now().offset().local_minus_utc())
    }
}

/// A constant offset, for tests and for deployments pinned to one zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedOffset(pub i64);

impl UtcOffsetSource for FixedOffset {
    fn offset_seconds(&self) -> i64 {
        self.0
    }
}
