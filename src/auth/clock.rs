use chrono::Utc;

/// Source of "now" for expiry checks, in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;

    /// Current instant as fractional epoch seconds, the unit of `exp`/`nbf`.
    #[allow(clippy::cast_precision_loss)]
    fn now_seconds(&self) -> f64 {
        self.now_millis() as f64 / 1000.0
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock pinned to a fixed instant.
#[cfg(test)]
#[derive(Clone, Copy, Debug)]
pub(crate) struct FixedClock {
    millis: i64,
}

#[cfg(test)]
impl FixedClock {
    pub(crate) const fn at(seconds: i64) -> Self {
        Self {
            millis: seconds * 1000,
        }
    }

    pub(crate) const fn at_millis(millis: i64) -> Self {
        Self { millis }
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis
    }
}
