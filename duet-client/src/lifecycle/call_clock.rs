use crate::error::ConfigError;

/// Hard limit of a timed call, in seconds. Only built through `new`, so the
/// alert window always fits inside the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallLimit {
    max_duration: u64,
    /// The warning fires this many seconds before `max_duration`.
    alert_before: u64,
}

impl CallLimit {
    pub fn new(max_duration: u64, alert_before: u64) -> Result<Self, ConfigError> {
        let limit = Self {
            max_duration,
            alert_before,
        };
        limit.validate()?;
        Ok(limit)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alert_before >= self.max_duration {
            return Err(ConfigError::AlertWindowTooLarge {
                alert_before: self.alert_before,
                max_duration: self.max_duration,
            });
        }
        Ok(())
    }

    pub fn max_duration(&self) -> u64 {
        self.max_duration
    }

    pub fn alert_before(&self) -> u64 {
        self.alert_before
    }

    /// `None` when the window does not fit; no warning is due then.
    fn alert_at(&self) -> Option<u64> {
        self.max_duration.checked_sub(self.alert_before)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    Warning { remaining: u64 },
    Expired,
}

#[derive(Debug, Clone)]
pub struct CallClock {
    elapsed: u64,
    limit: Option<CallLimit>,
    alert_fired: bool,
    terminated: bool,
}

impl CallClock {
    pub fn new(limit: Option<CallLimit>) -> Self {
        Self {
            elapsed: 0,
            limit,
            alert_fired: false,
            terminated: false,
        }
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn display(&self) -> String {
        format_clock(self.elapsed)
    }

    /// Advances one second. Each signal is produced at most once; expiry
    /// wins when both fall on the same second.
    pub fn tick(&mut self) -> Option<ClockSignal> {
        self.elapsed += 1;

        let limit = self.limit?;
        if self.terminated {
            return None;
        }
        if self.elapsed >= limit.max_duration {
            self.terminated = true;
            return Some(ClockSignal::Expired);
        }
        if !self.alert_fired && Some(self.elapsed) == limit.alert_at() {
            self.alert_fired = true;
            return Some(ClockSignal::Warning {
                remaining: limit.max_duration - self.elapsed,
            });
        }
        None
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
        self.alert_fired = false;
        self.terminated = false;
    }
}

/// `MM:SS`; minutes keep growing past 99.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_remaining(seconds: u64) -> String {
    let (min, sec) = (seconds / 60, seconds % 60);
    if min > 0 {
        let mut text = format!("{} minute{}", min, if min > 1 { "s" } else { "" });
        if sec > 0 {
            text.push_str(&format!(" {} sec", sec));
        }
        text
    } else {
        format!("{} second{}", sec, if sec > 1 { "s" } else { "" })
    }
}

pub fn warning_message(remaining: u64) -> String {
    format!("Only {} remaining in the call!", format_remaining(remaining))
}
