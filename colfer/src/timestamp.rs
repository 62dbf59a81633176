//! The timestamp value type.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A moment on the wire clock: seconds since the Unix epoch plus a
/// nanosecond remainder.
///
/// The zero value (epoch, zero nanoseconds) is the absent-field value
/// and is omitted from serials. `nanos` may hold any value; encoding
/// normalizes it into `[0, 1_000_000_000)`, carrying whole seconds and
/// borrowing one second when the remainder runs negative.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Timestamp {
    /// Seconds since the Unix epoch, before the epoch when negative.
    pub seconds: i64,
    /// Nanosecond offset from `seconds`.
    pub nanos: i32,
}

impl Timestamp {
    pub const fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Whether this is the zero value that serials omit.
    pub const fn is_zero(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }

    /// Seconds with the nanosecond carry applied, and the remainder
    /// reduced into `[0, 1_000_000_000)`.
    pub fn normalized(&self) -> (i64, u32) {
        let mut s = self.seconds.wrapping_add(i64::from(self.nanos) / NANOS_PER_SEC);
        let mut ns = i64::from(self.nanos) % NANOS_PER_SEC;
        if ns < 0 {
            s = s.wrapping_sub(1);
            ns += NANOS_PER_SEC;
        }
        (s, ns as u32)
    }

    /// The equivalent [`SystemTime`], when the platform can represent
    /// it.
    pub fn to_system_time(&self) -> Option<SystemTime> {
        let (s, ns) = self.normalized();
        if s >= 0 {
            UNIX_EPOCH.checked_add(Duration::new(s as u64, ns))
        } else {
            // ns counts forward from the (negative) second boundary.
            let back = Duration::new(s.unsigned_abs(), 0) - Duration::new(0, ns);
            UNIX_EPOCH.checked_sub(back)
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(t: SystemTime) -> Self {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => Self {
                seconds: d.as_secs() as i64,
                nanos: d.subsec_nanos() as i32,
            },
            Err(e) => {
                let d = e.duration();
                let mut seconds = -(d.as_secs() as i64);
                let mut nanos = 0;
                let rem = d.subsec_nanos();
                if rem > 0 {
                    seconds -= 1;
                    nanos = (NANOS_PER_SEC as u32 - rem) as i32;
                }
                Self { seconds, nanos }
            }
        }
    }
}
