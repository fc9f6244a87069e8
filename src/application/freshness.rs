//! Cache freshness policy.

use time::{Duration, OffsetDateTime};

/// Default entry lifetime: one week.
pub const DEFAULT_TTL: Duration = Duration::milliseconds(604_800_000);

/// An entry is usable iff strictly less than `ttl` has elapsed since its
/// last successful refresh. Staleness is discovered here, lazily, at lookup
/// time; nothing actively expires entries.
pub fn is_fresh(updated_at: OffsetDateTime, now: OffsetDateTime, ttl: Duration) -> bool {
    now - updated_at < ttl
}
