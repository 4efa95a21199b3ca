//! Query budget and cooldown presets for the order-book endpoint.
//!
//! Both presets add ten seconds on top of the nominal window to absorb clock skew and
//! server-side slack.
use std::time::Duration;

/// Queries allowed per window with an authenticated session.
pub const AUTHENTICATED_MAX_QUERIES: u32 = 50;
/// Cooldown with an authenticated session: one minute plus a cushion.
pub const AUTHENTICATED_COOLDOWN: Duration = Duration::from_secs(60 + 10);
/// Queries allowed per window for anonymous access.
pub const ANONYMOUS_MAX_QUERIES: u32 = 25;
/// Cooldown for anonymous access: five minutes plus a cushion.
pub const ANONYMOUS_COOLDOWN: Duration = Duration::from_secs(5 * 60 + 10);

/// Rate limits of the market for one kind of session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Number of queries that may be issued before a cooldown is required.
    pub max_queries_per_window: u32,
    /// How long to wait once the budget is spent.
    pub cooldown: Duration,
}

impl RateLimitPolicy {
    /// Preset for the given authentication state.
    pub fn for_session(has_authenticated_session: bool) -> Self {
        if has_authenticated_session {
            RateLimitPolicy {
                max_queries_per_window: AUTHENTICATED_MAX_QUERIES,
                cooldown: AUTHENTICATED_COOLDOWN,
            }
        } else {
            RateLimitPolicy {
                max_queries_per_window: ANONYMOUS_MAX_QUERIES,
                cooldown: ANONYMOUS_COOLDOWN,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_preset() {
        let policy = RateLimitPolicy::for_session(true);
        assert_eq!(policy.max_queries_per_window, 50);
        assert_eq!(policy.cooldown, Duration::from_secs(70));
    }

    #[test]
    fn anonymous_preset() {
        let policy = RateLimitPolicy::for_session(false);
        assert_eq!(policy.max_queries_per_window, 25);
        assert_eq!(policy.cooldown, Duration::from_secs(310));
    }
}
