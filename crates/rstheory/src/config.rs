//! Discovery configuration, read from the environment.

/// Environment variable selecting the policy for unresolvable member
/// references. `error` (or `strict`) makes them fatal.
pub const MISSING_MEMBER_ENV: &str = "RSTHEORY_MISSING_MEMBER";

/// What a member data source does when no static member matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingMemberPolicy {
    /// Resolve to zero rows and log a warning.
    #[default]
    Empty,
    /// Fail discovery of the method.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscoveryConfig {
    pub missing_member: MissingMemberPolicy,
}

impl DiscoveryConfig {
    pub fn new(missing_member: MissingMemberPolicy) -> Self {
        DiscoveryConfig { missing_member }
    }

    /// Read `RSTHEORY_MISSING_MEMBER`. Unset or unrecognized values keep
    /// the default.
    pub fn from_env() -> Self {
        let missing_member = match std::env::var(MISSING_MEMBER_ENV) {
            Ok(v) => parse_policy(&v),
            Err(_) => MissingMemberPolicy::default(),
        };
        DiscoveryConfig { missing_member }
    }
}

fn parse_policy(value: &str) -> MissingMemberPolicy {
    match value.trim().to_ascii_lowercase().as_str() {
        "error" | "strict" | "1" | "true" => MissingMemberPolicy::Error,
        _ => MissingMemberPolicy::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy() {
        assert_eq!(parse_policy("error"), MissingMemberPolicy::Error);
        assert_eq!(parse_policy(" Strict "), MissingMemberPolicy::Error);
        assert_eq!(parse_policy("1"), MissingMemberPolicy::Error);
        assert_eq!(parse_policy("empty"), MissingMemberPolicy::Empty);
        assert_eq!(parse_policy(""), MissingMemberPolicy::Empty);
    }

    #[test]
    fn test_default_is_silent() {
        assert_eq!(
            DiscoveryConfig::default().missing_member,
            MissingMemberPolicy::Empty
        );
    }
}
