/// Hosted-domain filter for Google OAuth logins.
///
/// Front ends call [`DomainAllowList::permits`] from their login callback with
/// the provider id and the `hd` claim of the Google profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainAllowList {
    domains: Vec<String>,
}

const GOOGLE_PROVIDER: &str = "google";

impl DomainAllowList {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    /// Parses a comma-separated list such as `example.com, corp.example.org`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// An empty list disables filtering.
    pub fn is_enabled(&self) -> bool {
        !self.domains.is_empty()
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn permits(&self, provider_id: &str, hosted_domain: Option<&str>) -> bool {
        if !self.is_enabled() {
            return true;
        }
        if provider_id != GOOGLE_PROVIDER {
            tracing::debug!(provider_id, "login rejected: provider is not allow-listed");
            return false;
        }
        let allowed = hosted_domain
            .map(|hd| self.domains.iter().any(|d| d.eq_ignore_ascii_case(hd.trim())))
            .unwrap_or(false);
        if !allowed {
            tracing::debug!(?hosted_domain, "login rejected: hosted domain is not allow-listed");
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_entries() {
        let list = DomainAllowList::parse(" Google.com, ,example.org ");
        assert_eq!(list.domains(), ["google.com", "example.org"]);
        assert!(list.is_enabled());
    }

    #[test]
    fn test_permits_listed_google_domain() {
        let list = DomainAllowList::new(["google.com"]);
        assert!(list.permits("google", Some("google.com")));
        assert!(list.permits("google", Some("GOOGLE.COM")));
        assert!(!list.permits("google", Some("evil.com")));
        assert!(!list.permits("google", None));
    }

    #[test]
    fn test_rejects_other_providers() {
        let list = DomainAllowList::new(["google.com"]);
        assert!(!list.permits("github", Some("google.com")));
    }

    #[test]
    fn test_empty_list_permits_everyone() {
        let list = DomainAllowList::parse("");
        assert!(!list.is_enabled());
        assert!(list.permits("github", None));
    }
}
