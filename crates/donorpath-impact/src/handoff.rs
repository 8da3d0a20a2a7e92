//! Outbound link to the external donation provider.

use donorpath_core::error::DomainError;
use url::Url;

/// Donation page used when no other is configured.
pub const DEFAULT_DONATE_URL: &str = "https://www.kenyaeducationfund.org/donate";

/// Parses `raw` as an absolute `http` or `https` URL with a host.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `raw` does not parse, uses another
/// scheme, or names no host.
pub fn parse_web_url(raw: &str) -> Result<Url, DomainError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| DomainError::Validation(format!("{raw} is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DomainError::Validation(format!("{raw} must use http or https")));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(DomainError::Validation(format!("{raw} has no host")));
    }
    Ok(url)
}

/// Builds donation links carrying the chosen amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationHandoff {
    base_url: Url,
}

impl DonationHandoff {
    /// Creates a handoff targeting `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Creates a handoff from an unparsed donation page address.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `raw` is not an http(s) URL with
    /// a host.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        parse_web_url(raw).map(Self::new)
    }

    /// The configured donation page.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Donation link for `amount` dollars.
    ///
    /// The amount joins any query the page already carries; a fragment stays
    /// at the end.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if `amount` is not a positive
    /// finite number.
    pub fn link(&self, amount: f64) -> Result<String, DomainError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DomainError::InvalidAmount(amount));
        }
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("amount", &amount.to_string());
        Ok(url.into())
    }
}

impl Default for DonationHandoff {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_DONATE_URL).expect("DEFAULT_DONATE_URL is a valid URL"))
    }
}
