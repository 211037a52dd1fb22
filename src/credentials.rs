//! Provider credential discovery and pooling
//!
//! Credentials are discovered once at startup from a primary slot
//! (`PREFIX`) followed by numbered alternates (`PREFIX_2`, `PREFIX_3`, ...).
//! Discovery stops at the first missing number. The resulting pool is
//! immutable for the life of the process.

use crate::error::{JarvisError, Result};
use std::fmt;

/// A single opaque provider credential
///
/// The `Debug` and `Display` implementations never print the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw credential string
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret, for building request headers only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form suitable for logs
    ///
    /// # Examples
    ///
    /// ```
    /// use jarvis::credentials::Credential;
    ///
    /// let key = Credential::new("gsk_abcdefghijklmnop");
    /// assert_eq!(key.masked(), "gsk_...mnop");
    /// assert_eq!(Credential::new("short").masked(), "****");
    /// ```
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 12 {
            return "****".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.masked())
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Ordered, non-empty pool of provider credentials
#[derive(Debug, Clone)]
pub struct CredentialPool {
    credentials: Vec<Credential>,
}

impl CredentialPool {
    /// Build a pool from raw credential strings
    ///
    /// Blank entries are dropped.
    ///
    /// # Errors
    ///
    /// Returns `JarvisError::MissingCredentials` if no usable credential remains
    pub fn new<I, S>(provider: &str, secrets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let credentials: Vec<Credential> = secrets
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .map(Credential::new)
            .collect();

        if credentials.is_empty() {
            return Err(JarvisError::MissingCredentials(provider.to_string()).into());
        }

        Ok(Self { credentials })
    }

    /// Number of credentials in the pool (always at least one)
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Credential at `index`, wrapping modulo the pool size
    pub fn get(&self, index: usize) -> &Credential {
        &self.credentials[index % self.credentials.len()]
    }
}

/// Discover a contiguous run of numbered credentials
///
/// Reads `prefix`, then `prefix_2`, `prefix_3`, ... until a slot is missing
/// or blank. A blank primary slot is skipped but does not stop discovery.
///
/// # Examples
///
/// ```
/// use jarvis::credentials::discover_credentials;
///
/// let lookup = |key: &str| match key {
///     "API_KEY" => Some("a".to_string()),
///     "API_KEY_2" => Some("b".to_string()),
///     "API_KEY_4" => Some("d".to_string()),
///     _ => None,
/// };
/// assert_eq!(discover_credentials("API_KEY", lookup), vec!["a", "b"]);
/// ```
pub fn discover_credentials<F>(prefix: &str, lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let mut keys = Vec::new();
    if let Some(primary) = read(prefix) {
        keys.push(primary);
    }

    let mut n = 2;
    while let Some(key) = read(&format!("{}_{}", prefix, n)) {
        keys.push(key);
        n += 1;
    }

    keys
}
