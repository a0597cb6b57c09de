//! Connection-string handling.
//!
//! A single connection string picks the store backend. Heroku-style
//! `postgres://` URLs are rewritten to `postgresql://`, and the diagnostics
//! endpoint only ever sees the credential-masked form.

use crate::error::DbError;

/// Scheme selecting the in-process store.
pub const MEMORY_SCHEME: &str = "memory";

/// Which store a connection string selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// `PostgreSQL` at the (normalized) URL.
    Postgres {
        /// `postgresql://` connection URL.
        url: String,
    },
    /// Process-local store; contents are lost on exit.
    Memory,
}

impl StoreBackend {
    /// Pick a backend from a connection string.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] for an empty string or an unknown scheme.
    pub fn from_url(url: &str) -> Result<Self, DbError> {
        let url = url.trim();
        match url.split_once("://").map(|(scheme, _)| scheme) {
            Some("postgres" | "postgresql") => Ok(Self::Postgres {
                url: normalize_postgres_url(url),
            }),
            Some(MEMORY_SCHEME) => Ok(Self::Memory),
            Some(other) => Err(DbError::Config(format!(
                "unsupported database scheme: {other}"
            ))),
            None => Err(DbError::Config(String::from(
                "database URL has no scheme",
            ))),
        }
    }
}

/// Rewrite a leading `postgres://` to `postgresql://`.
pub fn normalize_postgres_url(url: &str) -> String {
    url.strip_prefix("postgres://").map_or_else(
        || url.to_owned(),
        |rest| format!("postgresql://{rest}"),
    )
}

/// Hide credentials in a connection string.
///
/// Everything between the scheme and the last `@` is replaced with `****`,
/// e.g. `postgresql://user:pw@db:5432/app` becomes
/// `postgresql://****db:5432/app`. URLs without credentials keep their
/// host part after the mask.
pub fn mask_database_url(url: &str) -> String {
    let (scheme, rest) = url.split_once("://").unwrap_or(("", url));
    let tail = rest.rsplit_once('@').map_or(rest, |(_, host)| host);
    format!("{scheme}://****{tail}")
}
