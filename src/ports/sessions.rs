//! Session port: Trait for authenticated session tracking.

/// Maps opaque session tokens to authenticated usernames.
pub trait SessionStore: Send + Sync {
    /// Open a session for `username` and return its token.
    ///
    /// # Returns
    /// `None` if the session could not be recorded.
    fn open(&self, username: &str) -> Option<String>;

    /// Resolve a token to its username.
    ///
    /// # Returns
    /// `None` if the token is unknown or expired.
    fn lookup(&self, token: &str) -> Option<String>;

    /// End a session.
    ///
    /// # Returns
    /// `true` if a live session was removed.
    fn revoke(&self, token: &str) -> bool;
}
