//! Shared-secret handling
//!
//! Configured passwords are never sent to browsers in clear. Pages receive
//! their SHA-256 hex digest through template placeholders, and the relay
//! accepts the same digest as its `auth` query parameter.

use sha2::{Digest, Sha256};

use crate::config::AuthConfig;

pub const PASSWORD_PLACEHOLDER: &str = "{{PASSWORD}}";
pub const ADMIN_PASSWORD_PLACEHOLDER: &str = "{{ADMINPASSWORD}}";

pub fn sha256_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

#[derive(Debug, Clone, Default)]
pub struct SharedSecrets {
    password_hash: Option<String>,
    admin_password_hash: Option<String>,
}

impl SharedSecrets {
    pub fn from_config(config: &AuthConfig) -> Self {
        let digest = |secret: &Option<String>| {
            secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(sha256_hex)
        };
        Self {
            password_hash: digest(&config.password),
            admin_password_hash: digest(&config.admin_password),
        }
    }

    pub fn password_required(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Check a caller-supplied digest against the configured password
    ///
    /// Always true when no password is configured.
    pub fn verify(&self, candidate: Option<&str>) -> bool {
        match (&self.password_hash, candidate) {
            (None, _) => true,
            (Some(expected), Some(given)) => expected.eq_ignore_ascii_case(given.trim()),
            (Some(_), None) => false,
        }
    }

    /// Substitute the password digests into a page template
    pub fn render(&self, template: &str) -> String {
        template
            .replace(
                PASSWORD_PLACEHOLDER,
                self.password_hash.as_deref().unwrap_or_default(),
            )
            .replace(
                ADMIN_PASSWORD_PLACEHOLDER,
                self.admin_password_hash.as_deref().unwrap_or_default(),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_DIGEST: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn secrets(password: Option<&str>, admin: Option<&str>) -> SharedSecrets {
        SharedSecrets::from_config(&AuthConfig {
            password: password.map(str::to_string),
            admin_password: admin.map(str::to_string),
        })
    }

    #[test]
    fn digest_is_lowercase_hex() {
        assert_eq!(sha256_hex("hello"), HELLO_DIGEST);
    }

    #[test]
    fn render_substitutes_both_placeholders() {
        let page = "<script>window.__PW='{{PASSWORD}}';window.__ADMIN='{{ADMINPASSWORD}}';</script>";
        let rendered = secrets(Some("hello"), None).render(page);
        assert_eq!(
            rendered,
            format!("<script>window.__PW='{HELLO_DIGEST}';window.__ADMIN='';</script>")
        );
    }

    #[test]
    fn verify_without_password_accepts_everything() {
        let open = secrets(None, None);
        assert!(!open.password_required());
        assert!(open.verify(None));
        assert!(open.verify(Some("anything")));
    }

    #[test]
    fn verify_with_password_requires_digest() {
        let locked = secrets(Some("hello"), Some("root"));
        assert!(locked.password_required());
        assert!(locked.verify(Some(HELLO_DIGEST)));
        assert!(locked.verify(Some(&HELLO_DIGEST.to_uppercase())));
        assert!(!locked.verify(Some("hello")));
        assert!(!locked.verify(None));
    }

    #[test]
    fn empty_password_counts_as_unset() {
        assert!(!secrets(Some(""), None).password_required());
    }
}
