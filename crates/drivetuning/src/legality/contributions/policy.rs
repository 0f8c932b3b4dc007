use std::collections::HashSet;

use crate::config::AdminConfig;

use super::domain::Identity;

/// Decides whether an identity may review contributions.
pub trait AdminPolicy: Send + Sync {
    fn is_admin(&self, identity: &Identity) -> bool;
}

/// Allow-list of user ids and e-mail addresses (compared case-insensitively).
#[derive(Debug, Clone, Default)]
pub struct AllowListAdminPolicy {
    user_ids: HashSet<String>,
    emails: HashSet<String>,
}

impl AllowListAdminPolicy {
    pub fn new<I, E>(user_ids: I, emails: E) -> Self
    where
        I: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        Self {
            user_ids: user_ids
                .into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
            emails: emails
                .into_iter()
                .map(|email| email.trim().to_ascii_lowercase())
                .filter(|email| !email.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.user_ids.iter().cloned(), config.emails.iter().cloned())
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty() && self.emails.is_empty()
    }
}

impl AdminPolicy for AllowListAdminPolicy {
    fn is_admin(&self, identity: &Identity) -> bool {
        if self.user_ids.contains(identity.user_id.trim()) {
            return true;
        }

        identity
            .email
            .as_deref()
            .map(|email| self.emails.contains(&email.trim().to_ascii_lowercase()))
            .unwrap_or(false)
    }
}
