//! Subuser operations (`/subusers`).

use crate::{Client, Result};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// A subuser account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Subuser {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Filter for [`Client::list_subusers`]. The default lists everything.
#[derive(Debug, Clone, Default)]
pub struct SubuserFilter {
    /// Only subusers whose username matches.
    pub username: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
    /// Page offset.
    pub offset: Option<u32>,
}

/// Parameters for creating a subuser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewSubuser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub ips: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreditAllocation {
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Response of [`Client::create_subuser`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedSubuser {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub signup_session_token: String,
    #[serde(default)]
    pub authorization_token: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub credit_allocation: CreditAllocation,
}

/// Sender reputation of a subuser.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Reputation {
    #[serde(default)]
    pub reputation: f64,
    #[serde(default)]
    pub username: String,
}

#[derive(Serialize)]
struct UpdateStatus {
    disabled: bool,
}

impl Client {
    /// Lists subusers, optionally filtered and paginated.
    pub async fn list_subusers(
        &self,
        filter: &SubuserFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<Subuser>> {
        let limit = filter.limit.map(|v| v.to_string());
        let offset = filter.offset.map(|v| v.to_string());

        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(username) = &filter.username {
            query.push(("username", username));
        }
        if let Some(limit) = &limit {
            query.push(("limit", limit));
        }
        if let Some(offset) = &offset {
            query.push(("offset", offset));
        }

        self.get_with_query("/subusers", &query, cancel).await
    }

    /// Fetches sender reputations for a comma-separated list of usernames.
    pub async fn get_subuser_reputations(
        &self,
        usernames: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Reputation>> {
        self.get_with_query(
            "/subusers/reputations",
            &[("usernames", usernames)],
            cancel,
        )
        .await
    }

    /// Creates a subuser.
    pub async fn create_subuser(
        &self,
        input: &NewSubuser,
        cancel: &CancellationToken,
    ) -> Result<CreatedSubuser> {
        self.post("/subusers", input, cancel).await
    }

    /// Enables or disables a subuser.
    pub async fn update_subuser_status(
        &self,
        username: &str,
        disabled: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.patch(
            &format!("/subusers/{username}"),
            &UpdateStatus { disabled },
            cancel,
        )
        .await
    }

    /// Replaces the dedicated IPs assigned to a subuser.
    pub async fn update_subuser_ips(
        &self,
        username: &str,
        ips: &[String],
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.put(&format!("/subusers/{username}/ips"), &ips, cancel)
            .await
    }

    /// Deletes a subuser.
    pub async fn delete_subuser(&self, username: &str, cancel: &CancellationToken) -> Result<()> {
        self.delete(&format!("/subusers/{username}"), cancel).await
    }
}
