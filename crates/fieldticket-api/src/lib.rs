// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use fieldticket_app::{
    DeleteOutcome, DeleteRequest, Lease, PasswordUpdate, UserDetails, UserId, UserTag,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_DOMAIN: &str = "ogfieldticket.com";
pub const DEFAULT_TENANT: &str = "test";

const LEASES_PATH: &str = "api/leases.php";
const USER_TAGS_PATH: &str = "api/usertags.php";
const USER_DETAILS_PATH: &str = "api/userdetails.php";

/// Tenant label encoded in a hostname: the first label when the host has
/// more than two.
pub fn tenant_from_host(host: &str) -> Option<&str> {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() > 2 && !labels[0].is_empty() {
        Some(labels[0])
    } else {
        None
    }
}

/// `https://{tenant}.{domain}`. An explicit subdomain wins over one derived
/// from `host`; with neither, the default tenant is used.
pub fn tenant_base_url(domain: &str, host: Option<&str>, subdomain: Option<&str>) -> Result<Url> {
    let domain = domain.trim().trim_matches('.');
    if domain.is_empty() {
        bail!("api domain must not be empty -- set [api].domain");
    }
    let tenant = subdomain
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| host.and_then(tenant_from_host))
        .unwrap_or(DEFAULT_TENANT);
    let raw = format!("https://{tenant}.{domain}/");
    Url::parse(&raw).with_context(|| format!("build tenant url {raw:?}"))
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            bail!("api base url must not be empty");
        }
        let mut base_url = Url::parse(trimmed)
            .with_context(|| format!("api base url {trimmed:?} is not a valid URL"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "api base url {trimmed:?} must use http or https, got {}",
                base_url.scheme()
            );
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn list_leases(&self) -> Result<Vec<Lease>> {
        let url = self.endpoint(LEASES_PATH)?;
        debug!(url = %url, "fetching leases");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;
        let response = expect_ok(response)?;
        let leases: Option<Vec<Lease>> = response.json().context("decode lease list")?;
        Ok(leases.unwrap_or_default())
    }

    pub fn update_lease(&self, lease: &Lease) -> Result<()> {
        let url = self.endpoint(LEASES_PATH)?;
        debug!(lease = %lease.id, tanks = lease.tanks.len(), wells = lease.wells.len(), "saving lease");
        let response = self
            .http
            .patch(url)
            .json(lease)
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;
        expect_ok(response)?;
        Ok(())
    }

    /// A 200 means the entity is gone; any other status means the server
    /// refused, which for this endpoint is a reference conflict.
    pub fn delete_nested(&self, request: &DeleteRequest) -> Result<DeleteOutcome> {
        let url = self.endpoint(LEASES_PATH)?;
        debug!(lease = %request.lease_id, uniq_id = %request.uniq_id, "deleting nested entity");
        let response = self
            .http
            .delete(url)
            .json(&request.body())
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(DeleteOutcome::Deleted);
        }
        let body = response.text().unwrap_or_default();
        warn!(
            lease = %request.lease_id,
            uniq_id = %request.uniq_id,
            status = status.as_u16(),
            "{}",
            clean_error_response(status, &body)
        );
        Ok(DeleteOutcome::InUse {
            status: status.as_u16(),
        })
    }

    pub fn list_user_tags(&self) -> Result<Vec<UserTag>> {
        let url = self.endpoint(USER_TAGS_PATH)?;
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;
        let response = expect_ok(response)?;
        let rows: Option<Vec<UserTag>> = response.json().context("decode user tags")?;
        Ok(rows.unwrap_or_default())
    }

    pub fn get_user_details(&self, user_id: &UserId) -> Result<UserDetails> {
        let mut url = self.endpoint(USER_DETAILS_PATH)?;
        url.query_pairs_mut().append_pair("id", user_id.as_str());
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;
        let response = expect_ok(response)?;
        let envelope: UserDetailsEnvelope = response.json().context("decode user details")?;
        if !envelope.success {
            bail!("server could not load user {user_id} -- check the user id and sign in again");
        }
        envelope
            .users
            .into_iter()
            .find(|user| &user.user_id == user_id)
            .ok_or_else(|| anyhow!("user {user_id} not found in user details response"))
    }

    /// Returns the server's `success` flag.
    pub fn update_user_details(&self, user: &UserDetails) -> Result<bool> {
        let url = self.endpoint(USER_DETAILS_PATH)?;
        let response = self
            .http
            .patch(url)
            .json(user)
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;
        let response = expect_ok(response)?;
        let ack: SuccessEnvelope = response.json().context("decode profile update response")?;
        Ok(ack.success)
    }

    pub fn change_password(&self, update: &PasswordUpdate) -> Result<bool> {
        let url = self.endpoint(USER_DETAILS_PATH)?;
        let response = self
            .http
            .patch(url)
            .json(update)
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;
        let response = expect_ok(response)?;
        let ack: SuccessEnvelope = response.json().context("decode password change response")?;
        Ok(ack.success)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("build url for {path}"))
    }
}

fn expect_ok(response: Response) -> Result<Response> {
    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().unwrap_or_default();
        return Err(clean_error_response(status, &body));
    }
    Ok(response)
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!(
            "request to {base_url} timed out -- raise [api].timeout or check the network ({error})"
        );
    }
    anyhow!("cannot reach {base_url} -- check [api] settings and the network ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body) {
        let message = parsed.message.or(parsed.error).unwrap_or_default();
        if !message.is_empty() {
            return anyhow!("server error ({}): {}", status.as_u16(), message);
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), trimmed);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuccessEnvelope {
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct UserDetailsEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    users: Vec<UserDetails>,
}
