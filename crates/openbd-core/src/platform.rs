//! Thin client over the Heroku-style platform API used by the create
//! workflow. Latency and transient failures are the platform's problem:
//! every call here is a single request whose error surfaces directly.

use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.heroku.com";

/// API token for the platform.
pub const API_KEY_ENV: &str = "HEROKU_API_KEY";

/// Buildpack every openbd app is created with.
pub const BUILDPACK_URL: &str = "http://github.com/heathprovost/openbd-heroku.git";

pub const DEFAULT_STACK: &str = "cedar";

/// Labs feature required for the buildpack to see config vars at compile
/// time.
pub const USER_ENV_COMPILE: &str = "user-env-compile";

#[derive(Debug, Clone, Deserialize)]
pub struct AppInfo {
    pub name: String,
    #[serde(default)]
    pub create_status: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub git_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureInfo {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
}

pub struct PlatformClient {
    base: Url,
    token: String,
    client: reqwest::Client,
}

impl PlatformClient {
    pub fn new(base: Url, token: String) -> Self {
        Self {
            base,
            token,
            client: reqwest::Client::new(),
        }
    }

    /// Client authenticated from `HEROKU_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(API_KEY_ENV)
            .with_context(|| format!("{API_KEY_ENV} is not set; log in to the platform first"))?;
        let base = Url::parse(DEFAULT_API_URL).context("invalid platform API URL")?;
        Ok(Self::new(base, token))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| anyhow::anyhow!("platform URL cannot have path segments"))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn check(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            anyhow::bail!("{what} failed: HTTP {}", response.status())
        }
    }

    /// Provision an app. A `None` name lets the platform pick one.
    pub async fn create_app(&self, name: Option<&str>, stack: &str) -> Result<AppInfo> {
        let mut body = json!({ "stack": stack });
        if let Some(name) = name {
            body["name"] = json!(name);
        }
        let response = self
            .client
            .post(self.endpoint(&["apps"])?)
            .basic_auth("", Some(&self.token))
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .context("failed to reach the platform API")?;
        let response = Self::check(response, "app creation").await?;
        response.json().await.context("invalid app creation response")
    }

    /// Creation status of an app; polled until `complete`.
    pub async fn app_status(&self, name: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.endpoint(&["apps", name])?)
            .basic_auth("", Some(&self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("failed to reach the platform API")?;
        let response = Self::check(response, "app status check").await?;
        let info: AppInfo = response.json().await.context("invalid app status response")?;
        Ok(info.create_status)
    }

    pub async fn set_config_vars(&self, name: &str, vars: &HashMap<String, String>) -> Result<()> {
        let response = self
            .client
            .put(self.endpoint(&["apps", name, "config_vars"])?)
            .basic_auth("", Some(&self.token))
            .header("Accept", "application/json")
            .json(vars)
            .send()
            .await
            .context("failed to reach the platform API")?;
        Self::check(response, "setting config vars").await?;
        Ok(())
    }

    pub async fn install_addon(&self, name: &str, addon: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint(&["apps", name, "addons", addon])?)
            .basic_auth("", Some(&self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("failed to reach the platform API")?;
        Self::check(response, format!("installing addon {addon}").as_str()).await?;
        Ok(())
    }

    pub async fn list_features(&self) -> Result<Vec<FeatureInfo>> {
        let response = self
            .client
            .get(self.endpoint(&["features"])?)
            .basic_auth("", Some(&self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("failed to reach the platform API")?;
        let response = Self::check(response, "listing features").await?;
        response.json().await.context("invalid feature list response")
    }

    pub async fn enable_feature(&self, feature: &str, app: &str) -> Result<()> {
        let mut url = self.endpoint(&["features", feature])?;
        url.query_pairs_mut().append_pair("app", app);
        let response = self
            .client
            .post(url)
            .basic_auth("", Some(&self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("failed to reach the platform API")?;
        Self::check(response, format!("enabling feature {feature}").as_str()).await?;
        Ok(())
    }
}

/// Random alphanumeric admin-console password.
pub fn generate_password(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| rng.sample(rand::distributions::Alphanumeric) as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_rooted_at_the_base_url() {
        let client = PlatformClient::new(
            Url::parse("https://api.example.com").unwrap(),
            "token".to_string(),
        );
        assert_eq!(
            client.endpoint(&["apps"]).unwrap().as_str(),
            "https://api.example.com/apps"
        );
        assert_eq!(
            client
                .endpoint(&["apps", "demo", "config_vars"])
                .unwrap()
                .as_str(),
            "https://api.example.com/apps/demo/config_vars"
        );
    }

    #[test]
    fn generated_passwords_are_alphanumeric() {
        let password = generate_password(16);
        assert_eq!(password.len(), 16);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        // Vanishingly unlikely to collide.
        assert_ne!(password, generate_password(16));
    }
}
