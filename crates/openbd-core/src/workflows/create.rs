//! `create` workflow: provision a remote app wired up for openbd.

use crate::display::{DisplayMode, Reporter};
use crate::error::Error;
use crate::git;
use crate::platform::{self, PlatformClient};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CreateArgs {
    /// App name; the platform picks one when omitted.
    pub name: Option<String>,
    /// Comma-delimited addons to install.
    pub addons: Option<String>,
    /// Skip creating a git remote.
    pub no_remote: bool,
    /// Name of the git remote to create.
    pub remote: String,
    /// Admin console password; auto-generated when omitted.
    pub password: Option<String>,
    /// Seconds to wait for app provisioning.
    pub timeout_secs: u64,
}

impl Default for CreateArgs {
    fn default() -> Self {
        Self {
            name: None,
            addons: None,
            no_remote: false,
            remote: "heroku".to_string(),
            password: None,
            timeout_secs: 30,
        }
    }
}

/// Run create from `project_dir` (used for the git remote).
pub async fn run(project_dir: &Path, args: CreateArgs) -> Result<()> {
    let reporter = Reporter::new(DisplayMode::Terse);
    let client = PlatformClient::from_env()?;
    let password = args
        .password
        .clone()
        .unwrap_or_else(|| platform::generate_password(16));

    let info = client
        .create_app(args.name.as_deref(), platform::DEFAULT_STACK)
        .await?;

    let provisioned = wait_until_ready(&client, &info.name, info.create_status.as_deref(), &args, &reporter)
        .await?;
    if provisioned {
        match &info.region {
            Some(region) => {
                reporter.progress_done(format!("Creating {}... done, region is {region}", info.name))
            }
            None => reporter.progress_done(format!(
                "Creating {}... done, stack is {}",
                info.name,
                info.stack.as_deref().unwrap_or(platform::DEFAULT_STACK)
            )),
        }

        for addon in args
            .addons
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
        {
            reporter.progress(format!("Adding {addon} to {}...", info.name));
            client.install_addon(&info.name, addon).await?;
            reporter.progress_done(format!("Adding {addon} to {}... done", info.name));
        }

        let mut vars = HashMap::new();
        vars.insert(
            "BUILDPACK_URL".to_string(),
            platform::BUILDPACK_URL.to_string(),
        );
        client.set_config_vars(&info.name, &vars).await?;

        let mut vars = HashMap::new();
        vars.insert("OPENBD_PASSWORD".to_string(), password);
        client.set_config_vars(&info.name, &vars).await?;

        if let (Some(web_url), Some(git_url)) = (&info.web_url, &info.git_url) {
            reporter.plain(format!("{web_url} | {git_url}"));
        }
    }

    if !args.no_remote {
        if let Some(git_url) = &info.git_url {
            git::add_remote(project_dir, &args.remote, git_url, &reporter)?;
        }
    }

    let features = client.list_features().await?;
    if !features
        .iter()
        .any(|f| f.name == platform::USER_ENV_COMPILE)
    {
        return Err(Error::FeatureUnavailable {
            feature: platform::USER_ENV_COMPILE.to_string(),
        }
        .into());
    }
    client
        .enable_feature(platform::USER_ENV_COMPILE, &info.name)
        .await?;

    Ok(())
}

/// Poll creation status until the platform reports `complete`. A timeout
/// is reported to the user and skips the remaining provisioning steps, but
/// is not an error.
async fn wait_until_ready(
    client: &PlatformClient,
    name: &str,
    create_status: Option<&str>,
    args: &CreateArgs,
    reporter: &Reporter,
) -> Result<bool> {
    reporter.progress(format!("Creating {name}..."));
    if create_status != Some("creating") {
        return Ok(true);
    }
    let deadline = Instant::now() + Duration::from_secs(args.timeout_secs);
    loop {
        if client.app_status(name).await?.as_deref() == Some("complete") {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            reporter.progress_done(format!("Creating {name}... timed out"));
            reporter.plain("Timed Out! Run `heroku status` to check for known platform issues.");
            return Ok(false);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
