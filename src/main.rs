use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};

use jenkins_relay::cli::Cli;
use jenkins_relay::config::load_and_validate;
use jenkins_relay::dispatch::Dispatcher;
use jenkins_relay::github::{HookOutcome, OctocrabClient, register_hooks};
use jenkins_relay::jenkins::JenkinsClient;
use jenkins_relay::logging;
use jenkins_relay::server::{AppState, ROUTES, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.urls {
        for (method, path) in ROUTES {
            println!("{:<6} {}", method, path);
        }
        return Ok(());
    }

    logging::init(cli.log_level.as_deref());

    let config = load_and_validate(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let github = OctocrabClient::from_config(&config.github, config.retry)
        .context("building GitHub client")?;
    let jenkins =
        JenkinsClient::new(&config.jenkins, config.retry).context("building Jenkins client")?;

    if cli.register_hooks {
        let Some(public_url) = config.server.public_url.as_deref() else {
            bail!("--register-hooks needs server.public_url in the configuration");
        };
        let report = register_hooks(
            &github,
            &config.repos,
            public_url,
            config.github.webhook_secret.as_deref(),
        )
        .await;
        for (repo, outcome) in &report.outcomes {
            if let HookOutcome::Failed(reason) = outcome {
                warn!(repo = %repo, reason = %reason, "Hook registration failed");
            }
        }
        info!(
            repos = report.outcomes.len(),
            failures = report.failures(),
            "Hook registration finished"
        );
    }

    let bind = cli.bind.unwrap_or(config.server.bind);
    let repo_count = config.repos.iter().count();
    let state = AppState::new(
        config.repos,
        Dispatcher::new(github, jenkins),
        config.github.webhook_secret,
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {}", bind))?;
    info!(addr = %bind, repos = repo_count, "Listening");

    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
