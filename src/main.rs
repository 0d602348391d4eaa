use anyhow::Context;
use clap::Parser;
use shopper_match::{batch, cli, client, config, logging, render, scanner, workflow};
use cli::{Cli, Commands};
use client::HttpUploadClient;
use config::Config;
use shopper_match::error::ShopperMatchError;
use shopper_match_common::SessionStatus;
use workflow::MatchWorkflow;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load()?;
    if let Some(endpoint) = &cli.endpoint {
        config.set_endpoint(endpoint)?;
    }

    match cli.command {
        Commands::Match { image, output, zero_score } => {
            println!("🔍 shopper-match - product search\n");

            let client = HttpUploadClient::new(&config)?;
            let upload_url = client.upload_url().to_string();
            let policy = zero_score.unwrap_or(config.zero_score);
            let mut flow = MatchWorkflow::new(client, policy);

            let file = scanner::read_image_file(&image)?;
            flow.select_image(file);

            if flow.session().can_submit() {
                println!("Uploading to {} ...", upload_url);
                flow.submit().await;
            }

            let session = flow.session();
            print!("{}", render::render_session(session));

            if let Some(output) = output {
                let json = serde_json::to_string_pretty(&session.report())?;
                std::fs::write(&output, json)
                    .with_context(|| format!("failed to write {}", output.display()))?;
                println!("\n✔ Saved results: {}", output.display());
            }

            if session.status() == SessionStatus::Failed {
                let message = session.error().unwrap_or_default().to_string();
                return Err(ShopperMatchError::MatchFailed(message).into());
            }
        }

        Commands::Batch { folder, output, recursive, zero_score } => {
            println!("📂 shopper-match - batch search\n");

            let images = scanner::scan_folder(&folder, recursive)?;
            println!("✔ Found {} images\n", images.len());
            if images.is_empty() {
                return Err(ShopperMatchError::NoImagesFound(folder.display().to_string()).into());
            }

            let client = HttpUploadClient::new(&config)?;
            let upload_url = client.upload_url().to_string();
            let policy = zero_score.unwrap_or(config.zero_score);
            let mut flow = MatchWorkflow::new(client, policy);

            let report = batch::run_batch(&mut flow, &images, &config.endpoint, true).await;

            let output = output.unwrap_or_else(|| folder.join("matches.json"));
            report
                .save(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;

            println!("\n✔ {} succeeded, {} failed", report.succeeded, report.failed);
            println!("✔ Saved report: {}", output.display());
        }

        Commands::Health => {
            let client = HttpUploadClient::new(&config)?;
            let health = client.health().await?;
            print!("{}", render::render_health(&config.endpoint, &health));
        }

        Commands::Config { set_endpoint, set_zero_score, show } => {
            // --endpoint の一時上書きを保存しないよう読み直す
            let mut stored = Config::load_from(&Config::config_path()?)?;

            if let Some(endpoint) = set_endpoint {
                stored.set_endpoint(&endpoint)?;
                stored.save()?;
                println!("✔ Endpoint set: {}", stored.endpoint);
            }

            if let Some(policy) = set_zero_score {
                stored.zero_score = policy;
                stored.save()?;
                println!("✔ Zero-score policy set: {}", policy);
            }

            if show {
                let effective = stored.with_env_override();
                println!("Config:");
                println!("  Path: {}", Config::config_path()?.display());
                println!("  Endpoint: {}", effective.endpoint);
                println!(
                    "  Timeout: {}",
                    effective
                        .timeout_seconds
                        .map(|s| format!("{}s", s))
                        .unwrap_or_else(|| "none".into())
                );
                println!("  Zero-score policy: {}", effective.zero_score);
            }
        }
    }

    Ok(())
}
