use anyhow::Result;
use clap::{Parser, Subcommand};
use marquee::args::CommonArgs;
use marquee::config::Config;
use marquee::logging;
use marquee::platform::PlatformClient;
use marquee::provision::Provisioner;
use marquee::record::ProvisionRecord;
use marquee::theme as t;
use marquee::validate::{CheckStatus, Validator};

#[derive(Debug, Parser)]
#[command(
    name = "marquee",
    version,
    about = "Provision and validate the Miami theater showtimes voice agent"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Register the webhook tool and the agent, then save the record
    Provision,
    /// Re-check the saved record against the live webhook and the platform
    Validate,
    /// Show the saved provision record
    Status {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    t::init_color(cli.common.no_color);

    let mut config = Config::load(cli.common.config_path())?;
    cli.common.apply_overrides(&mut config);

    match cli.command {
        Commands::Provision => provision(&config).await,
        Commands::Validate => validate(&config).await,
        Commands::Status { json } => status(&config, json),
    }
}

async fn provision(config: &Config) -> Result<()> {
    let api_key = config.require_api_key()?;
    let (webhook_url, is_placeholder) = config.webhook_base_url();

    println!("{}", t::heading("Setting up the Miami theater voice agent"));
    println!("{}", t::label_value("API key", &mask_key(api_key)));
    println!("{}", t::label_value("Webhook URL", &webhook_url));
    println!("{}", t::label_value("Platform", &config.platform_base_url));
    if is_placeholder {
        tracing::warn!("using placeholder webhook URL; set VERCEL_APP_URL to the real deployment");
        println!(
            "{}",
            t::icon_warn("Using placeholder webhook URL. Set VERCEL_APP_URL before going live.")
        );
    }

    let client = PlatformClient::new(&config.platform_base_url, api_key)?;
    let provisioner = Provisioner::new(&client);

    let pb = t::spinner("Registering webhook tool and agent…");
    match provisioner.run(&webhook_url, &config.record_path).await {
        Ok(record) => {
            t::spinner_ok(&pb, "Provisioning complete");
            println!("{}", t::label_value("Tool ID", &record.tool_id));
            println!("{}", t::label_value("Agent ID", &record.agent_id));
            println!(
                "{}",
                t::label_value("Record", &config.record_path.display().to_string())
            );
            println!();
            println!("{}", t::muted("Next: test the agent in the platform dashboard."));
            Ok(())
        }
        Err(e) => {
            t::spinner_fail(&pb, &format!("Provisioning failed during {}", e.phase));
            Err(e.into())
        }
    }
}

async fn validate(config: &Config) -> Result<()> {
    // Both of these are fatal before any remote call happens.
    let record = ProvisionRecord::load(&config.record_path)?;
    let api_key = config.require_api_key()?;

    println!("{}", t::heading("Validating the showtimes voice agent"));
    println!("{}", t::label_value("Tool ID", &record.tool_id));
    println!("{}", t::label_value("Agent ID", &record.agent_id));
    println!("{}", t::label_value("Webhook URL", &record.vercel_url));
    println!("{}", t::label_value("Provisioned", &record.created_at.to_rfc3339()));
    println!();

    let client = PlatformClient::new(&config.platform_base_url, api_key)?;
    let validator = Validator::new(&client)?;
    let results = validator.run_all(&record).await;

    let mut all_pass = true;
    for result in &results {
        let line = match result.status {
            CheckStatus::Pass => t::icon_ok(result.check_name),
            CheckStatus::Fail => {
                all_pass = false;
                t::icon_fail(result.check_name)
            }
            CheckStatus::Error => {
                all_pass = false;
                t::icon_warn(result.check_name)
            }
        };
        println!("{line}");
        for detail in result.detail.lines() {
            println!("    {}", t::muted(detail));
        }
    }

    println!();
    if all_pass {
        println!("{}", t::success("All checks passed."));
    } else {
        println!("{}", t::warn("Some checks did not pass; see details above."));
    }
    // Check outcomes are diagnostic; only a missing record or credential
    // produces a non-zero exit.
    Ok(())
}

fn status(config: &Config, json: bool) -> Result<()> {
    let record = ProvisionRecord::load(&config.record_path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", t::label_value("Tool ID", &record.tool_id));
        println!("{}", t::label_value("Agent ID", &record.agent_id));
        println!("{}", t::label_value("Webhook URL", &record.vercel_url));
        println!("{}", t::label_value("Provisioned", &record.created_at.to_rfc3339()));
    }
    Ok(())
}

fn mask_key(key: &str) -> String {
    let head: String = key.chars().take(8).collect();
    format!("{head}…")
}
