use std::env;

use sportsfest::core::houses::format_counts_table;
use sportsfest::core::services::deletion::DeletionOrchestrator;
use sportsfest::core::services::registration::RegistrationService;
use sportsfest::platform::build_platform;
use sportsfest::{Principal, SportsfestConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut command: Option<String> = None;
    let mut uid: Option<String> = None;
    let mut yes = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--uid" | "-u" => {
                if i + 1 < args.len() {
                    uid = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--yes" | "-y" => yes = true,
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                if command.is_none() && !other.starts_with('-') {
                    command = Some(other.to_string());
                }
            }
        }
        i += 1;
    }

    let config = SportsfestConfig::from_env();
    config.validate()?;

    match command.as_deref() {
        Some("stats") => stats(&config).await,
        Some("delete-account") => {
            let Some(uid) = uid else {
                anyhow::bail!("delete-account requires --uid <uid>");
            };
            if !yes {
                anyhow::bail!("delete-account is irreversible; re-run with --yes to confirm");
            }
            delete_account(&config, &uid).await
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(1);
        }
        None => {
            print_help();
            Ok(())
        }
    }
}

async fn stats(config: &SportsfestConfig) -> anyhow::Result<()> {
    println!("🏅 Sportsfest house roster");
    println!("   Project: {}", config.project_id);
    println!();

    let (documents, _objects, _identity) = build_platform(config);
    let registrations = RegistrationService::new(documents, &config.registrations_collection);
    let counts = registrations.count_by_house().await;

    println!("{}", format_counts_table(&counts));
    Ok(())
}

/// Operator-side deletion. The orchestrator only accepts self-service
/// calls, so the operator explicitly assumes the target's identity here;
/// that is the whole authorization step for this CLI and the reason the
/// `--yes` flag exists.
async fn delete_account(config: &SportsfestConfig, uid: &str) -> anyhow::Result<()> {
    println!("🗑  Deleting account {} and everything it owns", uid);

    let (documents, objects, identity) = build_platform(config);
    let orchestrator = DeletionOrchestrator::new(documents, objects, identity, config);

    let principal = Principal {
        uid: uid.to_string(),
        email: None,
        is_admin: false,
    };

    match orchestrator.delete_account(Some(&principal), uid).await {
        Ok(outcome) => {
            println!("✅ Account deleted");
            println!("   Registrations removed: {}", outcome.registrations_deleted);
            println!("   Assets removed: {}", outcome.assets_deleted);
            if outcome.assets_failed > 0 {
                println!("   Assets left behind: {}", outcome.assets_failed);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Deletion failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!("Sportsfest admin tool");
    println!();
    println!("USAGE:");
    println!("  sportsfest-admin <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  stats                    Print the current house roster");
    println!("  delete-account           Delete an account across all stores");
    println!();
    println!("OPTIONS:");
    println!("  -u, --uid <UID>          Target account for delete-account");
    println!("  -y, --yes                Confirm the irreversible deletion");
    println!("  -h, --help               Show this help");
    println!();
    println!("ENVIRONMENT:");
    println!("  SPORTSFEST_PROJECT_ID, SPORTSFEST_API_KEY, SPORTSFEST_SERVICE_TOKEN");
    println!("  FIRESTORE_EMULATOR_HOST, FIREBASE_STORAGE_EMULATOR_HOST,");
    println!("  FIREBASE_AUTH_EMULATOR_HOST");
}
