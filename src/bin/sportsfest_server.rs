use sportsfest::api::{serve, AppState};
use sportsfest::platform::build_platform;
use sportsfest::SportsfestConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info").add_directive("sportsfest=debug".parse().unwrap())
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = SportsfestConfig::from_env();
    config.validate()?;

    println!("🏅 Sportsfest backend");
    println!("   Project: {}", config.project_id);
    println!("   Listening on: {}", config.bind_addr());

    let (documents, objects, identity) = build_platform(&config);
    let state = AppState::new(config, documents, objects, identity);

    serve(state).await?;
    Ok(())
}
