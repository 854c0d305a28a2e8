// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::env;

use signal_catalog::{count_rows, seed_if_empty, setup_database, Config, Table};

fn main() -> Result<()> {
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "seed" {
        // Seed mode
        run_seed(&config)?;
    } else {
        // UI mode (default)
        run_ui_mode(&config)?;
    }

    Ok(())
}

/// Logs go to stderr so they never mix with the terminal UI
fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_seed(config: &Config) -> Result<()> {
    println!("🌱 Signal Catalog - Seeding launch data");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Setup database
    println!("\n🔧 Setting up database {:?}...", config.database_path);
    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("Failed to open database {:?}", config.database_path))?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode");

    // 2. Insert seed rows
    println!("\n💾 Inserting seed data...");
    let report = seed_if_empty(&conn)?;
    println!("✓ Providers inserted: {}", report.providers);
    println!("✓ Brokers inserted: {}", report.brokers);
    println!("✓ Testimonials inserted: {}", report.testimonials);

    // 3. Verify
    println!("\n🔍 Verifying database...");
    for table in [Table::Providers, Table::Brokers, Table::Testimonials] {
        println!("✓ {} rows: {}", table.as_str(), count_rows(&conn, table)?);
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if report.providers + report.brokers + report.testimonials == 0 {
        println!("✅ Database already seeded, nothing to do");
    } else {
        println!("🎉 Seed complete!");
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    use signal_catalog::{load_snapshot, Carousel, DeadlineClock};
    use std::sync::Arc;

    println!("🖥️  Loading Signal Catalog...\n");

    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("Failed to open database {:?}", config.database_path))?;
    setup_database(&conn)?;
    seed_if_empty(&conn)?;

    // Load catalogs once; they stay immutable for the session
    println!("📊 Loading catalogs...");
    let snapshot = load_snapshot(&conn)?;
    drop(conn);

    println!(
        "✓ Loaded {} providers, {} brokers, {} testimonials\n",
        snapshot.providers.len(),
        snapshot.brokers.len(),
        snapshot.testimonials.len()
    );
    println!("Starting UI... (Press 'q' to quit)\n");

    let carousel = Carousel::new(
        snapshot.testimonials,
        DeadlineClock::new(),
        config.carousel_interval,
    )
    .context("No approved testimonials to show")?;

    // Create and run app
    let mut app = ui::App::new(
        Arc::new(snapshot.providers),
        Arc::new(snapshot.brokers),
        carousel,
    );
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin catalog-server --features server");
    std::process::exit(1);
}
