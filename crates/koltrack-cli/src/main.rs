use chrono::{DateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use koltrack_core::{Observation, ObservationLog};
use koltrack_scraper::ScrapeClient;
use sqlx::PgPool;

#[derive(Debug, Parser)]
#[command(name = "koltrack-cli")]
#[command(about = "KOL engagement tracker command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Insert a sample KOL roster and one tracked post for local development.
    Seed,
    /// Run one batch refresh across every tracked post.
    RefreshAll,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = koltrack_core::load_app_config()?;
    let pool = koltrack_db::connect_pool(
        &config.database_url,
        koltrack_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    koltrack_db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Seed => seed(&pool).await?,
        Commands::RefreshAll => {
            let client = ScrapeClient::new(
                &config.scraper_token,
                &config.scraper_actor,
                config.scraper_timeout_secs,
            )?;
            refresh_all(&pool, &client).await?;
        }
    }

    Ok(())
}

fn hk(y: i32, m: u32, d: u32) -> DateTime<chrono::FixedOffset> {
    koltrack_core::hong_kong_offset()
        .with_ymd_and_hms(y, m, d, 0, 0, 0)
        .single()
        .expect("valid sample date")
}

/// The dashboard's demo roster: three KOLs and one post with a short
/// engagement history. Plain inserts — running twice duplicates rows.
async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let roster = ["John Doe", "Jane Smith", "Bob Johnson"];

    let mut first_kol_id = None;
    for name in roster {
        let avatar = format!(
            "https://api.dicebear.com/6.x/avataaars/svg?seed={}",
            name.split_whitespace().next().unwrap_or(name)
        );
        let kol = koltrack_db::create_kol(pool, name, &avatar).await?;
        first_kol_id.get_or_insert(kol.id);
        println!("created KOL {} ({})", kol.id, kol.name);
    }

    let kol_id = first_kol_id.expect("roster is non-empty");
    let mut log = ObservationLog::new();
    log.append(Observation {
        date: hk(2023, 8, 2),
        likes: 1000,
        views: 5000,
    });
    log.append(Observation {
        date: hk(2023, 8, 26),
        likes: 1500,
        views: 7500,
    });

    let post = koltrack_db::create_post(
        pool,
        "https://www.instagram.com/p/123",
        kol_id,
        Some(Utc.with_ymd_and_hms(2023, 7, 26, 0, 0, 0).single().expect("valid sample date")),
        &log,
    )
    .await?;
    println!(
        "created post {} ({}) with {} observations",
        post.id,
        post.url,
        post.counts.len()
    );

    Ok(())
}

async fn refresh_all(pool: &PgPool, client: &ScrapeClient) -> anyhow::Result<()> {
    let refreshed = koltrack_engine::refresh_all(pool, client).await?;
    for post in &refreshed {
        let latest = post.counts.latest();
        println!(
            "refreshed post {} ({}): likes={} views={}",
            post.id, post.url, latest.likes, latest.views
        );
    }
    println!("{} post(s) refreshed", refreshed.len());
    Ok(())
}
