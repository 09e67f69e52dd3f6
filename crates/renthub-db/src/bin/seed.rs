//! # Seed Data Generator
//!
//! Populates a development database with demo users and listings.
//!
//! ## Usage
//! ```bash
//! # 3 owners x 8 items (default)
//! cargo run -p renthub-db --bin seed
//!
//! # Custom listing count
//! cargo run -p renthub-db --bin seed -- --count 40
//!
//! # Specify database path
//! cargo run -p renthub-db --bin seed -- --db ./data/renthub.db
//! ```
//!
//! Every listing is created `Active` through the listing store, so the
//! seeded data goes through the same validation as real submissions.

use anyhow::Context;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

use renthub_core::NewListing;
use renthub_db::{Database, DbConfig};

/// Demo owners: (id, name, email, phone, city)
const OWNERS: &[(&str, &str, &str, &str, &str)] = &[
    ("seed-owner-1", "Ayesha Khan", "ayesha@example.com", "555-0110", "Karachi"),
    ("seed-owner-2", "Bilal Ahmed", "bilal@example.com", "555-0111", "Lahore"),
    ("seed-owner-3", "Sana Malik", "sana@example.com", "555-0112", "Islamabad"),
];

/// Catalogue: (category, title, hourly cents, daily cents, deposit cents)
const ITEMS: &[(&str, &str, i64, i64, i64)] = &[
    ("Tools", "Cordless Drill", 400, 2000, 5000),
    ("Tools", "Pressure Washer", 800, 4500, 10000),
    ("Tools", "Tile Cutter", 500, 2500, 6000),
    ("Outdoor", "Camping Tent", 300, 2500, 5000),
    ("Outdoor", "Kayak", 1200, 6000, 20000),
    ("Outdoor", "Mountain Bike", 600, 3500, 15000),
    ("Electronics", "DSLR Camera", 1000, 5500, 30000),
    ("Electronics", "Projector", 700, 4000, 12000),
    ("Electronics", "Drone", 1500, 8000, 40000),
    ("Party", "Folding Tables (set of 4)", 250, 1500, 3000),
    ("Party", "PA Speaker", 900, 5000, 15000),
    ("Kitchen", "Stand Mixer", 350, 1800, 4000),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 24;
    let mut db_path = String::from("./renthub_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1]
                        .parse()
                        .with_context(|| format!("invalid --count value '{}'", args[i + 1]))?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("RentHub Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of listings to generate (default: 24)");
                println!("  -d, --db <PATH>    Database file path (default: ./renthub_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 RentHub Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Listings: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("failed to open database")?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let mut owners = Vec::with_capacity(OWNERS.len());
    for (id, name, email, phone, city) in OWNERS {
        let profile = match db.users().get_by_id(id).await? {
            Some(existing) => existing,
            None => db.users().register(id, name, email, phone, city).await?,
        };
        owners.push(profile.to_identity());
    }

    let existing: i64 = {
        let mut total = 0;
        for owner in &owners {
            total += db.listings().count_by_owner(&owner.user_id).await?;
        }
        total
    };
    if existing > 0 {
        println!("⚠ Demo owners already have {} listings", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating listings...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for n in 0..count {
        let owner = &owners[n % owners.len()];
        let listing = generate_listing(n);

        match db.listings().create(owner, &listing).await {
            Ok(created) => {
                generated += 1;
                info!(id = %created.id, title = %created.title, "Seeded listing");
            }
            Err(e) => eprintln!("Failed to insert {}: {}", listing.title, e),
        }
    }

    println!();
    println!("✓ Generated {} listings in {:?}", generated, start.elapsed());

    let visible = db.listings().find_available("nobody").await?;
    println!("  Browsable listings: {}", visible.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds the n-th demo listing, cycling through the catalogue.
fn generate_listing(n: usize) -> NewListing {
    let (category, title, hourly, daily, deposit) = ITEMS[n % ITEMS.len()];
    let round = (n / ITEMS.len()) as i64;

    let title = if round == 0 {
        title.to_string()
    } else {
        format!("{} #{}", title, round + 1)
    };

    NewListing {
        title,
        category: category.to_string(),
        description: format!("Well kept {}. Pick up only.", category.to_lowercase()),
        price_per_hour_cents: Some(hourly + round * 50),
        price_per_day_cents: Some(daily + round * 250),
        deposit_cents: Some(deposit),
        available_from: None,
        available_until: None,
        conditions: Some("Return clean and on time.".to_string()),
        images: vec![format!("/uploads/seed-{}.jpg", n % ITEMS.len())],
    }
}
