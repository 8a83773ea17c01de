//! # Seed Data Generator
//!
//! Populates the database with sample products (and optionally sales)
//! for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p indobat-db --bin seed
//!
//! # Generate custom amount, plus 50 sample orders
//! cargo run -p indobat-db --bin seed -- --count 1000 --orders 50
//!
//! # Specify database path
//! cargo run -p indobat-db --bin seed -- --db ./data/indobat.db
//! ```
//!
//! ## Generated Products
//! Common pharmacy stock across a few categories, each in several pack
//! sizes: `{name} {strength} {pack}`, price 1.50 - 76.50, stock 0 - 120.

use clap::Parser;
use indobat_core::{NewProduct, OrderRequest};
use indobat_db::{Database, DbConfig, OrderError};

/// Base products: (name, strength, base price in cents)
const MEDICINES: &[(&str, &str, i64)] = &[
    ("Paracetamol", "500mg", 150),
    ("Ibuprofen", "400mg", 320),
    ("Amoxicillin", "500mg", 850),
    ("Cetirizine", "10mg", 270),
    ("Loratadine", "10mg", 290),
    ("Omeprazole", "20mg", 640),
    ("Metformin", "500mg", 410),
    ("Amlodipine", "5mg", 380),
    ("Simvastatin", "20mg", 560),
    ("Vitamin C", "1000mg", 450),
    ("Vitamin D3", "1000IU", 520),
    ("Zinc", "20mg", 300),
    ("Antacid", "chewable", 210),
    ("Oral Rehydration Salts", "sachet", 180),
    ("Cough Syrup", "100ml", 720),
    ("Saline Nasal Spray", "20ml", 610),
    ("Povidone Iodine", "60ml", 530),
    ("Hydrocortisone Cream", "1%", 690),
    ("Loperamide", "2mg", 260),
    ("Aspirin", "80mg", 160),
];

/// Pack variants: (label, price multiplier)
const PACKS: &[(&str, i64)] = &[
    ("strip of 10", 1),
    ("box of 30", 3),
    ("box of 100", 9),
    ("blister 6", 1),
    ("family pack", 6),
];

/// Populates an Indobat database with sample data
#[derive(Debug, Parser)]
#[command(name = "seed", version)]
struct Args {
    /// Number of products to generate
    #[arg(short, long, default_value_t = 200)]
    count: usize,

    /// Number of sample orders to place after seeding products
    #[arg(short, long, default_value_t = 0)]
    orders: usize,

    /// Database file path
    #[arg(short, long, default_value = "./indobat_dev.db")]
    db: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("🌱 Indobat Seed Data Generator");
    println!("==============================");
    println!("Database: {}", args.db);
    println!("Products: {}", args.count);
    println!();

    let db = Database::new(DbConfig::new(&args.db)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut product_ids = Vec::with_capacity(args.count);

    for seed in 0..args.count {
        let product = generate_product(seed);

        match db.products().create(&product).await {
            Ok(created) => product_ids.push(created.id),
            Err(e) => {
                eprintln!("Failed to insert {}: {}", product.name, e);
                continue;
            }
        }

        if product_ids.len() % 100 == 0 {
            println!("  Generated {} products...", product_ids.len());
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", product_ids.len(), elapsed);

    if args.orders > 0 && !product_ids.is_empty() {
        println!();
        println!("Placing {} sample orders...", args.orders);

        let engine = db.orders();
        let mut placed = 0;
        let mut rejected = 0;

        for seed in 0..args.orders {
            let product_id = product_ids[(seed * 7) % product_ids.len()];
            let quantity = 1 + (seed % 4) as i64;
            let discount = [0.0, 5.0, 10.0, 25.0][seed % 4];

            let request = OrderRequest::new(product_id, quantity, discount)?;
            match engine.create_order(&request).await {
                Ok(_) => placed += 1,
                Err(OrderError::Rejected(_)) => rejected += 1,
                Err(e) => return Err(e.into()),
            }
        }

        println!("  Placed {}, rejected {} (out of stock)", placed, rejected);
    }

    let summary = serde_json::json!({
        "products": db.products().count().await?,
        "transactions": db.transactions().count().await?,
    });
    println!();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single product with deterministic, realistic data.
fn generate_product(seed: usize) -> NewProduct {
    let (name, strength, base_cents) = MEDICINES[seed % MEDICINES.len()];
    let (pack, multiplier) = PACKS[(seed / MEDICINES.len()) % PACKS.len()];
    let batch = seed / (MEDICINES.len() * PACKS.len());

    // Repeat runs past the catalogue get a batch suffix so names stay distinct
    let full_name = if batch == 0 {
        format!("{} {} {}", name, strength, pack)
    } else {
        format!("{} {} {} (batch {})", name, strength, pack, batch + 1)
    };

    NewProduct {
        name: full_name,
        stock: (seed * 13 % 121) as i64,
        price_cents: base_cents * multiplier,
    }
}
