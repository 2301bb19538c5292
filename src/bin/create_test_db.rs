use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use fintrack_rs::{Currency, PasswordHash, ValidatedPassword, create_user, initialize_db};

/// A utility for creating a test database for the REST API server of fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("testpassword"),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        "Test User",
        "test@example.com",
        password_hash,
        Currency::PKR,
        &conn,
    )?;

    println!("Creating sample transactions...");

    let today = OffsetDateTime::now_utc().date();
    let samples = [
        ("Other", "#6B7280", 85_000.0, "income", "salary", 30),
        ("Food", "#10B981", 4_200.0, "expense", "groceries", 28),
        ("Bills", "#F59E0B", 3_500.0, "expense", "electricity", 25),
        ("Transport", "#3B82F6", 900.0, "expense", "fuel", 20),
        ("Entertainment", "#8B5CF6", 1_500.0, "expense", "cinema", 14),
        ("Food", "#10B981", 2_800.0, "expense", "groceries", 7),
        ("Shopping", "#EC4899", 6_000.0, "expense", "clothes", 3),
        ("Food", "#10B981", 1_200.0, "expense", "takeaway", 0),
    ];

    for (category, color, amount, kind, description, days_ago) in samples {
        conn.execute(
            "INSERT INTO \"transaction\"
                (user_id, category_name, category_color, amount, kind, description, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                user.id.as_i64(),
                category,
                color,
                amount,
                kind,
                description,
                today - Duration::days(days_ago),
            ),
        )?;
    }

    println!("Creating sample budgets...");

    let budgets = [
        ("Food", "monthly", 10_000.0),
        ("Transport", "monthly", 5_000.0),
        ("Entertainment", "weekly", 2_000.0),
    ];

    for (category, period, amount) in budgets {
        conn.execute(
            "INSERT INTO budget
                (user_id, category_name, period, amount, starting_date, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (user.id.as_i64(), category, period, amount, today, ""),
        )?;
    }

    println!("Success!");

    Ok(())
}
