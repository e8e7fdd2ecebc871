//! Basic ledger usage example
//!
//! Set `RUST_LOG=envelope_ledger=debug` to see the ledger's tracing output.

use chrono::NaiveDate;
use envelope_ledger::utils::MemoryStorage;
use envelope_ledger::{Ledger, LedgerConfig, TransactionBuilder};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();

    println!("🧾 Envelope Ledger - Basic Ledger Example\n");

    // Create a new ledger with in-memory storage
    let storage = MemoryStorage::new();
    let ledger = Ledger::with_config(storage, &LedgerConfig::default());

    // 1. Register an account
    let checking = ledger
        .create_account("checking".to_string(), "Everyday Checking".to_string())
        .await?;
    println!("  ✓ Registered account: {} - {}", checking.account_uuid, checking.name);

    // 2. Record some transactions, one of them backdated
    let entries = [
        ((2024, 1, 1), "Opening balance", 250_000, true),
        ((2024, 1, 3), "Rent", -120_000, true),
        ((2024, 1, 9), "Grocer", -8_450, false),
        ((2024, 1, 2), "Paycheck", 310_000, true),
    ];

    for ((year, month, day), payee, amount, cleared) in entries {
        let candidate = TransactionBuilder::new(
            checking.account_uuid.clone(),
            NaiveDate::from_ymd_opt(year, month, day).ok_or("invalid date")?,
            payee.to_string(),
            amount,
        )
        .cleared(cleared)
        .build()?;

        let created = ledger.create_transaction(candidate).await?;
        println!("  ✓ Recorded {} ({})", created.payee, created.uuid);
    }

    // 3. A transaction for an unknown account is refused
    let stray = TransactionBuilder::new(
        "savings".to_string(),
        NaiveDate::from_ymd_opt(2024, 1, 4).ok_or("invalid date")?,
        "Transfer".to_string(),
        5_000,
    )
    .build()?;
    if let Err(err) = ledger.create_transaction(stray).await {
        println!("  ✗ Refused: {}", err);
    }

    // 4. Print the ledger with its running balance
    println!("\n📒 Ledger for {}:", checking.name);
    for row in ledger.list_transactions(&checking.account_uuid).await? {
        println!(
            "  {}  {:<16} {:>10} {:>10}  {}",
            row.occurred_at,
            row.payee,
            row.amount,
            row.rolling_total.unwrap_or_default(),
            if row.cleared { "cleared" } else { "" }
        );
    }

    let balance = ledger.get_account_balance(&checking.account_uuid).await?;
    println!("\n  Balance: {}", balance);

    println!("\n🎉 Example completed successfully!");
    Ok(())
}
