//! Command-line surface over the import pipeline.
//!
//! Warehouses are referenced by code on the command line and resolved to ids
//! before the core operations run. The `--operator` flag is the explicit
//! actor identity recorded on imports and transactions.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use stockflow::core::{import, item, report, stock, warehouse};
use stockflow::errors::{Error, Result};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "stockflow")]
#[command(about = "POS sales import and inventory reconciliation")]
#[command(version)]
pub struct Cli {
    /// Operator name recorded on imports and transactions
    #[arg(long, default_value = "cli")]
    pub operator: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a POS sales CSV file (raw or base64-encoded)
    Import {
        /// Path to the CSV file
        file: PathBuf,

        /// Unique import number (e.g., "IMP-20251111-001")
        #[arg(long)]
        import_number: String,

        /// Warehouse code the sales belong to
        #[arg(long)]
        warehouse: String,

        /// Sales period start, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        period_from: Option<NaiveDate>,

        /// Sales period end, YYYY-MM-DD (defaults to the period start)
        #[arg(long)]
        period_to: Option<NaiveDate>,

        /// Free-text notes attached to the import
        #[arg(long)]
        notes: Option<String>,

        /// Leave the import pending instead of processing immediately
        #[arg(long)]
        no_process: bool,
    },

    /// Process an import left pending by `import --no-process`
    Process {
        /// Import number to process
        import_number: String,
    },

    /// Show an import's summary and per-row error detail
    Status {
        /// Import number to inspect
        import_number: String,
    },

    /// Reverse a completed import with offsetting ledger entries
    Reverse {
        /// Import number to reverse
        import_number: String,

        /// Reason for the reversal
        #[arg(long)]
        reason: String,
    },

    /// Add an item to the catalog
    AddItem {
        /// Item barcode
        #[arg(long)]
        barcode: String,

        /// Item name
        #[arg(long)]
        name: String,

        /// Unit cost
        #[arg(long)]
        cost: f64,
    },

    /// Set the absolute on-hand quantity for an item at a warehouse
    SetStock {
        /// Item barcode
        #[arg(long)]
        barcode: String,

        /// Warehouse code
        #[arg(long)]
        warehouse: String,

        /// On-hand quantity
        #[arg(long)]
        quantity: i32,
    },

    /// List all imports, newest first
    List,
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

async fn resolve_warehouse(
    db: &DatabaseConnection,
    code: &str,
) -> Result<stockflow::entities::warehouse::Model> {
    warehouse::get_warehouse_by_code(db, code)
        .await?
        .ok_or_else(|| Error::WarehouseNotFound {
            warehouse: code.to_string(),
        })
}

async fn resolve_item(
    db: &DatabaseConnection,
    barcode: &str,
) -> Result<stockflow::entities::item::Model> {
    let barcodes = [barcode.to_string()];
    let mut lookup = item::find_items_by_barcodes(db, &barcodes).await?;
    lookup
        .remove(&barcode.to_lowercase())
        .ok_or_else(|| Error::Config {
            message: format!("Item with barcode {barcode} not found"),
        })
}

/// Dispatches the parsed command against the database.
pub async fn run(cli: Cli, db: &DatabaseConnection) -> Result<()> {
    let cancel = CancellationToken::new();

    match cli.command {
        Commands::Import {
            file,
            import_number,
            warehouse,
            period_from,
            period_to,
            notes,
            no_process,
        } => {
            let csv_data = std::fs::read_to_string(&file)?;
            let warehouse = resolve_warehouse(db, &warehouse).await?;

            let now = Utc::now();
            let sales_period_from = period_from.map_or(now, midnight);
            let sales_period_to = period_to.map_or(sales_period_from, midnight);
            let file_name = file
                .file_name()
                .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned());

            let request = import::CreateSalesImportRequest {
                import_number,
                import_date: now,
                sales_period_from,
                sales_period_to,
                warehouse_id: warehouse.id,
                file_name,
                csv_data,
                notes,
                auto_process: !no_process,
            };

            let response = import::create_sales_import(db, request, &cli.operator, &cancel).await?;
            println!(
                "Import {} -> {} ({} total, {} processed, {} errors)",
                response.import_number,
                response.status,
                response.total_records,
                response.processed_records,
                response.error_records
            );
        }

        Commands::Process { import_number } => {
            let response = import::process_pending_import(db, &import_number, &cancel).await?;
            println!(
                "Import {} -> {} ({} total, {} processed, {} errors)",
                response.import_number,
                response.status,
                response.total_records,
                response.processed_records,
                response.error_records
            );
        }

        Commands::Status { import_number } => {
            let summary = report::get_import_summary(db, &import_number).await?;
            println!(
                "{} [{}] file={} total={} processed={} errors={} quantity={} value={}{}",
                summary.import_number,
                summary.status,
                summary.file_name,
                summary.total_records,
                summary.processed_records,
                summary.error_records,
                summary.total_quantity,
                summary.total_value.unwrap_or(0.0),
                if summary.is_reversed { " (reversed)" } else { "" }
            );

            let errors = report::get_import_errors(db, &import_number).await?;
            for row in errors {
                println!("  line {}: {} - {}", row.line_number, row.barcode, row.message);
            }
        }

        Commands::Reverse {
            import_number,
            reason,
        } => {
            let reversed = import::reverse_import(db, &import_number, &reason, &cli.operator).await?;
            println!("Import {} reversed", reversed.import_number);
        }

        Commands::AddItem {
            barcode,
            name,
            cost,
        } => {
            let created = item::create_item(db, barcode, name, cost).await?;
            println!("Item {} ({}) added", created.barcode, created.name);
        }

        Commands::SetStock {
            barcode,
            warehouse,
            quantity,
        } => {
            let warehouse = resolve_warehouse(db, &warehouse).await?;
            let item = resolve_item(db, &barcode).await?;
            let stock = stock::set_stock_level(db, item.id, warehouse.id, quantity).await?;
            println!(
                "Stock for {} at {} set to {}",
                item.barcode, warehouse.code, stock.quantity_on_hand
            );
        }

        Commands::List => {
            for import in report::list_imports(db).await? {
                println!(
                    "{} [{}] {} ({} total, {} processed, {} errors)",
                    import.import_number,
                    import.status,
                    import.file_name,
                    import.total_records,
                    import.processed_records,
                    import.error_records
                );
            }
        }
    }

    Ok(())
}
