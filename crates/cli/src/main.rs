//! Command-line driver for the PIR intake engine.
//!
//! Thin glue only: reads files, wires the persistence collaborator and the
//! simulated CRM, and prints outcomes. All ingestion, reconciliation, and
//! sync logic lives in `pir-core`.

mod crm;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pir_core::{
    clear_active_batch, ingest_csv, load_active_batch, save_active_batch, DirectoryStore,
    IntakeError, ReconciliationStore, SyncCoordinator, CSV_MEDIA_TYPE,
};
use pir_types::{Batch, CanonicalField};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crm::SimulatedCrm;

#[derive(Parser)]
#[command(name = "pir")]
#[command(about = "PIR patient intake reconciliation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a patient CSV as the active batch
    Import {
        /// Path to the CSV file
        path: PathBuf,
        /// Declared media type (defaults to a guess from the file extension)
        #[arg(long)]
        media_type: Option<String>,
    },
    /// List the active batch's records
    List,
    /// Edit one record in the active batch
    Edit {
        /// EHR ID of the record to edit
        ehr_id: String,
        /// New EHR ID
        #[arg(long)]
        set_ehr_id: Option<String>,
        /// New patient name
        #[arg(long)]
        patient_name: Option<String>,
        /// New email
        #[arg(long)]
        email: Option<String>,
        /// New phone number
        #[arg(long)]
        phone: Option<String>,
        /// New referring provider
        #[arg(long)]
        referring_provider: Option<String>,
    },
    /// Push the valid records to the CRM
    Sync {
        /// Simulated CRM failure rate, 0.0 to 1.0
        #[arg(long, default_value_t = 0.2)]
        fail_rate: f64,
    },
    /// Discard the active batch
    Reset,
}

/// Best-effort declared media type from the file extension. The engine only
/// accepts `text/csv`; everything else is rejected before parsing.
fn declared_media_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => CSV_MEDIA_TYPE,
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn data_dir() -> String {
    std::env::var("PIR_DATA_DIR").unwrap_or_else(|_| "/pir_data".into())
}

fn restore_store(kv: &DirectoryStore) -> anyhow::Result<ReconciliationStore> {
    let mut store = ReconciliationStore::new();
    if let Some(batch) = load_active_batch(kv)? {
        store.load(batch);
    }
    Ok(store)
}

fn persist_store(kv: &mut DirectoryStore, store: &ReconciliationStore) -> anyhow::Result<()> {
    if let Some(batch) = store.active() {
        save_active_batch(kv, batch)?;
    }
    Ok(())
}

fn print_batch(batch: &Batch) {
    println!(
        "{} (imported {}, {} records)",
        batch.file_name,
        batch.created.format("%-d %b %Y"),
        batch.records.len()
    );
    for record in &batch.records {
        let validity = if record.is_valid { "" } else { " (invalid)" };
        println!(
            "{:<12} {:<24} {:<28} {:<14} {:<22} {}{}",
            record.ehr_id(),
            record.patient_name(),
            record.field(CanonicalField::Email.key()),
            record.field(CanonicalField::Phone.key()),
            record.field(CanonicalField::ReferringProvider.key()),
            record.sync_status,
            validity,
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pir_core=info".parse()?)
                .add_directive("pir=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut kv = DirectoryStore::new(data_dir());

    match cli.command {
        Commands::Import { path, media_type } => {
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("upload.csv")
                .to_string();
            let media_type =
                media_type.unwrap_or_else(|| declared_media_type(&path).to_string());
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;

            let batch = ingest_csv(&file_name, &media_type, &text)?;
            let count = batch.records.len();

            let mut store = ReconciliationStore::new();
            store.load(batch);
            persist_store(&mut kv, &store)?;
            println!("{count} records loaded successfully");
        }
        Commands::List => {
            let store = restore_store(&kv)?;
            match store.active() {
                Some(batch) => print_batch(batch),
                None => println!("No documents uploaded yet. Import a CSV to get started."),
            }
        }
        Commands::Edit {
            ehr_id,
            set_ehr_id,
            patient_name,
            email,
            phone,
            referring_provider,
        } => {
            let mut store = restore_store(&kv)?;
            store.begin_edit(&ehr_id)?;

            let mut patch = BTreeMap::new();
            let updates = [
                (CanonicalField::EhrId, set_ehr_id),
                (CanonicalField::PatientName, patient_name),
                (CanonicalField::Email, email),
                (CanonicalField::Phone, phone),
                (CanonicalField::ReferringProvider, referring_provider),
            ];
            for (field, value) in updates {
                if let Some(value) = value {
                    patch.insert(field.key().to_string(), value);
                }
            }

            if patch.is_empty() {
                store.cancel_edit();
                println!("nothing to change for '{ehr_id}'");
            } else {
                // The patch may rewrite the key field, so take the
                // confirmation from the returned record, not a re-lookup.
                let (is_valid, new_key) = {
                    let record = store.commit_edit(&ehr_id, &patch)?;
                    (record.is_valid, record.ehr_id().to_string())
                };
                persist_store(&mut kv, &store)?;
                let validity = if is_valid { "valid" } else { "invalid" };
                println!("record '{new_key}' updated ({validity}, pending)");
            }
        }
        Commands::Sync { fail_rate } => {
            let mut store = restore_store(&kv)?;
            let mut coordinator = SyncCoordinator::new();
            let crm = SimulatedCrm::new(fail_rate);

            let result = coordinator.sync(&mut store, &crm).await;
            persist_store(&mut kv, &store)?;
            match result {
                Ok(updated) => println!("{updated} records synced to the CRM"),
                Err(err @ IntakeError::NothingToSync) => println!("{err}"),
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Reset => {
            clear_active_batch(&mut kv)?;
            println!("active batch discarded");
        }
    }

    Ok(())
}
