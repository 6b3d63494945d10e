use crate::cli::{ClaimArgs, Cli, Command, CrawlArgs, DeleteArgs, PutArgs, QueryArgs, kind};
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use modcat_access::{AccessGate, JwtVerifier, claim_field, encode_allowed};
use modcat_catalog::{Catalog, Status};
use modcat_config::Config;
use modcat_store::{Record, RecordKind, StoreHandle};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Command::Claim(args) = &cli.command {
        return claim(&config, args);
    }
    let engine = config.database.engine().or_raise(|| ErrorKind::Config)?;
    let store = modcat_store::connect(&engine).await.or_raise(|| ErrorKind::Store)?;
    tracing::debug!(engine = store.engine(), "Connected to record store");
    let result = execute(cli.command, &config, &store).await;
    store.close().await;
    result
}

async fn execute(command: Command, config: &Config, store: &StoreHandle) -> Result<()> {
    match command {
        Command::Crawl(args) => crawl(store, args).await,
        // Reads need no credential.
        Command::Query(args) => query(&Catalog::new(store.clone()), args).await,
        Command::Put(args) => put(&writable_catalog(config, store.clone()).await?, args).await,
        Command::Delete(args) => delete(&writable_catalog(config, store.clone()).await?, args).await,
        Command::Claim(args) => claim(config, &args),
    }
}

async fn writable_catalog(config: &Config, store: StoreHandle) -> Result<Catalog> {
    let catalog = Catalog::new(store);
    let Some(verifier) = JwtVerifier::from_config(&config.access).await.or_raise(|| ErrorKind::Access)? else {
        return Ok(catalog);
    };
    let namespace = config.claim_namespace().ok_or_raise(|| ErrorKind::Namespace)?;
    let gate = AccessGate::for_namespace(Arc::new(verifier), namespace);
    tracing::debug!(claim = gate.field(), "Writes are authorized");
    Ok(catalog.with_gate(gate))
}

async fn crawl(store: &StoreHandle, args: CrawlArgs) -> Result<()> {
    let crawl = modcat_crawl::crawl(&args.path, &args.url).await.or_raise(|| ErrorKind::Crawl)?;
    let report = modcat_crawl::ingest(store.as_ref(), &args.org, &crawl).await;
    println!(
        "inserted {}, already cataloged {}, skipped {}, failed {}",
        report.inserted, report.existing, report.skipped, report.failed
    );
    Ok(())
}

async fn query(catalog: &Catalog, args: QueryArgs) -> Result<()> {
    let filter = args.filter();
    let output: Vec<Value> = match args.kind() {
        RecordKind::Module => catalog
            .modules(&filter)
            .await
            .or_raise(|| ErrorKind::Catalog)?
            .into_iter()
            .map(|entry| {
                let mut value = record_json(&entry.record);
                value["url"] = json!(entry.url);
                value["summary"] = json!(entry.summary);
                value
            })
            .collect(),
        kind => catalog
            .query(kind, &filter)
            .await
            .or_raise(|| ErrorKind::Catalog)?
            .iter()
            .map(record_json)
            .collect(),
    };
    let output = serde_json::to_string_pretty(&output).or_raise(|| ErrorKind::Output)?;
    println!("{output}");
    Ok(())
}

async fn put(catalog: &Catalog, args: PutArgs) -> Result<()> {
    let token = read_token(&args.token).await?;
    let raw = tokio::fs::read(&args.file).await.or_raise(|| ErrorKind::Io(args.file.clone()))?;
    let result = catalog
        .create_or_update(kind(args.bundle), Some(token.as_str()), &args.org, &raw)
        .await;
    println!("{}", Status::of(&result));
    result.or_raise(|| ErrorKind::Catalog)?;
    Ok(())
}

async fn delete(catalog: &Catalog, args: DeleteArgs) -> Result<()> {
    let token = read_token(&args.token).await?;
    let result = catalog
        .delete(kind(args.bundle), Some(token.as_str()), &args.org, &args.name, &args.version)
        .await;
    println!("{}", Status::of(&result));
    result.or_raise(|| ErrorKind::Catalog)?;
    Ok(())
}

fn claim(config: &Config, args: &ClaimArgs) -> Result<()> {
    let output = serde_json::to_string_pretty(&allow_claim(config, &args.org)?).or_raise(|| ErrorKind::Output)?;
    println!("{output}");
    Ok(())
}

/// The allow-claim an identity provider has to issue for the organizations.
fn allow_claim(config: &Config, organizations: &[String]) -> Result<Value> {
    let namespace = config.claim_namespace().ok_or_raise(|| ErrorKind::Namespace)?;
    let mut claims = serde_json::Map::new();
    claims.insert(claim_field(namespace), Value::String(encode_allowed(organizations)));
    Ok(Value::Object(claims))
}

async fn read_token(path: &Path) -> Result<String> {
    let token = tokio::fs::read_to_string(path)
        .await
        .or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    Ok(token.trim().to_string())
}

/// Record as printed by `query`: its key, and the document parsed back into
/// JSON (or as a string if the engine holds something unparsable).
fn record_json(record: &Record) -> Value {
    let data = serde_json::from_str(&record.data).unwrap_or_else(|_| Value::String(record.data.clone()));
    json!({
        "org_name": record.key.org_name(),
        "name": record.key.name(),
        "version": record.key.version(),
        "data": data,
    })
}
