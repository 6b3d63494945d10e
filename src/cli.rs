use crate::logging::LogFormat;
use clap::{Args, Parser, Subcommand};
use modcat_crawl::DEFAULT_ORG;
use modcat_store::{Filter, RecordKind};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "modcat", version, about)]
pub struct Cli {
    /// Configuration file [default: modcat.toml in the platform config directory]
    #[arg(long, global = true, env = "MODCAT_CONFIG")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Crawl YANG source trees and catalog every new module version
    Crawl(CrawlArgs),
    /// Print cataloged records as JSON
    Query(QueryArgs),
    /// Create or replace a record
    Put(PutArgs),
    /// Delete a record
    Delete(DeleteArgs),
    /// Print the claim an identity provider must issue to allow writing to
    /// the given organizations
    Claim(ClaimArgs),
}

#[derive(Debug, Args)]
pub struct CrawlArgs {
    /// Source tree roots, crawled in the order given
    #[arg(long, required = true, value_delimiter = ',')]
    pub path: Vec<PathBuf>,
    /// Prefix of the canonical URL of every crawled file
    #[arg(long, default_value = "")]
    pub url: String,
    /// Organization the modules are cataloged under
    #[arg(long, default_value = DEFAULT_ORG)]
    pub org: String,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[arg(long)]
    pub org: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub version: Option<String>,
    /// Query feature bundles instead of modules
    #[arg(long)]
    pub bundles: bool,
}

impl QueryArgs {
    pub fn kind(&self) -> RecordKind {
        kind(self.bundles)
    }

    pub fn filter(&self) -> Filter {
        Filter {
            org_name: self.org.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct PutArgs {
    /// File holding the credential
    #[arg(long)]
    pub token: PathBuf,
    #[arg(long)]
    pub org: String,
    /// JSON document to store
    pub file: PathBuf,
    /// The document is a feature bundle
    #[arg(long)]
    pub bundle: bool,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// File holding the credential
    #[arg(long)]
    pub token: PathBuf,
    #[arg(long)]
    pub org: String,
    pub name: String,
    pub version: String,
    /// The record is a feature bundle
    #[arg(long)]
    pub bundle: bool,
}

#[derive(Debug, Args)]
pub struct ClaimArgs {
    /// Organizations, comma-separated or repeated
    #[arg(required = true, value_delimiter = ',')]
    pub org: Vec<String>,
}

pub fn kind(bundle: bool) -> RecordKind {
    if bundle { RecordKind::FeatureBundle } else { RecordKind::Module }
}
