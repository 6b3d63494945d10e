use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("no claim namespace configured (set access.namespace or DB_NAME)")]
    Namespace,
    #[display("could not set up credential verification")]
    Access,
    #[display("could not open the record store")]
    Store,
    #[display("crawl failed")]
    Crawl,
    #[display("catalog operation failed")]
    Catalog,
    #[display("could not read {}", _0.display())]
    Io(#[error(not(source))] std::path::PathBuf),
    #[display("could not write output")]
    Output,
}
