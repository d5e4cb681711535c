//! CLI Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    /// An argument could not be turned into a model value.
    #[display("invalid {_0}")]
    Argument(#[error(not(source))] &'static str),
    #[display("could not open the store")]
    Store,
    #[display("could not open media storage")]
    Storage,
    #[display("could not read {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    #[display("command failed")]
    Command,
}
