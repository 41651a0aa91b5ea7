use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("expected at least {min} segment(s) separated by \"::\" but found {found}")]
    TooFewSegments { min: usize, found: usize },

    #[error("segment {index} is empty")]
    EmptySegment { index: usize },

    #[error("segment {segment:?} is not a valid identifier")]
    InvalidIdentifier { segment: String },

    #[error("segment {segment:?} is a reserved C++ keyword")]
    ReservedWord { segment: String },
}

#[derive(Debug, Error)]
pub enum EncodeFileError {
    #[error("error reading {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing declaration: {0}")]
    Write(#[from] std::io::Error),
}
