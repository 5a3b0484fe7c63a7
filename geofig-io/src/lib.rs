use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use geofig_core::errors::FigureError;
use geofig_core::figure::Figure;

mod comments;
mod parser;
mod unparse;
mod writer;

pub use comments::strip_comments;
pub use parser::FigureParser;
pub use unparse::{UnparseOptions, unparse, unparse_with};
pub use writer::to_json_value;

/// 解析失败时可归入的四类错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedFigure,
    DuplicateName,
    UnknownPoint,
    SelfLoop,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed figure at {path}: expected {expected}, found {found}")]
    Malformed {
        path: String,
        expected: &'static str,
        found: String,
    },
    #[error("invalid JSON at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    #[error(transparent)]
    Figure(#[from] FigureError),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Malformed { .. } | ParseError::Syntax { .. } => ErrorKind::MalformedFigure,
            ParseError::Figure(FigureError::DuplicateName(_)) => ErrorKind::DuplicateName,
            ParseError::Figure(FigureError::UnknownPoint(_)) => ErrorKind::UnknownPoint,
            ParseError::Figure(FigureError::SelfLoop(_)) => ErrorKind::SelfLoop,
        }
    }
}

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode figure for {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse figure {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl IoError {
    /// 仅解析类错误带有分类。
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            IoError::Parse { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

pub trait FigureLoader {
    fn load(&self, path: &Path) -> Result<Figure, IoError>;
}

pub trait FigureSaver {
    fn save(&self, figure: &Figure, path: &Path) -> Result<(), IoError>;
}

/// JSON 图形文件的读写入口。
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFacade {
    parser: FigureParser,
}

impl JsonFacade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(parser: FigureParser) -> Self {
        Self { parser }
    }
}

impl FigureLoader for JsonFacade {
    fn load(&self, path: &Path) -> Result<Figure, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let figure = self
            .parser
            .parse_str(&data)
            .map_err(|source| IoError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), points = figure.points().len(), "已加载图形文件");
        Ok(figure)
    }
}

impl FigureSaver for JsonFacade {
    fn save(&self, figure: &Figure, path: &Path) -> Result<(), IoError> {
        let text = serde_json::to_string_pretty(&to_json_value(figure)).map_err(|source| {
            IoError::Encode {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, text).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}
