use std::io;
use std::path::{Path, PathBuf};

use http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tokio::fs;

use super::csv::{Row, parse};
use super::stats::{CategoryColumns, Statistics};

/// Where the bank product analyzer writes its results, relative to the
/// working directory.
pub const RESULT_PATH: &str = "output/result.csv";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("result file {} does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AnalysisError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Read { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand to a client. Never includes paths or OS errors.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => {
                "Results not found. Run the bank product analysis first to generate output/result.csv"
            }
            Self::Read { .. } => "Failed to load analysis results",
        }
    }
}

/// Full result set plus its statistics, for one request.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Report {
    pub data: Vec<Row>,
    pub statistics: Statistics,
}

/// Loads and aggregates the result file. Stateless: every call rereads the
/// file from disk.
#[derive(Clone, Debug)]
pub struct ResultLoader {
    path: PathBuf,
    categories: CategoryColumns,
}

impl ResultLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), categories: CategoryColumns::default() }
    }

    pub fn with_categories(mut self, categories: CategoryColumns) -> Self {
        self.categories = categories;
        self
    }

    pub fn path(&self) -> &Path { &self.path }

    pub async fn load(&self) -> Result<Report, AnalysisError> {
        let exists = fs::try_exists(&self.path).await.map_err(|e| self.read_error(e))?;
        if !exists {
            return Err(self.not_found());
        }

        // The file can still vanish between the check and the read.
        let content = fs::read_to_string(&self.path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => self.not_found(),
            _ => self.read_error(e),
        })?;

        let data = parse(&content);
        let statistics = Statistics::collect(&data, &self.categories);
        Ok(Report { data, statistics })
    }

    fn not_found(&self) -> AnalysisError {
        AnalysisError::NotFound { path: self.path.clone() }
    }

    fn read_error(&self, source: io::Error) -> AnalysisError {
        AnalysisError::Read { path: self.path.clone(), source }
    }
}

impl Default for ResultLoader {
    fn default() -> Self { Self::new(RESULT_PATH) }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn loads_rows_and_statistics() {
        let file = write_csv("a,b,product\n1,2,X\n3,4,Y\n5,6,X\n");
        let report = ResultLoader::new(file.path()).load().await.unwrap();
        assert_eq!(report.data.len(), 3);
        assert_eq!(report.statistics.total_clients, 3);
        assert_eq!(report.statistics.products.get("X"), Some(2));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResultLoader::new(dir.path().join("result.csv")).load().await.unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound { .. }));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn directory_is_a_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResultLoader::new(dir.path()).load().await.unwrap_err();
        assert!(matches!(err, AnalysisError::Read { .. }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Failed to load analysis results");
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_read_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b\n\xff\xfe,1\n").unwrap();
        let err = ResultLoader::new(file.path()).load().await.unwrap_err();
        assert!(matches!(err, AnalysisError::Read { .. }));
    }

    #[tokio::test]
    async fn repeated_loads_are_identical() {
        let file = write_csv("client_id,best_product\n1,deposits\n2,travel_card\n3,deposits\n");
        let loader = ResultLoader::new(file.path());
        let first = serde_json::to_vec(&loader.load().await.unwrap()).unwrap();
        let second = serde_json::to_vec(&loader.load().await.unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn custom_category_columns() {
        let file = write_csv("segment,best_product\nretail,deposits\n,deposits\n");
        let loader = ResultLoader::new(file.path())
            .with_categories(CategoryColumns::new(["segment", "best_product"]));
        let report = loader.load().await.unwrap();
        assert_eq!(report.statistics.products.get("retail"), Some(1));
        assert_eq!(report.statistics.products.get("deposits"), Some(1));
    }

    #[test]
    fn default_path_is_fixed() {
        assert_eq!(ResultLoader::default().path(), Path::new("output/result.csv"));
    }
}
