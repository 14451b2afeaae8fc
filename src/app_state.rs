//! Implements a struct that holds the state of the REST server.

use std::{fs, path::Path, sync::Arc};

use crate::{Error, dashboard::DashboardData};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The data shown on the dashboard, shared read-only between requests.
    pub dashboard_data: Arc<DashboardData>,
}

impl AppState {
    /// Create a new [AppState] serving `dashboard_data`.
    pub fn new(dashboard_data: DashboardData) -> Self {
        Self {
            dashboard_data: Arc::new(dashboard_data),
        }
    }

    /// Create a new [AppState] from a dashboard data JSON file.
    ///
    /// # Errors
    /// Returns [Error::DataFile] if the file cannot be read, or
    /// [Error::InvalidDashboardData] if it does not contain dashboard data.
    pub fn from_data_file(path: &Path) -> Result<Self, Error> {
        let json = fs::read_to_string(path)
            .map_err(|error| Error::DataFile(format!("{}: {error}", path.display())))?;

        let data = DashboardData::from_json(&json)?;
        tracing::info!(
            "Loaded dashboard data with {} budgets from {}",
            data.budgets.len(),
            path.display()
        );

        Ok(Self::new(data))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::AppState;
    use crate::Error;

    #[test]
    fn missing_file_is_a_data_file_error() {
        let result = AppState::from_data_file(Path::new("does/not/exist.json"));

        assert!(matches!(result, Err(Error::DataFile(_))));
    }

    #[test]
    fn loads_sample_data() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/sample_dashboard.json");

        let state = AppState::from_data_file(&path).unwrap();

        assert!(!state.dashboard_data.is_empty());
        assert!(!state.dashboard_data.budgets.is_empty());
    }
}
