use fp_models::ModelError;
use fp_solver::SolverError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Invalid case: {what}")]
    Case { what: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
