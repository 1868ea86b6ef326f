use thiserror::Error;

use crate::export::ExportError;

/// Everything a run can fail with, grouped by the collaborator that
/// failed. Comparables-unavailable and zero-candidates-after-filter are
/// valid outcomes, not errors, and never appear here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] fynd_blocket::FetchError),
    #[error(transparent)]
    Inference(#[from] fynd_ai::InferenceError),
    #[error(transparent)]
    Storage(#[from] fynd_db::StorageError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
