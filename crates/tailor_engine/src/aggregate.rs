use tailor_core::{BatchId, JobResult, JobUrlList, Msg};
use tailor_logging::{tailor_info, tailor_warn};

use crate::{ApiError, BatchApi};

/// Fetches the result set of a completed batch.
///
/// Records that do not echo their URL borrow the submitted URL at the same
/// position; ordering by URL happens when the results are delivered.
pub async fn fetch_results(
    api: &dyn BatchApi,
    id: &BatchId,
    urls: &JobUrlList,
) -> Result<Vec<JobResult>, ApiError> {
    let results = api.results(id).await?;
    if results.len() != urls.len() {
        tailor_warn!(
            "Batch {} returned {} results for {} urls",
            id,
            results.len(),
            urls.len()
        );
    }
    Ok(results
        .into_iter()
        .enumerate()
        .map(|(index, result)| match urls.as_slice().get(index) {
            Some(url) => result.with_source_url_if_missing(url),
            None => result,
        })
        .collect())
}

pub(crate) async fn load_results(api: &dyn BatchApi, id: &BatchId, urls: &JobUrlList) -> Msg {
    match fetch_results(api, id, urls).await {
        Ok(results) => {
            let succeeded = results.iter().filter(|result| result.is_success()).count();
            tailor_info!(
                "Batch {} results loaded: {} records, {} succeeded",
                id,
                results.len(),
                succeeded
            );
            Msg::ResultsLoaded(results)
        }
        Err(err) => {
            tailor_warn!("Loading results for batch {} failed: {}", id, err);
            Msg::ResultsFailed(err.message())
        }
    }
}
