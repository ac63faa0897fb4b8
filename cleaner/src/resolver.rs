use crate::{client::StoreClient, JobDescriptor};

/// Resolves the job's selector into the ordered list of metric names to
/// delete.
///
/// Explicit metric names win over the label selector; with neither, every
/// metric name known to the store is returned. A failed lookup contributes no
/// names and resolution continues.
pub async fn resolve(job: &JobDescriptor, client: &StoreClient) -> Vec<String> {
    if !job.metric_names.is_empty() {
        return job.metric_names.clone();
    }

    if job.label_selector.is_empty() {
        return match client.all_metric_names().await {
            Ok(names) => names,
            Err(error) => {
                tracing::warn!(%error, "failed to list metric names");
                Vec::new()
            }
        };
    }

    // NOTE: names matched by several label pairs are kept once per pair
    let mut names = Vec::new();
    for (label, value) in &job.label_selector {
        match client.metric_names_by_label(label, value).await {
            Ok(found) => names.extend(found),
            Err(error) => tracing::warn!(
                %error,
                label = %label,
                value = %value,
                "failed to list metric names by label"
            ),
        }
    }
    names
}
