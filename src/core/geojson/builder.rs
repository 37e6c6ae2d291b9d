//! Feature building over submissions and the GeoJSON writer

use super::feature::{Feature, FeatureCollection};
use crate::domain::{FormSchema, Result, Submission};
use std::path::Path;

/// One feature per spatial field occurrence of a submission
///
/// Fields of the main document are keyed by the instance id; fields inside a
/// repeat group get one feature per instance, keyed by the instance KEY.
pub fn build_features(schema: &FormSchema, submission: &Submission) -> Vec<Feature> {
    let mut features = Vec::new();

    for field in schema.spatial_fields() {
        let kind = schema.field(field).kind;
        let fqn = schema.fqn(field);

        match schema.nearest_repeat_ancestor(field) {
            None => {
                let element = submission.root.follow(schema, &schema.path(field));
                features.push(Feature::from_value(
                    kind,
                    element.map(|e| e.text()),
                    submission.instance_id.as_str(),
                    fqn,
                ));
            }
            Some(group) => {
                let path = schema.path_from(Some(group), field);
                for instance in submission.repeat_instances(schema, group) {
                    let element = instance.element.follow(schema, &path);
                    features.push(Feature::from_value(
                        kind,
                        element.map(|e| e.text()),
                        instance.key,
                        fqn.clone(),
                    ));
                }
            }
        }
    }

    features
}

/// Writes a feature collection, replacing any existing file
pub async fn write_geojson(path: &Path, features: Vec<Feature>) -> Result<usize> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let count = features.len();
    let document = serde_json::to_string_pretty(&FeatureCollection::new(features))?;
    tokio::fs::write(path, document).await?;

    tracing::debug!(file = %path.display(), features = count, "GeoJSON file written");
    Ok(count)
}
