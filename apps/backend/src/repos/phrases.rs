//! Phrase catalog repository functions for domain layer.

use std::collections::HashMap;

use sea_orm::ConnectionTrait;

use crate::adapters::catalog_sea as catalog_adapter;
use crate::errors::domain::{DomainError, NotFoundKind};

/// Draw up to `limit` random phrases tagged with any of `tag_ids`,
/// excluding `exclude`. Fewer than `limit` results means the filter is
/// exhausted; shortfall handling is the caller's decision.
pub async fn draw_random<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tag_ids: &[i64],
    exclude: &[String],
    limit: u64,
) -> Result<Vec<String>, DomainError> {
    let phrases = catalog_adapter::draw_random(conn, tag_ids, exclude, limit).await?;
    Ok(phrases.into_iter().map(|p| p.phrase).collect())
}

/// Resolve tag names to ids, failing if any name is unknown.
pub async fn resolve_tags<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    names: &[String],
) -> Result<Vec<i64>, DomainError> {
    if names.is_empty() {
        return Err(DomainError::validation(
            "At least one tag is required to source phrases",
        ));
    }

    let tags = catalog_adapter::find_tags_by_names(conn, names).await?;
    let by_name: HashMap<&str, i64> = tags.iter().map(|t| (t.name.as_str(), t.id)).collect();

    let mut ids = Vec::with_capacity(names.len());
    let mut missing = Vec::new();
    for name in names {
        match by_name.get(name.as_str()) {
            Some(id) => ids.push(*id),
            None => missing.push(name.as_str()),
        }
    }

    if !missing.is_empty() {
        return Err(DomainError::not_found(
            NotFoundKind::Tag,
            format!("Unknown tag(s): {}", missing.join(", ")),
        ));
    }

    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}
