use crate::models::details::BookDetails;
use crate::models::responses::{AuthorResponse, EditionsResponse, RatingsResponse, WorkResponse};
use crate::services::catalog::{CatalogError, OpenLibraryCatalog};
use crate::utils::cancel::CancelToken;
use tracing::{debug, error};

/// Accepts `/works/OL1W`, `works/OL1W` or a bare `OL1W`.
pub fn normalize_work_key(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.starts_with("works/") {
        format!("/{}", trimmed)
    } else {
        format!("/works/{}", trimmed)
    }
}

fn optional<T>(result: Result<T, CatalogError>, what: &str) -> Result<Option<T>, CatalogError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CatalogError::Cancelled) => Err(CatalogError::Cancelled),
        Err(e) => {
            debug!("Could not fetch {}: {}", what, e);
            Ok(None)
        }
    }
}

/// Loads everything the detail page shows. Only the work record itself is
/// required; ratings, editions and the author record are best effort.
pub async fn load_book_details(
    catalog: &OpenLibraryCatalog,
    raw_key: &str,
    cancel: &CancelToken,
) -> Result<BookDetails, CatalogError> {
    let key = normalize_work_key(raw_key);

    let work: WorkResponse = catalog
        .get_json(&format!("{}.json", key), &[], cancel)
        .await
        .map_err(|e| {
            error!("Error loading book details for {}: {}", key, e);
            e
        })?;

    let ratings = optional(
        catalog
            .get_json::<RatingsResponse>(&format!("{}/ratings.json", key), &[], cancel)
            .await,
        "ratings",
    )?;

    let edition = optional(
        catalog
            .get_json::<EditionsResponse>(&format!("{}/editions.json", key), &[], cancel)
            .await,
        "edition data",
    )?
    .and_then(|editions| editions.entries.into_iter().next());

    let author_key = work
        .authors
        .first()
        .and_then(|a| a.author.as_ref())
        .map(|a| a.key.clone());

    let author = match author_key {
        Some(author_key) => optional(
            catalog
                .get_json::<AuthorResponse>(&format!("{}.json", author_key), &[], cancel)
                .await,
            "author data",
        )?,
        None => None,
    };

    Ok(BookDetails::assemble(
        &key,
        work,
        ratings,
        edition,
        author,
        catalog.covers_url(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_keys_are_normalized() {
        assert_eq!(normalize_work_key("/works/OL45804W"), "/works/OL45804W");
        assert_eq!(normalize_work_key("works/OL45804W"), "/works/OL45804W");
        assert_eq!(normalize_work_key("OL45804W"), "/works/OL45804W");
        assert_eq!(normalize_work_key(" /works/OL45804W/ "), "/works/OL45804W");
    }
}
