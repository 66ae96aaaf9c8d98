use crate::models::book::Rating;
use crate::models::responses::{AuthorResponse, Edition, RatingsResponse, WorkResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetails {
    pub key: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub language: Option<String>,
    pub pages: Option<String>,
    pub release_date: String,
    pub description: Option<String>,
    pub rating: Option<Rating>,
    pub genres: Vec<String>,
    pub places: Vec<String>,
    pub people: Vec<String>,
    pub times: Vec<String>,
}

pub fn language_name(code: &str) -> String {
    match code {
        "eng" => "English",
        "spa" => "Spanish",
        "fre" => "French",
        "ger" => "German",
        "ita" => "Italian",
        "por" => "Portuguese",
        "rus" => "Russian",
        "jpn" => "Japanese",
        "chi" => "Chinese",
        "ara" => "Arabic",
        other => return other.to_uppercase(),
    }
    .to_string()
}

impl BookDetails {
    pub fn assemble(
        key: &str,
        work: WorkResponse,
        ratings: Option<RatingsResponse>,
        edition: Option<Edition>,
        author: Option<AuthorResponse>,
        covers_url: &str,
    ) -> Self {
        let author_name = author
            .and_then(|a| a.name)
            .or_else(|| work.authors.first().and_then(|a| a.name.clone()))
            .unwrap_or_else(|| "Unknown Author".to_string());

        let cover_url = work.covers.first().map(|id| {
            format!("{}/b/id/{}-L.jpg", covers_url.trim_end_matches('/'), id)
        });

        let language = edition
            .as_ref()
            .and_then(|e| e.languages.first())
            .and_then(|lang| lang.key.rsplit('/').next())
            .map(language_name);

        let pages = edition.as_ref().and_then(|e| {
            e.number_of_pages
                .map(|n| n.to_string())
                .or_else(|| e.pagination.clone())
        });

        let release_date = edition
            .as_ref()
            .and_then(|e| e.publish_date.clone())
            .or(work.first_publish_date)
            .unwrap_or_else(|| "Unknown".to_string());

        let description = work
            .description
            .map(|d| d.as_str().trim().to_string())
            .filter(|d| !d.is_empty());

        let rating = ratings
            .and_then(|r| r.summary)
            .and_then(|s| match s.average {
                Some(average) if average > 0.0 => Some(Rating {
                    average,
                    count: s.count.unwrap_or(0),
                }),
                _ => None,
            });

        Self {
            key: key.to_string(),
            title: work.title.unwrap_or_else(|| "Unknown Title".to_string()),
            author: author_name,
            cover_url,
            language,
            pages,
            release_date,
            description,
            rating,
            genres: work.subjects,
            places: work.subject_places,
            people: work.subject_people,
            times: work.subject_times,
        }
    }
}
