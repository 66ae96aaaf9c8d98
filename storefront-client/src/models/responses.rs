use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    pub docs: Option<Vec<SearchDoc>>,
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SearchDoc {
    pub key: String,
    pub title: Option<String>,
    pub author_name: Option<Vec<String>>,
    pub cover_i: Option<i64>,
    pub first_publish_year: Option<i32>,
    pub number_of_pages_median: Option<u32>,
    pub subject: Option<Vec<String>>,
    pub ratings_average: Option<f64>,
    pub ratings_count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RatingsResponse {
    pub summary: Option<RatingsSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RatingsSummary {
    pub average: Option<f64>,
    pub count: Option<u64>,
}

/// `description` is either a bare string or `{ "type": ..., "value": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextValue {
    Plain(String),
    Typed { value: String },
}

impl TextValue {
    pub fn as_str(&self) -> &str {
        match self {
            TextValue::Plain(text) => text,
            TextValue::Typed { value } => value,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkResponse {
    pub title: Option<String>,
    pub description: Option<TextValue>,
    pub covers: Vec<i64>,
    pub authors: Vec<WorkAuthor>,
    pub first_publish_date: Option<String>,
    pub subjects: Vec<String>,
    pub subject_places: Vec<String>,
    pub subject_people: Vec<String>,
    pub subject_times: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkAuthor {
    pub author: Option<KeyRef>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct KeyRef {
    pub key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EditionsResponse {
    pub entries: Vec<Edition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Edition {
    pub languages: Vec<KeyRef>,
    pub number_of_pages: Option<u32>,
    pub pagination: Option<String>,
    pub publish_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthorResponse {
    pub name: Option<String>,
}
