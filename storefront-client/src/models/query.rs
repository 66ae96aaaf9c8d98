use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const POPULAR_TERM: &str = "fiction";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Relevance,
    Rating,
    RatingAsc,
    Title,
    Author,
    Date,
}

impl SortOrder {
    /// Value for the catalog's `sort` parameter; relevance sends none.
    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            SortOrder::Relevance => None,
            SortOrder::Rating => Some("rating desc"),
            SortOrder::RatingAsc => Some("rating asc"),
            SortOrder::Title => Some("title"),
            SortOrder::Author => Some("author"),
            SortOrder::Date => Some("date"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Relevance => "Sort by",
            SortOrder::Rating => "Rating",
            SortOrder::RatingAsc => "Rating (Low to High)",
            SortOrder::Title => "Title",
            SortOrder::Author => "Author",
            SortOrder::Date => "Date",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevance" | "" => Ok(SortOrder::Relevance),
            "rating" => Ok(SortOrder::Rating),
            "rating_asc" => Ok(SortOrder::RatingAsc),
            "title" => Ok(SortOrder::Title),
            "author" => Ok(SortOrder::Author),
            "date" => Ok(SortOrder::Date),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl YearRange {
    pub fn clause(&self) -> String {
        match self.end {
            Some(end) => format!("first_publish_year:[{} TO {}]", self.start, end),
            None => format!("first_publish_year:{}", self.start),
        }
    }
}

impl FromStr for YearRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid year '{}': {}", part, e))
        };

        match s.split_once('-') {
            Some((start, end)) => Ok(YearRange {
                start: parse(start)?,
                end: Some(parse(end)?),
            }),
            None => Ok(YearRange {
                start: parse(s)?,
                end: None,
            }),
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}", self.start),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub genre: Option<String>,
    pub language: Option<String>,
    pub year: Option<YearRange>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl Filters {
    pub fn clauses(&self) -> String {
        let mut clauses = String::new();

        if let Some(ref genre) = self.genre {
            clauses.push_str(&format!(" subject:{}", genre));
        }
        if let Some(ref language) = self.language {
            clauses.push_str(&format!(" language:{}", language));
        }
        if let Some(year) = self.year {
            clauses.push(' ');
            clauses.push_str(&year.clause());
        }

        clauses
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSelection {
    Genre(String),
    Language(String),
    Year(YearRange),
}

impl FilterSelection {
    /// The menu value, which doubles as the display term for the results.
    pub fn label(&self) -> String {
        match self {
            FilterSelection::Genre(genre) => genre.clone(),
            FilterSelection::Language(language) => language.clone(),
            FilterSelection::Year(year) => year.to_string(),
        }
    }

    pub fn apply_to(&self, filters: &mut Filters) {
        match self {
            FilterSelection::Genre(genre) => filters.genre = Some(genre.clone()),
            FilterSelection::Language(language) => filters.language = Some(language.clone()),
            FilterSelection::Year(year) => filters.year = Some(*year),
        }
    }
}

/// What drives a result set. `term == None` is the popular-books landing
/// query, which ignores filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub term: Option<String>,
    pub filters: Filters,
}

impl Query {
    pub fn popular() -> Self {
        Self::default()
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            term: Some(term.into()),
            filters: Filters::default(),
        }
    }

    pub fn is_popular(&self) -> bool {
        self.term.is_none()
    }

    pub fn search_text(&self) -> String {
        match self.term {
            Some(ref term) => format!("{}{}", term, self.filters.clauses()),
            None => POPULAR_TERM.to_string(),
        }
    }
}
