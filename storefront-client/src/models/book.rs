use crate::models::responses::SearchDoc;
use serde::{Deserialize, Serialize};

const DEMO_PRICES_CENTS: [u32; 10] = [999, 1299, 1550, 1875, 2200, 1125, 1499, 1999, 1650, 1375];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    LikeNew,
    VeryGood,
    Good,
}

impl Condition {
    const ALL: [Condition; 3] = [Condition::LikeNew, Condition::VeryGood, Condition::Good];

    pub fn label(&self) -> &'static str {
        match self {
            Condition::LikeNew => "Like New",
            Condition::VeryGood => "Very Good",
            Condition::Good => "Good",
        }
    }

    pub fn badge_class(&self) -> String {
        self.label().to_lowercase().replace(' ', "-")
    }
}

/// Placeholder second-hand listing shown on each card. Derived from the book
/// key so the same book always carries the same price and condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub price_cents: u32,
    pub condition: Condition,
}

impl Listing {
    pub fn for_key(key: &str) -> Self {
        // FNV-1a, stable across builds and platforms.
        let hash = key.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| {
            (acc ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
        });

        Self {
            price_cents: DEMO_PRICES_CENTS[(hash % DEMO_PRICES_CENTS.len() as u64) as usize],
            condition: Condition::ALL[((hash / 10) % Condition::ALL.len() as u64) as usize],
        }
    }

    pub fn price_label(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub average: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Open Library work key, e.g. `/works/OL45804W`.
    pub key: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub published_year: Option<i32>,
    pub page_count: Option<u32>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub rating: Option<Rating>,
    pub listing: Listing,
}

impl Book {
    pub fn from_doc(doc: SearchDoc, covers_url: &str) -> Self {
        let author = doc
            .author_name
            .filter(|names| !names.is_empty())
            .map(|names| names.join(", "))
            .unwrap_or_else(|| "Unknown Author".to_string());

        let rating = doc.ratings_average.map(|average| Rating {
            average,
            count: doc.ratings_count.unwrap_or(0),
        });

        Self {
            listing: Listing::for_key(&doc.key),
            cover_url: doc
                .cover_i
                .map(|id| format!("{}/b/id/{}-M.jpg", covers_url.trim_end_matches('/'), id)),
            key: doc.key,
            title: doc.title.unwrap_or_else(|| "Unknown Title".to_string()),
            author,
            published_year: doc.first_publish_year,
            page_count: doc.number_of_pages_median,
            categories: doc.subject.unwrap_or_default(),
            rating,
        }
    }
}
