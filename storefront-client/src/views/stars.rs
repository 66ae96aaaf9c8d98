use crate::models::book::Rating;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarBreakdown {
    pub full: u8,
    pub half: bool,
    pub empty: u8,
}

impl StarBreakdown {
    pub fn for_rating(rating: f64) -> Self {
        let rating = rating.clamp(0.0, 5.0);
        let full = rating.floor() as u8;
        let half = full < 5 && rating.fract() >= 0.5;
        let empty = 5 - full - u8::from(half);

        Self { full, half, empty }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingView {
    pub stars: StarBreakdown,
    pub text: Option<String>,
}

impl RatingView {
    /// `None` for unrated books; the text needs a review count as well.
    pub fn from_rating(rating: Option<&Rating>) -> Option<Self> {
        let rating = rating.filter(|r| r.average > 0.0)?;

        Some(Self {
            stars: StarBreakdown::for_rating(rating.average),
            text: (rating.count > 0)
                .then(|| format!("{:.1} ({} reviews)", rating.average, rating.count)),
        })
    }
}
