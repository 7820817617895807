use crate::{actions::{Actions, ElementSnapshot, Selector},
            artifacts::{ArtifactStore, RANKING_ARTIFACT},
            error::{PilotError, Result}};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Currency symbol followed by digits with optional thousands separators
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[₪$€£¥]\s?(\d{1,3}(?:,\d{3})+|\d+)").expect("valid price regex"));

/// Rating with review count. Accepts one or two fractional digits, so both "4.8 (12)"
/// and the site's "4.87 (123)" form parse.
static RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d\.\d{1,2})\s*\((\d[\d,]*)\)").expect("valid rating regex"));

/// One parsed result card, scoped to a single ranking pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingCandidate {
    /// 0-based position among the rendered cards
    pub index: usize,
    /// Smallest currency unit shown on the card
    pub price: u64,
    pub rating: f64,
    pub text: String,
}

/// Winning candidate, persisted as `cheapest_top_rated.json`
pub type RankingResult = ListingCandidate;

/// Price the card commits to. Discounted cards render the struck-out price first.
pub fn parse_price(text: &str) -> Option<u64> {
    let last = PRICE_RE.captures_iter(text).last()?;
    let digits: String = last[1].chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<u64>().ok().filter(|price| *price > 0)
}

pub fn parse_rating(text: &str) -> Option<f64> {
    let caps = RATING_RE.captures(text)?;
    caps[1].parse::<f64>().ok().filter(|rating| (0.0..=5.0).contains(rating))
}

/// Parse one card; `None` when it is hidden or lacks a price or rating
pub fn parse_card(index: usize, card: &ElementSnapshot) -> Option<ListingCandidate> {
    if !card.visible {
        return None;
    }
    let price = parse_price(&card.text)?;
    let rating = parse_rating(&card.text)?;

    Some(ListingCandidate { index, price, rating, text: card.text.clone() })
}

pub fn extract_candidates(cards: &[ElementSnapshot]) -> Vec<ListingCandidate> {
    cards
        .iter()
        .enumerate()
        .filter_map(|(index, card)| {
            let candidate = parse_card(index, card);
            if candidate.is_none() {
                log::debug!("Skipping card {} (hidden or unparseable)", index);
            }
            candidate
        })
        .collect()
}

/// Highest rating wins; among equally rated candidates the lowest price wins;
/// remaining ties go to the earliest card.
pub fn rank(candidates: &[ListingCandidate]) -> Option<&ListingCandidate> {
    let max_rating = candidates.iter().map(|c| c.rating).fold(None, |max: Option<f64>, rating| {
        Some(max.map_or(rating, |m| m.max(rating)))
    })?;

    candidates.iter().filter(|c| c.rating == max_rating).min_by_key(|c| c.price)
}

#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub cards: Selector,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self { cards: Selector::xpath("//div[@data-testid='card-container']") }
    }
}

/// Reads the rendered result cards and picks the cheapest top-rated listing
pub struct ListingAnalyzer<'a> {
    actions: &'a dyn Actions,
    selectors: ListingSelectors,
}

impl<'a> ListingAnalyzer<'a> {
    pub fn new(actions: &'a dyn Actions) -> Self {
        Self::with_selectors(actions, ListingSelectors::default())
    }

    pub fn with_selectors(actions: &'a dyn Actions, selectors: ListingSelectors) -> Self {
        Self { actions, selectors }
    }

    pub fn selectors(&self) -> &ListingSelectors {
        &self.selectors
    }

    pub fn candidates(&self) -> Result<(usize, Vec<ListingCandidate>)> {
        let cards = self.actions.snapshot_all(&self.selectors.cards)?;
        Ok((cards.len(), extract_candidates(&cards)))
    }

    pub fn cheapest_top_rated(&self) -> Result<RankingResult> {
        let (cards, candidates) = self.candidates()?;
        log::info!("Parsed {} of {} result cards", candidates.len(), cards);

        rank(&candidates).cloned().ok_or(PilotError::NoValidListings { cards })
    }

    /// Rank the current results and persist the winner
    pub fn analyze_and_save(&self, store: &ArtifactStore) -> Result<RankingResult> {
        let winner = self.cheapest_top_rated()?;
        log::info!("Cheapest top-rated listing: #{} at {} ({})", winner.index, winner.price, winner.rating);

        store.write_json(RANKING_ARTIFACT, &winner)?;
        Ok(winner)
    }
}
