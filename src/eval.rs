// Seven-card hand-strength evaluation. Produces a ranked category plus the
// deciding ranks, enough for the strategy engine's tier checks and for
// naming the hand in a recommendation rationale. This is a tier model, not
// an exhaustive equity calculator.

use std::collections::HashMap;
use std::fmt;

use crate::types::{Card, Rank, Suit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandRanking {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl HandRanking {
    /// A "strong" hand for value-betting and ICM purposes is a straight or
    /// better.
    pub fn is_strong(self) -> bool {
        self >= HandRanking::Straight
    }
}

impl fmt::Display for HandRanking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandRanking::HighCard => "high card",
            HandRanking::OnePair => "one pair",
            HandRanking::TwoPair => "two pair",
            HandRanking::ThreeOfAKind => "three of a kind",
            HandRanking::Straight => "straight",
            HandRanking::Flush => "flush",
            HandRanking::FullHouse => "full house",
            HandRanking::FourOfAKind => "four of a kind",
            HandRanking::StraightFlush => "straight flush",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandStrength {
    pub ranking: HandRanking,
    pub kickers: Vec<Rank>,
}

pub fn evaluate_hand(hole_cards: &[Card], board: &[Card]) -> HandStrength {
    let mut all_cards: Vec<Card> = Vec::with_capacity(hole_cards.len() + board.len());
    all_cards.extend_from_slice(hole_cards);
    all_cards.extend_from_slice(board);

    if all_cards.is_empty() {
        return HandStrength {
            ranking: HandRanking::HighCard,
            kickers: vec![],
        };
    }

    let mut rank_counts: HashMap<Rank, usize> = HashMap::new();
    let mut suit_counts: HashMap<Suit, usize> = HashMap::new();
    for card in &all_cards {
        *rank_counts.entry(card.rank).or_insert(0) += 1;
        *suit_counts.entry(card.suit).or_insert(0) += 1;
    }

    let flush_suit = suit_counts
        .iter()
        .find(|(_, &count)| count >= 5)
        .map(|(&suit, _)| suit);

    let mut unique_ranks: Vec<Rank> = rank_counts.keys().copied().collect();
    unique_ranks.sort_by(|a, b| b.cmp(a));
    let (has_straight, straight_high) = check_straight(&unique_ranks);

    if let Some(suit) = flush_suit {
        let mut flush_ranks: Vec<Rank> = all_cards
            .iter()
            .filter(|c| c.suit == suit)
            .map(|c| c.rank)
            .collect();
        flush_ranks.sort_by(|a, b| b.cmp(a));
        flush_ranks.dedup();
        let (has_sf, sf_high) = check_straight(&flush_ranks);
        if has_sf {
            return HandStrength {
                ranking: HandRanking::StraightFlush,
                kickers: vec![sf_high],
            };
        }
    }

    let mut counts: Vec<(Rank, usize)> = rank_counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));

    if counts[0].1 == 4 {
        return HandStrength {
            ranking: HandRanking::FourOfAKind,
            kickers: vec![counts[0].0],
        };
    }

    if counts.len() >= 2 && counts[0].1 == 3 && counts[1].1 >= 2 {
        return HandStrength {
            ranking: HandRanking::FullHouse,
            kickers: vec![counts[0].0, counts[1].0],
        };
    }

    if let Some(suit) = flush_suit {
        let mut flush_ranks: Vec<Rank> = all_cards
            .iter()
            .filter(|c| c.suit == suit)
            .map(|c| c.rank)
            .collect();
        flush_ranks.sort_by(|a, b| b.cmp(a));
        return HandStrength {
            ranking: HandRanking::Flush,
            kickers: flush_ranks.into_iter().take(5).collect(),
        };
    }

    if has_straight {
        return HandStrength {
            ranking: HandRanking::Straight,
            kickers: vec![straight_high],
        };
    }

    if counts[0].1 == 3 {
        return HandStrength {
            ranking: HandRanking::ThreeOfAKind,
            kickers: vec![counts[0].0],
        };
    }

    if counts.len() >= 2 && counts[0].1 == 2 && counts[1].1 == 2 {
        let kicker = all_cards
            .iter()
            .map(|c| c.rank)
            .filter(|&r| r != counts[0].0 && r != counts[1].0)
            .max();
        let mut kickers = vec![counts[0].0, counts[1].0];
        kickers.extend(kicker);
        return HandStrength {
            ranking: HandRanking::TwoPair,
            kickers,
        };
    }

    if counts[0].1 == 2 {
        let pair = counts[0].0;
        let mut kickers: Vec<Rank> = all_cards
            .iter()
            .map(|c| c.rank)
            .filter(|&r| r != pair)
            .collect();
        kickers.sort_by(|a, b| b.cmp(a));
        let mut out = vec![pair];
        out.extend(kickers.into_iter().take(3));
        return HandStrength {
            ranking: HandRanking::OnePair,
            kickers: out,
        };
    }

    let mut kickers: Vec<Rank> = all_cards.iter().map(|c| c.rank).collect();
    kickers.sort_by(|a, b| b.cmp(a));
    HandStrength {
        ranking: HandRanking::HighCard,
        kickers: kickers.into_iter().take(5).collect(),
    }
}

/// Expects unique ranks sorted high to low.
fn check_straight(ranks: &[Rank]) -> (bool, Rank) {
    if ranks.len() < 5 {
        return (false, Rank::Two);
    }

    // Wheel (A-2-3-4-5)
    if ranks.contains(&Rank::Ace)
        && ranks.contains(&Rank::Five)
        && ranks.contains(&Rank::Four)
        && ranks.contains(&Rank::Three)
        && ranks.contains(&Rank::Two)
    {
        return (true, Rank::Five);
    }

    for window in ranks.windows(5) {
        let consecutive = window
            .windows(2)
            .all(|pair| pair[0].value() == pair[1].value() + 1);
        if consecutive {
            return (true, window[0]);
        }
    }
    (false, Rank::Two)
}
