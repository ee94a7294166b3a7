// Static preflop range charts, derived at load time from compact range
// notation. Keyed by (table size, effective-stack bucket, seat position)
// with a single miss policy: a missing entry degrades to Fold upstream.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::types::{Card, Position};

const RANKS: [char; 13] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A',
];

/// Effective-stack bucket in big blinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackBucket {
    UpTo15,
    UpTo25,
    UpTo40,
    Over40,
}

impl StackBucket {
    pub fn from_bb(effective_bb: f64) -> StackBucket {
        if effective_bb <= 15.0 {
            StackBucket::UpTo15
        } else if effective_bb <= 25.0 {
            StackBucket::UpTo25
        } else if effective_bb <= 40.0 {
            StackBucket::UpTo40
        } else {
            StackBucket::Over40
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StackBucket::UpTo15 => "10-15bb",
            StackBucket::UpTo25 => "15-25bb",
            StackBucket::UpTo40 => "25-40bb",
            StackBucket::Over40 => "40bb+",
        }
    }
}

/// The action type a range describes. Short stacks consult the push range,
/// everyone else the open-raise range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeAction {
    Push,
    OpenRaise,
}

impl RangeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RangeAction::Push => "push",
            RangeAction::OpenRaise => "open_raise",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartKey {
    pub table_size: usize,
    pub bucket: StackBucket,
    pub position: Position,
}

/// Ranges for one chart key. An action a chart does not define is simply an
/// empty range: membership fails and the hand folds.
#[derive(Debug, Default)]
pub struct RangeEntry {
    push: HashSet<String>,
    open_raise: HashSet<String>,
}

impl RangeEntry {
    pub fn range(&self, action: RangeAction) -> &HashSet<String> {
        match action {
            RangeAction::Push => &self.push,
            RangeAction::OpenRaise => &self.open_raise,
        }
    }
}

/// Marginal hands added to the BTN range when the big blind folds to steals
/// often enough to exploit.
pub const STEAL_WIDENING: [&str; 5] = ["97s", "86s", "75s", "A2o", "K5o"];

/// "66+" -> 66, 77, ..., AA
fn expand_pairs(notation: &str) -> Vec<String> {
    let rank = notation.chars().next().expect("pair notation is non-empty");
    let start = rank_index(rank);
    RANKS[start..]
        .iter()
        .map(|r| format!("{}{}", r, r))
        .collect()
}

/// "AJs+" -> AJs, AQs, AKs
fn expand_suited(notation: &str) -> Vec<String> {
    let mut chars = notation.chars();
    let rank = chars.next().expect("suited notation has a rank");
    let kicker = chars.next().expect("suited notation has a kicker");
    let hi = rank_index(rank);
    let lo = rank_index(kicker);
    RANKS[lo..hi]
        .iter()
        .map(|k| format!("{}{}s", rank, k))
        .collect()
}

/// Offsuit "plus" notation only appears for the broadway tops, so the
/// expansions are listed rather than computed.
fn expand_offsuit(notation: &str) -> Vec<String> {
    match notation {
        "AKo+" => vec!["AKo".to_string()],
        "AQo+" => vec!["AQo".to_string(), "AKo".to_string()],
        other => vec![other.to_string()],
    }
}

fn rank_index(rank: char) -> usize {
    RANKS
        .iter()
        .position(|&r| r == rank)
        .expect("rank chars in chart notation are valid")
}

fn build_range(parts: &[Vec<String>], extras: &[&str]) -> HashSet<String> {
    let mut range: HashSet<String> = HashSet::new();
    for part in parts {
        range.extend(part.iter().cloned());
    }
    range.extend(extras.iter().map(|h| h.to_string()));
    range
}

static CHARTS: Lazy<HashMap<ChartKey, RangeEntry>> = Lazy::new(|| {
    let mut charts = HashMap::new();

    // 9-max, 10-15bb: push/fold territory.
    charts.insert(
        ChartKey {
            table_size: 9,
            bucket: StackBucket::UpTo15,
            position: Position::Utg,
        },
        RangeEntry {
            push: build_range(
                &[
                    expand_pairs("22+"),
                    expand_offsuit("AQo+"),
                    expand_suited("AQs+"),
                ],
                &[],
            ),
            ..Default::default()
        },
    );
    charts.insert(
        ChartKey {
            table_size: 9,
            bucket: StackBucket::UpTo15,
            position: Position::Btn,
        },
        RangeEntry {
            push: build_range(
                &[
                    expand_pairs("99+"),
                    expand_offsuit("AQo+"),
                    expand_suited("AJs+"),
                ],
                &["KQs", "KJs", "QTs"],
            ),
            ..Default::default()
        },
    );

    // 9-max, deep stacks.
    charts.insert(
        ChartKey {
            table_size: 9,
            bucket: StackBucket::Over40,
            position: Position::Btn,
        },
        RangeEntry {
            open_raise: build_range(
                &[
                    expand_pairs("66+"),
                    expand_offsuit("AQo+"),
                    expand_suited("AJs+"),
                ],
                &["KQs", "KJs", "QTs", "JTs", "T9s", "98s"],
            ),
            ..Default::default()
        },
    );

    // 6-max, 10-15bb. Defines only an open-raise range; a push lookup
    // against this entry finds an empty range and folds.
    charts.insert(
        ChartKey {
            table_size: 6,
            bucket: StackBucket::UpTo15,
            position: Position::Utg,
        },
        RangeEntry {
            open_raise: build_range(
                &[
                    expand_pairs("TT+"),
                    expand_offsuit("AKo+"),
                    expand_suited("AJs+"),
                ],
                &["KQs"],
            ),
            ..Default::default()
        },
    );

    charts
});

pub fn lookup(key: &ChartKey) -> Option<&'static RangeEntry> {
    CHARTS.get(key)
}

/// Canonical two-card shorthand: pairs as "QQ", otherwise high rank first
/// with an "s"/"o" suffix for suited/offsuit. Returns `None` unless exactly
/// two hole cards are known.
pub fn hand_shorthand(cards: &[Card]) -> Option<String> {
    let (a, b) = match cards {
        [a, b] => (a, b),
        _ => return None,
    };
    if a.rank == b.rank {
        return Some(format!("{}{}", a.rank.to_char(), b.rank.to_char()));
    }
    let (high, low) = if a.rank.value() > b.rank.value() {
        (a, b)
    } else {
        (b, a)
    };
    let suffix = if a.suit == b.suit { 's' } else { 'o' };
    Some(format!(
        "{}{}{}",
        high.rank.to_char(),
        low.rank.to_char(),
        suffix
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(tokens: &[&str]) -> Vec<Card> {
        tokens.iter().map(|t| t.parse().unwrap()).collect()
    }

    #[test]
    fn pair_expansion_walks_up_from_the_start_rank() {
        let pairs = expand_pairs("99+");
        assert_eq!(pairs, vec!["99", "TT", "JJ", "QQ", "KK", "AA"]);
    }

    #[test]
    fn suited_expansion_stops_below_the_top_rank() {
        assert_eq!(expand_suited("AJs+"), vec!["AJs", "AQs", "AKs"]);
        assert_eq!(expand_suited("AQs+"), vec!["AQs", "AKs"]);
    }

    #[test]
    fn offsuit_expansion() {
        assert_eq!(expand_offsuit("AQo+"), vec!["AQo", "AKo"]);
        assert_eq!(expand_offsuit("AKo+"), vec!["AKo"]);
        assert_eq!(expand_offsuit("KQo"), vec!["KQo"]);
    }

    #[test]
    fn btn_deep_chart_contains_expected_hands() {
        let entry = lookup(&ChartKey {
            table_size: 9,
            bucket: StackBucket::Over40,
            position: Position::Btn,
        })
        .unwrap();
        let range = entry.range(RangeAction::OpenRaise);
        assert!(range.contains("AKs"));
        assert!(range.contains("66"));
        assert!(range.contains("T9s"));
        assert!(!range.contains("55"));
        assert!(!range.contains("97s"));
        assert!(entry.range(RangeAction::Push).is_empty());
    }

    #[test]
    fn six_max_utg_defines_no_push_range() {
        let entry = lookup(&ChartKey {
            table_size: 6,
            bucket: StackBucket::UpTo15,
            position: Position::Utg,
        })
        .unwrap();
        assert!(entry.range(RangeAction::Push).is_empty());
        assert!(entry.range(RangeAction::OpenRaise).contains("TT"));
    }

    #[test]
    fn missing_key_is_a_chart_miss() {
        assert!(lookup(&ChartKey {
            table_size: 5,
            bucket: StackBucket::UpTo15,
            position: Position::Btn,
        })
        .is_none());
        assert!(lookup(&ChartKey {
            table_size: 9,
            bucket: StackBucket::UpTo25,
            position: Position::Btn,
        })
        .is_none());
    }

    #[test]
    fn stack_buckets() {
        assert_eq!(StackBucket::from_bb(8.0), StackBucket::UpTo15);
        assert_eq!(StackBucket::from_bb(15.0), StackBucket::UpTo15);
        assert_eq!(StackBucket::from_bb(15.1), StackBucket::UpTo25);
        assert_eq!(StackBucket::from_bb(40.0), StackBucket::UpTo40);
        assert_eq!(StackBucket::from_bb(50.0), StackBucket::Over40);
    }

    #[test]
    fn shorthand_orders_ranks_and_marks_suitedness() {
        assert_eq!(hand_shorthand(&cards(&["Ah", "Kh"])).unwrap(), "AKs");
        assert_eq!(hand_shorthand(&cards(&["Kd", "As"])).unwrap(), "AKo");
        assert_eq!(hand_shorthand(&cards(&["9c", "9d"])).unwrap(), "99");
        assert_eq!(hand_shorthand(&cards(&["2s", "7s"])).unwrap(), "72s");
        assert_eq!(hand_shorthand(&cards(&["Ah"])), None);
        assert_eq!(hand_shorthand(&[]), None);
    }
}
