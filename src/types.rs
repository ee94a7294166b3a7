// Shared data model: cards, streets, seats, table snapshots and
// recommendations exchanged with the capture and delivery collaborators.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub fn value(self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Ace => 14,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    pub fn from_char(c: char) -> Option<Rank> {
        match c.to_ascii_uppercase() {
            '2' => Some(Rank::Two),
            '3' => Some(Rank::Three),
            '4' => Some(Rank::Four),
            '5' => Some(Rank::Five),
            '6' => Some(Rank::Six),
            '7' => Some(Rank::Seven),
            '8' => Some(Rank::Eight),
            '9' => Some(Rank::Nine),
            'T' => Some(Rank::Ten),
            'J' => Some(Rank::Jack),
            'Q' => Some(Rank::Queen),
            'K' => Some(Rank::King),
            'A' => Some(Rank::Ace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub fn to_char(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }

    pub fn from_char(c: char) -> Option<Suit> {
        match c.to_ascii_lowercase() {
            'c' => Some(Suit::Clubs),
            'd' => Some(Suit::Diamonds),
            'h' => Some(Suit::Hearts),
            's' => Some(Suit::Spades),
            _ => None,
        }
    }
}

/// A playing card. Serialized as the two-character token the capture side
/// produces, e.g. "Ah" or "Tc".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }
}

impl FromStr for Card {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Card, Self::Err> {
        let mut chars = s.trim().chars();
        let (r, u) = match (chars.next(), chars.next(), chars.next()) {
            (Some(r), Some(u), None) => (r, u),
            _ => bail!("card token must be exactly two characters: {:?}", s),
        };
        let rank = Rank::from_char(r).ok_or_else(|| anyhow!("bad card rank: {:?}", s))?;
        let suit = Suit::from_char(u).ok_or_else(|| anyhow!("bad card suit: {:?}", s))?;
        Ok(Card { rank, suit })
    }
}

impl TryFrom<String> for Card {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Card, Self::Error> {
        s.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> String {
        card.to_string()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

/// Betting street, derived strictly from the community-card count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    /// 0 -> preflop, 3 -> flop, 4 -> turn, 5 -> river. Any other count is
    /// an ingestion anomaly and yields `None`.
    pub fn from_board_len(len: usize) -> Option<Street> {
        match len {
            0 => Some(Street::Preflop),
            3 => Some(Street::Flop),
            4 => Some(Street::Turn),
            5 => Some(Street::River),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        }
    }
}

/// Seat position label as the table assigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Utg,
    UtgPlus1,
    Mp,
    Hj,
    Co,
    Btn,
    Sb,
    Bb,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Utg => "UTG",
            Position::UtgPlus1 => "UTG+1",
            Position::Mp => "MP",
            Position::Hj => "HJ",
            Position::Co => "CO",
            Position::Btn => "BTN",
            Position::Sb => "SB",
            Position::Bb => "BB",
        }
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Position, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UTG" | "EP" | "EARLY" => Ok(Position::Utg),
            "UTG+1" | "UTG1" => Ok(Position::UtgPlus1),
            "MP" | "MP1" | "MP2" | "MIDDLE" => Ok(Position::Mp),
            "HJ" | "HIJACK" => Ok(Position::Hj),
            "CO" | "CUTOFF" => Ok(Position::Co),
            "BTN" | "BUTTON" | "BU" => Ok(Position::Btn),
            "SB" | "SMALL_BLIND" | "SMALLBLIND" => Ok(Position::Sb),
            "BB" | "BIG_BLIND" | "BIGBLIND" => Ok(Position::Bb),
            other => bail!("unknown position label: {:?}", other),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    #[default]
    Active,
    Folded,
    SittingOut,
}

/// One seat as the capture collaborator reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatObservation {
    pub name: String,
    pub stack: f64,
    #[serde(default)]
    pub bet: f64,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub status: SeatStatus,
    #[serde(default)]
    pub is_hero: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HeroObservation {
    #[serde(default)]
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BlindsObservation {
    #[serde(default)]
    pub big: f64,
    #[serde(default)]
    pub small: Option<f64>,
}

/// Raw, possibly duplicated table observation from the capture/recognition
/// collaborator. Structural equality against the previously stored snapshot
/// is the "did anything observable change" contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    #[serde(default)]
    pub hero: HeroObservation,
    #[serde(default)]
    pub board: Vec<Card>,
    #[serde(default)]
    pub pot: f64,
    #[serde(default)]
    pub blinds: BlindsObservation,
    #[serde(default)]
    pub players: Vec<SeatObservation>,
}

/// A seat inside the tracker's hand model.
#[derive(Debug, Clone, PartialEq)]
pub struct Seat {
    pub name: String,
    pub stack: f64,
    pub bet: f64,
    pub position: Option<Position>,
    pub status: SeatStatus,
    pub is_hero: bool,
}

impl Seat {
    pub fn is_active(&self) -> bool {
        self.status == SeatStatus::Active
    }
}

/// The running model of the current hand. Owned and mutated exclusively by
/// the `StateTracker`; the strategy engine only ever sees `&HandState`.
#[derive(Debug, Clone, PartialEq)]
pub struct HandState {
    pub hand_id: Option<Uuid>,
    pub street: Street,
    pub board: Vec<Card>,
    pub pot: f64,
    pub big_blind: f64,
    pub hero_cards: Vec<Card>,
    pub seats: Vec<Seat>,
}

impl Default for HandState {
    fn default() -> HandState {
        HandState {
            hand_id: None,
            street: Street::Preflop,
            board: Vec::new(),
            pot: 0.0,
            big_blind: 0.0,
            hero_cards: Vec::new(),
            seats: Vec::new(),
        }
    }
}

impl HandState {
    pub fn hero(&self) -> Option<&Seat> {
        self.seats.iter().find(|s| s.is_hero)
    }

    pub fn opponents(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(|s| !s.is_hero)
    }

    pub fn hero_position(&self) -> Option<Position> {
        self.hero().and_then(|s| s.position)
    }

    pub fn table_size(&self) -> usize {
        self.seats.len()
    }

    /// Smallest live stack at the table, in big-blind units. Degrades to
    /// 0.0 rather than dividing by an unknown big blind.
    pub fn effective_stack_bb(&self) -> f64 {
        if self.big_blind <= 0.0 {
            return 0.0;
        }
        let min_stack = self
            .seats
            .iter()
            .filter(|s| s.is_active() && s.stack > 0.0)
            .map(|s| s.stack)
            .fold(f64::INFINITY, f64::min);
        if min_stack.is_finite() {
            min_stack / self.big_blind
        } else {
            0.0
        }
    }

    /// Largest bet currently posted by an opponent; the bet the hero is
    /// facing for pot-odds purposes.
    pub fn last_bet(&self) -> f64 {
        self.opponents()
            .filter(|s| s.is_active())
            .map(|s| s.bet)
            .fold(0.0, f64::max)
    }

    /// Hero acts last postflop from the button or cutoff. Coarse, but the
    /// snapshot carries no action-order detail.
    pub fn hero_in_position(&self) -> bool {
        matches!(self.hero_position(), Some(Position::Btn) | Some(Position::Co))
    }
}

/// Behavioral label derived from lifetime opponent counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Unknown,
    LoosePassive,
    LooseAggressive,
    TightPassive,
    TightAggressive,
    Standard,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Classification::Unknown => "Unknown",
            Classification::LoosePassive => "Loose-Passive (Fish)",
            Classification::LooseAggressive => "Loose-Aggressive (LAG)",
            Classification::TightPassive => "Tight-Passive (Nit)",
            Classification::TightAggressive => "Tight-Aggressive (TAG)",
            Classification::Standard => "Standard",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisedAction {
    Fold,
    CheckFold,
    Call,
    Bet,
    Raise,
    PushAllIn,
}

impl fmt::Display for AdvisedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AdvisedAction::Fold => "Fold",
            AdvisedAction::CheckFold => "Check/Fold",
            AdvisedAction::Call => "Call",
            AdvisedAction::Bet => "Bet",
            AdvisedAction::Raise => "Raise",
            AdvisedAction::PushAllIn => "Push All-in",
        };
        f.write_str(label)
    }
}

/// One action recommendation plus its human-readable rationale. Produced
/// fresh on every decision; only the advisor's single last-recommendation
/// slot retains one for `/why`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: AdvisedAction,
    #[serde(default)]
    pub sizing: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StackProfile {
    Short,
    #[default]
    Medium,
    Deep,
}

/// Tournament pressure context the embedding application supplies. Both
/// flags default to off for cash-game sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TournamentContext {
    pub on_bubble: bool,
    pub stack_profile: StackProfile,
}
