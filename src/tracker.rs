// Turns the noisy, periodic snapshot stream into a coherent hand lifecycle:
// new-hand detection, street derivation from board length, structural
// change detection, and local recovery from malformed observations.

use std::collections::HashSet;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::types::{Card, HandState, Position, Seat, SeatStatus, Street, TableSnapshot};

/// What one snapshot did to the model. `anomalies` lists the fields that
/// were ignored or retained for this cycle, in the same spirit as the
/// capture-side correction reports.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotOutcome {
    pub changed: bool,
    pub new_hand: bool,
    pub anomalies: Vec<String>,
}

#[derive(Debug, Default)]
pub struct StateTracker {
    previous: Option<TableSnapshot>,
    hand: HandState,
    last_result: f64,
}

impl StateTracker {
    pub fn new() -> StateTracker {
        StateTracker::default()
    }

    /// Ingest one observation. Returns whether anything observable changed
    /// (a structural comparison against the previously stored snapshot),
    /// whether a new hand started, and any ingestion anomalies that were
    /// recovered locally.
    pub fn update(&mut self, snapshot: TableSnapshot) -> SnapshotOutcome {
        let changed = self.previous.as_ref() != Some(&snapshot);
        let new_hand = self.detect_new_hand(&snapshot);
        let mut anomalies = Vec::new();

        if new_hand {
            self.start_new_hand();
        }
        self.apply(&snapshot, &mut anomalies);

        for anomaly in &anomalies {
            warn!(anomaly = %anomaly, "ingestion anomaly, field retained for this cycle");
        }
        self.previous = Some(snapshot);
        SnapshotOutcome {
            changed,
            new_hand,
            anomalies,
        }
    }

    pub fn state(&self) -> &HandState {
        &self.hand
    }

    /// Best-effort: the snapshot carries no action-order detail, so the
    /// hero is considered to act whenever they are seated, live and
    /// holding cards.
    pub fn is_hero_turn(&self) -> bool {
        self.hand.hero_cards.len() == 2
            && self.hand.hero().map(|s| s.is_active()).unwrap_or(false)
    }

    /// Drains the completed-hand profit marker. Always 0.0: computing real
    /// settlement needs richer input than the snapshot stream carries and
    /// belongs to an external collaborator.
    pub fn take_hand_result(&mut self) -> f64 {
        std::mem::take(&mut self.last_result)
    }

    /// A new hand starts when the board shrank or the hero's holding was
    /// replaced. The first observation of a session also starts one, since
    /// a hand identifier has to exist before anything else can happen.
    fn detect_new_hand(&self, snapshot: &TableSnapshot) -> bool {
        let prev = match &self.previous {
            None => return true,
            Some(prev) => prev,
        };
        if snapshot.board.len() < prev.board.len() {
            return true;
        }
        hero_holding_replaced(&prev.hero.cards, &snapshot.hero.cards)
    }

    /// Raw observations carry no hand id, so one is minted here. Seat
    /// identity and stacks belong to the next hand and survive the reset;
    /// everything else is transient.
    fn start_new_hand(&mut self) {
        let carried: Vec<Seat> = self
            .hand
            .seats
            .iter()
            .map(|s| Seat {
                name: s.name.clone(),
                stack: s.stack,
                bet: 0.0,
                position: None,
                status: SeatStatus::Active,
                is_hero: s.is_hero,
            })
            .collect();
        self.hand = HandState {
            hand_id: Some(Uuid::new_v4()),
            seats: carried,
            ..HandState::default()
        };
        debug!(hand_id = ?self.hand.hand_id, "new hand started");
    }

    fn apply(&mut self, snapshot: &TableSnapshot, anomalies: &mut Vec<String>) {
        for duplicate in duplicate_cards(snapshot) {
            anomalies.push(format!("duplicate_card_detected: {}", duplicate));
        }

        match Street::from_board_len(snapshot.board.len()) {
            Some(street) => {
                self.hand.board = snapshot.board.clone();
                self.hand.street = street;
            }
            None => {
                anomalies.push(format!("invalid_board_length: {}", snapshot.board.len()));
            }
        }

        match snapshot.hero.cards.len() {
            2 => self.hand.hero_cards = snapshot.hero.cards.clone(),
            0 => {
                if !self.hand.hero_cards.is_empty() {
                    anomalies.push("hero_cards_vanished".to_string());
                }
            }
            n => anomalies.push(format!("invalid_hero_cards_count: {}", n)),
        }

        self.hand.pot = snapshot.pot;
        self.hand.big_blind = snapshot.blinds.big;

        if !snapshot.players.is_empty() {
            self.hand.seats = snapshot
                .players
                .iter()
                .map(|p| {
                    let position = match &p.position {
                        Some(label) => match label.parse::<Position>() {
                            Ok(position) => Some(position),
                            Err(_) => {
                                anomalies.push(format!("unparsed_position: {}", label));
                                None
                            }
                        },
                        None => None,
                    };
                    Seat {
                        name: p.name.clone(),
                        stack: p.stack,
                        bet: p.bet,
                        position,
                        status: p.status,
                        is_hero: p.is_hero,
                    }
                })
                .collect();
        }
    }
}

/// True when both the stored and incoming holdings are complete and differ
/// as unordered pairs. Partial or missing holdings are anomalies, not hand
/// boundaries.
fn hero_holding_replaced(prev: &[Card], current: &[Card]) -> bool {
    if prev.len() != 2 || current.len() != 2 {
        return false;
    }
    let same = (prev[0] == current[0] && prev[1] == current[1])
        || (prev[0] == current[1] && prev[1] == current[0]);
    !same
}

fn duplicate_cards(snapshot: &TableSnapshot) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for card in snapshot.hero.cards.iter().chain(snapshot.board.iter()) {
        if !seen.insert(*card) {
            duplicates.push(card.to_string());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BlindsObservation, Card, HeroObservation, SeatObservation};

    fn cards(tokens: &[&str]) -> Vec<Card> {
        tokens.iter().map(|t| t.parse().unwrap()).collect()
    }

    fn seat(name: &str, stack: f64, is_hero: bool) -> SeatObservation {
        SeatObservation {
            name: name.to_string(),
            stack,
            bet: 0.0,
            position: None,
            status: SeatStatus::Active,
            is_hero,
        }
    }

    fn snapshot(hero: &[&str], board: &[&str], pot: f64) -> TableSnapshot {
        TableSnapshot {
            hero: HeroObservation { cards: cards(hero) },
            board: cards(board),
            pot,
            blinds: BlindsObservation {
                big: 20.0,
                small: Some(10.0),
            },
            players: vec![seat("hero", 1500.0, true), seat("villain", 900.0, false)],
        }
    }

    #[test]
    fn first_observation_starts_a_hand_and_mints_an_id() {
        let mut tracker = StateTracker::new();
        let outcome = tracker.update(snapshot(&["As", "Kd"], &[], 30.0));
        assert!(outcome.new_hand);
        assert!(outcome.changed);
        assert!(tracker.state().hand_id.is_some());
        assert_eq!(tracker.state().street, Street::Preflop);
    }

    #[test]
    fn identical_observation_changes_nothing() {
        let mut tracker = StateTracker::new();
        tracker.update(snapshot(&["As", "Kd"], &["2c", "7d", "Kh"], 120.0));
        let outcome = tracker.update(snapshot(&["As", "Kd"], &["2c", "7d", "Kh"], 120.0));
        assert!(!outcome.changed);
        assert!(!outcome.new_hand);
        assert!(outcome.anomalies.is_empty());
    }

    #[test]
    fn streets_follow_board_length() {
        let mut tracker = StateTracker::new();
        tracker.update(snapshot(&["As", "Kd"], &[], 30.0));
        assert_eq!(tracker.state().street, Street::Preflop);
        tracker.update(snapshot(&["As", "Kd"], &["2c", "7d", "Kh"], 90.0));
        assert_eq!(tracker.state().street, Street::Flop);
        tracker.update(snapshot(&["As", "Kd"], &["2c", "7d", "Kh", "9s"], 150.0));
        assert_eq!(tracker.state().street, Street::Turn);
        tracker.update(snapshot(&["As", "Kd"], &["2c", "7d", "Kh", "9s", "3h"], 200.0));
        assert_eq!(tracker.state().street, Street::River);
    }

    #[test]
    fn invalid_board_length_is_recovered_locally() {
        let mut tracker = StateTracker::new();
        tracker.update(snapshot(&["As", "Kd"], &["2c", "7d", "Kh"], 90.0));
        let hand_id = tracker.state().hand_id;

        let outcome = tracker.update(snapshot(&["As", "Kd"], &["2c", "7d", "Kh", "9s", "3h", "4c"], 90.0));
        assert!(!outcome.new_hand);
        assert!(outcome
            .anomalies
            .iter()
            .any(|a| a.contains("invalid_board_length: 6")));
        // Field treated as absent for the cycle: street and board retained.
        assert_eq!(tracker.state().street, Street::Flop);
        assert_eq!(tracker.state().board.len(), 3);
        assert_eq!(tracker.state().hand_id, hand_id);
    }

    #[test]
    fn board_shrinking_starts_a_new_hand() {
        let mut tracker = StateTracker::new();
        tracker.update(snapshot(&["As", "Kd"], &["2c", "7d", "Kh"], 90.0));
        let first_id = tracker.state().hand_id;

        let outcome = tracker.update(snapshot(&["As", "Kd"], &[], 30.0));
        assert!(outcome.new_hand);
        assert_ne!(tracker.state().hand_id, first_id);
        assert_eq!(tracker.state().street, Street::Preflop);
    }

    #[test]
    fn replaced_hero_holding_starts_a_new_hand() {
        let mut tracker = StateTracker::new();
        tracker.update(snapshot(&["As", "Kd"], &[], 30.0));
        let first_id = tracker.state().hand_id;

        let outcome = tracker.update(snapshot(&["7h", "2c"], &[], 30.0));
        assert!(outcome.new_hand);
        assert_ne!(tracker.state().hand_id, first_id);
    }

    #[test]
    fn reordered_hero_holding_is_the_same_hand() {
        let mut tracker = StateTracker::new();
        tracker.update(snapshot(&["As", "Kd"], &[], 30.0));
        let outcome = tracker.update(snapshot(&["Kd", "As"], &[], 30.0));
        assert!(!outcome.new_hand);
    }

    #[test]
    fn vanished_hero_cards_are_retained() {
        let mut tracker = StateTracker::new();
        tracker.update(snapshot(&["As", "Kd"], &["2c", "7d", "Kh"], 90.0));
        let outcome = tracker.update(snapshot(&[], &["2c", "7d", "Kh"], 90.0));
        assert!(!outcome.new_hand);
        assert!(outcome.anomalies.iter().any(|a| a.contains("hero_cards_vanished")));
        assert_eq!(tracker.state().hero_cards, cards(&["As", "Kd"]));
    }

    #[test]
    fn duplicate_cards_are_reported() {
        let mut tracker = StateTracker::new();
        let outcome = tracker.update(snapshot(&["As", "Kd"], &["As", "7d", "Kh"], 90.0));
        assert!(outcome
            .anomalies
            .iter()
            .any(|a| a.contains("duplicate_card_detected: As")));
    }

    #[test]
    fn seats_carry_identity_and_stack_across_hands() {
        let mut tracker = StateTracker::new();
        tracker.update(snapshot(&["As", "Kd"], &["2c", "7d", "Kh"], 90.0));

        // New hand signalled by a shrunken board; no seat list this cycle.
        let mut next = snapshot(&["As", "Kd"], &[], 30.0);
        next.players.clear();
        tracker.update(next);

        let names: Vec<&str> = tracker.state().seats.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["hero", "villain"]);
        assert!(tracker.state().seats.iter().all(|s| s.bet == 0.0));
    }

    #[test]
    fn hand_result_drains_to_zero() {
        let mut tracker = StateTracker::new();
        tracker.update(snapshot(&["As", "Kd"], &[], 30.0));
        assert_eq!(tracker.take_hand_result(), 0.0);
        assert_eq!(tracker.take_hand_result(), 0.0);
    }

    #[test]
    fn hero_turn_requires_live_seat_and_cards() {
        let mut tracker = StateTracker::new();
        tracker.update(snapshot(&["As", "Kd"], &[], 30.0));
        assert!(tracker.is_hero_turn());

        let mut folded = snapshot(&["As", "Kd"], &[], 30.0);
        folded.players[0].status = SeatStatus::Folded;
        tracker.update(folded);
        assert!(!tracker.is_hero_turn());
    }
}
