// The decision rules: an ICM override, the chart-driven preflop branch
// with a steal-widening exploit, and the ordered postflop rule table
// (draw odds, exploit c-bet, positional c-bet, value bet, check/fold).

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::charts::{self, hand_shorthand, ChartKey, RangeAction, StackBucket, STEAL_WIDENING};
use crate::eval::evaluate_hand;
use crate::profiler::OpponentProfile;
use crate::types::{
    AdvisedAction, Card, HandState, Position, Recommendation, StackProfile, Street, Suit,
    TournamentContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardTexture {
    Unknown,
    Dry,
    Paired,
    WetDrawy,
    WetMonotone,
}

impl fmt::Display for BoardTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoardTexture::Unknown => "unknown",
            BoardTexture::Dry => "dry",
            BoardTexture::Paired => "paired",
            BoardTexture::WetDrawy => "wet-drawy",
            BoardTexture::WetMonotone => "monotone",
        };
        f.write_str(name)
    }
}

/// Classifies a board of three or more cards by suitedness and
/// connectivity. Fewer than three cards is Unknown.
pub fn board_texture(board: &[Card]) -> BoardTexture {
    if board.len() < 3 {
        return BoardTexture::Unknown;
    }

    let suits: HashSet<Suit> = board.iter().map(|c| c.suit).collect();
    if suits.len() == 1 {
        return BoardTexture::WetMonotone;
    }

    let distinct_ranks: HashSet<u8> = board.iter().map(|c| c.rank.value()).collect();
    if distinct_ranks.len() < board.len() {
        return BoardTexture::Paired;
    }

    let mut values: Vec<u8> = board.iter().map(|c| c.rank.value()).collect();
    values.sort_unstable();
    let connected = (values[2] - values[0] <= 4)
        || (values.len() > 3 && values[3] - values[1] <= 4);
    let two_tone = suits.len() == 2;

    if connected || two_tone {
        BoardTexture::WetDrawy
    } else {
        BoardTexture::Dry
    }
}

/// Flush draws only: exactly four cards of one suit across hole and board
/// (five or more is a made flush). Straight and combo draws are not
/// modeled; this is a known approximation boundary.
fn flush_draw_outs(hole_cards: &[Card], board: &[Card]) -> Option<u32> {
    let mut counts: HashMap<Suit, u32> = HashMap::new();
    for card in hole_cards.iter().chain(board.iter()) {
        *counts.entry(card.suit).or_insert(0) += 1;
    }
    counts.values().find(|&&n| n == 4).map(|&n| 13 - n)
}

/// Produces one recommendation for the current state, or `None` when no
/// hole cards are known and there is nothing to decide.
pub fn decide(
    state: &HandState,
    tournament: &TournamentContext,
    profiles: &HashMap<String, OpponentProfile>,
) -> Option<Recommendation> {
    if state.hero_cards.len() < 2 {
        return None;
    }

    // ICM override: on the bubble with a medium stack, anything below a
    // strong made hand is not worth the risk. Takes precedence over all
    // street logic.
    if tournament.on_bubble && tournament.stack_profile == StackProfile::Medium {
        let strength = evaluate_hand(&state.hero_cards, &state.board);
        if !strength.ranking.is_strong() {
            return Some(Recommendation {
                action: AdvisedAction::CheckFold,
                sizing: None,
                reason: format!(
                    "ICM pressure on the bubble: avoiding risk with {} to outlast the short stacks.",
                    strength.ranking
                ),
            });
        }
    }

    let recommendation = match state.street {
        Street::Preflop => preflop_action(state, profiles),
        Street::Flop | Street::Turn | Street::River => postflop_action(state, profiles),
    };
    debug!(action = %recommendation.action, reason = %recommendation.reason, "decision made");
    Some(recommendation)
}

fn preflop_action(
    state: &HandState,
    profiles: &HashMap<String, OpponentProfile>,
) -> Recommendation {
    let hand = match hand_shorthand(&state.hero_cards) {
        Some(hand) => hand,
        None => {
            return Recommendation {
                action: AdvisedAction::Fold,
                sizing: None,
                reason: "Hole cards are incomplete; nothing to rank.".to_string(),
            }
        }
    };

    let effective_bb = state.effective_stack_bb();
    let bucket = StackBucket::from_bb(effective_bb);
    let action = if effective_bb <= 15.0 {
        RangeAction::Push
    } else {
        RangeAction::OpenRaise
    };
    let table_size = state.table_size();

    let position = match state.hero_position() {
        Some(position) => position,
        None => {
            return Recommendation {
                action: AdvisedAction::Fold,
                sizing: None,
                reason: format!(
                    "No range chart applies: {}-max table, unknown position, {} stack.",
                    table_size,
                    bucket.as_str()
                ),
            }
        }
    };

    let key = ChartKey {
        table_size,
        bucket,
        position,
    };
    let entry = match charts::lookup(&key) {
        Some(entry) => entry,
        None => {
            return Recommendation {
                action: AdvisedAction::Fold,
                sizing: None,
                reason: format!(
                    "No range chart for {}-max, position {}, {} stack.",
                    table_size,
                    position,
                    bucket.as_str()
                ),
            }
        }
    };

    let range = entry.range(action);
    let widened = position == Position::Btn && big_blind_overfolds_to_steals(state, profiles);
    let in_range = range.contains(hand.as_str())
        || (widened && STEAL_WIDENING.contains(&hand.as_str()));

    if in_range {
        let (advised, sizing) = match action {
            RangeAction::Push => (AdvisedAction::PushAllIn, None),
            RangeAction::OpenRaise => (AdvisedAction::Raise, Some("2.5bb".to_string())),
        };
        Recommendation {
            action: advised,
            sizing,
            reason: format!(
                "Hand ({}) is inside the standard {} range for {} at {:.0}bb effective.",
                hand,
                action.as_str(),
                position,
                effective_bb
            ),
        }
    } else {
        Recommendation {
            action: AdvisedAction::Fold,
            sizing: None,
            reason: format!(
                "Hand ({}) is outside the {} range for {} at {:.0}bb effective.",
                hand,
                action.as_str(),
                position,
                effective_bb
            ),
        }
    }
}

/// The steal-widening condition: hero opens from the button and the seat
/// in the big blind has folded to steals more than 80% of the time.
fn big_blind_overfolds_to_steals(
    state: &HandState,
    profiles: &HashMap<String, OpponentProfile>,
) -> bool {
    state
        .opponents()
        .find(|s| s.position == Some(Position::Bb))
        .and_then(|s| profiles.get(&s.name))
        .map(|p| p.fold_to_steal > 80.0)
        .unwrap_or(false)
}

fn postflop_action(
    state: &HandState,
    profiles: &HashMap<String, OpponentProfile>,
) -> Recommendation {
    let strength = evaluate_hand(&state.hero_cards, &state.board);
    let texture = board_texture(&state.board);

    // 1. Drawing hands are a pure odds decision. Draws only exist with
    //    cards to come, so the river never reaches this branch.
    if matches!(state.street, Street::Flop | Street::Turn) {
        if let Some(outs) = flush_draw_outs(&state.hero_cards, &state.board) {
            let last_bet = state.last_bet();
            let pot_odds = if last_bet > 0.0 {
                last_bet / (state.pot + last_bet) * 100.0
            } else {
                0.0
            };
            let equity = if state.board.len() == 4 {
                outs as f64 * 2.1
            } else {
                outs as f64 * 4.2
            };
            let summary = format!(
                "Drawing hand (flush draw, {} outs, ~{:.1}% equity). Pot odds: {:.1}%.",
                outs, equity, pot_odds
            );
            return if equity > pot_odds {
                Recommendation {
                    action: AdvisedAction::Call,
                    sizing: None,
                    reason: format!("{} Calling is profitable.", summary),
                }
            } else {
                Recommendation {
                    action: AdvisedAction::Fold,
                    sizing: None,
                    reason: format!("{} Calling is not profitable.", summary),
                }
            };
        }
    }

    if state.street == Street::Flop && texture == BoardTexture::Dry {
        // 2. Exploit c-bet against an opponent who folds to them too often.
        if let Some(profile) = active_opponent_profile(state, profiles) {
            if profile.fold_to_cbet > 60.0 {
                return Recommendation {
                    action: AdvisedAction::Bet,
                    sizing: Some("33% of pot".to_string()),
                    reason: format!(
                        "Exploit: c-bet against a player who folds to c-bets {:.0}% of the time.",
                        profile.fold_to_cbet
                    ),
                };
            }
        }
        // 3. Positional c-bet on a dry board.
        if state.hero_in_position() {
            return Recommendation {
                action: AdvisedAction::Bet,
                sizing: Some("33% of pot".to_string()),
                reason: "C-bet on a dry board in position.".to_string(),
            };
        }
    }

    // 4. Value bet strong made hands.
    if strength.ranking.is_strong() {
        return Recommendation {
            action: AdvisedAction::Bet,
            sizing: Some("66% of pot".to_string()),
            reason: format!("Value bet with a strong hand ({}).", strength.ranking),
        };
    }

    // 5. Nothing justifies putting money in.
    Recommendation {
        action: AdvisedAction::CheckFold,
        sizing: None,
        reason: format!(
            "No sufficient grounds to bet with {} on a {} board.",
            strength.ranking, texture
        ),
    }
}

/// The opponent the exploit rules aim at: the first live non-hero seat with
/// a stored profile.
fn active_opponent_profile<'a>(
    state: &HandState,
    profiles: &'a HashMap<String, OpponentProfile>,
) -> Option<&'a OpponentProfile> {
    state
        .opponents()
        .filter(|s| s.is_active())
        .find_map(|s| profiles.get(&s.name))
}
