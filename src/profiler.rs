// Per-opponent lifetime counters and behavioral classification. Telemetry
// is best-effort: the capture side does not see every action, so counters
// only move on positively observed events and ratios tolerate gaps.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Classification, Street};

/// Action-level detail as the upstream observation reports it. The derived
/// kinds (3-bet, fold-to-cbet, steal pair) arrive only when the capture
/// side can attribute them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryKind {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    ThreeBet,
    CbetOpportunity,
    FoldToCbet,
    StealOpportunity,
    FoldToSteal,
    WentToShowdown,
}

#[derive(Debug, Clone)]
pub struct ActionTelemetry {
    pub player: String,
    pub kind: TelemetryKind,
    pub street: Street,
}

/// Lifetime counters for one opponent. Monotonically incremented, never
/// decremented; persisted across sessions by an external store via
/// `Profiler::snapshot`/`Profiler::load`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentStats {
    pub total_hands: u64,
    pub vpip_hands: u64,
    pub pfr_hands: u64,
    pub three_bet_hands: u64,
    pub cbet_opportunities: u64,
    pub fold_to_cbet_hands: u64,
    pub steal_opportunities: u64,
    pub fold_to_steal_hands: u64,
    pub wtsd_hands: u64,
    pub aggressive_actions: u64,
    pub passive_actions: u64,
}

/// Ratios derived from `OpponentStats`, all division-by-zero guarded.
/// Percentages are on a 0-100 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct OpponentProfile {
    pub vpip: f64,
    pub pfr: f64,
    pub af: f64,
    pub fold_to_cbet: f64,
    pub fold_to_steal: f64,
    pub wtsd: f64,
    pub three_bet: f64,
    pub total_hands: u64,
    pub classification: Classification,
}

/// Per-hand dedup flags: hand-level counters move at most once per hand per
/// player, no matter how often the same event is observed.
#[derive(Debug, Clone, Default)]
struct HandFlags {
    counted: bool,
    vpip: bool,
    pfr: bool,
    three_bet: bool,
    cbet_opportunity: bool,
    fold_to_cbet: bool,
    steal_opportunity: bool,
    fold_to_steal: bool,
    wtsd: bool,
}

#[derive(Debug, Default)]
pub struct Profiler {
    store: HashMap<String, OpponentStats>,
    session: HashMap<String, HandFlags>,
}

impl Profiler {
    pub fn new() -> Profiler {
        Profiler::default()
    }

    /// Seed from an external store (persisted between sessions).
    pub fn load(stats: HashMap<String, OpponentStats>) -> Profiler {
        Profiler {
            store: stats,
            session: HashMap::new(),
        }
    }

    /// Current counters, for the external store to persist.
    pub fn snapshot(&self) -> &HashMap<String, OpponentStats> {
        &self.store
    }

    /// Resets the per-hand dedup flags at a hand boundary.
    pub fn on_new_hand<I, S>(&mut self, players: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.session.clear();
        for player in players {
            self.session.insert(player.into(), HandFlags::default());
        }
    }

    /// Records one observed action. Idempotent per hand for hand-level
    /// counters; aggressive/passive counts are action-level and unbounded.
    pub fn record_action(&mut self, telemetry: &ActionTelemetry) {
        let flags = self.session.entry(telemetry.player.clone()).or_default();
        let stats = self.store.entry(telemetry.player.clone()).or_default();

        if !flags.counted {
            stats.total_hands += 1;
            flags.counted = true;
        }

        match telemetry.kind {
            TelemetryKind::Call => {
                stats.passive_actions += 1;
                if !flags.vpip {
                    stats.vpip_hands += 1;
                    flags.vpip = true;
                }
            }
            TelemetryKind::Bet | TelemetryKind::Raise => {
                stats.aggressive_actions += 1;
                if !flags.vpip {
                    stats.vpip_hands += 1;
                    flags.vpip = true;
                }
                if telemetry.kind == TelemetryKind::Raise
                    && telemetry.street == Street::Preflop
                    && !flags.pfr
                {
                    stats.pfr_hands += 1;
                    flags.pfr = true;
                }
            }
            TelemetryKind::ThreeBet => {
                if !flags.three_bet {
                    stats.three_bet_hands += 1;
                    flags.three_bet = true;
                }
            }
            TelemetryKind::CbetOpportunity => {
                if !flags.cbet_opportunity {
                    stats.cbet_opportunities += 1;
                    flags.cbet_opportunity = true;
                }
            }
            TelemetryKind::FoldToCbet => {
                if !flags.fold_to_cbet {
                    stats.fold_to_cbet_hands += 1;
                    flags.fold_to_cbet = true;
                }
            }
            TelemetryKind::StealOpportunity => {
                if !flags.steal_opportunity {
                    stats.steal_opportunities += 1;
                    flags.steal_opportunity = true;
                }
            }
            TelemetryKind::FoldToSteal => {
                if !flags.fold_to_steal {
                    stats.fold_to_steal_hands += 1;
                    flags.fold_to_steal = true;
                }
            }
            TelemetryKind::WentToShowdown => {
                if !flags.wtsd {
                    stats.wtsd_hands += 1;
                    flags.wtsd = true;
                }
            }
            TelemetryKind::Fold | TelemetryKind::Check => {}
        }
        debug!(player = %telemetry.player, kind = ?telemetry.kind, "telemetry recorded");
    }

    /// Derived profile for one opponent. Unseen opponents get default
    /// counters, which classify as Unknown.
    pub fn profile_for(&self, player: &str) -> OpponentProfile {
        let default = OpponentStats::default();
        let stats = self.store.get(player).unwrap_or(&default);
        derive_profile(stats)
    }

    /// Profiles for the given opponents, keyed by name.
    pub fn profiles<'a, I>(&self, opponents: I) -> HashMap<String, OpponentProfile>
    where
        I: IntoIterator<Item = &'a str>,
    {
        opponents
            .into_iter()
            .map(|name| (name.to_string(), self.profile_for(name)))
            .collect()
    }
}

fn ratio_pct(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

fn derive_profile(stats: &OpponentStats) -> OpponentProfile {
    let vpip = ratio_pct(stats.vpip_hands, stats.total_hands);
    let pfr = ratio_pct(stats.pfr_hands, stats.total_hands);
    let af = if stats.passive_actions > 0 {
        stats.aggressive_actions as f64 / stats.passive_actions as f64
    } else {
        stats.aggressive_actions as f64
    };
    let fold_to_cbet = ratio_pct(stats.fold_to_cbet_hands, stats.cbet_opportunities);
    let fold_to_steal = ratio_pct(stats.fold_to_steal_hands, stats.steal_opportunities);
    let wtsd = ratio_pct(stats.wtsd_hands, stats.total_hands);
    let three_bet = ratio_pct(stats.three_bet_hands, stats.total_hands);

    OpponentProfile {
        vpip,
        pfr,
        af,
        fold_to_cbet,
        fold_to_steal,
        wtsd,
        three_bet,
        total_hands: stats.total_hands,
        classification: classify(stats.total_hands, vpip, pfr, af),
    }
}

/// Ordered rule evaluation, first match wins. A minimum sample of 50 hands
/// is mandatory before any label other than Unknown.
fn classify(total_hands: u64, vpip: f64, pfr: f64, af: f64) -> Classification {
    if total_hands < 50 {
        return Classification::Unknown;
    }
    if vpip > 35.0 && pfr < 10.0 && af < 1.5 {
        return Classification::LoosePassive;
    }
    if vpip > 24.0 && pfr > 18.0 {
        return Classification::LooseAggressive;
    }
    if vpip < 15.0 && pfr < 10.0 {
        return Classification::TightPassive;
    }
    if vpip < 18.0 && pfr > 10.0 && af > 3.0 {
        return Classification::TightAggressive;
    }
    Classification::Standard
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(player: &str, kind: TelemetryKind, street: Street) -> ActionTelemetry {
        ActionTelemetry {
            player: player.to_string(),
            kind,
            street,
        }
    }

    #[test]
    fn vpip_counts_once_per_hand() {
        let mut profiler = Profiler::new();
        profiler.on_new_hand(["villain"]);
        profiler.record_action(&action("villain", TelemetryKind::Call, Street::Preflop));
        profiler.record_action(&action("villain", TelemetryKind::Call, Street::Flop));
        profiler.record_action(&action("villain", TelemetryKind::Bet, Street::Turn));

        let stats = &profiler.snapshot()["villain"];
        assert_eq!(stats.vpip_hands, 1);
        assert_eq!(stats.total_hands, 1);
        // Action-level counters stay unbounded.
        assert_eq!(stats.passive_actions, 2);
        assert_eq!(stats.aggressive_actions, 1);
    }

    #[test]
    fn vpip_counts_again_next_hand() {
        let mut profiler = Profiler::new();
        profiler.on_new_hand(["villain"]);
        profiler.record_action(&action("villain", TelemetryKind::Call, Street::Preflop));
        profiler.on_new_hand(["villain"]);
        profiler.record_action(&action("villain", TelemetryKind::Call, Street::Preflop));

        let stats = &profiler.snapshot()["villain"];
        assert_eq!(stats.vpip_hands, 2);
        assert_eq!(stats.total_hands, 2);
    }

    #[test]
    fn pfr_requires_a_preflop_raise() {
        let mut profiler = Profiler::new();
        profiler.on_new_hand(["villain"]);
        profiler.record_action(&action("villain", TelemetryKind::Raise, Street::Flop));
        assert_eq!(profiler.snapshot()["villain"].pfr_hands, 0);

        profiler.record_action(&action("villain", TelemetryKind::Raise, Street::Preflop));
        profiler.record_action(&action("villain", TelemetryKind::Raise, Street::Preflop));
        assert_eq!(profiler.snapshot()["villain"].pfr_hands, 1);
    }

    #[test]
    fn folds_and_checks_move_no_counters() {
        let mut profiler = Profiler::new();
        profiler.on_new_hand(["villain"]);
        profiler.record_action(&action("villain", TelemetryKind::Fold, Street::Preflop));
        profiler.record_action(&action("villain", TelemetryKind::Check, Street::Flop));

        let stats = &profiler.snapshot()["villain"];
        assert_eq!(stats.vpip_hands, 0);
        assert_eq!(stats.aggressive_actions, 0);
        assert_eq!(stats.passive_actions, 0);
        // The hand itself is still counted as seen.
        assert_eq!(stats.total_hands, 1);
    }

    #[test]
    fn ratios_guard_zero_denominators() {
        let profile = derive_profile(&OpponentStats::default());
        assert_eq!(profile.vpip, 0.0);
        assert_eq!(profile.pfr, 0.0);
        assert_eq!(profile.af, 0.0);
        assert_eq!(profile.fold_to_cbet, 0.0);
        assert_eq!(profile.fold_to_steal, 0.0);
        assert_eq!(profile.classification, Classification::Unknown);
    }

    #[test]
    fn aggression_factor_falls_back_to_raw_count() {
        let stats = OpponentStats {
            aggressive_actions: 7,
            passive_actions: 0,
            ..OpponentStats::default()
        };
        assert_eq!(derive_profile(&stats).af, 7.0);
    }

    #[test]
    fn small_samples_stay_unknown() {
        let stats = OpponentStats {
            total_hands: 49,
            vpip_hands: 30,
            pfr_hands: 2,
            ..OpponentStats::default()
        };
        assert_eq!(derive_profile(&stats).classification, Classification::Unknown);
    }

    #[test]
    fn classification_rule_table() {
        let base = |total, vpip, pfr, aggressive, passive| OpponentStats {
            total_hands: total,
            vpip_hands: vpip,
            pfr_hands: pfr,
            aggressive_actions: aggressive,
            passive_actions: passive,
            ..OpponentStats::default()
        };

        // vpip 40%, pfr 5%, af 1.0
        assert_eq!(
            derive_profile(&base(100, 40, 5, 10, 10)).classification,
            Classification::LoosePassive
        );
        // vpip 30%, pfr 20%
        assert_eq!(
            derive_profile(&base(100, 30, 20, 40, 10)).classification,
            Classification::LooseAggressive
        );
        // vpip 12%, pfr 8%
        assert_eq!(
            derive_profile(&base(100, 12, 8, 5, 10)).classification,
            Classification::TightPassive
        );
        // vpip 16%, pfr 12%, af 4.0
        assert_eq!(
            derive_profile(&base(100, 16, 12, 40, 10)).classification,
            Classification::TightAggressive
        );
        // vpip 22%, pfr 15%
        assert_eq!(
            derive_profile(&base(100, 22, 15, 20, 10)).classification,
            Classification::Standard
        );
    }

    #[test]
    fn classification_is_stable_without_new_data() {
        let mut profiler = Profiler::new();
        let stats = OpponentStats {
            total_hands: 80,
            vpip_hands: 30,
            pfr_hands: 18,
            aggressive_actions: 20,
            passive_actions: 10,
            ..OpponentStats::default()
        };
        profiler.store.insert("villain".to_string(), stats);

        let first = profiler.profile_for("villain").classification;
        let second = profiler.profile_for("villain").classification;
        assert_eq!(first, second);
    }

    #[test]
    fn fold_to_steal_ratio() {
        let mut profiler = Profiler::new();
        for _ in 0..10 {
            profiler.on_new_hand(["bb"]);
            profiler.record_action(&action("bb", TelemetryKind::StealOpportunity, Street::Preflop));
            profiler.record_action(&action("bb", TelemetryKind::FoldToSteal, Street::Preflop));
        }
        profiler.on_new_hand(["bb"]);
        profiler.record_action(&action("bb", TelemetryKind::StealOpportunity, Street::Preflop));

        let profile = profiler.profile_for("bb");
        assert!(profile.fold_to_steal > 80.0);
    }
}
