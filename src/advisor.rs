// Session orchestration: one advisor owns the tracker, the profiler and the
// tournament context, turns each incoming snapshot into zero or more
// outbound events, and keeps the single last-recommendation slot that backs
// the "why" query.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::profiler::{ActionTelemetry, OpponentStats, Profiler};
use crate::strategy::decide;
use crate::tracker::{SnapshotOutcome, StateTracker};
use crate::types::{Recommendation, TableSnapshot, TournamentContext};

/// Outbound surface for the delivery collaborator: either a structured
/// recommendation or a plain text message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum AdvisorEvent {
    NewHand { hand_id: Uuid },
    Notice(String),
    Advice(Recommendation),
}

#[derive(Debug, Default)]
pub struct Advisor {
    tracker: StateTracker,
    profiler: Profiler,
    tournament: TournamentContext,
    last_recommendation: Option<Recommendation>,
    bubble_noticed: bool,
    short_stack_noticed: bool,
}

impl Advisor {
    pub fn new() -> Advisor {
        Advisor::default()
    }

    /// Resume a session with opponent counters from an external store.
    pub fn with_stats(stats: HashMap<String, OpponentStats>) -> Advisor {
        Advisor {
            profiler: Profiler::load(stats),
            ..Advisor::default()
        }
    }

    /// Opponent counters for the external store to persist.
    pub fn stats_snapshot(&self) -> &HashMap<String, OpponentStats> {
        self.profiler.snapshot()
    }

    pub fn set_tournament(&mut self, tournament: TournamentContext) {
        self.tournament = tournament;
    }

    /// Telemetry passthrough for observed opponent actions.
    pub fn record_action(&mut self, telemetry: &ActionTelemetry) {
        self.profiler.record_action(telemetry);
    }

    /// Ingest one snapshot and produce the events it warrants: a hand
    /// boundary, one-shot notices, and a recommendation when it is the
    /// hero's turn. An unchanged snapshot produces nothing.
    pub fn on_snapshot(&mut self, snapshot: TableSnapshot) -> Vec<AdvisorEvent> {
        let outcome = self.tracker.update(snapshot);
        let mut events = Vec::new();

        if outcome.new_hand {
            self.begin_hand(&outcome, &mut events);
        }
        if !outcome.changed {
            return events;
        }

        self.push_notices(&mut events);

        if self.tracker.is_hero_turn() {
            let state = self.tracker.state();
            let profiles = self
                .profiler
                .profiles(state.opponents().map(|s| s.name.as_str()));
            if let Some(recommendation) = decide(state, &self.tournament, &profiles) {
                info!(
                    action = %recommendation.action,
                    street = state.street.as_str(),
                    "advice issued"
                );
                self.last_recommendation = Some(recommendation.clone());
                events.push(AdvisorEvent::Advice(recommendation));
            }
        }
        events
    }

    /// Re-emit the last recommendation of the current hand, if any.
    pub fn explain_last(&self) -> AdvisorEvent {
        match &self.last_recommendation {
            Some(recommendation) => AdvisorEvent::Advice(recommendation.clone()),
            None => AdvisorEvent::Notice("No recommendation yet this hand.".to_string()),
        }
    }

    fn begin_hand(&mut self, outcome: &SnapshotOutcome, events: &mut Vec<AdvisorEvent>) {
        let settled = self.tracker.take_hand_result();
        debug!(settled, anomalies = outcome.anomalies.len(), "hand boundary");

        self.bubble_noticed = false;
        self.short_stack_noticed = false;
        self.last_recommendation = None;

        let players: Vec<String> = self
            .tracker
            .state()
            .seats
            .iter()
            .map(|s| s.name.clone())
            .collect();
        self.profiler.on_new_hand(players);

        if let Some(hand_id) = self.tracker.state().hand_id {
            events.push(AdvisorEvent::NewHand { hand_id });
        }
    }

    /// One-shot per hand: bubble pressure and short-stack warnings.
    fn push_notices(&mut self, events: &mut Vec<AdvisorEvent>) {
        if self.tournament.on_bubble && !self.bubble_noticed {
            self.bubble_noticed = true;
            events.push(AdvisorEvent::Notice(
                "Bubble play: survival outweighs chip accumulation.".to_string(),
            ));
        }

        let effective = self.tracker.state().effective_stack_bb();
        if effective > 0.0 && effective < 15.0 && !self.short_stack_noticed {
            self.short_stack_noticed = true;
            events.push(AdvisorEvent::Notice(format!(
                "Short stack: {:.0}bb effective, push/fold territory.",
                effective
            )));
        }
    }
}
