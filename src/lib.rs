// Decision core for a live poker advisor.
//
// The pipeline: a capture collaborator delivers a `TableSnapshot`, the
// `tracker` turns the noisy snapshot stream into a coherent hand lifecycle,
// the `strategy` engine combines the preflop `charts`, the `eval` hand
// strength model and the `profiler`'s opponent classifications into a
// `Recommendation`, and the `advisor` wires it all together for the
// delivery collaborator.

pub mod advisor;
pub mod charts;
pub mod eval;
pub mod profiler;
pub mod strategy;
pub mod tracker;
pub mod types;

pub use advisor::{Advisor, AdvisorEvent};
pub use charts::{hand_shorthand, ChartKey, RangeAction, StackBucket};
pub use eval::{evaluate_hand, HandRanking, HandStrength};
pub use profiler::{ActionTelemetry, OpponentProfile, OpponentStats, Profiler, TelemetryKind};
pub use strategy::{board_texture, decide, BoardTexture};
pub use tracker::{SnapshotOutcome, StateTracker};
pub use types::{
    AdvisedAction, Card, Classification, HandState, Position, Rank, Recommendation, Seat,
    SeatObservation, SeatStatus, StackProfile, Street, Suit, TableSnapshot, TournamentContext,
};
