//! Soft-body simulation module
//!
//! Everything that moves lives here. This module must stay pure:
//! - Time arrives as frame timestamps, never read from a clock
//! - Seeded RNG only
//! - Stable iteration order (by cell key, then body id)
//! - No DOM or platform dependencies

pub mod body;
pub mod key;
pub mod membership;
pub mod node;
pub mod params;
pub mod schedule;
pub mod sink;
pub mod tick;
pub mod world;

pub use body::{Body, BodyId};
pub use key::CellKey;
pub use membership::Membership;
pub use node::Node;
pub use params::{BodyParams, BodyParamsPatch};
pub use schedule::{FixedStepDriver, FrameLoop, FrameOutcome, LoopState};
pub use sink::{OffsetBuffer, OffsetSink};
pub use tick::{StepContext, integrate};
pub use world::SoftBodyWorld;
