//! Orchestrator - Turn execution loop
//!
//! Drives one turn through an explicit phase machine:
//! DECIDING → CALLING → DECIDING ... → SYNTHESIZING → DONE, or ABORTED.
//!
//! # Module Structure
//!
//! - `config`: Configuration types (OrchestratorConfig, TurnContext)
//! - `types`: Phase, Decision, OrchestrationState and turn results
//! - `core`: Orchestrator struct
//! - `process`: The phase machine
//! - `decision`: Decision reply parsing
//! - `evidence`: Evidence digest over tool results
//! - `prompts`: Decision, synthesis and fallback texts

mod config;
mod core;
pub mod decision;
pub mod evidence;
mod process;
mod prompts;
mod types;


pub use config::{OrchestratorConfig, TurnContext, DEFAULT_MAX_ITERATIONS};
pub use core::Orchestrator;
pub use decision::parse_decision;
pub use prompts::{DECISION_MARKER, SYNTHESIS_MARKER};
pub use types::{
    Decision, DecisionKind, OrchestrationState, Phase, StateSnapshot, TurnError, TurnMetadata,
    TurnOutcome,
};
