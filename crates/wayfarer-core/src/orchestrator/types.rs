//! Orchestrator types
//!
//! Contains the loop state machine types:
//! - `Phase`, `Decision` and `OrchestrationState` for the running turn
//! - `TurnOutcome`, `TurnMetadata` and `StateSnapshot` for its result

use crate::error::{Error, UserFriendlyError};
use crate::intent::{Intent, Scenario};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use wayfarer_tools::ToolCallResult;

/// Loop phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Asking the LLM what to do next
    Deciding,
    /// Executing the requested tool
    Calling,
    /// Generating the final report
    Synthesizing,
    /// Report generated
    Done,
    /// Turn failed or was cancelled
    Aborted,
}

impl Phase {
    /// Whether the loop has stopped
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Aborted)
    }
}

/// Kind of the last parsed decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Call a tool
    CallTool,
    /// Stop and synthesize
    Finish,
}

/// Parsed LLM directive
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// `CALL_TOOL`
    CallTool {
        /// Requested tool name
        tool_name: String,
        /// Requested arguments
        arguments: Value,
        /// Stated reason
        reason: Option<String>,
    },
    /// `GENERATE_FINAL_RESPONSE`, or anything unusable
    Finish {
        /// Stated reason
        reason: Option<String>,
    },
}

impl Decision {
    /// Kind of this decision
    #[must_use]
    pub fn kind(&self) -> DecisionKind {
        match self {
            Decision::CallTool { .. } => DecisionKind::CallTool,
            Decision::Finish { .. } => DecisionKind::Finish,
        }
    }
}

/// State of one turn. Lives only for the duration of `run`.
#[derive(Debug, Clone)]
pub struct OrchestrationState {
    /// Intent the turn was started with
    pub intent: Intent,
    /// Tool results in call order
    pub results: Vec<ToolCallResult>,
    /// Completed DECIDING→CALLING round trips
    pub iteration_count: usize,
    /// Last decision taken
    pub terminal_decision: Option<DecisionKind>,
    /// Current phase
    pub phase: Phase,
}

impl OrchestrationState {
    /// Fresh state in `Deciding`
    #[must_use]
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            results: Vec::new(),
            iteration_count: 0,
            terminal_decision: None,
            phase: Phase::Deciding,
        }
    }

    /// Tool names in call order
    #[must_use]
    pub fn tools_used(&self) -> Vec<String> {
        self.results.iter().map(|r| r.tool_name.clone()).collect()
    }

    /// Number of successful calls
    #[must_use]
    pub fn successful_calls(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }
}

/// Error surfaced by an aborted turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnError {
    /// Machine-readable code (`synthesis_failed`, `llm_timeout`, ...)
    pub code: String,
    /// User-safe message
    pub message: String,
}

impl From<&Error> for TurnError {
    fn from(e: &Error) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.user_message(),
        }
    }
}

/// Metadata of a finished turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnMetadata {
    /// Completed round trips
    pub iterations: usize,
    /// Tool calls made
    pub tool_calls_count: usize,
    /// Tool names in call order
    pub tools_used: Vec<String>,
    /// Where the evidence came from
    pub data_sources: BTreeSet<String>,
    /// Wall time in milliseconds
    pub processing_time_ms: u64,
    /// Final phase (`done` or `aborted`)
    pub phase: Phase,
}

impl TurnMetadata {
    /// Wall time in seconds
    #[must_use]
    pub fn processing_time_secs(&self) -> f64 {
        self.processing_time_ms as f64 / 1000.0
    }
}

/// Result of `Orchestrator::run`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Report text, or a generic failure report when aborted
    pub final_text: String,
    /// Tool results in call order
    pub results: Vec<ToolCallResult>,
    /// Turn metadata
    pub metadata: TurnMetadata,
    /// Why the turn aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TurnError>,
}

impl TurnOutcome {
    /// Whether the turn reached `Done`
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.metadata.phase == Phase::Done
    }

    /// Whether the turn was aborted by its cancellation token
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(&self.error, Some(e) if e.code == Error::Cancelled.code())
    }

    /// Compact summary kept with the conversation
    #[must_use]
    pub fn snapshot(&self, intent: &Intent) -> StateSnapshot {
        StateSnapshot {
            scenario: intent.scenario,
            confidence: intent.confidence,
            entities: intent.entities.clone(),
            tools_used: self.metadata.tools_used.clone(),
            iterations: self.metadata.iterations,
            phase: self.metadata.phase,
        }
    }
}

/// Serializable summary of the last orchestration in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Scenario of the turn
    pub scenario: Scenario,
    /// Classifier confidence
    pub confidence: f32,
    /// Extracted entities
    pub entities: BTreeMap<String, String>,
    /// Tools called, in order
    pub tools_used: Vec<String>,
    /// Completed round trips
    pub iterations: usize,
    /// Final phase
    pub phase: Phase,
}
