//! Orchestrator main execution loop
//!
//! Contains `run` and the explicit phase machine behind it.

use crate::error::{Error, Result};
use crate::intent::Intent;
use std::collections::BTreeSet;
use std::time::Instant;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use wayfarer_llm::CompletionRequest;

use super::config::TurnContext;
use super::core::Orchestrator;
use super::decision::parse_decision;
use super::prompts;
use super::types::{
    Decision, DecisionKind, OrchestrationState, Phase, TurnError, TurnMetadata, TurnOutcome,
};

/// Data source recorded when any map call succeeded
const MAP_SOURCE: &str = "amap";

impl Orchestrator {
    /// Run one turn to completion
    pub async fn run(&self, intent: Intent, ctx: TurnContext) -> TurnOutcome {
        self.run_with_cancel(intent, ctx, &CancellationToken::new())
            .await
    }

    /// Run one turn, stopping at the next suspension point once `cancel` fires
    #[instrument(skip_all, fields(
        scenario = %intent.scenario,
        max_iterations = self.config.max_iterations
    ))]
    pub async fn run_with_cancel(
        &self,
        intent: Intent,
        ctx: TurnContext,
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        let start = Instant::now();
        let mut state = OrchestrationState::new(intent);

        info!(query = %ctx.query, "Starting turn");

        let outcome = self.drive(&mut state, &ctx, cancel).await;
        let processing_time_ms = start.elapsed().as_millis() as u64;

        let (final_text, error) = match outcome {
            Ok(report) => {
                state.phase = Phase::Done;
                info!(
                    iterations = state.iteration_count,
                    tool_calls = state.results.len(),
                    processing_time_ms,
                    "Turn completed"
                );
                (report, None)
            }
            Err(e) => {
                state.phase = Phase::Aborted;
                warn!(
                    code = e.code(),
                    error = %e,
                    iterations = state.iteration_count,
                    "Turn aborted"
                );
                let report = prompts::fallback_report(&state.intent, &ctx, &state.results);
                (report, Some(TurnError::from(&e)))
            }
        };

        let mut data_sources = BTreeSet::new();
        if state.successful_calls() > 0 {
            data_sources.insert(MAP_SOURCE.to_string());
        }
        data_sources.insert(self.llm.name().to_string());

        TurnOutcome {
            final_text,
            metadata: TurnMetadata {
                iterations: state.iteration_count,
                tool_calls_count: state.results.len(),
                tools_used: state.tools_used(),
                data_sources,
                processing_time_ms,
                phase: state.phase,
            },
            results: state.results,
            error,
        }
    }

    /// Step the phase machine until it reaches a terminal phase
    async fn drive(
        &self,
        state: &mut OrchestrationState,
        ctx: &TurnContext,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let tool_menu = self.tools.describe();
        let mut pending: Option<Decision> = None;

        loop {
            match state.phase {
                Phase::Deciding => {
                    if state.iteration_count >= self.config.max_iterations {
                        info!(
                            iterations = state.iteration_count,
                            "Iteration cap reached, synthesizing"
                        );
                        state.phase = Phase::Synthesizing;
                        continue;
                    }

                    let prompt = prompts::decision_prompt(
                        state,
                        ctx,
                        &tool_menu,
                        self.config.max_iterations,
                    );
                    let reply = self
                        .infer(prompt, self.config.decision_temperature, cancel)
                        .await?;
                    let decision = parse_decision(&reply);
                    state.terminal_decision = Some(decision.kind());

                    match decision.kind() {
                        DecisionKind::CallTool => {
                            pending = Some(decision);
                            state.phase = Phase::Calling;
                        }
                        DecisionKind::Finish => {
                            debug!(
                                iteration = state.iteration_count,
                                "Decision is finish, synthesizing"
                            );
                            state.phase = Phase::Synthesizing;
                        }
                    }
                }
                Phase::Calling => {
                    let Some(Decision::CallTool {
                        tool_name,
                        arguments,
                        reason,
                    }) = pending.take()
                    else {
                        state.phase = Phase::Deciding;
                        continue;
                    };

                    info!(
                        tool = %tool_name,
                        iteration = state.iteration_count + 1,
                        "Calling tool"
                    );

                    let result = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        result = self.tools.execute(&tool_name, arguments) => result,
                    };

                    state.results.push(result.with_reason(reason));
                    state.iteration_count += 1;
                    state.phase = Phase::Deciding;
                }
                Phase::Synthesizing => {
                    let prompt = prompts::synthesis_prompt(&state.intent, ctx, &state.results);
                    let report = self
                        .infer(prompt, self.config.synthesis_temperature, cancel)
                        .await
                        .map_err(|e| match e {
                            Error::Llm(inner) => Error::Synthesis(inner.to_string()),
                            other => other,
                        })?;

                    if report.trim().is_empty() {
                        return Err(Error::Synthesis("empty report".to_string()));
                    }
                    return Ok(report);
                }
                Phase::Done | Phase::Aborted => {
                    return Err(Error::Synthesis(format!(
                        "loop entered terminal phase {:?} without a report",
                        state.phase
                    )));
                }
            }
        }
    }

    /// One LLM call under the configured deadline
    async fn infer(
        &self,
        prompt: String,
        temperature: f32,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut request = CompletionRequest::prompt(prompt).with_temperature(temperature);
        if let Some(model) = &self.config.model {
            request.model = model.clone();
        }

        let deadline = self.config.llm_timeout;
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = timeout(deadline, self.llm.complete(request)) => response,
        };

        match response {
            Ok(Ok(response)) => Ok(response.content),
            Ok(Err(e)) if e.is_timeout() => Err(Error::LlmTimeout(deadline.as_millis() as u64)),
            Ok(Err(e)) => Err(Error::Llm(e)),
            Err(_) => Err(Error::LlmTimeout(deadline.as_millis() as u64)),
        }
    }
}
