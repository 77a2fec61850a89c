mod result;

use std::{sync::Arc, time::Duration};

pub use result::{RunResult, StepRecord};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    agent::{
        context::ExecutionContext,
        core::VerdictResponse,
        planning::{PlanStep, TaskPlan},
        types::{AgentMode, State, StepStatus},
    },
    browser::{BrowserAction, BrowserSession, ScreenshotSnapshot, SessionProvider},
    error::{Error, Result},
    input::Command,
    registry::AgentRegistry,
    vision::{VisionGrounding, ground_or_empty},
};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub mode: AgentMode,

    /// Critic rejections tolerated per step before escalating to a re-plan.
    pub step_retry_budget: u32,

    /// Re-plans tolerated per run before the run fails as exhausted.
    pub replan_budget: u32,

    /// Ceiling on one agent invocation.
    pub llm_timeout: Duration,

    /// Ceiling on action execution plus the load-state wait.
    pub page_timeout: Duration,

    /// Ceiling on one vision grounding call.
    pub vision_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            mode: AgentMode::default(),
            step_retry_budget: 2,
            replan_budget: 1,
            llm_timeout: Duration::from_secs(60),
            page_timeout: Duration::from_secs(15),
            vision_timeout: Duration::from_secs(20),
        }
    }
}

/// Run-scoped bookkeeping: the audit trail plus the budgets' state.
#[derive(Default)]
struct RunTracker {
    history: Vec<StepRecord>,
    replans: u32,
    failure_notes: Vec<String>,
}

impl RunTracker {
    fn ensure(&mut self, plan_id: &str, step: &PlanStep) {
        let exists = self
            .history
            .iter()
            .any(|r| r.plan_id == plan_id && r.step_id == step.step_id);
        if !exists {
            self.history.push(StepRecord {
                plan_id: plan_id.to_string(),
                step_id: step.step_id,
                description: step.description.clone(),
                attempts: 0,
                status: StepStatus::Executing,
                last_action: None,
                last_error: None,
            });
        }
    }

    fn record_mut(&mut self, plan_id: &str, step_id: usize) -> Option<&mut StepRecord> {
        self.history
            .iter_mut()
            .find(|r| r.plan_id == plan_id && r.step_id == step_id)
    }

    fn count_attempt(&mut self, plan_id: &str, step_id: usize) {
        if let Some(record) = self.record_mut(plan_id, step_id) {
            record.attempts += 1;
        }
    }

    fn record_action(&mut self, plan_id: &str, step_id: usize, action: &BrowserAction) {
        if let Some(record) = self.record_mut(plan_id, step_id) {
            record.last_action = Some(action.to_string());
        }
    }

    fn note_error(&mut self, plan_id: &str, step_id: usize, reason: &str) {
        if let Some(record) = self.record_mut(plan_id, step_id) {
            record.last_error = Some(reason.to_string());
        }
    }

    fn finish_step(&mut self, plan_id: &str, step_id: usize, status: StepStatus) {
        if let Some(record) = self.record_mut(plan_id, step_id) {
            record.status = status;
        }
    }
}

/// Drives a single command from acceptance to `RunResult`.
///
/// Owns the current state, the exclusively-held browser session, and the
/// retry/re-plan budgets. The registry is read-only and may be shared by
/// concurrent orchestrators; everything mutable lives per run.
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    provider: Arc<dyn SessionProvider>,
    vision: Arc<dyn VisionGrounding>,
    config: OrchestratorConfig,
    session: Option<Box<dyn BrowserSession>>,
    state: State,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<AgentRegistry>,
        provider: Arc<dyn SessionProvider>,
        vision: Arc<dyn VisionGrounding>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            provider,
            vision,
            config,
            session: None,
            state: State::Plan,
        }
    }

    pub fn current_state(&self) -> State {
        self.state
    }

    /// Acquire the browser session for this run. Idempotent: a session that
    /// is already held is kept.
    pub async fn start(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        let session = self
            .provider
            .acquire()
            .await
            .map_err(|e| Error::SessionInit(e.to_string()))?;
        info!("browser session acquired");
        self.session = Some(session);
        self.state = State::Plan;
        Ok(())
    }

    /// Run the full loop for one command. Always returns a `RunResult`; the
    /// session is released exactly once on every path before this returns.
    pub async fn execute_command(&mut self, command: Command) -> RunResult {
        let run_id = Uuid::new_v4().simple().to_string();
        let started_at = chrono::Utc::now();
        info!("run {run_id}: executing command '{}'", command.instruction);

        if self.session.is_none() {
            if let Err(e) = self.start().await {
                warn!("run {run_id}: {e}");
                // No state was entered; there is nothing to release.
                return RunResult {
                    run_id,
                    success: false,
                    final_state: self.state,
                    steps: Vec::new(),
                    replans: 0,
                    failure: Some(format!("SessionInitError: {e}")),
                    started_at,
                    finished_at: chrono::Utc::now(),
                };
            }
        }

        let mut tracker = RunTracker::default();
        let outcome = self.run(&command, &mut tracker).await;
        self.release_session().await;

        let (success, failure) = match outcome {
            Ok(()) => (true, None),
            Err(e) => (false, Some(e.to_string())),
        };
        info!(
            "run {run_id}: finished (success={success}, steps={}, replans={})",
            tracker.history.len(),
            tracker.replans
        );
        RunResult {
            run_id,
            success,
            final_state: self.state,
            steps: tracker.history,
            replans: tracker.replans,
            failure,
            started_at,
            finished_at: chrono::Utc::now(),
        }
    }

    /// Release the session if one is held. For callers that cancelled an
    /// in-flight `execute_command` and still need the scoped-resource
    /// guarantee.
    pub async fn shutdown(&mut self) {
        self.release_session().await;
    }

    async fn release_session(&mut self) {
        // take() makes a double release impossible.
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close().await {
                warn!("browser session close reported an error: {e}");
            }
            info!("browser session released");
        }
    }

    async fn run(&mut self, command: &Command, tracker: &mut RunTracker) -> Result<()> {
        let mut plan = self.plan(command, tracker).await?;

        loop {
            self.state = State::Browse;
            let Some(step) = plan.next_pending_step().cloned() else {
                // No incomplete step remains: terminal success.
                return Ok(());
            };
            plan.mark_step(step.step_id, StepStatus::Executing, None);
            tracker.ensure(&plan.plan_id, &step);

            let mut rejections = 0u32;
            let mut guidance: Option<String> = None;
            loop {
                tracker.count_attempt(&plan.plan_id, step.step_id);
                let verdict = self
                    .attempt_step(command, &plan, &step, guidance.take(), tracker)
                    .await?;

                if verdict.accepted {
                    plan.mark_step(step.step_id, StepStatus::Done, None);
                    tracker.finish_step(&plan.plan_id, step.step_id, StepStatus::Done);
                    info!("step {} done: {}", step.step_id, step.description);
                    break;
                }

                let reason = verdict
                    .reason
                    .unwrap_or_else(|| "step rejected".to_string());
                warn!("step {} rejected: {reason}", step.step_id);
                tracker.note_error(&plan.plan_id, step.step_id, &reason);
                rejections += 1;

                if rejections < self.config.step_retry_budget {
                    guidance = verdict.guidance;
                    self.state = State::Browse;
                    continue;
                }

                // Step retries exhausted: escalate to a re-plan, or fail the
                // run once that budget is spent too.
                plan.mark_step(step.step_id, StepStatus::Failed, Some(reason.clone()));
                tracker.finish_step(&plan.plan_id, step.step_id, StepStatus::Failed);
                tracker.failure_notes.push(format!(
                    "step {} ('{}') failed after {} rejection(s): {}",
                    step.step_id, step.description, rejections, reason
                ));

                if tracker.replans < self.config.replan_budget {
                    tracker.replans += 1;
                    info!(
                        "re-planning ({} of {})",
                        tracker.replans, self.config.replan_budget
                    );
                    plan = self.plan(command, tracker).await?;
                    break;
                }
                return Err(Error::ExecutionExhausted(reason));
            }
        }
    }

    async fn plan(&mut self, command: &Command, tracker: &RunTracker) -> Result<TaskPlan> {
        self.state = State::Plan;
        let agent = self.registry.get(State::Plan)?;
        let ctx = ExecutionContext::for_planning(command, &tracker.failure_notes);

        let response = match tokio::time::timeout(self.config.llm_timeout, agent.handle(&ctx)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e @ Error::ContractViolation { .. })) => return Err(e),
            Ok(Err(e)) => return Err(Error::PlanningFailed(e.to_string())),
            Err(_) => {
                return Err(Error::PlanningFailed(format!(
                    "planner timed out after {:?}",
                    self.config.llm_timeout
                )));
            }
        };

        let plan = response.expect_plan(agent.name())?.into_plan();
        if plan.steps.is_empty() {
            return Err(Error::PlanningFailed(
                "planner returned no actionable steps".to_string(),
            ));
        }
        info!("plan {} ready with {} step(s)", plan.plan_id, plan.steps.len());
        Ok(plan)
    }

    /// One attempt at one step: observe, propose, execute, judge. Browser
    /// failures, page-wait timeouts, and model transport failures become
    /// rejections that flow through the retry policy; contract violations and
    /// registry gaps are fatal and propagate.
    async fn attempt_step(
        &mut self,
        command: &Command,
        plan: &TaskPlan,
        step: &PlanStep,
        guidance: Option<String>,
        tracker: &mut RunTracker,
    ) -> Result<VerdictResponse> {
        let snapshot = self.capture_snapshot().await;

        let (agent, proposal_state) = match self.config.mode {
            AgentMode::SingleAgent => (self.registry.get(State::AgentQBase)?, State::AgentQBase),
            AgentMode::ActorCritic => match self.registry.get(State::AgentQActor) {
                Ok(agent) => (agent, State::AgentQActor),
                Err(_) => (self.registry.get(State::Browse)?, State::Browse),
            },
        };
        self.state = proposal_state;

        let ctx = ExecutionContext {
            command: command.clone(),
            plan: Some(plan.clone()),
            step: Some(step.clone()),
            snapshot: Some(snapshot),
            last_action: None,
            guidance,
            failure_notes: Vec::new(),
        };

        let response = match tokio::time::timeout(self.config.llm_timeout, agent.handle(&ctx)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e @ Error::ContractViolation { .. })) => return Err(e),
            Ok(Err(e @ Error::MissingAgent(_))) => return Err(e),
            Ok(Err(e)) => {
                return Ok(VerdictResponse::rejected(
                    format!("{} agent failed: {e}", agent.name()),
                    None,
                ));
            }
            Err(_) => {
                return Ok(VerdictResponse::rejected(
                    format!(
                        "{} agent timed out after {:?}",
                        agent.name(),
                        self.config.llm_timeout
                    ),
                    None,
                ));
            }
        };

        let action = response.expect_action(agent.name())?.action;
        tracker.record_action(&plan.plan_id, step.step_id, &action);
        info!("step {}: executing action '{action}'", step.step_id);

        if let Err(reason) = self.execute_action(&action).await {
            // Rejected by construction: the page never reached a state worth
            // judging, so the critic is not consulted.
            return Ok(VerdictResponse::rejected(reason, None));
        }

        match self.config.mode {
            // Single-agent mode self-validates in the proposal; an executed
            // action counts as accepted.
            AgentMode::SingleAgent => Ok(VerdictResponse::accepted()),
            AgentMode::ActorCritic => {
                let post_snapshot = self.capture_snapshot().await;
                self.state = State::AgentQCritic;
                let critic = self.registry.get(State::AgentQCritic)?;
                let critic_ctx = ExecutionContext {
                    command: command.clone(),
                    plan: Some(plan.clone()),
                    step: Some(step.clone()),
                    snapshot: Some(post_snapshot),
                    last_action: Some(action),
                    guidance: None,
                    failure_notes: Vec::new(),
                };
                match tokio::time::timeout(self.config.llm_timeout, critic.handle(&critic_ctx))
                    .await
                {
                    Ok(Ok(response)) => response.expect_verdict(critic.name()),
                    Ok(Err(e @ Error::ContractViolation { .. })) => Err(e),
                    Ok(Err(e)) => Ok(VerdictResponse::rejected(
                        format!("critic failed: {e}"),
                        None,
                    )),
                    Err(_) => Ok(VerdictResponse::rejected(
                        format!("critic timed out after {:?}", self.config.llm_timeout),
                        None,
                    )),
                }
            }
        }
    }

    /// Execute the action and wait for the page to settle, under the page
    /// timeout. Returns the rejection reason on failure.
    async fn execute_action(&mut self, action: &BrowserAction) -> std::result::Result<(), String> {
        let Some(session) = self.session.as_mut() else {
            return Err("no active browser session".to_string());
        };

        let work = async {
            let extraction = action.execute(session.as_mut()).await?;
            if let Some(extraction) = extraction {
                info!(
                    "extracted '{}' ({} chars)",
                    extraction.label,
                    extraction.content.len()
                );
            }
            session.wait_for_load_state().await?;
            Ok::<(), Error>(())
        };

        match tokio::time::timeout(self.config.page_timeout, work).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("action failed: {e}")),
            Err(_) => Err(format!(
                "page did not reach a stable load state within {:?}",
                self.config.page_timeout
            )),
        }
    }

    /// Observe the page. Best effort on every field: a broken screenshot or
    /// vision outage degrades the snapshot instead of failing the attempt.
    async fn capture_snapshot(&mut self) -> ScreenshotSnapshot {
        let viewport = self
            .session
            .as_ref()
            .map(|s| s.viewport_size())
            .unwrap_or_default();

        let (url, title, dom_excerpt, image) = match self.session.as_mut() {
            Some(session) => {
                let url = session
                    .current_url()
                    .await
                    .unwrap_or_else(|_| "unknown".to_string());
                let title = session
                    .page_title()
                    .await
                    .unwrap_or_else(|_| "untitled".to_string());
                let dom_excerpt = session.dom_summary().await.unwrap_or_default();
                let image = match tokio::time::timeout(
                    self.config.page_timeout,
                    session.screenshot(false),
                )
                .await
                {
                    Ok(Ok(bytes)) => bytes,
                    Ok(Err(e)) => {
                        warn!("screenshot failed, proceeding with DOM-only context: {e}");
                        Vec::new()
                    }
                    Err(_) => {
                        warn!("screenshot timed out, proceeding with DOM-only context");
                        Vec::new()
                    }
                };
                (url, title, dom_excerpt, image)
            }
            None => (
                "unknown".to_string(),
                "untitled".to_string(),
                String::new(),
                Vec::new(),
            ),
        };

        let elements = if image.is_empty() {
            Vec::new()
        } else {
            ground_or_empty(
                self.vision.as_ref(),
                &image,
                viewport,
                self.config.vision_timeout,
            )
            .await
        };

        ScreenshotSnapshot {
            image,
            viewport,
            elements,
            url,
            title,
            dom_excerpt,
            captured_at: chrono::Utc::now(),
        }
    }
}
