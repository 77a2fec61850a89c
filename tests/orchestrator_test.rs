#[cfg(test)]
mod orchestrator_tests {
    use std::{
        collections::VecDeque,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use agentq::{
        Error,
        agent::{
            context::ExecutionContext,
            core::{
                ActionResponse, AgentResponse, AgentRole, PlanResponse, PlannedStep,
                VerdictResponse,
            },
            types::{AgentMode, State, StepStatus},
        },
        browser::{BrowserAction, BrowserSession, SessionProvider, Viewport},
        error::Result,
        input::Command,
        orchestrator::{Orchestrator, OrchestratorConfig},
        registry::AgentRegistry,
        vision::{UiElement, VisionGrounding, ground_or_empty},
    };
    use async_trait::async_trait;

    // ---- scripted agents ------------------------------------------------

    struct ScriptedAgent {
        name: &'static str,
        state: State,
        responses: Mutex<VecDeque<AgentResponse>>,
        fallback: AgentResponse,
        calls: AtomicUsize,
        seen: Mutex<Vec<ExecutionContext>>,
    }

    impl ScriptedAgent {
        fn new(name: &'static str, state: State, fallback: AgentResponse) -> Arc<Self> {
            Arc::new(Self {
                name,
                state,
                responses: Mutex::new(VecDeque::new()),
                fallback,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn queue(self: &Arc<Self>, response: AgentResponse) -> Arc<Self> {
            self.responses.lock().unwrap().push_back(response);
            self.clone()
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AgentRole for ScriptedAgent {
        fn name(&self) -> &str {
            self.name
        }

        fn state(&self) -> State {
            self.state
        }

        async fn handle(&self, ctx: &ExecutionContext) -> Result<AgentResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(ctx.clone());
            let scripted = self.responses.lock().unwrap().pop_front();
            Ok(scripted.unwrap_or_else(|| self.fallback.clone()))
        }
    }

    /// Never answers; used to cancel a run mid-flight.
    struct HangingAgent;

    #[async_trait]
    impl AgentRole for HangingAgent {
        fn name(&self) -> &str {
            "hanging"
        }

        fn state(&self) -> State {
            State::Plan
        }

        async fn handle(&self, _ctx: &ExecutionContext) -> Result<AgentResponse> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(plan_of(&[]))
        }
    }

    fn plan_of(steps: &[&str]) -> AgentResponse {
        AgentResponse::Plan(PlanResponse {
            description: None,
            steps: steps
                .iter()
                .enumerate()
                .map(|(i, d)| PlannedStep {
                    step_id: i + 1,
                    description: d.to_string(),
                })
                .collect(),
        })
    }

    fn click(target: &str) -> AgentResponse {
        AgentResponse::Action(ActionResponse {
            action: BrowserAction::Click {
                target: target.to_string(),
            },
            rationale: None,
        })
    }

    fn accepted() -> AgentResponse {
        AgentResponse::Verdict(VerdictResponse::accepted())
    }

    fn rejected(reason: &str, guidance: Option<&str>) -> AgentResponse {
        AgentResponse::Verdict(VerdictResponse::rejected(
            reason,
            guidance.map(|g| g.to_string()),
        ))
    }

    // ---- mock browser / provider / vision -------------------------------

    struct MockBrowser {
        closes: Arc<AtomicUsize>,
        actions: Arc<Mutex<Vec<String>>>,
        load_delay: Duration,
    }

    #[async_trait]
    impl BrowserSession for MockBrowser {
        async fn current_url(&self) -> Result<String> {
            Ok("https://example.test/".to_string())
        }

        async fn page_title(&self) -> Result<String> {
            Ok("Example".to_string())
        }

        async fn dom_summary(&self) -> Result<String> {
            Ok("<body><input id=q><button id=go>Go</button></body>".to_string())
        }

        async fn navigate(&mut self, url: &str) -> Result<()> {
            self.actions.lock().unwrap().push(format!("navigate {url}"));
            Ok(())
        }

        async fn click(&mut self, target: &str) -> Result<()> {
            self.actions.lock().unwrap().push(format!("click {target}"));
            Ok(())
        }

        async fn type_text(&mut self, target: &str, text: &str) -> Result<()> {
            self.actions
                .lock()
                .unwrap()
                .push(format!("type {target}={text}"));
            Ok(())
        }

        async fn press_key(&mut self, key: &str) -> Result<()> {
            self.actions.lock().unwrap().push(format!("press {key}"));
            Ok(())
        }

        async fn extract_text(&mut self, _target: &str) -> Result<String> {
            Ok("extracted".to_string())
        }

        async fn wait_for_load_state(&mut self) -> Result<()> {
            tokio::time::sleep(self.load_delay).await;
            Ok(())
        }

        async fn screenshot(&mut self, _full_page: bool) -> Result<Vec<u8>> {
            Ok(vec![137, 80, 78, 71])
        }

        fn viewport_size(&self) -> Viewport {
            Viewport {
                width: 1280,
                height: 720,
            }
        }

        async fn close(&mut self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct MockProvider {
        closes: Arc<AtomicUsize>,
        actions: Arc<Mutex<Vec<String>>>,
        acquisitions: Arc<AtomicUsize>,
        fail: bool,
        load_delay: Duration,
    }

    impl MockProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                closes: Arc::new(AtomicUsize::new(0)),
                actions: Arc::new(Mutex::new(Vec::new())),
                acquisitions: Arc::new(AtomicUsize::new(0)),
                fail: false,
                load_delay: Duration::ZERO,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                closes: Arc::new(AtomicUsize::new(0)),
                actions: Arc::new(Mutex::new(Vec::new())),
                acquisitions: Arc::new(AtomicUsize::new(0)),
                fail: true,
                load_delay: Duration::ZERO,
            })
        }

        fn unresponsive(load_delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                closes: Arc::new(AtomicUsize::new(0)),
                actions: Arc::new(Mutex::new(Vec::new())),
                acquisitions: Arc::new(AtomicUsize::new(0)),
                fail: false,
                load_delay,
            })
        }

        fn close_count(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionProvider for MockProvider {
        async fn acquire(&self) -> Result<Box<dyn BrowserSession>> {
            self.acquisitions.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Browser("chrome did not start".to_string()));
            }
            Ok(Box::new(MockBrowser {
                closes: self.closes.clone(),
                actions: self.actions.clone(),
                load_delay: self.load_delay,
            }))
        }
    }

    struct FixedVision {
        elements: Vec<UiElement>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl VisionGrounding for FixedVision {
        async fn ground(&self, _image: &[u8], _viewport: Viewport) -> Result<Vec<UiElement>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.elements.clone())
        }
    }

    struct FailingVision;

    #[async_trait]
    impl VisionGrounding for FailingVision {
        async fn ground(&self, _image: &[u8], _viewport: Viewport) -> Result<Vec<UiElement>> {
            Err(Error::Vision("grounding backend offline".to_string()))
        }
    }

    struct SlowVision {
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl VisionGrounding for SlowVision {
        async fn ground(&self, _image: &[u8], _viewport: Viewport) -> Result<Vec<UiElement>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(vec![element("late")])
        }
    }

    fn element(label: &str) -> UiElement {
        UiElement {
            label: label.to_string(),
            role: Some("button".to_string()),
            region: None,
        }
    }

    fn fast_config(mode: AgentMode) -> OrchestratorConfig {
        OrchestratorConfig {
            mode,
            step_retry_budget: 2,
            replan_budget: 1,
            llm_timeout: Duration::from_secs(5),
            page_timeout: Duration::from_millis(200),
            vision_timeout: Duration::from_millis(200),
        }
    }

    fn default_vision() -> Arc<FixedVision> {
        Arc::new(FixedVision {
            elements: vec![element("search box"), element("go button")],
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    // ---- scenarios ------------------------------------------------------

    #[tokio::test]
    async fn happy_path_completes_all_steps() {
        let planner = ScriptedAgent::new("planner", State::Plan, plan_of(&[]))
            .queue(plan_of(&["open search", "enter query", "submit"]));
        let nav = ScriptedAgent::new("browser_nav", State::Browse, click("#go"));
        let critic = ScriptedAgent::new("critic", State::AgentQCritic, accepted());

        let registry = AgentRegistry::builder()
            .with(planner.clone())
            .with(nav.clone())
            .with(critic.clone())
            .build(AgentMode::ActorCritic)
            .unwrap();

        let provider = MockProvider::new();
        let mut orchestrator = Orchestrator::new(
            Arc::new(registry),
            provider.clone(),
            default_vision(),
            fast_config(AgentMode::ActorCritic),
        );

        let result = orchestrator
            .execute_command(Command::new("search for eggs"))
            .await;

        assert!(result.success, "failure: {:?}", result.failure);
        assert_eq!(result.steps.len(), 3);
        assert!(result.steps.iter().all(|s| s.status == StepStatus::Done));
        assert_eq!(result.replans, 0);
        assert_eq!(result.final_state, State::Browse);
        assert_eq!(nav.call_count(), 3);
        assert_eq!(critic.call_count(), 3);
        assert_eq!(provider.close_count(), 1);
        assert_eq!(provider.actions.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn dedicated_actor_is_preferred_over_browse_agent() {
        let planner = ScriptedAgent::new("planner", State::Plan, plan_of(&[]))
            .queue(plan_of(&["open search"]));
        let nav = ScriptedAgent::new("browser_nav", State::Browse, click("#nav"));
        let actor = ScriptedAgent::new("actor", State::AgentQActor, click("#actor"));
        let critic = ScriptedAgent::new("critic", State::AgentQCritic, accepted());

        let registry = AgentRegistry::builder()
            .with(planner)
            .with(nav.clone())
            .with(actor.clone())
            .with(critic)
            .build(AgentMode::ActorCritic)
            .unwrap();

        let provider = MockProvider::new();
        let mut orchestrator = Orchestrator::new(
            Arc::new(registry),
            provider.clone(),
            default_vision(),
            fast_config(AgentMode::ActorCritic),
        );

        let result = orchestrator.execute_command("search for eggs".into()).await;

        assert!(result.success);
        assert_eq!(actor.call_count(), 1);
        assert_eq!(nav.call_count(), 0);
    }

    #[tokio::test]
    async fn rejection_exhaustion_triggers_replan_then_succeeds() {
        let planner = ScriptedAgent::new(
            "planner",
            State::Plan,
            plan_of(&["click the alternate submit"]),
        )
        .queue(plan_of(&["find the submit button"]));
        let nav = ScriptedAgent::new("browser_nav", State::Browse, click("#go"));
        let critic = ScriptedAgent::new("critic", State::AgentQCritic, accepted())
            .queue(rejected("nothing changed", Some("try the icon button")))
            .queue(rejected("still nothing", None));

        let registry = AgentRegistry::builder()
            .with(planner.clone())
            .with(nav.clone())
            .with(critic.clone())
            .build(AgentMode::ActorCritic)
            .unwrap();

        let provider = MockProvider::new();
        let mut orchestrator = Orchestrator::new(
            Arc::new(registry),
            provider.clone(),
            default_vision(),
            fast_config(AgentMode::ActorCritic),
        );

        let result = orchestrator.execute_command("search for eggs".into()).await;

        assert!(result.success, "failure: {:?}", result.failure);
        assert_eq!(result.replans, 1);
        assert_eq!(planner.call_count(), 2);

        // Abandoned plan's step keeps its failed record; rejections stayed
        // inside the per-step budget.
        assert_eq!(result.steps.len(), 2);
        let failed = &result.steps[0];
        assert_eq!(failed.status, StepStatus::Failed);
        assert_eq!(failed.attempts, 2);
        assert!(failed.last_error.as_deref().unwrap().contains("nothing"));
        assert_eq!(result.steps[1].status, StepStatus::Done);

        // The retry carried the critic's corrective guidance to the actor.
        let seen = nav.seen.lock().unwrap();
        assert_eq!(seen[1].guidance.as_deref(), Some("try the icon button"));
        assert_eq!(provider.close_count(), 1);
    }

    #[tokio::test]
    async fn replan_exhaustion_fails_the_run() {
        let planner = ScriptedAgent::new("planner", State::Plan, plan_of(&["submit the form"]));
        let nav = ScriptedAgent::new("browser_nav", State::Browse, click("#go"));
        let critic = ScriptedAgent::new(
            "critic",
            State::AgentQCritic,
            rejected("form never submitted", None),
        );

        let registry = AgentRegistry::builder()
            .with(planner)
            .with(nav)
            .with(critic.clone())
            .build(AgentMode::ActorCritic)
            .unwrap();

        let provider = MockProvider::new();
        let mut config = fast_config(AgentMode::ActorCritic);
        config.step_retry_budget = 2;
        config.replan_budget = 1;
        let mut orchestrator =
            Orchestrator::new(Arc::new(registry), provider.clone(), default_vision(), config);

        let result = orchestrator.execute_command("search for eggs".into()).await;

        assert!(!result.success);
        assert!(
            result
                .failure
                .as_deref()
                .unwrap()
                .contains("execution exhausted")
        );
        assert_eq!(result.replans, 1);
        // Two rejections per step per plan, two plans.
        assert_eq!(critic.call_count(), 4);
        assert_eq!(provider.close_count(), 1);
    }

    #[tokio::test]
    async fn empty_plan_is_planning_failure_without_browse() {
        let planner = ScriptedAgent::new("planner", State::Plan, plan_of(&[]));
        let nav = ScriptedAgent::new("browser_nav", State::Browse, click("#go"));
        let critic = ScriptedAgent::new("critic", State::AgentQCritic, accepted());

        let registry = AgentRegistry::builder()
            .with(planner)
            .with(nav.clone())
            .with(critic)
            .build(AgentMode::ActorCritic)
            .unwrap();

        let provider = MockProvider::new();
        let mut orchestrator = Orchestrator::new(
            Arc::new(registry),
            provider.clone(),
            default_vision(),
            fast_config(AgentMode::ActorCritic),
        );

        let result = orchestrator.execute_command("do nothing".into()).await;

        assert!(!result.success);
        assert!(result.failure.as_deref().unwrap().contains("planning failed"));
        assert_eq!(result.final_state, State::Plan);
        assert!(result.steps.is_empty());
        assert_eq!(nav.call_count(), 0);
        assert_eq!(provider.close_count(), 1);
    }

    #[tokio::test]
    async fn session_acquisition_failure_never_enters_plan() {
        let planner = ScriptedAgent::new("planner", State::Plan, plan_of(&["anything"]));
        let nav = ScriptedAgent::new("browser_nav", State::Browse, click("#go"));
        let critic = ScriptedAgent::new("critic", State::AgentQCritic, accepted());

        let registry = AgentRegistry::builder()
            .with(planner.clone())
            .with(nav)
            .with(critic)
            .build(AgentMode::ActorCritic)
            .unwrap();

        let provider = MockProvider::failing();
        let mut orchestrator = Orchestrator::new(
            Arc::new(registry),
            provider.clone(),
            default_vision(),
            fast_config(AgentMode::ActorCritic),
        );

        let result = orchestrator.execute_command("search for eggs".into()).await;

        assert!(!result.success);
        assert!(
            result
                .failure
                .as_deref()
                .unwrap()
                .contains("SessionInitError")
        );
        assert!(result.steps.is_empty());
        assert_eq!(planner.call_count(), 0);
        assert_eq!(provider.acquisitions.load(Ordering::SeqCst), 1);
        assert_eq!(provider.close_count(), 0);
    }

    #[tokio::test]
    async fn vision_timeouts_degrade_to_dom_only_context() {
        let planner = ScriptedAgent::new("planner", State::Plan, plan_of(&[]))
            .queue(plan_of(&["open search", "submit"]));
        let nav = ScriptedAgent::new("browser_nav", State::Browse, click("#go"));
        let critic = ScriptedAgent::new("critic", State::AgentQCritic, accepted());

        let registry = AgentRegistry::builder()
            .with(planner)
            .with(nav.clone())
            .with(critic)
            .build(AgentMode::ActorCritic)
            .unwrap();

        let vision_calls = Arc::new(AtomicUsize::new(0));
        let vision = Arc::new(SlowVision {
            delay: Duration::from_millis(200),
            calls: vision_calls.clone(),
        });

        let provider = MockProvider::new();
        let mut config = fast_config(AgentMode::ActorCritic);
        config.vision_timeout = Duration::from_millis(10);
        let mut orchestrator =
            Orchestrator::new(Arc::new(registry), provider.clone(), vision, config);

        let result = orchestrator.execute_command("search for eggs".into()).await;

        // The run completes despite every vision call timing out.
        assert!(result.success, "failure: {:?}", result.failure);
        assert!(vision_calls.load(Ordering::SeqCst) >= 1);
        let seen = nav.seen.lock().unwrap();
        assert!(
            seen.iter()
                .all(|ctx| ctx.snapshot.as_ref().unwrap().elements.is_empty())
        );
        assert_eq!(provider.close_count(), 1);
    }

    #[tokio::test]
    async fn unresponsive_page_is_rejected_without_consulting_the_critic() {
        let planner = ScriptedAgent::new("planner", State::Plan, plan_of(&["submit the form"]));
        let nav = ScriptedAgent::new("browser_nav", State::Browse, click("#go"));
        let critic = ScriptedAgent::new("critic", State::AgentQCritic, accepted());

        let registry = AgentRegistry::builder()
            .with(planner)
            .with(nav)
            .with(critic.clone())
            .build(AgentMode::ActorCritic)
            .unwrap();

        let provider = MockProvider::unresponsive(Duration::from_millis(200));
        let mut config = fast_config(AgentMode::ActorCritic);
        config.page_timeout = Duration::from_millis(20);
        config.replan_budget = 0;
        let mut orchestrator =
            Orchestrator::new(Arc::new(registry), provider.clone(), default_vision(), config);

        let result = orchestrator.execute_command("search for eggs".into()).await;

        assert!(!result.success);
        assert!(result.failure.as_deref().unwrap().contains("load state"));
        assert_eq!(critic.call_count(), 0);
        assert_eq!(provider.close_count(), 1);
    }

    #[tokio::test]
    async fn single_agent_mode_runs_without_a_critic() {
        let planner = ScriptedAgent::new("planner", State::Plan, plan_of(&[]))
            .queue(plan_of(&["open search", "submit"]));
        let base = ScriptedAgent::new("agentq_base", State::AgentQBase, click("#go"));

        let registry = AgentRegistry::builder()
            .with(planner)
            .with(base.clone())
            .build(AgentMode::SingleAgent)
            .unwrap();

        let provider = MockProvider::new();
        let mut orchestrator = Orchestrator::new(
            Arc::new(registry),
            provider.clone(),
            default_vision(),
            fast_config(AgentMode::SingleAgent),
        );

        let result = orchestrator.execute_command("search for eggs".into()).await;

        assert!(result.success, "failure: {:?}", result.failure);
        assert_eq!(base.call_count(), 2);
        assert_eq!(result.steps.len(), 2);
        assert_eq!(provider.close_count(), 1);
    }

    #[tokio::test]
    async fn wrong_response_variant_is_a_fatal_contract_violation() {
        let planner = ScriptedAgent::new("planner", State::Plan, plan_of(&[]))
            .queue(plan_of(&["open search"]));
        // Browse agent answers with a verdict instead of an action.
        let nav = ScriptedAgent::new("browser_nav", State::Browse, accepted());
        let critic = ScriptedAgent::new("critic", State::AgentQCritic, accepted());

        let registry = AgentRegistry::builder()
            .with(planner)
            .with(nav)
            .with(critic)
            .build(AgentMode::ActorCritic)
            .unwrap();

        let provider = MockProvider::new();
        let mut orchestrator = Orchestrator::new(
            Arc::new(registry),
            provider.clone(),
            default_vision(),
            fast_config(AgentMode::ActorCritic),
        );

        let result = orchestrator.execute_command("search for eggs".into()).await;

        assert!(!result.success);
        assert!(result.failure.as_deref().unwrap().contains("contract"));
        assert_eq!(provider.close_count(), 1);
    }

    #[tokio::test]
    async fn cancelled_run_still_releases_the_session_once() {
        let registry = AgentRegistry::builder()
            .with(Arc::new(HangingAgent))
            .with(ScriptedAgent::new("browser_nav", State::Browse, click("#go")))
            .with(ScriptedAgent::new("critic", State::AgentQCritic, accepted()))
            .build(AgentMode::ActorCritic)
            .unwrap();

        let provider = MockProvider::new();
        let mut orchestrator = Orchestrator::new(
            Arc::new(registry),
            provider.clone(),
            default_vision(),
            fast_config(AgentMode::ActorCritic),
        );

        orchestrator.start().await.unwrap();
        let cancelled = tokio::time::timeout(
            Duration::from_millis(20),
            orchestrator.execute_command("search for eggs".into()),
        )
        .await;
        assert!(cancelled.is_err());

        orchestrator.shutdown().await;
        assert_eq!(provider.close_count(), 1);

        // A second shutdown must not release again.
        orchestrator.shutdown().await;
        assert_eq!(provider.close_count(), 1);
    }

    #[tokio::test]
    async fn registry_rejects_incomplete_role_sets() {
        let planner = ScriptedAgent::new("planner", State::Plan, plan_of(&[]));
        let err = AgentRegistry::builder()
            .with(planner.clone())
            .build(AgentMode::ActorCritic)
            .err()
            .unwrap();
        assert!(matches!(err, Error::MissingAgent(_)));

        // The same single role is enough only with the base agent present.
        let err = AgentRegistry::builder()
            .with(planner)
            .build(AgentMode::SingleAgent)
            .err()
            .unwrap();
        assert!(matches!(err, Error::MissingAgent(State::AgentQBase)));
    }

    #[tokio::test]
    async fn vision_grounding_is_idempotent_and_fallback_is_stable() {
        let vision = FixedVision {
            elements: vec![element("search box")],
            calls: Arc::new(AtomicUsize::new(0)),
        };
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let image = vec![1u8, 2, 3];

        let first = vision.ground(&image, viewport).await.unwrap();
        let second = vision.ground(&image, viewport).await.unwrap();
        assert_eq!(first, second);

        let failing = FailingVision;
        let timeout = Duration::from_millis(50);
        let first = ground_or_empty(&failing, &image, viewport, timeout).await;
        let second = ground_or_empty(&failing, &image, viewport, timeout).await;
        assert!(first.is_empty());
        assert_eq!(first, second);
    }
}
