use std::{collections::HashMap, sync::Arc};

use tracing::info;

use crate::{
    agent::{
        core::AgentRole,
        types::{AgentMode, State},
    },
    error::{Error, Result},
};

/// Immutable mapping from state to the agent serving it. Built once at
/// startup and shared read-only across runs; no transition may ever target
/// an unmapped state, which `build` enforces for the chosen mode.
pub struct AgentRegistry {
    agents: HashMap<State, Arc<dyn AgentRole>>,
}

impl AgentRegistry {
    pub fn builder() -> AgentRegistryBuilder {
        AgentRegistryBuilder::default()
    }

    pub fn get(&self, state: State) -> Result<Arc<dyn AgentRole>> {
        self.agents
            .get(&state)
            .cloned()
            .ok_or(Error::MissingAgent(state))
    }

    pub fn contains(&self, state: State) -> bool {
        self.agents.contains_key(&state)
    }

    /// The states every registry must cover to run in `mode`.
    pub fn required_states(mode: AgentMode) -> &'static [State] {
        match mode {
            AgentMode::ActorCritic => &[State::Plan, State::Browse, State::AgentQCritic],
            AgentMode::SingleAgent => &[State::Plan, State::AgentQBase],
        }
    }
}

#[derive(Default)]
pub struct AgentRegistryBuilder {
    agents: HashMap<State, Arc<dyn AgentRole>>,
}

impl AgentRegistryBuilder {
    /// Register `agent` under its own declared state.
    pub fn with(mut self, agent: Arc<dyn AgentRole>) -> Self {
        self.agents.insert(agent.state(), agent);
        self
    }

    pub fn build(self, mode: AgentMode) -> Result<AgentRegistry> {
        for state in AgentRegistry::required_states(mode) {
            if !self.agents.contains_key(state) {
                return Err(Error::MissingAgent(*state));
            }
        }
        info!(
            "agent registry built with {} role(s) for {:?} mode",
            self.agents.len(),
            mode
        );
        Ok(AgentRegistry {
            agents: self.agents,
        })
    }
}
