//! # Shared Fixtures
//!
//! A toy endpoint that hosts activities. Each activity is addressed by a
//! scope token and moves through a small lifecycle; items notify it of
//! changes and the final-state request moves it to its next lifecycle state.

use serde::{Deserialize, Serialize};
use shared_types::ScopeToken;
use std::collections::HashMap;
use txn_envelope::{
    FinalStateRequest, ItemError, ItemRegistry, TargetState, TransactionDispatcher,
    TransactionItem, WireItem,
};

/// Lifecycle an activity can be driven into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityState {
    Created,
    Resumed,
    Paused,
    Destroyed,
}

impl ActivityState {
    pub fn code(self) -> TargetState {
        TargetState(self as u32)
    }
}

/// One recorded call, in the order the endpoint saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEvent {
    pub call: String,
    pub scope: Option<ScopeToken>,
}

/// Effects the items are allowed to have on the endpoint.
pub trait ActivityHandler: Send {
    fn record(&mut self, call: String, scope: Option<&ScopeToken>);
    fn set_density(&mut self, scope: Option<&ScopeToken>, density: u32);
    fn move_to(&mut self, scope: Option<&ScopeToken>, state: ActivityState) -> Result<(), ItemError>;
    fn state_of(&self, scope: Option<&ScopeToken>) -> Option<ActivityState>;
    fn density_of(&self, scope: Option<&ScopeToken>) -> Option<u32>;
    fn journal(&self) -> &[HostEvent];
}

/// In-memory endpoint: one record per scope, `None` is the endpoint itself.
#[derive(Debug, Default)]
pub struct ActivityHost {
    states: HashMap<Option<ScopeToken>, ActivityState>,
    densities: HashMap<Option<ScopeToken>, u32>,
    journal: Vec<HostEvent>,
}

impl ActivityHandler for ActivityHost {
    fn record(&mut self, call: String, scope: Option<&ScopeToken>) {
        self.journal.push(HostEvent {
            call,
            scope: scope.copied(),
        });
    }

    fn set_density(&mut self, scope: Option<&ScopeToken>, density: u32) {
        self.densities.insert(scope.copied(), density);
    }

    fn move_to(&mut self, scope: Option<&ScopeToken>, state: ActivityState) -> Result<(), ItemError> {
        let current = self.states.get(&scope.copied()).copied();
        if current == Some(ActivityState::Destroyed) {
            return Err(ItemError::Precondition(format!(
                "activity is destroyed, cannot move to {state:?}"
            )));
        }
        self.states.insert(scope.copied(), state);
        Ok(())
    }

    fn state_of(&self, scope: Option<&ScopeToken>) -> Option<ActivityState> {
        self.states.get(&scope.copied()).copied()
    }

    fn density_of(&self, scope: Option<&ScopeToken>) -> Option<u32> {
        self.densities.get(&scope.copied()).copied()
    }

    fn journal(&self) -> &[HostEvent] {
        &self.journal
    }
}

// =============================================================================
// ITEMS
// =============================================================================

/// Display configuration changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationChanged {
    pub label: String,
    pub density: u32,
}

impl WireItem for ConfigurationChanged {
    const TAG: &'static str = "activity.configuration_changed";
}

impl<H: ActivityHandler + ?Sized> TransactionItem<H> for ConfigurationChanged {
    fn prepare(&self, host: &mut H, scope: Option<&ScopeToken>) -> Result<(), ItemError> {
        host.record(format!("{}.prepare", self.label), scope);
        if self.density == 0 {
            return Err(ItemError::Precondition("density must be positive".into()));
        }
        Ok(())
    }

    fn execute(&self, host: &mut H, scope: Option<&ScopeToken>) -> Result<(), ItemError> {
        host.record(format!("{}.execute", self.label), scope);
        host.set_density(scope, self.density);
        Ok(())
    }
}

/// A new request was routed to the activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIntent {
    pub label: String,
    pub action: String,
}

impl WireItem for NewIntent {
    const TAG: &'static str = "activity.new_intent";
}

impl<H: ActivityHandler + ?Sized> TransactionItem<H> for NewIntent {
    fn prepare(&self, host: &mut H, scope: Option<&ScopeToken>) -> Result<(), ItemError> {
        host.record(format!("{}.prepare", self.label), scope);
        Ok(())
    }

    fn execute(&self, host: &mut H, scope: Option<&ScopeToken>) -> Result<(), ItemError> {
        host.record(format!("{}.execute", self.label), scope);
        Ok(())
    }
}

/// Drive the activity into `state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleRequest {
    pub label: String,
    pub state: ActivityState,
}

impl WireItem for LifecycleRequest {
    const TAG: &'static str = "activity.lifecycle";
}

impl<H: ActivityHandler + ?Sized> TransactionItem<H> for LifecycleRequest {
    fn prepare(&self, host: &mut H, scope: Option<&ScopeToken>) -> Result<(), ItemError> {
        host.record(format!("{}.prepare", self.label), scope);
        Ok(())
    }

    fn execute(&self, host: &mut H, scope: Option<&ScopeToken>) -> Result<(), ItemError> {
        host.record(format!("{}.execute", self.label), scope);
        host.move_to(scope, self.state)
    }
}

impl<H: ActivityHandler + ?Sized> FinalStateRequest<H> for LifecycleRequest {
    fn target_state(&self) -> TargetState {
        self.state.code()
    }
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

pub fn configuration(label: &str, density: u32) -> ConfigurationChanged {
    ConfigurationChanged {
        label: label.to_string(),
        density,
    }
}

pub fn intent(label: &str, action: &str) -> NewIntent {
    NewIntent {
        label: label.to_string(),
        action: action.to_string(),
    }
}

pub fn lifecycle(label: &str, state: ActivityState) -> LifecycleRequest {
    LifecycleRequest {
        label: label.to_string(),
        state,
    }
}

/// Registry that knows every activity item kind.
pub fn activity_registry() -> anyhow::Result<ItemRegistry<dyn ActivityHandler>> {
    let mut registry = ItemRegistry::<dyn ActivityHandler>::new();
    registry
        .register_item::<ConfigurationChanged>()?
        .register_item::<NewIntent>()?
        .register_final_state::<LifecycleRequest>()?;
    Ok(registry)
}

/// Dispatcher over a fresh `ActivityHost`.
pub fn activity_dispatcher() -> anyhow::Result<TransactionDispatcher<dyn ActivityHandler>> {
    Ok(TransactionDispatcher::new(
        activity_registry()?,
        Box::new(ActivityHost::default()),
    ))
}

/// Calls in the journal, without scopes.
pub fn calls(host: &dyn ActivityHandler) -> Vec<&str> {
    host.journal().iter().map(|e| e.call.as_str()).collect()
}
