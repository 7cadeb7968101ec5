use agentrt_domain::{ActionResult, Decision, State};

/// The four hooks the engine calls once per step, in this order:
/// `system_prompt` (at message-build time), `observe`, `prepare`, then
/// `reduce` after the decision has been dispatched.
///
/// An `Agent` never touches `state.current_step` or `state.stop_reason`
/// directly — those are engine-owned per §4.1's consolidation note.
/// `reduce` gets `&mut State` only to set `metadata` or call
/// `set_final_result`/`set_stop_reason` for a custom termination signal;
/// the engine still applies its own post-dispatch bookkeeping afterward.
pub trait Agent: Send + Sync {
    /// The system prompt for this step, if any. `{{tool_schema}}` in the
    /// returned text is replaced by the tool registry's formatted
    /// descriptions before the message is sent.
    fn system_prompt(&self, _state: &State) -> Option<String> {
        None
    }

    /// Produce this step's observation (a JSON-serializable mapping) from
    /// the current state. Called before the user prompt is prepared.
    fn observe(&mut self, state: &State) -> serde_json::Value;

    /// Render the current user-turn prompt text from the state and this
    /// step's observation.
    fn prepare(&mut self, state: &State, observation: &serde_json::Value) -> String;

    /// Fold this step's observation, decision, and action results back
    /// into state. Called unconditionally after dispatch, even when the
    /// decision was `final`.
    fn reduce(&mut self, state: &mut State, observation: &serde_json::Value, decision: &Decision, action_results: &[ActionResult]);
}
