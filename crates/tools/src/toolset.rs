use std::sync::Arc;

use agentrt_domain::Result;

use crate::tool::Tool;

/// Opaque context handle passed to a [`Toolset`]'s lifecycle hooks. A
/// real deployment would carry a workspace path, credentials, or a
/// shared client pool here; this runtime only needs a name for trace
/// and log correlation.
pub struct ToolsetContext {
    pub run_id: String,
}

/// A named bundle of tools with optional setup/teardown around a run.
/// Setup runs in registration order; teardown runs in reverse order and
/// a failing teardown is logged, not propagated, so one broken toolset
/// cannot prevent the others from cleaning up.
pub struct Toolset {
    pub name: String,
    tools: Vec<Arc<dyn Tool>>,
    setup_fn: Option<Box<dyn Fn(&ToolsetContext) -> Result<()> + Send + Sync>>,
    teardown_fn: Option<Box<dyn Fn(&ToolsetContext) -> Result<()> + Send + Sync>>,
}

impl Toolset {
    pub fn new(name: impl Into<String>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { name: name.into(), tools, setup_fn: None, teardown_fn: None }
    }

    pub fn with_setup(mut self, f: impl Fn(&ToolsetContext) -> Result<()> + Send + Sync + 'static) -> Self {
        self.setup_fn = Some(Box::new(f));
        self
    }

    pub fn with_teardown(mut self, f: impl Fn(&ToolsetContext) -> Result<()> + Send + Sync + 'static) -> Self {
        self.teardown_fn = Some(Box::new(f));
        self
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    fn setup(&self, ctx: &ToolsetContext) -> Result<()> {
        match &self.setup_fn {
            Some(f) => f(ctx),
            None => Ok(()),
        }
    }

    fn teardown(&self, ctx: &ToolsetContext) -> Result<()> {
        match &self.teardown_fn {
            Some(f) => f(ctx),
            None => Ok(()),
        }
    }
}

/// Runs `setup` across `toolsets` in order, stopping and returning the
/// first error. The caller is responsible for calling
/// [`teardown_all`] on whatever subset of toolsets already started,
/// which this function does not track — see [`ToolsetLifecycle`] for the
/// tracked variant used by the engine.
pub fn setup_all(toolsets: &[Toolset], ctx: &ToolsetContext) -> Result<()> {
    for toolset in toolsets {
        toolset.setup(ctx)?;
    }
    Ok(())
}

/// Tears down `toolsets` in reverse order, logging (not propagating)
/// each individual failure so every toolset gets a chance to clean up.
pub fn teardown_all(toolsets: &[Toolset], ctx: &ToolsetContext) {
    for toolset in toolsets.iter().rev() {
        if let Err(err) = toolset.teardown(ctx) {
            tracing::warn!(toolset = %toolset.name, error = %err, "toolset teardown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    fn empty_toolset(name: &str, log: Arc<Mutex<Vec<String>>>, fail_teardown: bool) -> Toolset {
        let setup_log = log.clone();
        let setup_name = name.to_string();
        let teardown_log = log.clone();
        let teardown_name = name.to_string();
        Toolset::new(name, vec![])
            .with_setup(move |_| {
                setup_log.lock().push(format!("setup:{setup_name}"));
                Ok(())
            })
            .with_teardown(move |_| {
                teardown_log.lock().push(format!("teardown:{teardown_name}"));
                if fail_teardown {
                    Err(agentrt_domain::Error::Other("boom".into()))
                } else {
                    Ok(())
                }
            })
    }

    #[test]
    fn setup_runs_in_order_teardown_runs_in_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let toolsets = vec![empty_toolset("a", log.clone(), false), empty_toolset("b", log.clone(), false)];
        let ctx = ToolsetContext { run_id: "r1".into() };
        setup_all(&toolsets, &ctx).unwrap();
        teardown_all(&toolsets, &ctx);
        assert_eq!(*log.lock(), vec!["setup:a", "setup:b", "teardown:b", "teardown:a"]);
    }

    #[test]
    fn failing_teardown_does_not_block_the_others() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let toolsets = vec![empty_toolset("a", log.clone(), true), empty_toolset("b", log.clone(), false)];
        let ctx = ToolsetContext { run_id: "r1".into() };
        teardown_all(&toolsets, &ctx);
        assert_eq!(*log.lock(), vec!["teardown:b", "teardown:a"]);
    }
}
