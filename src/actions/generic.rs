//! `generic`: list the available tasks, or describe one.
use super::{registry, Action, ActionRequest};
use crate::dispatch::{find_action, resolve_alias, ALIASES};
use crate::error::PipelineError;
use anyhow::Result;

pub struct Generic;

impl Action for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn description(&self) -> &'static str {
        "List available tasks, or describe TASK"
    }

    fn expects_operation(&self) -> bool {
        true
    }

    fn perform(&self, request: &ActionRequest<'_>) -> Result<()> {
        print!("{}", render(request.params.operation())?);
        Ok(())
    }
}

pub fn render(task: Option<&str>) -> Result<String> {
    let mut out = String::new();
    match task {
        Some(task) => {
            let action = find_action(registry(), resolve_alias(task)).ok_or_else(|| {
                PipelineError::NoAction {
                    task: task.to_string(),
                }
            })?;
            out.push_str(&format!("{}: {}\n", action.name(), action.description()));
            out.push_str(&format!("Run `genoflow {} --help` for options.\n", action.name()));
        }
        None => {
            out.push_str("genoflow <task> [operation] [options] [FILES...]\n\nTasks:\n");
            let width = registry()
                .iter()
                .map(|action| action.name().len())
                .max()
                .unwrap_or(0);
            for action in registry() {
                out.push_str(&format!(
                    "  {:<width$}  {}\n",
                    action.name(),
                    action.description()
                ));
            }
            out.push_str("\nAliases:\n");
            for (alias, canonical) in ALIASES {
                out.push_str(&format!("  {alias} -> {canonical}\n"));
            }
        }
    }
    Ok(out)
}
