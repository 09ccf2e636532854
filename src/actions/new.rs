//! `new`: create an empty project.
use super::{Action, ActionRequest, METADATA_OPT, PROJECT_OPT};
use crate::dispatch::options::OptSpec;
use crate::model::{MetaValue, Project, ProjectType};
use anyhow::Result;

pub struct New;

impl Action for New {
    fn name(&self) -> &'static str {
        "new"
    }

    fn description(&self) -> &'static str {
        "Create an empty project"
    }

    fn options(&self) -> Vec<OptSpec> {
        vec![
            PROJECT_OPT,
            OptSpec::value("type", "type", "Type of project").short('t').value_name("TYPE"),
            OptSpec::value("name", "name", "Project name (defaults to the directory name)"),
            OptSpec::value("description", "description", "Project description"),
            METADATA_OPT,
        ]
    }

    fn required(&self) -> &'static [(&'static str, &'static str)] {
        &[("project", "-P"), ("type", "-t")]
    }

    fn perform(&self, request: &ActionRequest<'_>) -> Result<()> {
        let params = request.params;
        let root = params.path("project").unwrap_or_default();
        let project_type: ProjectType = params.text("type").unwrap_or_default().parse()?;

        let mut extra = Vec::new();
        for key in ["name", "description"] {
            if let Some(value) = params.text(key) {
                extra.push((key.to_string(), MetaValue::from(value)));
            }
        }
        extra.extend(request.metadata_pairs()?);

        request.reporter.say(format!("Creating project: {}", root.display()));
        let project = Project::create(&root, project_type, &extra)?;
        request
            .reporter
            .say(format!("Project created: {}", project.root().display()));
        Ok(())
    }
}
