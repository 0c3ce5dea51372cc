use crate::domain::model::{WorkflowContext, WorkflowReport};
use crate::domain::ports::Workflow;
use crate::utils::error::Result;
use chrono::Utc;
use std::time::Instant;

/// Runs one workflow and times it.
pub struct WorkflowEngine<W: Workflow> {
    workflow: W,
}

impl<W: Workflow> WorkflowEngine<W> {
    pub fn new(workflow: W) -> Self {
        Self { workflow }
    }

    pub async fn run(&self) -> Result<WorkflowReport> {
        let started_at = Utc::now();
        let run_id = format!("run_{}", started_at.format("%Y%m%d_%H%M%S"));
        let name = self.workflow.name().to_string();

        println!("Starting {} workflow ({})...", name, run_id);
        tracing::info!("▶️ {} started as {}", name, run_id);

        let timer = Instant::now();
        let mut context = WorkflowContext::new(run_id.clone());
        let outcome = self.workflow.run(&mut context).await;
        let duration = timer.elapsed();

        if let Err(e) = outcome {
            tracing::error!(
                "❌ {} failed after {} completed step(s): {}",
                name,
                context.completed_steps.len(),
                e
            );
            return Err(e);
        }

        println!(
            "{} workflow finished in {:.1}s ({} steps, {} warnings)",
            name,
            duration.as_secs_f64(),
            context.completed_steps.len(),
            context.warnings.len()
        );
        tracing::info!("✅ {} finished", name);

        Ok(WorkflowReport {
            workflow: name,
            run_id,
            started_at,
            duration,
            completed_steps: context.completed_steps,
            warnings: context.warnings,
        })
    }
}
