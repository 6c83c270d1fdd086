//! Mutation pipeline: a fixed linear sequence of dependent writes.
//!
//! Stage N+1 starts only after stage N returned success. The first failure
//! halts the run; later stages are never attempted. There is no checkpoint of
//! committed stages, so running the pipeline again re-issues every stage from
//! the start, including those that already succeeded last time.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::graphql::GraphqlError;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StageError(pub String);

impl From<GraphqlError> for StageError {
    fn from(value: GraphqlError) -> Self {
        Self(value.to_string())
    }
}

/// One write operation. Stages read their inputs from, and record their
/// results into, the shared context `C`.
#[async_trait]
pub trait Stage<C: Send>: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, ctx: &mut C) -> Result<(), StageError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub completed: Vec<&'static str>,
}

#[derive(Debug, Error)]
#[error("stage {stage} failed after {completed:?}: {reason}")]
pub struct PipelineFailure {
    pub stage: &'static str,
    pub completed: Vec<&'static str>,
    pub reason: String,
}

pub struct MutationPipeline<C> {
    name: &'static str,
    stages: Vec<Box<dyn Stage<C>>>,
}

impl<C: Send> MutationPipeline<C> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            stages: Vec::new(),
        }
    }

    pub fn then(mut self, stage: impl Stage<C> + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub async fn run(&self, ctx: &mut C) -> Result<PipelineReport, PipelineFailure> {
        let mut completed = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            if let Err(e) = stage.run(ctx).await {
                warn!(
                    "pipeline {} halted at {} (completed: {:?}): {}",
                    self.name,
                    stage.name(),
                    completed,
                    e
                );
                return Err(PipelineFailure {
                    stage: stage.name(),
                    completed,
                    reason: e.0,
                });
            }
            completed.push(stage.name());
        }

        info!("pipeline {} completed {:?}", self.name, completed);
        Ok(PipelineReport { completed })
    }
}

/// Busy state that disables re-submission while a pipeline is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyFlag(bool);

impl BusyFlag {
    /// Returns `false` if already busy.
    pub fn begin(&mut self) -> bool {
        if self.0 {
            return false;
        }
        self.0 = true;
        true
    }

    pub fn clear(&mut self) {
        self.0 = false;
    }

    pub fn is_busy(&self) -> bool {
        self.0
    }
}
