//! The runtime: deployment-plan validation, channel lifecycle, and
//! barrier-synchronized stepped execution.

use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;
use tracing::instrument;

use crate::channels::{ChannelEndpoint, FlumeEndpoint};
use crate::process::{ProcessModel, StepOutcome};
use crate::types::{DType, Shape};
use crate::runtimes::plan::{Executable, NodeConfig};
use crate::runtimes::run_condition::RunCondition;
use crate::runtimes::runtime_config::RuntimeConfig;

/// Lifecycle phase of a runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuntimePhase {
    Created,
    Initialized,
    Running,
    Stopped,
}

impl fmt::Display for RuntimePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimePhase::Created => write!(f, "created"),
            RuntimePhase::Initialized => write!(f, "initialized"),
            RuntimePhase::Running => write!(f, "running"),
            RuntimePhase::Stopped => write!(f, "stopped"),
        }
    }
}

/// Failures on the runtime plane.
#[derive(Debug, Error, Diagnostic)]
pub enum RuntimeError {
    #[error("invalid deployment plan: {detail}")]
    #[diagnostic(
        code(procmesh::runtime::invalid_deployment_plan),
        help("a runnable executable holds exactly one NodeConfig with exactly one Node")
    )]
    InvalidDeploymentPlan { detail: String },

    #[error("runtime is {actual}, expected {expected}")]
    #[diagnostic(code(procmesh::runtime::phase))]
    Phase {
        expected: RuntimePhase,
        actual: RuntimePhase,
    },

    #[error("process `{model}` terminated abnormally at step {step}: {detail}")]
    #[diagnostic(code(procmesh::runtime::abnormal_termination))]
    Abnormal {
        model: String,
        step: u64,
        detail: String,
    },

    #[error("instance task join error: {0}")]
    #[diagnostic(code(procmesh::runtime::join))]
    Join(#[from] tokio::task::JoinError),
}

/// Summary of a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Fully barriered steps executed.
    pub steps: u64,
    /// Whether every instance halted before the run condition fired.
    pub halted_early: bool,
}

enum Command {
    Step(u64),
    Halt,
}

enum Ack {
    Done,
    Halted,
    Failed { detail: String },
}

struct Worker {
    kind: &'static str,
    cmd_tx: flume::Sender<Command>,
    ack_rx: flume::Receiver<Ack>,
    handle: tokio::task::JoinHandle<Box<dyn ProcessModel>>,
    active: bool,
}

/// Drives built process instances under a run condition.
///
/// Phases move `Created → Initialized → Running → Stopped`. `initialize()`
/// validates the deployment plan and starts every registered endpoint;
/// `run()` steps all instances with a barrier between steps, then stops and
/// drains the endpoints.
pub struct Runtime {
    executable: Executable,
    run_condition: Box<dyn RunCondition>,
    config: RuntimeConfig,
    phase: RuntimePhase,
    instances: Vec<Box<dyn ProcessModel>>,
    endpoints: Vec<Arc<dyn ChannelEndpoint>>,
}

impl Runtime {
    pub fn new(executable: Executable, run_condition: impl RunCondition + 'static) -> Self {
        Self::with_config(executable, run_condition, RuntimeConfig::default())
    }

    pub fn with_config(
        executable: Executable,
        run_condition: impl RunCondition + 'static,
        config: RuntimeConfig,
    ) -> Self {
        Runtime {
            executable,
            run_condition: Box::new(run_condition),
            config,
            phase: RuntimePhase::Created,
            instances: Vec::new(),
            endpoints: Vec::new(),
        }
    }

    pub fn phase(&self) -> RuntimePhase {
        self.phase
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Hand a built instance to the runtime.
    pub fn register_instance(&mut self, model: Box<dyn ProcessModel>) {
        self.instances.push(model);
    }

    /// Register an endpoint whose lifecycle this runtime owns.
    pub fn register_endpoint(&mut self, endpoint: Arc<dyn ChannelEndpoint>) {
        self.endpoints.push(endpoint);
    }

    /// Allocate both ends of a channel link with the configured capacity and
    /// take ownership of their lifecycle. The returned ends are handed to
    /// the builders of the two processes being wired together.
    pub fn allocate_endpoint_pair(
        &mut self,
        a_name: impl Into<String>,
        b_name: impl Into<String>,
        shape: Shape,
        dtype: DType,
    ) -> (Arc<FlumeEndpoint>, Arc<FlumeEndpoint>) {
        let (a, b) = FlumeEndpoint::pair(a_name, b_name, shape, dtype, self.config.channel_capacity);
        self.register_endpoint(Arc::clone(&a) as Arc<dyn ChannelEndpoint>);
        self.register_endpoint(Arc::clone(&b) as Arc<dyn ChannelEndpoint>);
        (a, b)
    }

    /// Instances currently held by the runtime (all of them before `run`,
    /// the joined survivors after).
    pub fn instances(&self) -> &[Box<dyn ProcessModel>] {
        &self.instances
    }

    /// Take the held instances back, e.g. to inspect final state after a
    /// run.
    pub fn take_instances(&mut self) -> Vec<Box<dyn ProcessModel>> {
        std::mem::take(&mut self.instances)
    }

    fn validate_plan(&self) -> Result<&NodeConfig, RuntimeError> {
        match self.executable.node_configs() {
            [config] => {
                if config.len() == 1 {
                    Ok(config)
                } else {
                    Err(RuntimeError::InvalidDeploymentPlan {
                        detail: format!(
                            "selected NodeConfig holds {} nodes; this runtime deploys to exactly one",
                            config.len()
                        ),
                    })
                }
            }
            configs => Err(RuntimeError::InvalidDeploymentPlan {
                detail: format!(
                    "executable holds {} node configs, expected exactly one",
                    configs.len()
                ),
            }),
        }
    }

    /// Validate the deployment plan and start every registered endpoint.
    ///
    /// The plan is recounted on every call, so an executable or config
    /// mutated after an earlier validation is rejected here. Failure leaves
    /// endpoint state untouched.
    #[instrument(skip(self), err)]
    pub fn initialize(&mut self) -> Result<(), RuntimeError> {
        if self.phase != RuntimePhase::Created {
            return Err(RuntimeError::Phase {
                expected: RuntimePhase::Created,
                actual: self.phase,
            });
        }
        let config = self.validate_plan()?;
        tracing::info!(
            nodes = config.len(),
            instances = self.instances.len(),
            endpoints = self.endpoints.len(),
            "deployment plan validated"
        );
        for endpoint in &self.endpoints {
            endpoint.start();
        }
        self.phase = RuntimePhase::Initialized;
        Ok(())
    }

    /// Step every instance until the run condition fires or all instances
    /// halt, with a barrier between steps: step `n + 1` is not issued until
    /// every active instance has acknowledged step `n`.
    ///
    /// Shutdown stops every endpoint, so any instance still blocked in a
    /// channel operation observes end of stream instead of hanging. A
    /// graceful per-instance halt is not an error; an abnormal one is
    /// surfaced after cleanup.
    #[instrument(skip(self), err)]
    pub async fn run(&mut self) -> Result<RunReport, RuntimeError> {
        if self.phase != RuntimePhase::Initialized {
            return Err(RuntimeError::Phase {
                expected: RuntimePhase::Initialized,
                actual: self.phase,
            });
        }
        self.phase = RuntimePhase::Running;
        tracing::info!(instances = self.instances.len(), "run started");

        let mut workers: Vec<Worker> = self.instances.drain(..).map(spawn_worker).collect();
        let mut completed_steps: u64 = 0;
        let mut failure: Option<RuntimeError> = None;

        while failure.is_none()
            && workers.iter().any(|w| w.active)
            && !self.run_condition.should_stop(completed_steps)
        {
            let step = completed_steps + 1;
            for worker in workers.iter().filter(|w| w.active) {
                if worker.cmd_tx.send_async(Command::Step(step)).await.is_err() {
                    failure = Some(RuntimeError::Abnormal {
                        model: worker.kind.to_string(),
                        step,
                        detail: "instance task ended before the step command".to_string(),
                    });
                }
            }
            if failure.is_some() {
                break;
            }
            for worker in workers.iter_mut().filter(|w| w.active) {
                match worker.ack_rx.recv_async().await {
                    Ok(Ack::Done) => {}
                    Ok(Ack::Halted) => {
                        tracing::info!(model = worker.kind, step, "instance halted gracefully");
                        worker.active = false;
                    }
                    Ok(Ack::Failed { detail }) => {
                        worker.active = false;
                        failure = Some(RuntimeError::Abnormal {
                            model: worker.kind.to_string(),
                            step,
                            detail,
                        });
                    }
                    Err(_) => {
                        worker.active = false;
                        failure = Some(RuntimeError::Abnormal {
                            model: worker.kind.to_string(),
                            step,
                            detail: "instance task ended without acknowledging the step"
                                .to_string(),
                        });
                    }
                }
            }
            completed_steps = step;
            tracing::debug!(step, "barrier released");
        }

        let halted_early = workers.iter().all(|w| !w.active);

        for worker in workers.iter().filter(|w| w.active) {
            let _ = worker.cmd_tx.send_async(Command::Halt).await;
        }
        for endpoint in &self.endpoints {
            endpoint.stop();
        }
        for worker in workers {
            match worker.handle.await {
                Ok(model) => self.instances.push(model),
                Err(err) => {
                    if failure.is_none() {
                        failure = Some(RuntimeError::Join(err));
                    }
                }
            }
        }
        self.phase = RuntimePhase::Stopped;
        tracing::info!(steps = completed_steps, "run stopped");

        match failure {
            Some(err) => Err(err),
            None => Ok(RunReport {
                steps: completed_steps,
                halted_early,
            }),
        }
    }
}

fn spawn_worker(model: Box<dyn ProcessModel>) -> Worker {
    let (cmd_tx, cmd_rx) = flume::bounded(1);
    let (ack_tx, ack_rx) = flume::bounded(1);
    let kind = model.kind();
    let handle = tokio::spawn(drive_instance(model, cmd_rx, ack_tx));
    Worker {
        kind,
        cmd_tx,
        ack_rx,
        handle,
        active: true,
    }
}

/// Per-instance task: execute step commands, acknowledge each one, and hand
/// the model back on exit.
async fn drive_instance(
    mut model: Box<dyn ProcessModel>,
    cmd_rx: flume::Receiver<Command>,
    ack_tx: flume::Sender<Ack>,
) -> Box<dyn ProcessModel> {
    while let Ok(command) = cmd_rx.recv_async().await {
        match command {
            Command::Halt => break,
            Command::Step(step) => {
                let ack = match model.run_step(step).await {
                    Ok(StepOutcome::Completed) => Ack::Done,
                    Ok(StepOutcome::EndOfStream) => Ack::Halted,
                    Err(err) => Ack::Failed {
                        detail: err.to_string(),
                    },
                };
                let leaving = !matches!(ack, Ack::Done);
                if ack_tx.send_async(ack).await.is_err() || leaving {
                    break;
                }
            }
        }
    }
    model
}
