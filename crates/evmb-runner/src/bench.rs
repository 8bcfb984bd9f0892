//! Deploy-then-call benchmark loop
//!
//! All execution happens on threads sized by [`EXECUTION_STACK_SIZE`] so a
//! contract recursing to the call depth limit cannot overflow the stack.

use crate::config::{HostPolicy, RunnerConfig};
use crate::error::{RunnerError, RunnerResult};
use bytes::Bytes;
use evmb_host::{MockedHost, EXECUTION_STACK_SIZE};
use evmb_interpreter::{AnalyzedCode, Host, Message};
use std::thread::{self, Builder};
use std::time::Instant;
use tracing::{debug, info, trace};

/// A deployed contract ready to be called repeatedly
pub struct Benchmark {
    host: MockedHost,
    runtime: AnalyzedCode,
    message: Message,
    policy: HostPolicy,
    jobs: usize,
    output: Bytes,
}

impl Benchmark {
    /// Deploy `creation_code` and prepare the call message.
    ///
    /// Any non-success deployment is an error.
    pub fn deploy(config: &RunnerConfig, creation_code: Bytes, calldata: Bytes) -> RunnerResult<Self> {
        let (host, result) = on_execution_stack(move || {
            let mut host = MockedHost::new();
            let result = host.deploy(config.caller, config.contract, creation_code, config.gas_limit);
            Ok((host, result))
        })?;
        if !result.is_success() {
            return Err(RunnerError::DeployFailed(result.status));
        }
        let address = result.create_address.ok_or(RunnerError::NoCreatedAccount)?;

        let runtime = AnalyzedCode::analyze(host.get_code(&address));
        info!(
            %address,
            runtime_len = runtime.len(),
            gas_used = result.gas_used(config.gas_limit),
            "contract deployed"
        );

        Ok(Self {
            host,
            runtime,
            message: Message::call(config.caller, address, calldata, config.gas_limit),
            policy: config.host_policy,
            jobs: config.jobs,
            output: Bytes::new(),
        })
    }

    /// Host state after deployment and any shared runs
    pub fn host(&self) -> &MockedHost {
        &self.host
    }

    /// Return data of the last run
    pub fn output(&self) -> &Bytes {
        &self.output
    }

    /// Run the contract `num_runs` times and return each run's duration in
    /// milliseconds, in run order
    pub fn run(&mut self, num_runs: usize) -> RunnerResult<Vec<f64>> {
        debug!(num_runs, policy = ?self.policy, jobs = self.jobs, "starting runs");
        let runs = match self.policy {
            HostPolicy::Fresh if self.jobs > 1 => self.run_parallel(num_runs)?,
            _ => self.run_serial(num_runs)?,
        };
        if let Some((_, output)) = runs.last() {
            self.output = output.clone();
        }
        Ok(runs.into_iter().map(|(ms, _)| ms).collect())
    }

    /// Runs on one execution thread, against the deployed host itself when
    /// the policy is shared
    fn run_serial(&mut self, num_runs: usize) -> RunnerResult<Vec<(f64, Bytes)>> {
        let shared = matches!(self.policy, HostPolicy::Shared);
        let Self {
            host,
            runtime,
            message,
            ..
        } = self;
        on_execution_stack(move || {
            (0..num_runs)
                .map(|run| {
                    if shared {
                        run_once(host, message, runtime, run)
                    } else {
                        run_once(&mut host.clone(), message, runtime, run)
                    }
                })
                .collect()
        })
    }

    /// Fresh-host runs spread round-robin over scoped worker threads
    fn run_parallel(&self, num_runs: usize) -> RunnerResult<Vec<(f64, Bytes)>> {
        let jobs = self.jobs.min(num_runs.max(1));
        let mut samples = vec![(0.0, Bytes::new()); num_runs];

        let batches = thread::scope(|scope| {
            let handles = (0..jobs)
                .map(|worker| {
                    execution_thread(format!("evmb-worker-{worker}"))
                        .spawn_scoped(scope, move || {
                            (worker..num_runs)
                                .step_by(jobs)
                                .map(|run| {
                                    let mut host = self.host.clone();
                                    run_once(&mut host, &self.message, &self.runtime, run)
                                        .map(|sample| (run, sample))
                                })
                                .collect::<RunnerResult<Vec<_>>>()
                        })
                        .map_err(RunnerError::ThreadSpawn)
                })
                .collect::<RunnerResult<Vec<_>>>()?;
            handles
                .into_iter()
                .map(|handle| handle.join().map_err(|_| RunnerError::WorkerPanicked)?)
                .collect::<RunnerResult<Vec<_>>>()
        })?;

        for (run, sample) in batches.into_iter().flatten() {
            samples[run] = sample;
        }
        Ok(samples)
    }
}

fn execution_thread(name: String) -> Builder {
    Builder::new().name(name).stack_size(EXECUTION_STACK_SIZE)
}

/// Run `f` to completion on a scoped execution thread
fn on_execution_stack<T, F>(f: F) -> RunnerResult<T>
where
    T: Send,
    F: FnOnce() -> RunnerResult<T> + Send,
{
    thread::scope(|scope| {
        execution_thread("evmb-exec".to_string())
            .spawn_scoped(scope, f)
            .map_err(RunnerError::ThreadSpawn)?
            .join()
            .map_err(|_| RunnerError::WorkerPanicked)?
    })
}

fn run_once(host: &mut MockedHost, message: &Message, code: &AnalyzedCode, run: usize) -> RunnerResult<(f64, Bytes)> {
    let timer = Instant::now();
    let result = host.transact(message, code);
    let elapsed = timer.elapsed();

    if !result.is_success() {
        return Err(RunnerError::RunFailed {
            run,
            status: result.status,
        });
    }
    trace!(run, gas_used = result.gas_used(message.gas), "run finished");
    Ok((elapsed.as_micros() as f64 / 1e3, result.output))
}
