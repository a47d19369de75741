//! Privileged-run helper for the embedded PostgreSQL test cluster.
//!
//! When the test suites run as root, `pg_embedded_setup_unpriv` drops
//! privileges and shells out to this binary as `pg_worker <setup|start|stop>
//! <payload.json>`. The payload is the library's own `WorkerPayload`.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Report, Result, eyre};
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    let (step, payload_path) = parse_args(env::args_os())?;
    let payload = read_payload(Path::new(&payload_path))?;
    run_step(step, payload)
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<(Step, OsString)> {
    let _program = args.next();
    let step = Step::parse(&args.next().ok_or_else(|| eyre!("missing operation argument"))?)?;
    let payload_path = args
        .next()
        .ok_or_else(|| eyre!("missing config path argument"))?;
    if let Some(extra) = args.next() {
        return Err(eyre!(
            "unexpected extra argument: {}; usage is pg_worker <operation> <config>",
            extra.to_string_lossy()
        ));
    }
    Ok((step, payload_path))
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let raw = fs::read(path)
        .with_context(|| format!("failed to read worker config at {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse worker config at {}", path.display()))
}

fn run_step(step: Step, payload: WorkerPayload) -> Result<()> {
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| Report::new(err).wrap_err("failed to rebuild postgres settings"))?;
    export_environment(payload.environment);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build pg_worker runtime")?;
    let mut postgres = PostgreSQL::new(settings);
    runtime
        .block_on(async move {
            match step {
                Step::Setup => postgres.setup().await,
                Step::Start => postgres.start().await,
                Step::Stop => postgres.stop().await,
            }
        })
        .with_context(|| format!("postgresql_embedded::{step} failed"))
}

fn export_environment(vars: Vec<(String, Option<PlainSecret>)>) {
    for (name, value) in vars {
        // SAFETY: runs on the main thread before the runtime starts.
        match value {
            Some(value) => unsafe { env::set_var(&name, value.expose()) },
            None => unsafe { env::remove_var(&name) },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Setup,
    Start,
    Stop,
}

impl Step {
    fn parse(raw: &OsStr) -> Result<Self> {
        match raw.to_string_lossy().as_ref() {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(eyre!(
                "unknown pg_worker operation '{other}'; expected setup, start or stop"
            )),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}
