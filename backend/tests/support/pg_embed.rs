//! Bootstrap of the embedded PostgreSQL cluster shared by a test binary.
//!
//! `pg-embed-setup-unpriv` installs into `/var/tmp` by default. Sandboxed
//! runners cannot write there, so when `PG_RUNTIME_DIR` or `PG_DATA_DIR` is
//! unset both are pointed below the cargo target directory for the duration
//! of the bootstrap.
//!
//! Some bootstrap failures surface as panics inside the library, for example
//! a root run where the `pg_worker` binary cannot be located. Those are
//! caught and returned as errors so `SKIP_TEST_CLUSTER` still applies.

use std::any::Any;
use std::panic::{self, UnwindSafe};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pg_embedded_setup_unpriv::ClusterHandle;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use uuid::Uuid;

static BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const MAX_ATTEMPTS: u32 = 4;
const RETRY_DELAY: Duration = Duration::from_millis(500);

fn pg_embed_target_dir() -> PathBuf {
    if let Some(target_dir) = std::env::var_os("CARGO_TARGET_DIR") {
        return PathBuf::from(target_dir).join("pg-embed");
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("target")
        .join("pg-embed")
}

fn create_unique_pg_embed_dirs() -> std::io::Result<(PathBuf, PathBuf)> {
    let base = pg_embed_target_dir().join(format!(
        "bootstrap-{}-{}",
        std::process::id(),
        Uuid::new_v4()
    ));
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");
    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    Ok((runtime_dir, data_dir))
}

fn is_transient_error(message: &str) -> bool {
    let message = message.to_lowercase();
    [
        "error decoding response body",
        "connection reset",
        "connection refused",
        "timed out",
        "timeout",
        "temporarily unavailable",
        "dns error",
    ]
    .iter()
    .any(|pattern| message.contains(pattern))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "embedded cluster bootstrap panicked".to_owned())
}

/// Run `bootstrap`, reporting a panic as an ordinary setup error.
fn catch_bootstrap_panic<T>(
    bootstrap: impl FnOnce() -> Result<T, String> + UnwindSafe,
) -> Result<T, String> {
    panic::catch_unwind(bootstrap).unwrap_or_else(|payload| Err(panic_message(payload.as_ref())))
}

/// Return the process-wide embedded cluster, starting it on first use.
///
/// Transient download and startup failures are retried with a doubling
/// delay; anything else is reported immediately.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let _bootstrap = BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let needs_override =
        std::env::var_os("PG_RUNTIME_DIR").is_none() || std::env::var_os("PG_DATA_DIR").is_none();
    let _env = if needs_override {
        let (runtime_dir, data_dir) =
            create_unique_pg_embed_dirs().map_err(|err| err.to_string())?;
        Some(env_lock::lock_env([
            (
                "PG_RUNTIME_DIR",
                Some(runtime_dir.to_string_lossy().into_owned()),
            ),
            ("PG_DATA_DIR", Some(data_dir.to_string_lossy().into_owned())),
        ]))
    } else {
        None
    };

    let mut last_error = String::new();
    for attempt in 0..MAX_ATTEMPTS {
        match catch_bootstrap_panic(|| shared_cluster_handle().map_err(|err| format!("{err:?}"))) {
            Ok(handle) => return Ok(handle),
            Err(err) => {
                last_error = err;
                if attempt + 1 == MAX_ATTEMPTS || !is_transient_error(&last_error) {
                    break;
                }
                let delay = RETRY_DELAY * (1 << attempt);
                eprintln!(
                    "pg-embed: attempt {}/{MAX_ATTEMPTS} failed, retrying in {delay:?}: {last_error}",
                    attempt + 1
                );
                std::thread::sleep(delay);
            }
        }
    }
    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_panics_become_setup_errors() {
        let result: Result<(), String> = catch_bootstrap_panic(|| {
            panic!("SKIP-TEST-CLUSTER: PG_EMBEDDED_WORKER is not set and pg_worker binary was not found")
        });

        let reason = result.expect_err("panic should surface as an error");
        assert!(reason.contains("pg_worker binary was not found"), "got: {reason}");
        assert!(!is_transient_error(&reason));
    }

    #[test]
    fn formatted_panic_payloads_keep_their_message() {
        let result: Result<(), String> =
            catch_bootstrap_panic(|| panic!("cluster failed after {} attempts", 2));

        assert_eq!(result, Err("cluster failed after 2 attempts".to_owned()));
    }

    #[test]
    fn successful_bootstraps_pass_through() {
        assert_eq!(catch_bootstrap_panic(|| Ok(7)), Ok(7));
    }
}
