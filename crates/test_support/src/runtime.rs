use anyhow::{Result, bail};
use std::{
    env, fs,
    os::unix::net::UnixStream,
    path::{Path, PathBuf},
    sync::OnceLock,
    thread,
    time::{Duration, Instant},
};

const SOCKET_WAIT_TIMEOUT: Duration = Duration::from_secs(3);
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Ensure a container runtime socket is reachable for testcontainers.
///
/// Honors `DOCKER_HOST` first, then the Docker socket, then a Podman socket,
/// which is exported through `DOCKER_HOST` when found. The probe runs once per
/// test binary.
///
/// # Errors
/// Returns an error describing what was tried when no socket answers.
pub fn ensure_container_runtime() -> Result<()> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();
    match INIT.get_or_init(detect_runtime) {
        Ok(()) => Ok(()),
        Err(message) => bail!("{message}"),
    }
}

fn detect_runtime() -> Result<(), String> {
    if let Ok(docker_host) = env::var("DOCKER_HOST") {
        return check_docker_host(&docker_host);
    }

    if wait_for_socket(Path::new(DOCKER_SOCKET), SOCKET_WAIT_TIMEOUT) {
        return Ok(());
    }

    if let Some(path) = podman_socket_candidates()
        .into_iter()
        .find(|path| path.exists())
    {
        if wait_for_socket(&path, SOCKET_WAIT_TIMEOUT) {
            export_docker_host(&path);
            return Ok(());
        }
        return Err(format!(
            "Podman socket found at `{}`, but it is not accepting connections. Start `podman.socket`.",
            path.display()
        ));
    }

    Err(format!(
        "No container runtime reachable: `{DOCKER_SOCKET}` is not accepting connections and no Podman socket was found. Set `DOCKER_HOST` to run the integration tests."
    ))
}

fn check_docker_host(docker_host: &str) -> Result<(), String> {
    let socket = docker_host
        .strip_prefix("unix://")
        .or_else(|| docker_host.starts_with('/').then_some(docker_host));

    // tcp:// and friends are left to testcontainers to validate.
    let Some(socket) = socket else {
        return Ok(());
    };

    if wait_for_socket(Path::new(socket), SOCKET_WAIT_TIMEOUT) {
        Ok(())
    } else {
        Err(format!(
            "`DOCKER_HOST` points to `{docker_host}`, but the socket is not accepting connections."
        ))
    }
}

fn podman_socket_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(runtime_dir) = env::var("XDG_RUNTIME_DIR") {
        candidates.push(PathBuf::from(runtime_dir).join("podman/podman.sock"));
    }
    if let Some(uid) = read_uid() {
        candidates.push(PathBuf::from(format!("/run/user/{uid}/podman/podman.sock")));
    }
    candidates.push(PathBuf::from("/run/podman/podman.sock"));
    candidates
}

fn wait_for_socket(path: &Path, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if path.exists() && UnixStream::connect(path).is_ok() {
            return true;
        }
        thread::sleep(Duration::from_millis(200));
    }
    false
}

fn export_docker_host(path: &Path) {
    let docker_host = format!("unix://{}", path.display());
    // SAFETY: called once from the probe above, before any container starts.
    unsafe {
        env::set_var("DOCKER_HOST", docker_host);
    }
}

fn read_uid() -> Option<u32> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    status
        .lines()
        .find_map(|line| line.strip_prefix("Uid:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|uid| uid.parse::<u32>().ok())
}
