use bitsy::process::{is_process_alive, read_pid_file};

pub async fn execute(global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let layout = global.load_options()?.layout()?;
    let pid_file = layout.pid_file();

    if !pid_file.exists() {
        anyhow::bail!("not running: no PID file at {}", pid_file.display());
    }

    let pid = read_pid_file(&pid_file)?;
    if !is_process_alive(pid) {
        anyhow::bail!("not running: stale PID {} in {}", pid, pid_file.display());
    }

    println!("running (pid {})", pid);
    Ok(())
}
