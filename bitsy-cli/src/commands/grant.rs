use bitsy::StartupSequencer;

pub async fn execute(global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let sequencer = StartupSequencer::new(global.load_options()?)?;
    let nodes = sequencer.options().device_nodes().len();
    let granted = sequencer.grant_devices();

    tracing::info!(granted, nodes, "Device permissions applied");
    println!("granted {}/{}", granted, nodes);
    Ok(())
}
