//! Minimal window: logs pointer motion and resizes until the window is closed

use winloop::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut runtime = Runtime::new(RuntimeConfig::default())?;

    let window = runtime.create_window(
        &WindowConfig::new("Window Manager")
            .with_size(800, 600)
            .with_resizable(false),
    )?;

    runtime.on("pointermove", Scope::Window(window), |event, _ctx| {
        if let Some(position) = event.position() {
            log::info!("{} {}", position.x, position.y);
        }
        Ok(())
    })?;

    runtime.add_event_listener(EventKind::Resize, Scope::Global, |event, _ctx| {
        if let Some(size) = event.size() {
            log::info!("Window resized {} {}", size.width, size.height);
        }
        Ok(())
    });

    runtime.run(true, |_frame| Ok(()))?;
    log::info!("Window demo finished");
    Ok(())
}
