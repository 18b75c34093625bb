//! Full-screen warning panel with two buttons
//!
//! Covers the primary monitor's work area, floats above other windows and
//! asks for attention. Pointer input is ignored while the panel is not
//! focused. Button presses and hover changes are logged; rendering is left to
//! whichever renderer attaches to the window surface.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use winloop::prelude::*;

/// Switch between covering the monitor and a regular resizable window
const FULL_SCREEN: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    RestartApp,
    ForceUpdate,
}

struct Button {
    action: Action,
    label: &'static str,
    bounds: Rect,
}

struct PanelState {
    cursor: Point,
    down: bool,
    hovered: Option<Action>,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            cursor: Point::origin(),
            down: false,
            hovered: None,
        }
    }
}

fn layout_buttons() -> Vec<Button> {
    const PADDING: u32 = 20;
    const HEIGHT: u32 = 40;
    const GLYPH_WIDTH: u32 = 11;

    let mut x = 40;
    [(Action::RestartApp, "Restart app"), (Action::ForceUpdate, "Force update")]
        .into_iter()
        .map(|(action, label)| {
            let width = u32::try_from(label.len()).unwrap_or(0) * GLYPH_WIDTH + PADDING * 2;
            let bounds = Rect::new(x, 180, width, HEIGHT);
            x += i32::try_from(width + PADDING).unwrap_or(0);
            Button { action, label, bounds }
        })
        .collect()
}

fn button_at(buttons: &[Button], cursor: &Point) -> Option<Action> {
    buttons
        .iter()
        .find(|button| button.bounds.contains(cursor))
        .map(|button| button.action)
}

fn perform(action: Action) {
    match action {
        Action::RestartApp => log::info!("RESTART APP"),
        Action::ForceUpdate => log::info!("FORCE UPDATE"),
    }
}

fn window_config() -> WindowConfig {
    let config = WindowConfig::new("Error display")
        .with_focused(true)
        .with_floating(true);
    if FULL_SCREEN {
        config
            .with_monitor(MonitorBinding::Primary)
            .with_resizable(false)
            .with_maximized(true)
            .with_decorated(false)
    } else {
        config.with_resizable(true).with_size(900, 500)
    }
}

/// Track the cursor only while the panel is focused
fn track_pointer(
    state: &Rc<RefCell<PanelState>>,
    event: &mut Event,
    ctx: &mut Context<'_, GlfwPlatform>,
) -> RuntimeResult<bool> {
    if !ctx.window(event.window())?.is_focused() {
        event.prevent_default();
        return Ok(false);
    }
    if let Some(position) = event.position() {
        state.borrow_mut().cursor = position;
    }
    Ok(true)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut runtime = Runtime::new(RuntimeConfig::default())?;

    let monitor = runtime.primary_monitor()?;
    log::info!(
        "Primary monitor {} work area {}x{}",
        monitor.name.as_deref().unwrap_or("<unnamed>"),
        monitor.work_area.width,
        monitor.work_area.height
    );

    let window = runtime.create_window(&window_config())?;
    if FULL_SCREEN {
        runtime.set_position(window, Position::new(0, 0))?;
        runtime.request_attention(window)?;
    }
    runtime.set_size_limits(window, SizeLimits::new(900, 500, 3000, 3000))?;

    let scale = runtime.window(window)?.content_scale();
    log::info!("Content scale {}x{}", scale.x, scale.y);

    let buttons = Rc::new(layout_buttons());
    let state = Rc::new(RefCell::new(PanelState::default()));

    runtime.add_event_listener(EventKind::Click, Scope::Window(window), |event, _ctx| {
        log::debug!("click {:?} {:?}", event.x(), event.y());
        Ok(())
    });
    runtime.add_event_listener(EventKind::DoubleClick, Scope::Window(window), |_event, _ctx| {
        log::debug!("dblclick");
        Ok(())
    });

    let down_state = state.clone();
    runtime.on("mousedown", Scope::Window(window), move |event, ctx| {
        if track_pointer(&down_state, event, ctx)? {
            down_state.borrow_mut().down = true;
        }
        Ok(())
    })?;

    let move_state = state.clone();
    runtime.on("mousemove", Scope::Window(window), move |event, ctx| {
        track_pointer(&move_state, event, ctx)?;
        Ok(())
    })?;

    let up_state = state.clone();
    let up_buttons = buttons.clone();
    runtime.on("mouseup", Scope::Window(window), move |event, ctx| {
        if !track_pointer(&up_state, event, ctx)? {
            return Ok(());
        }
        let mut panel = up_state.borrow_mut();
        panel.down = false;
        if let Some(action) = button_at(&up_buttons, &panel.cursor) {
            perform(action);
        }
        Ok(())
    })?;

    runtime.add_event_listener(EventKind::Close, Scope::Window(window), |_event, _ctx| {
        log::info!("Close requested");
        Ok(())
    });
    // Closing the panel ends the loop; `run` below does not exit on its own
    runtime.add_event_listener(EventKind::WindowClosed, Scope::Window(window), |_event, ctx| {
        log::info!("Window removed");
        ctx.stop();
        Ok(())
    });

    runtime.set_interval(Duration::from_secs(1), |_ctx| {
        log::info!("alive");
        Ok(())
    });

    let draw_state = state;
    runtime.run(false, move |_frame| {
        let mut panel = draw_state.borrow_mut();
        let hovered = button_at(&buttons, &panel.cursor);
        if hovered != panel.hovered {
            let label = buttons
                .iter()
                .find(|button| Some(button.action) == hovered)
                .map_or("none", |button| button.label);
            let pressed = if panel.down { " (pressed)" } else { "" };
            log::debug!("Hovering {label}{pressed}");
            panel.hovered = hovered;
        }
        Ok(())
    })?;

    log::info!("Error display finished");
    Ok(())
}
