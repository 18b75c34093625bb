//! Main loop ordering, exit policy and timers

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::{recorder, open, runtime};
use crate::core::config::{RuntimeConfig, SchedulerConfig};
use crate::events::{EventKind, Scope};
use crate::platform::headless::{HeadlessPlatform, PlatformCall};
use crate::platform::RawEventKind;
use crate::scheduler::SchedulerState;
use crate::surface::{SurfaceHandle, SurfaceKind};
use crate::window::WindowConfig;
use crate::{Runtime, RuntimeError};

fn frame_calls(calls: &[PlatformCall]) -> Vec<PlatformCall> {
    calls
        .iter()
        .copied()
        .filter(|call| !matches!(call, PlatformCall::Create(_)))
        .collect()
}

#[test]
fn test_close_inside_draw_presents_once_then_exits() {
    let mut rt = runtime();
    let (_, native) = open(&mut rt, "main");
    let frames = recorder();

    let sink = frames.clone();
    rt.run(true, move |frame| {
        sink.borrow_mut().push(frame.info().frame);
        frame.close_window();
        Ok(())
    })
    .unwrap();

    assert_eq!(*frames.borrow(), vec![1]);
    assert_eq!(
        frame_calls(rt.platform().calls()),
        vec![
            PlatformCall::BeginFrame(native),
            PlatformCall::Present(native),
            PlatformCall::Destroy(native),
        ]
    );
    assert_eq!(rt.active_window_count(), 0);
    assert_eq!(rt.scheduler_state(), SchedulerState::Stopped);
}

#[test]
fn test_count_is_stable_within_a_tick() {
    let mut rt = runtime();
    let (a, _) = open(&mut rt, "a");
    let (b, _) = open(&mut rt, "b");
    let seen = recorder();

    let sink = seen.clone();
    rt.run(true, move |frame| {
        let number = frame.info().frame;
        let window = frame.window();
        let ctx = frame.context();
        sink.borrow_mut().push((number, window, ctx.active_window_count()));
        if number == 1 && window == a {
            ctx.close(a);
        }
        if number == 3 {
            ctx.stop();
        }
        Ok(())
    })
    .unwrap();

    assert_eq!(*seen.borrow(), vec![(1, a, 2), (1, b, 2), (2, b, 1), (3, b, 1)]);
}

#[test]
fn test_draw_runs_between_begin_and_present() {
    let mut rt = runtime();
    let (_, native) = open(&mut rt, "main");
    let observed = recorder();

    let sink = observed.clone();
    rt.run(true, move |frame| {
        let ctx = frame.context();
        let last = ctx.platform().calls().last().copied();
        let presents = ctx.platform().presents(native);
        sink.borrow_mut().push((last, presents));
        if frame.info().frame == 2 {
            frame.close_window();
        }
        Ok(())
    })
    .unwrap();

    assert_eq!(
        *observed.borrow(),
        vec![
            (Some(PlatformCall::BeginFrame(native)), 0),
            (Some(PlatformCall::BeginFrame(native)), 1),
        ]
    );
}

#[test]
fn test_closed_window_is_never_drawn_again() {
    let mut rt = runtime();
    let (a, native_a) = open(&mut rt, "a");
    open(&mut rt, "b");
    let drawn = recorder();

    rt.close(a);
    let sink = drawn.clone();
    rt.run(true, move |frame| {
        sink.borrow_mut().push(frame.window());
        frame.close_window();
        Ok(())
    })
    .unwrap();

    assert!(!drawn.borrow().contains(&a));
    assert_eq!(drawn.borrow().len(), 1);
    assert!(!rt.platform().calls().contains(&PlatformCall::BeginFrame(native_a)));
}

#[test]
fn test_draw_failure_is_logged_and_presented() {
    let mut rt = runtime();
    let (_, native) = open(&mut rt, "main");

    rt.run(true, |frame| {
        match frame.info().frame {
            1 => Err("shader compile failed".into()),
            2 => panic!("draw exploded"),
            _ => {
                frame.close_window();
                Ok(())
            }
        }
    })
    .unwrap();

    let presents = rt
        .platform()
        .calls()
        .iter()
        .filter(|call| **call == PlatformCall::Present(native))
        .count();
    assert_eq!(presents, 3);
    assert_eq!(rt.callback_failures(), 2);
}

#[test]
fn test_stop_from_listener_tears_down() {
    let mut rt = runtime();
    let (id, native) = open(&mut rt, "main");
    let draws = Rc::new(Cell::new(0));

    rt.add_event_listener(EventKind::Refresh, Scope::Window(id), |_, ctx| {
        ctx.stop();
        Ok(())
    });
    rt.set_interval(Duration::from_secs(60), |_| Ok(()));
    rt.platform_mut().inject(native, RawEventKind::Refresh);

    assert_eq!(rt.scheduler_state(), SchedulerState::Idle);
    let counter = draws.clone();
    rt.run(false, move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    })
    .unwrap();

    assert_eq!(draws.get(), 1);
    assert_eq!(rt.scheduler_state(), SchedulerState::Stopped);
    assert_eq!(rt.listener_count(), 0);
    // Windows outlive the loop
    assert_eq!(rt.active_window_count(), 1);
}

#[test]
fn test_no_windows_exits_immediately() {
    let mut rt = runtime();
    let draws = Rc::new(Cell::new(0));
    let counter = draws.clone();
    rt.run(true, move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    })
    .unwrap();
    assert_eq!(draws.get(), 0);
}

#[test]
fn test_timers_fire_after_drawing() {
    let mut rt = runtime();
    open(&mut rt, "main");
    let order = recorder();

    let sink = order.clone();
    rt.set_timeout(Duration::ZERO, move |_| {
        sink.borrow_mut().push("timeout");
        Ok(())
    });
    let sink = order.clone();
    let fired = Rc::new(Cell::new(0));
    let ticks = fired.clone();
    rt.set_interval(Duration::ZERO, move |ctx| {
        sink.borrow_mut().push("interval");
        ticks.set(ticks.get() + 1);
        if ticks.get() == 3 {
            ctx.stop();
        }
        Ok(())
    });
    let cancelled = rt.set_timeout(Duration::ZERO, |_| Err("never runs".into()));
    assert!(rt.clear_timer(cancelled));
    assert!(!rt.clear_timer(cancelled));

    let sink = order.clone();
    rt.run(false, move |_| {
        sink.borrow_mut().push("draw");
        Ok(())
    })
    .unwrap();

    assert_eq!(
        *order.borrow(),
        vec!["draw", "timeout", "interval", "draw", "interval", "draw", "interval"]
    );
    assert_eq!(rt.callback_failures(), 0);
}

#[test]
fn test_timer_can_close_window() {
    let mut rt = runtime();
    let (id, _) = open(&mut rt, "main");
    rt.set_timeout(Duration::ZERO, move |ctx| {
        ctx.close(id);
        Ok(())
    });

    let draws = Rc::new(Cell::new(0));
    let counter = draws.clone();
    rt.run(true, move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    })
    .unwrap();
    assert_eq!(draws.get(), 1);
}

#[test]
fn test_wait_for_events_is_bounded() {
    let scheduler = SchedulerConfig::new().with_wait_for_events(Some(5));
    let config = RuntimeConfig::new().with_scheduler(scheduler);
    let mut rt = Runtime::with_platform(HeadlessPlatform::new(), config).unwrap();
    open(&mut rt, "main");

    let draws = Rc::new(Cell::new(0));
    let counter = draws.clone();
    rt.run_configured(move |frame| {
        counter.set(counter.get() + 1);
        if counter.get() == 3 {
            frame.close_window();
        }
        Ok(())
    })
    .unwrap();
    assert_eq!(draws.get(), 3);
}

#[test]
fn test_frame_info_geometry() {
    let mut rt = runtime();
    let (id, native) = open(&mut rt, "main");
    rt.platform_mut().inject(native, RawEventKind::FramebufferResized { width: 1280, height: 960 });
    let infos = recorder();

    let sink = infos.clone();
    rt.run(true, move |frame| {
        sink.borrow_mut().push(*frame.info());
        frame.close_window();
        Ok(())
    })
    .unwrap();

    let info = infos.borrow()[0];
    assert_eq!(info.window, id);
    assert_eq!(info.size, crate::foundation::math::Size::new(640, 480));
    assert_eq!(info.framebuffer_size, crate::foundation::math::Size::new(1280, 960));
}

#[test]
fn test_pixel_surface_draw() {
    let mut rt = runtime();
    let id = rt
        .create_window(
            &WindowConfig::new("pixels")
                .with_size(4, 2)
                .with_surface(SurfaceKind::Pixels),
        )
        .unwrap();
    let native = rt.native_id(id).unwrap();
    let surfaces = recorder();

    let sink = surfaces.clone();
    rt.run(false, move |frame| {
        sink.borrow_mut().push(frame.surface()?);
        frame.pixels_mut()?.fill(0x00FF_00FF);
        frame.context().stop();
        Ok(())
    })
    .unwrap();

    assert_eq!(*surfaces.borrow(), vec![SurfaceHandle::Pixels { width: 4, height: 2 }]);
    let pixels = rt.platform().window(native).unwrap().pixels();
    assert_eq!(pixels.len(), 8);
    assert!(pixels.iter().all(|pixel| *pixel == 0x00FF_00FF));
    assert_eq!(rt.callback_failures(), 0);
}

#[test]
fn test_native_surface_has_no_pixels() {
    let mut rt = runtime();
    let (id, _) = open(&mut rt, "main");
    assert_eq!(rt.surface_for(id).unwrap(), SurfaceHandle::Detached);
    assert!(matches!(rt.pixels_mut(id), Err(RuntimeError::UnsupportedSurface(_))));
    assert!(matches!(rt.context().gl_proc_address(id, "glClear"), Err(RuntimeError::UnsupportedSurface(_))));
}

#[test]
fn test_opengl_surface_unavailable_headless() {
    let mut rt = runtime();
    let config = WindowConfig::new("gl").with_surface(SurfaceKind::opengl(3, 3));
    assert!(matches!(rt.create_window(&config), Err(RuntimeError::WindowCreation(_))));
}

#[test]
fn test_target_fps_paces_ticks() {
    let scheduler = SchedulerConfig::new().with_target_fps(50);
    let config = RuntimeConfig::new().with_scheduler(scheduler);
    let mut rt = Runtime::with_platform(HeadlessPlatform::new(), config).unwrap();
    open(&mut rt, "main");

    let draws = Rc::new(Cell::new(0));
    let counter = draws.clone();
    let started = Instant::now();
    rt.run(true, move |frame| {
        counter.set(counter.get() + 1);
        if counter.get() == 3 {
            frame.close_window();
        }
        Ok(())
    })
    .unwrap();

    // Three drawn ticks, each padded to a 20 ms budget
    assert_eq!(draws.get(), 3);
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[test]
fn test_unpaced_loop_does_not_sleep() {
    let mut rt = runtime();
    open(&mut rt, "main");

    let draws = Rc::new(Cell::new(0));
    let counter = draws.clone();
    let started = Instant::now();
    rt.run(true, move |frame| {
        counter.set(counter.get() + 1);
        if counter.get() == 3 {
            frame.close_window();
        }
        Ok(())
    })
    .unwrap();

    assert_eq!(draws.get(), 3);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_poll_events_runs_due_timers() {
    let mut rt = runtime();
    let (id, _) = open(&mut rt, "main");
    let fired = Rc::new(Cell::new(0));

    let ticks = fired.clone();
    rt.set_interval(Duration::ZERO, move |ctx| {
        ticks.set(ticks.get() + 1);
        if ticks.get() == 3 {
            ctx.close(id);
        }
        Ok(())
    });
    let later = rt.set_timeout(Duration::from_secs(60), |_| Err("not due".into()));

    let mut polls = 0;
    while !rt.is_closed(id) {
        rt.poll_events();
        polls += 1;
    }

    assert_eq!(polls, 3);
    assert_eq!(fired.get(), 3);
    assert_eq!(rt.callback_failures(), 0);
    assert!(rt.clear_timer(later));
}

#[test]
fn test_wait_events_wakes_for_timer() {
    let mut rt = runtime();
    open(&mut rt, "main");
    let fired = Rc::new(Cell::new(false));

    let started = Instant::now();
    let flag = fired.clone();
    rt.set_timeout(Duration::from_millis(10), move |_| {
        flag.set(true);
        Ok(())
    });

    rt.wait_events(None);
    assert!(fired.get());
    assert!(started.elapsed() >= Duration::from_millis(10));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_window_closed_listener_stops_loop_without_auto_exit() {
    let mut rt = runtime();
    let (id, native) = open(&mut rt, "panel");
    rt.set_interval(Duration::from_secs(60), |_| Ok(()));
    rt.add_event_listener(EventKind::WindowClosed, Scope::Window(id), |_, ctx| {
        ctx.stop();
        Ok(())
    });
    rt.platform_mut().inject(native, RawEventKind::CloseRequested);

    let draws = Rc::new(Cell::new(0));
    let counter = draws.clone();
    rt.run(false, move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    })
    .unwrap();

    // Closed during the first tick, removed and stopped at the second boundary
    assert_eq!(draws.get(), 0);
    assert_eq!(rt.active_window_count(), 0);
    assert_eq!(rt.scheduler_state(), SchedulerState::Stopped);
}
