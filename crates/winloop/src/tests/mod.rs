//! Runtime behaviour tests on the headless backend

mod scheduler;

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::config::RuntimeConfig;
use crate::foundation::collections::WindowId;
use crate::platform::headless::HeadlessPlatform;
use crate::platform::NativeId;
use crate::window::WindowConfig;
use crate::Runtime;

/// Shared log written from inside callbacks
pub(crate) type Recorder<T> = Rc<RefCell<Vec<T>>>;

pub(crate) fn recorder<T>() -> Recorder<T> {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn runtime() -> Runtime<HeadlessPlatform> {
    Runtime::with_platform(HeadlessPlatform::new(), RuntimeConfig::default()).unwrap()
}

pub(crate) fn open(runtime: &mut Runtime<HeadlessPlatform>, title: &str) -> (WindowId, NativeId) {
    let id = runtime
        .create_window(&WindowConfig::new(title).with_size(640, 480))
        .unwrap();
    let native = runtime.native_id(id).unwrap();
    (id, native)
}

#[test]
fn test_package_metadata() {
    assert_eq!(env!("CARGO_PKG_NAME"), "winloop");
    assert!(env!("CARGO_PKG_AUTHORS").contains("winloop"));
    assert!(env!("CARGO_PKG_REPOSITORY").is_empty());
}
