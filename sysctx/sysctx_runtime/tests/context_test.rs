//! Integration tests for the system context.
//!
//! These tests drive configuration loading and controller resolution through
//! a directory-backed host, the way an embedding container would.

use std::any::Any;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread;

use sysctx_core::error::{ConfigError, ControllerError, Error, Result};
use sysctx_runtime::controller::{ContextBinding, CONTROLLER_CLASS_PARAM};
use sysctx_runtime::config::CONFIG_LOCATION_PARAM;
use sysctx_runtime::*;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

// Initialize tracing for tests
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn write(root: &Path, location: &str, content: &str) {
    let path = root.join(location.trim_start_matches('/'));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn context_with(dir: &TempDir, params: &[(&str, &str)]) -> Arc<SystemContext> {
    let mut host = DirectoryHost::new(dir.path());
    for (name, value) in params {
        host.set_init_parameter(*name, *value);
    }
    SystemContext::new(Arc::new(host))
}

/// A controller counting its constructions, used to check that the context
/// builds at most one.
#[derive(Default)]
struct CountingController {
    binding: ContextBinding,
}

static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

impl LifecycleController for CountingController {
    fn bind(&self, context: Weak<SystemContext>) -> Result<()> {
        self.binding.bind(context)
    }

    fn context(&self) -> Option<Arc<SystemContext>> {
        self.binding.get()
    }

    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn start(&self) -> Result<()> {
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_default_locations_merge() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    write(dir.path(), "/WEB-INF/sysconfig.cfg", "mode=prod\nport=80\n");
    write(dir.path(), "/WEB-INF/sysconfig.dev.cfg", "mode=dev\ndebug=true\n");

    let context = context_with(&dir, &[]);
    let config = context.config().unwrap();

    assert_eq!(config.get("mode"), Some("prod"));
    assert_eq!(config.get("port"), Some("80"));
    assert_eq!(config.get("debug"), Some("true"));
    assert_eq!(
        config.source_of("debug"),
        Some(dir.path().join("WEB-INF/sysconfig.dev.cfg").as_path())
    );
}

#[test]
fn test_location_parameter_overrides_defaults() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    write(dir.path(), "/cfg/a.cfg", "test=a\n");
    write(dir.path(), "/cfg/b.cfg", "test=b\nxyz=1\n");
    write(dir.path(), "/WEB-INF/sysconfig.cfg", "ignored=yes\n");

    let context = context_with(&dir, &[(CONFIG_LOCATION_PARAM, "/cfg/a.cfg,/cfg/b.cfg")]);
    let config = context.config().unwrap();

    assert_eq!(config.get("test"), Some("a"));
    assert_eq!(config.get("xyz"), Some("1"));
    assert!(!config.contains_key("ignored"));
}

#[test]
fn test_missing_source_tolerated() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "/cfg/a.cfg", "only=a\n");

    let context = context_with(&dir, &[(CONFIG_LOCATION_PARAM, "/cfg/a.cfg /cfg/missing.cfg")]);
    let config = context.config().unwrap();

    assert_eq!(config.len(), 1);
    assert_eq!(config.get("only"), Some("a"));
}

#[test]
fn test_all_sources_missing_gives_empty_config() {
    let dir = TempDir::new().unwrap();

    let context = context_with(&dir, &[(CONFIG_LOCATION_PARAM, "/nope.cfg;/also-nope.cfg")]);
    let config = context.config().unwrap();

    assert!(config.is_empty());
}

#[test]
fn test_config_identity_survives_file_changes() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "/WEB-INF/sysconfig.cfg", "k=before\n");
    let context = context_with(&dir, &[]);

    let first = context.config().unwrap();
    write(dir.path(), "/WEB-INF/sysconfig.cfg", "k=after\n");
    let second = context.config().unwrap();

    assert!(std::ptr::eq(first, second));
    assert_eq!(second.get("k"), Some("before"));
}

#[test]
fn test_config_failure_is_not_cached() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "/WEB-INF/sysconfig.cfg", "k=\\u00zz\n");
    let context = context_with(&dir, &[]);

    let err = context.config().unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Load { .. })));

    write(dir.path(), "/WEB-INF/sysconfig.cfg", "k=fixed\n");
    assert_eq!(context.config().unwrap().get("k"), Some("fixed"));
}

#[test]
fn test_default_controller_bound_to_context() {
    let dir = TempDir::new().unwrap();
    let context = context_with(&dir, &[]);

    let controller = context.controller().unwrap();

    assert!(controller.as_any().is::<DefaultController>());
    assert!(Arc::ptr_eq(&controller.context().unwrap(), &context));
    assert!(Arc::ptr_eq(&controller, &context.controller().unwrap()));
}

#[test]
fn test_custom_controller_bound_to_context() {
    let dir = TempDir::new().unwrap();
    let name = std::any::type_name::<CountingController>();
    let factory = Arc::new(ControllerFactory::with_defaults());
    factory.register_fn(name, || {
        CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingController::default()) as Box<dyn LifecycleController>)
    });
    let host = DirectoryHost::new(dir.path()).with_init_parameter(CONTROLLER_CLASS_PARAM, name);
    let context = SystemContext::with_factory(Arc::new(host), factory);

    let before = CONSTRUCTED.load(Ordering::SeqCst);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let context = Arc::clone(&context);
            thread::spawn(move || context.controller().unwrap())
        })
        .collect();
    let controllers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(CONSTRUCTED.load(Ordering::SeqCst) - before, 1);
    assert!(controllers[0].as_any().is::<CountingController>());
    assert!(controllers.iter().all(|c| Arc::ptr_eq(c, &controllers[0])));
    assert!(Arc::ptr_eq(&controllers[0].context().unwrap(), &context));
}

#[test]
fn test_unknown_controller_fails() {
    let dir = TempDir::new().unwrap();
    let context = context_with(&dir, &[(CONTROLLER_CLASS_PARAM, "com.example.Missing")]);

    let err = context.controller().err().unwrap();

    match err {
        Error::Controller(ControllerError::Instantiation { name, .. }) => {
            assert_eq!(name, "com.example.Missing");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_installed_controller_is_bound() {
    let dir = TempDir::new().unwrap();
    let context = context_with(&dir, &[]);

    context
        .install_controller(Arc::new(CountingController::default()))
        .unwrap();

    let controller = context.controller().unwrap();
    assert!(controller.as_any().is::<CountingController>());
    assert!(Arc::ptr_eq(&controller.context().unwrap(), &context));
    assert!(matches!(
        context.install_controller(Arc::new(CountingController::default())),
        Err(Error::AlreadyInitialized("controller"))
    ));
}

#[test]
fn test_concurrent_config_access_loads_once() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "/WEB-INF/sysconfig.cfg", "k=v\n");
    let context = context_with(&dir, &[]);

    let addresses: Vec<usize> = (0..8)
        .map(|_| {
            let context = Arc::clone(&context);
            thread::spawn(move || context.config().unwrap() as *const _ as usize)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    assert!(addresses.iter().all(|a| *a == addresses[0]));
}
