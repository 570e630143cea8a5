//! Named callbacks resolved through a registry.
//!
//! A callback is described by three options:
//!
//! ```ini
//! [collector]
//! handler.module = storage
//! handler.function = write_batch
//! handler.init = open_pool
//! ```
//!
//! The application registers its functions up front, under a module and a
//! function name, and [`Store::get_callback`] looks the configured names up.
//! `init` is optional and names a nullary function of the same module that
//! runs once each time the callback is resolved.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::accessors::Fallback;
use crate::error::ConfigError;
use crate::store::Store;

type InitFn = Arc<dyn Fn() + Send + Sync>;

struct Module<F> {
    functions: IndexMap<String, F>,
    inits: IndexMap<String, InitFn>,
}

impl<F> Default for Module<F> {
    fn default() -> Self {
        Self {
            functions: IndexMap::new(),
            inits: IndexMap::new(),
        }
    }
}

/// Functions of type `F` addressable as `module.function`.
///
/// `F` is whatever the application calls: a plain `fn` pointer, an
/// `Arc<dyn Fn(..)>`, or an enum of handlers. It only needs to be `Clone`.
pub struct CallbackRegistry<F> {
    modules: IndexMap<String, Module<F>>,
}

impl<F> Default for CallbackRegistry<F> {
    fn default() -> Self {
        Self {
            modules: IndexMap::new(),
        }
    }
}

impl<F> fmt::Debug for CallbackRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, module) in &self.modules {
            let functions: Vec<&str> = module.functions.keys().map(String::as_str).collect();
            map.entry(name, &functions);
        }
        map.finish()
    }
}

impl<F: Clone> CallbackRegistry<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` as `module.function`, replacing any previous one.
    pub fn register(&mut self, module: &str, function: &str, callback: F) -> &mut Self {
        self.modules
            .entry(module.to_string())
            .or_default()
            .functions
            .insert(function.to_string(), callback);
        self
    }

    /// Register an initializer that an `.init` option can name.
    pub fn register_init<I>(&mut self, module: &str, name: &str, init: I) -> &mut Self
    where
        I: Fn() + Send + Sync + 'static,
    {
        self.modules
            .entry(module.to_string())
            .or_default()
            .inits
            .insert(name.to_string(), Arc::new(init));
        self
    }

    pub fn function(&self, module: &str, function: &str) -> Option<&F> {
        self.modules.get(module)?.functions.get(function)
    }

    pub fn contains(&self, module: &str, function: &str) -> bool {
        self.function(module, function).is_some()
    }

    fn init(&self, module: &str, name: &str) -> Option<&InitFn> {
        self.modules.get(module)?.inits.get(name)
    }

    /// Look up `module.function`, failing with `UnknownCallback`.
    pub fn resolve(&self, module: &str, function: &str) -> Result<F, ConfigError> {
        self.function(module, function)
            .cloned()
            .ok_or_else(|| unknown(module, function))
    }

    /// Resolve a dotted `module.function` reference. The function name is
    /// the part after the last dot, so modules may contain dots themselves.
    pub fn resolve_dotted(&self, reference: &str) -> Result<F, ConfigError> {
        match reference.trim().rsplit_once('.') {
            Some((module, function)) => self.resolve(module, function),
            None => Err(unknown("", reference.trim())),
        }
    }
}

fn unknown(module: &str, name: &str) -> ConfigError {
    ConfigError::UnknownCallback {
        module: module.to_string(),
        name: name.to_string(),
    }
}

impl Store {
    /// Resolve the callback described by `option.module`,
    /// `option.function` and (optionally) `option.init`.
    ///
    /// If `option.module` or `option.function` is absent the fallback
    /// applies; a `Raw` fallback is a `module.function` reference. Names
    /// that are present but not registered are an error, as is a named init
    /// that is not registered. The init runs after the function has been
    /// found.
    pub fn get_callback<F: Clone>(
        &self,
        section: &str,
        option: &str,
        registry: &CallbackRegistry<F>,
        fallback: Fallback<F>,
    ) -> Result<Option<F>, ConfigError> {
        let names = self
            .get(section, &format!("{option}.module"), Fallback::Required)
            .and_then(|module| {
                let function =
                    self.get(section, &format!("{option}.function"), Fallback::Required)?;
                Ok((module, function))
            });

        let (module, function) = match names {
            Ok((Some(module), Some(function))) => (module, function),
            Ok(_) => return Ok(None),
            Err(e) if e.is_missing() => {
                return match fallback {
                    Fallback::Required => Err(e),
                    Fallback::None => Ok(None),
                    Fallback::Value(callback) => Ok(Some(callback)),
                    Fallback::Raw(reference) => registry.resolve_dotted(&reference).map(Some),
                };
            }
            Err(e) => return Err(e),
        };

        let callback = registry.resolve(&module, &function)?;

        let init = self.get(section, &format!("{option}.init"), Fallback::None)?;
        if let Some(init) = init.filter(|name| !name.is_empty()) {
            let run = registry.init(&module, &init).ok_or_else(|| unknown(&module, &init))?;
            debug!(module = %module, init = %init, "running callback initializer");
            run();
        }

        Ok(Some(callback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Handler = fn(i64) -> i64;

    fn double(x: i64) -> i64 {
        x * 2
    }

    fn negate(x: i64) -> i64 {
        -x
    }

    fn registry() -> CallbackRegistry<Handler> {
        let mut registry = CallbackRegistry::new();
        registry
            .register("math", "double", double as Handler)
            .register("math.extra", "negate", negate as Handler);
        registry
    }

    fn store() -> Store {
        "[section]\n\
         callback.module = math\n\
         callback.function = double\n\
         \n\
         [templated]\n\
         lib = math.extra\n\
         callback.module = %(lib)s\n\
         callback.function = negate\n\
         \n\
         [unknown]\n\
         callback.module = math\n\
         callback.function = triple\n\
         \n\
         [half]\n\
         callback.module = math\n"
            .parse()
            .unwrap()
    }

    #[test]
    fn resolves_registered_function() {
        let f = store()
            .get_callback("section", "callback", &registry(), Fallback::Required)
            .unwrap()
            .unwrap();
        assert_eq!(f(21), 42);
    }

    #[test]
    fn names_are_interpolated() {
        let f = store()
            .get_callback("templated", "callback", &registry(), Fallback::None)
            .unwrap()
            .unwrap();
        assert_eq!(f(3), -3);
    }

    #[test]
    fn unregistered_function_is_an_error() {
        let err = store()
            .get_callback("unknown", "callback", &registry(), Fallback::None)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownCallback { module, name } if module == "math" && name == "triple"
        ));
    }

    #[test]
    fn missing_options_use_fallback() {
        let store = store();
        let registry = registry();
        assert!(
            store
                .get_callback("half", "callback", &registry, Fallback::None)
                .unwrap()
                .is_none()
        );
        assert!(matches!(
            store.get_callback("half", "callback", &registry, Fallback::Required),
            Err(ConfigError::MissingOption { .. })
        ));
        assert!(matches!(
            store.get_callback("nowhere", "callback", &registry, Fallback::Required),
            Err(ConfigError::MissingSection(_))
        ));

        let f = store
            .get_callback("half", "callback", &registry, Fallback::Value(negate as Handler))
            .unwrap()
            .unwrap();
        assert_eq!(f(1), -1);

        let f = store
            .get_callback("half", "callback", &registry, Fallback::raw("math.extra.negate"))
            .unwrap()
            .unwrap();
        assert_eq!(f(5), -5);
    }

    #[test]
    fn init_runs_once_per_resolution() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut registry = registry();
        registry.register_init("math", "setup", || {
            CALLS.fetch_add(1, Ordering::SeqCst);
        });

        let mut store = store();
        store.set("section", "callback.init", "setup").unwrap();

        store
            .get_callback("section", "callback", &registry, Fallback::None)
            .unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        store
            .get_callback("section", "callback", &registry, Fallback::None)
            .unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unknown_init_is_an_error() {
        let mut store = store();
        store.set("section", "callback.init", "missing_init").unwrap();
        assert!(matches!(
            store.get_callback("section", "callback", &registry(), Fallback::None),
            Err(ConfigError::UnknownCallback { name, .. }) if name == "missing_init"
        ));
    }

    #[test]
    fn registry_lookup() {
        let registry = registry();
        assert!(registry.contains("math", "double"));
        assert!(!registry.contains("math", "negate"));
        assert!(registry.resolve_dotted("nodots").is_err());
        assert!(format!("{registry:?}").contains("double"));
    }
}
