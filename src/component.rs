//! Components: per-instance views synthesized from prefixed options.
//!
//! A section lists component names in one option and describes each of them
//! with `prefix.name.key` options:
//!
//! ```ini
//! [monitor]
//! watches = data spool
//! root = /mnt
//!
//! watch.*.threshold = 90
//! watch.data.path = %(root)s/data
//! watch.spool.path = %(root)s/spool
//! watch.spool.threshold = 75
//! ```
//!
//! Each component gets a private [`Store`] with a single section named
//! `prefix.name`. It is filled in layers, each overriding the previous one
//! key by key:
//!
//! 1. every option of the parent section (including its `DEFAULT` view)
//!    that does not start with `prefix.` goes to the private `DEFAULT`
//! 2. `prefix.*.key`
//! 3. `prefix.default.key`
//! 4. each mixin in order (`mixin.key`); the list comes from the closest of
//!    `prefix.name.mixin`, `prefix.default.mixin`, `prefix.*.mixin`
//! 5. `prefix.name.key`
//! 6. the meta keys `name` and `{prefix}`, both holding the component name
//!
//! Values are copied raw. Interpolation happens on read, against the private
//! section and its `DEFAULT`, so `%(root)s` above resolves even though `root`
//! was never part of the `watch.` namespace.
//!
//! Mixins are expanded one level: a mixin's own `mixin` key is copied like
//! any other key but not followed.

use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::accessors::{Fallback, SectionView};
use crate::error::ConfigError;
use crate::store::{DEFAULT_SECTION, Store, normalize_option};

/// One synthesized component. Read it through [`SectionView`].
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    prefix: String,
    name: String,
    section: String,
    store: Store,
}

impl Component {
    /// Synthesize component `name` from the options visible in `parent`.
    pub fn build<V>(parent: &V, prefix: &str, name: &str) -> Result<Self, ConfigError>
    where
        V: SectionView + ?Sized,
    {
        let items = parent.store().raw_items(parent.section_name())?;
        let section = format!("{prefix}.{name}");
        let namespace = format!("{}.", normalize_option(prefix));

        let mut store = Store::new();
        store.ensure_section(&section);

        for (key, value) in &items {
            if !key.starts_with(&namespace) {
                store.insert(DEFAULT_SECTION, key, value);
            }
        }

        let mut stack = vec![format!("{prefix}.*."), format!("{prefix}.default.")];

        let mut mixins = parent.get_list(&format!("{prefix}.*.mixin"), Fallback::None)?;
        for scope in ["default", name] {
            mixins = parent.get_list(
                &format!("{prefix}.{scope}.mixin"),
                Fallback::Value(mixins),
            )?;
        }
        stack.extend(mixins.iter().map(|mixin| format!("{mixin}.")));
        stack.push(format!("{prefix}.{name}."));

        debug!(component = %section, ?stack, "synthesizing component");

        for layer in &stack {
            let layer_key = normalize_option(layer);
            for (key, value) in &items {
                if let Some(stripped) = key.strip_prefix(layer_key.as_str())
                    && !stripped.is_empty()
                {
                    trace!(component = %section, key = stripped, from = %layer, "layer value");
                    store.insert(&section, stripped, value);
                }
            }
        }

        store.insert(&section, "name", name);
        store.insert(&section, prefix, name);

        Ok(Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
            section,
            store,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set an option in this component's own section.
    pub fn set(&mut self, option: &str, value: &str) {
        self.store.insert(&self.section, option, value);
    }

    /// The private store, for callers that want to keep it.
    pub fn into_store(self) -> Store {
        self.store
    }
}

impl SectionView for Component {
    fn store(&self) -> &Store {
        &self.store
    }

    fn section_name(&self) -> &str {
        &self.section
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.section)
    }
}

/// Build every component listed in `option` and pass each to `factory`.
///
/// The result is keyed by component name, in list order. A name listed
/// twice keeps its first position and the value built last. An absent list
/// yields an empty map. The first factory error stops synthesis and is
/// returned as-is.
pub fn get_components<'p, V, P, T, E, F>(
    view: &V,
    option: &str,
    prefix: &str,
    parent: &'p P,
    mut factory: F,
) -> Result<IndexMap<String, T>, E>
where
    V: SectionView + ?Sized,
    E: From<ConfigError>,
    F: FnMut(Component, &'p P) -> Result<T, E>,
{
    let names = view.get_list(option, Fallback::None)?;
    let mut components = IndexMap::with_capacity(names.len());
    for name in names {
        let component = Component::build(view, prefix, &name)?;
        let value = factory(component, parent)?;
        components.insert(name, value);
    }
    debug!(
        section = view.section_name(),
        option,
        prefix,
        count = components.len(),
        "built components"
    );
    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{component_store, monitor_store};

    #[derive(Debug)]
    struct Watch {
        name: String,
        path: String,
        threshold: i64,
    }

    fn build_watch(component: Component, _parent: &()) -> Result<Watch, ConfigError> {
        Ok(Watch {
            name: component.name().to_string(),
            path: component.get("path", Fallback::Required)?.unwrap_or_default(),
            threshold: component
                .get_int("threshold", Fallback::Required)?
                .unwrap_or_default(),
        })
    }

    fn identity(component: Component, _parent: &()) -> Result<Component, ConfigError> {
        Ok(component)
    }

    #[test]
    fn layers_and_interpolation() {
        let store = monitor_store();
        let watches = store
            .get_components("monitor", "watches", "watch", &(), build_watch)
            .unwrap();

        let names: Vec<&str> = watches.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["data", "spool"]);

        let data = &watches["data"];
        assert_eq!(data.name, "data");
        assert_eq!(data.path, "/mnt/data");
        assert_eq!(data.threshold, 90);

        let spool = &watches["spool"];
        assert_eq!(spool.path, "/mnt/spool");
        assert_eq!(spool.threshold, 75);
    }

    #[test]
    fn components_keep_values_from_build_time() {
        let mut store = monitor_store();
        let watches = store
            .get_components("monitor", "watches", "watch", &(), identity)
            .unwrap();

        store.set("DEFAULT", "root", "/elsewhere").unwrap();
        store.set("monitor", "watch.spool.threshold", "10").unwrap();
        store.remove_option("monitor", "watch.data.path").unwrap();

        let spool = &watches["spool"];
        assert_eq!(
            spool.get("path", Fallback::Required).unwrap().as_deref(),
            Some("/mnt/spool")
        );
        assert_eq!(spool.get_int("threshold", Fallback::Required).unwrap(), Some(75));
        assert_eq!(
            watches["data"].get("path", Fallback::Required).unwrap().as_deref(),
            Some("/mnt/data")
        );
    }

    #[test]
    fn own_value_beats_mixin() {
        let store = component_store();
        let components = store
            .get_components("section", "components", "component", &(), identity)
            .unwrap();
        assert_eq!(
            components["a"].get("key1", Fallback::None).unwrap().as_deref(),
            Some("a key1")
        );
    }

    #[test]
    fn mixin_beats_nothing() {
        let mut store = component_store();
        store.remove_option("section", "component.a.key1").unwrap();
        let components = store
            .get_components("section", "components", "component", &(), identity)
            .unwrap();
        assert_eq!(
            components["a"].get("key1", Fallback::None).unwrap().as_deref(),
            Some("base key1")
        );
        assert_eq!(
            components["b"].get("key1", Fallback::None).unwrap().as_deref(),
            Some("wild key1")
        );
    }

    #[test]
    fn closest_mixin_list_replaces_broader_ones() {
        let store: Store = "[s]\n\
             items = a b\n\
             one.key = from-one\n\
             two.key = from-two\n\
             two.other = two-other\n\
             item.*.mixin = one two\n\
             item.a.mixin = one\n"
            .parse()
            .unwrap();
        let items = store
            .get_components("s", "items", "item", &(), identity)
            .unwrap();
        assert_eq!(items["a"].get("key", Fallback::None).unwrap().as_deref(), Some("from-one"));
        assert_eq!(items["a"].get("other", Fallback::None).unwrap(), None);
        assert_eq!(items["b"].get("key", Fallback::None).unwrap().as_deref(), Some("from-two"));
    }

    #[test]
    fn named_default_beats_wildcard() {
        let store: Store = "[s]\n\
             items = a\n\
             item.*.color = red\n\
             item.default.color = blue\n"
            .parse()
            .unwrap();
        let items = store
            .get_components("s", "items", "item", &(), identity)
            .unwrap();
        assert_eq!(items["a"].get("color", Fallback::None).unwrap().as_deref(), Some("blue"));
    }

    #[test]
    fn mixins_are_single_level() {
        let store: Store = "[s]\n\
             items = a\n\
             base1.mixin.key2 = base1\n\
             base2.mixin.mixin = base1.mixin\n\
             base2.mixin.key1 = base2\n\
             item.*.mixin = base2.mixin\n"
            .parse()
            .unwrap();
        let items = store
            .get_components("s", "items", "item", &(), identity)
            .unwrap();
        let a = &items["a"];
        assert_eq!(a.get("key1", Fallback::None).unwrap().as_deref(), Some("base2"));
        assert_eq!(a.get("key2", Fallback::None).unwrap(), None);
    }

    #[test]
    fn meta_keys_and_options_order() {
        let mut store = Store::new();
        store.add_section("section").unwrap();
        store.set("section", "components", "a").unwrap();

        let components = store
            .get_components("section", "components", "component", &(), |mut c, _| {
                let value = format!("setname.{}", c.name());
                c.set("setname", &value);
                Ok::<_, ConfigError>(c)
            })
            .unwrap();
        let a = &components["a"];
        assert_eq!(a.options(), vec!["name", "component", "setname", "components"]);
        assert_eq!(a.get("setname", Fallback::None).unwrap().as_deref(), Some("setname.a"));
        assert_eq!(a.get("component", Fallback::None).unwrap().as_deref(), Some("a"));
        assert_eq!(a.to_string(), "component.a");
        assert_eq!(a.prefix(), "component");
    }

    #[test]
    fn parent_defaults_reach_components() {
        let store: Store = "[DEFAULT]\n\
             site = north\n\
             [s]\n\
             items = a\n\
             item.*.label = %(site)s-%(name)s\n"
            .parse()
            .unwrap();
        let items = store
            .get_components("s", "items", "item", &(), identity)
            .unwrap();
        assert_eq!(
            items["a"].get("label", Fallback::None).unwrap().as_deref(),
            Some("north-a")
        );
    }

    #[test]
    fn missing_list_is_empty() {
        let store = monitor_store();
        let none = store
            .get_components("monitor", "nothing", "watch", &(), identity)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn duplicate_names_keep_first_position() {
        let store: Store = "[s]\nitems = a b a\n".parse().unwrap();
        let mut built = 0;
        let items = store
            .get_components("s", "items", "item", &(), |c, _| {
                built += 1;
                Ok::<_, ConfigError>((c.name().to_string(), built))
            })
            .unwrap();
        let order: Vec<&str> = items.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(items["a"].1, 3);
    }

    #[derive(Debug)]
    enum AppError {
        Config(ConfigError),
        Rejected(String),
    }

    impl From<ConfigError> for AppError {
        fn from(e: ConfigError) -> Self {
            AppError::Config(e)
        }
    }

    #[test]
    fn factory_errors_stop_synthesis() {
        let store = monitor_store();
        let mut seen = Vec::new();
        let err = store
            .get_components("monitor", "watches", "watch", &(), |c, _| {
                seen.push(c.name().to_string());
                Err::<(), _>(AppError::Rejected(c.name().to_string()))
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Rejected(name) if name == "data"));
        assert_eq!(seen, vec!["data"]);
    }

    #[test]
    fn config_errors_convert_into_factory_error() {
        let store: Store = "[s]\nitems = a\n".parse().unwrap();
        let err = store
            .get_components("s", "items", "item", &(), |c, _| {
                c.get_int("missing", Fallback::Required)?;
                Ok::<_, AppError>(())
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::MissingOption { .. })));
    }

    #[test]
    fn parent_is_passed_through() {
        struct Owner {
            label: &'static str,
        }
        let owner = Owner { label: "owner" };
        let store = monitor_store();
        let labels = store
            .get_components("monitor", "watches", "watch", &owner, |c, parent: &Owner| {
                Ok::<_, ConfigError>(format!("{}:{}", parent.label, c.name()))
            })
            .unwrap();
        assert_eq!(labels["spool"], "owner:spool");
    }

    #[test]
    fn nested_components() {
        let store: Store = "[s]\n\
             groups = g\n\
             group.g.members = x y\n\
             group.g.member.*.role = worker\n\
             group.g.member.y.role = lead\n"
            .parse()
            .unwrap();
        let groups = store
            .get_components("s", "groups", "group", &(), |group, _| {
                group.get_components("members", "member", &(), |member, _| {
                    member.get("role", Fallback::Required).map(Option::unwrap_or_default)
                })
            })
            .unwrap();
        let g = &groups["g"];
        assert_eq!(g["x"], "worker");
        assert_eq!(g["y"], "lead");
    }

    #[test]
    fn section_view_get_components() {
        let store = monitor_store();
        let section = store.section("monitor").unwrap();
        let watches = section
            .get_components("watches", "watch", &(), build_watch)
            .unwrap();
        assert_eq!(watches.len(), 2);
    }
}
