#[cfg(test)]
pub mod test {
    use crate::store::Store;

    /// A watcher config in the shape components are meant for.
    pub const MONITOR_INI: &str = "\
[DEFAULT]
root = /mnt

[monitor]
watches = data spool
poll = 60
poll.sync = true

watch.*.threshold = 90
watch.data.path = %(root)s/data
watch.spool.path = %(root)s/spool
watch.spool.threshold = 75
";

    pub fn monitor_store() -> Store {
        Store::parse("monitor.ini", MONITOR_INI).unwrap()
    }

    /// Two components, `a` with its own mixin and `b` with the wildcard one.
    pub fn component_store() -> Store {
        let mut store = Store::new();
        store.add_section("section").unwrap();
        for (key, value) in [
            ("base.mixin.key1", "base key1"),
            ("wild.mixin.key1", "wild key1"),
            ("components", "a b"),
            ("component.*.mixin", "wild.mixin"),
            ("component.a.mixin", "base.mixin"),
            ("component.a.key1", "a key1"),
        ] {
            store.set("section", key, value).unwrap();
        }
        store
    }

    /// Section `types` holding one value of every accessor type.
    pub const TYPES_INI: &str = "\
[types]
int = 42
hex = 0x1F
float = 2.5
flag = On
names = alpha beta  gamma
numbers = 1, 2, 3
size = 100 MiB
when = 2024-05-17 12:30:00
wait = 5m
where = /var/lib/app
span = days=1, seconds=10
bad_flag = maybe
";

    pub fn types_store() -> Store {
        Store::parse("types.ini", TYPES_INI).unwrap()
    }

    #[test]
    fn fixtures_parse() {
        assert!(monitor_store().has_section("monitor"));
        assert_eq!(component_store().options("section").unwrap().len(), 6);
        assert_eq!(
            types_store().get_raw("types", "names").unwrap(),
            Some("alpha beta  gamma")
        );
    }
}
