use crate::store::{DEFAULT_SECTION, Store};

/// Overlay `top` on top of `base`, option by option.
/// Sections only in `top` are added; an option present in both takes
/// `top`'s value. Nothing in `base` is ever removed.
pub fn overlay(base: &mut Store, top: Store) {
    for (key, value) in top.own_items(DEFAULT_SECTION) {
        base.insert(DEFAULT_SECTION, key, value);
    }
    for section in top.sections() {
        base.ensure_section(section);
        for (key, value) in top.own_items(section) {
            base.insert(section, key, value);
        }
    }
}
