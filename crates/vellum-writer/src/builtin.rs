//! Templates compiled into the crate, the last resolver source

/// Built-in macro library
pub const MACROS: &str = "_macros";
/// Default HTML page layout
pub const LAYOUT: &str = "layout";
/// Dump of the render context
pub const DEBUG: &str = "debug";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (MACROS, include_str!("../templates/_macros.hbs")),
    (LAYOUT, include_str!("../templates/layout.hbs")),
    (DEBUG, include_str!("../templates/debug.hbs")),
];

/// Source of a built-in template
pub fn get(name: &str) -> Option<&'static str> {
    lookup(name).map(|(_, source)| source)
}

/// Static name and source of a built-in template
pub fn lookup(name: &str) -> Option<(&'static str, &'static str)> {
    BUILTIN_TEMPLATES.iter().copied().find(|(n, _)| *n == name)
}

/// All built-in templates as `(name, source)`
pub fn all() -> impl Iterator<Item = (&'static str, &'static str)> {
    BUILTIN_TEMPLATES.iter().copied()
}
