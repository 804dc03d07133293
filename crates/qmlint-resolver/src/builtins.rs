//! Built-in modules embedded in the binary.
//!
//! The descriptor files are compiled in with `include_str!` and exposed as
//! in-memory resource overlays so they resolve exactly like modules found on
//! the search path.

use crate::search_path::ResourceOverlay;

/// An embedded `.qmltypes` file.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedModule {
    /// Module URI (e.g. "QtQuick")
    pub uri: &'static str,
    /// The descriptor file name inside the module directory
    pub file_name: &'static str,
    /// The descriptor content
    pub content: &'static str,
    /// `import` lines of the generated qmldir
    pub reexports: &'static [&'static str],
}

/// Value types every document sees.
pub const MODULE_QML: EmbeddedModule = EmbeddedModule {
    uri: "QML",
    file_name: "builtins.qmltypes",
    content: include_str!("../builtins/QML.qmltypes"),
    reexports: &[],
};

pub const MODULE_QTQML: EmbeddedModule = EmbeddedModule {
    uri: "QtQml",
    file_name: "qtqml.qmltypes",
    content: include_str!("../builtins/QtQml.qmltypes"),
    reexports: &[],
};

pub const MODULE_QTQUICK: EmbeddedModule = EmbeddedModule {
    uri: "QtQuick",
    file_name: "qtquick.qmltypes",
    content: include_str!("../builtins/QtQuick.qmltypes"),
    reexports: &["QtQml"],
};

/// Modules found through the default import path, skipped with `--bare`.
pub const DEFAULT_IMPORT_PATH_MODULES: &[EmbeddedModule] = &[MODULE_QTQML, MODULE_QTQUICK];

pub const BUILTIN_OVERLAY_NAME: &str = "qmlint-builtins";
pub const DEFAULT_IMPORTS_OVERLAY_NAME: &str = "qmlint-imports";

fn add_module(overlay: ResourceOverlay, module: &EmbeddedModule) -> ResourceOverlay {
    let dir = module.uri.replace('.', "/");
    let mut qmldir = format!("module {}\ntypeinfo {}\n", module.uri, module.file_name);
    for reexport in module.reexports {
        qmldir.push_str(&format!("import {reexport} auto\n"));
    }
    overlay
        .with_content(&format!("{dir}/qmldir"), qmldir)
        .with_content(&format!("{dir}/{}", module.file_name), module.content)
}

/// The overlay providing the `QML` value types.
pub fn builtin_overlay() -> ResourceOverlay {
    add_module(ResourceOverlay::new(BUILTIN_OVERLAY_NAME), &MODULE_QML)
}

/// The overlay standing in for the default import path.
pub fn default_imports_overlay() -> ResourceOverlay {
    DEFAULT_IMPORT_PATH_MODULES
        .iter()
        .fold(ResourceOverlay::new(DEFAULT_IMPORTS_OVERLAY_NAME), add_module)
}
