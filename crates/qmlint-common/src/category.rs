//! Diagnostic categories.
//!
//! A category is a stable string id used for severity configuration,
//! suppression comments and deduplication. Built-in categories are
//! listed in [`BUILTIN_CATEGORIES`]; plugins contribute their own
//! [`CategoryInfo`] entries with `'static` names.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Severity
// =============================================================================

/// The severity level of a diagnostic, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Get the severity name for display.
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    /// Error or critical.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error | Severity::Critical)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Level
// =============================================================================

/// Configured level of a category: a severity, or disabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Disable,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// `None` when the category is disabled.
    pub fn severity(self) -> Option<Severity> {
        match self {
            Level::Disable => None,
            Level::Info => Some(Severity::Info),
            Level::Warning => Some(Severity::Warning),
            Level::Error => Some(Severity::Error),
            Level::Critical => Some(Severity::Critical),
        }
    }
}

impl From<Severity> for Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => Level::Info,
            Severity::Warning => Level::Warning,
            Severity::Error => Level::Error,
            Severity::Critical => Level::Critical,
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disable" | "disabled" | "ignore" | "off" => Ok(Level::Disable),
            "info" => Ok(Level::Info),
            "warning" | "warn" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "critical" => Ok(Level::Critical),
            other => Err(format!("unknown level '{other}'")),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A diagnostic category id, e.g. `unqualified` or `alias-cycle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Category(&'static str);

impl Category {
    pub const fn new(name: &'static str) -> Self {
        Category(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

/// Registration data of a category.
#[derive(Clone, Copy, Debug)]
pub struct CategoryInfo {
    pub category: Category,
    pub description: &'static str,
    pub default_level: Level,
}

impl CategoryInfo {
    pub const fn new(category: Category, description: &'static str, default_level: Level) -> Self {
        CategoryInfo {
            category,
            description,
            default_level,
        }
    }
}

pub const UNQUALIFIED: Category = Category::new("unqualified");
pub const MISSING_PROPERTY: Category = Category::new("missing-property");
pub const MISSING_ENUM_ENTRY: Category = Category::new("missing-enum-entry");
pub const DEPRECATED: Category = Category::new("deprecated");
pub const ALIAS_CYCLE: Category = Category::new("alias-cycle");
pub const UNRESOLVED_ALIAS: Category = Category::new("unresolved-alias");
pub const INHERITANCE_CYCLE: Category = Category::new("inheritance-cycle");
pub const IMPORT: Category = Category::new("import");
pub const UNUSED_IMPORTS: Category = Category::new("unused-imports");
pub const INVISIBLE_TYPE: Category = Category::new("invisible-type");
pub const UNRESOLVED_TYPE: Category = Category::new("unresolved-type");
pub const UNCREATABLE_TYPE: Category = Category::new("uncreatable-type");
pub const SYNTAX: Category = Category::new("syntax");
pub const DUPLICATE_IDS: Category = Category::new("syntax.duplicate-ids");
pub const ID_QUOTATION: Category = Category::new("syntax.id-quotation");
pub const DUPLICATED_NAME: Category = Category::new("duplicated-name");
pub const INCOMPATIBLE_TYPE: Category = Category::new("incompatible-type");
pub const LITERAL_CONVERSION: Category = Category::new("literal-conversion");
pub const READ_ONLY_PROPERTY: Category = Category::new("read-only-property");
pub const NON_LIST_PROPERTY: Category = Category::new("non-list-property");
pub const SIGNAL_HANDLER_PARAMETERS: Category = Category::new("signal-handler-parameters");
pub const MULTILINE_STRINGS: Category = Category::new("multiline-strings");
pub const COLOR: Category = Category::new("color");
pub const REQUIRED: Category = Category::new("required");
pub const WITH: Category = Category::new("with");
pub const DUPLICATE_PROPERTY_BINDING: Category = Category::new("duplicate-property-binding");
pub const VAR_USED_BEFORE_DECLARATION: Category = Category::new("var-used-before-declaration");
pub const ATTACHED_PROPERTY_REUSE: Category = Category::new("attached-property-reuse");
pub const INTERNAL: Category = Category::new("internal");

/// Every category the engine itself reports, with its default level.
pub const BUILTIN_CATEGORIES: &[CategoryInfo] = &[
    CategoryInfo::new(UNQUALIFIED, "Unqualified access to a member of an outer scope", Level::Warning),
    CategoryInfo::new(MISSING_PROPERTY, "Property, member or signal could not be found", Level::Warning),
    CategoryInfo::new(MISSING_ENUM_ENTRY, "Access to a non-existent enum entry", Level::Warning),
    CategoryInfo::new(DEPRECATED, "Use of deprecated types, properties or methods", Level::Warning),
    CategoryInfo::new(ALIAS_CYCLE, "Alias properties forming a cycle", Level::Warning),
    CategoryInfo::new(UNRESOLVED_ALIAS, "Alias target could not be resolved", Level::Warning),
    CategoryInfo::new(INHERITANCE_CYCLE, "Types inheriting from themselves", Level::Warning),
    CategoryInfo::new(IMPORT, "Failed imports and unknown types", Level::Warning),
    CategoryInfo::new(UNUSED_IMPORTS, "Imports none of whose types are used", Level::Info),
    CategoryInfo::new(INVISIBLE_TYPE, "Types only reachable through indirect imports", Level::Warning),
    CategoryInfo::new(UNRESOLVED_TYPE, "Type of a member could not be resolved", Level::Warning),
    CategoryInfo::new(UNCREATABLE_TYPE, "Instantiation of an uncreatable type", Level::Warning),
    CategoryInfo::new(SYNTAX, "Syntax and naming issues", Level::Warning),
    CategoryInfo::new(DUPLICATE_IDS, "Ids declared more than once in a component", Level::Error),
    CategoryInfo::new(ID_QUOTATION, "Ids written as string literals", Level::Info),
    CategoryInfo::new(DUPLICATED_NAME, "Names declared more than once in the same scope", Level::Warning),
    CategoryInfo::new(INCOMPATIBLE_TYPE, "Values of incompatible type bound to properties", Level::Warning),
    CategoryInfo::new(LITERAL_CONVERSION, "String literals implicitly converted to other types", Level::Info),
    CategoryInfo::new(READ_ONLY_PROPERTY, "Bindings on read-only properties", Level::Warning),
    CategoryInfo::new(NON_LIST_PROPERTY, "Multiple objects assigned to a non-list property", Level::Warning),
    CategoryInfo::new(SIGNAL_HANDLER_PARAMETERS, "Signal handler parameters not matching the signal", Level::Warning),
    CategoryInfo::new(MULTILINE_STRINGS, "String literals spanning several lines", Level::Info),
    CategoryInfo::new(COLOR, "Invalid color literals", Level::Warning),
    CategoryInfo::new(REQUIRED, "Required properties left unset", Level::Warning),
    CategoryInfo::new(WITH, "JavaScript with statements", Level::Warning),
    CategoryInfo::new(
        DUPLICATE_PROPERTY_BINDING,
        "Several interceptors or value sources on one property",
        Level::Warning,
    ),
    CategoryInfo::new(
        VAR_USED_BEFORE_DECLARATION,
        "Variables read before their declaration",
        Level::Warning,
    ),
    CategoryInfo::new(
        ATTACHED_PROPERTY_REUSE,
        "Attached objects created again below an object that already has them",
        Level::Disable,
    ),
    CategoryInfo::new(INTERNAL, "Internal failures of an analysis pass", Level::Critical),
];

/// Look up a built-in category by its id.
pub fn builtin(name: &str) -> Option<&'static CategoryInfo> {
    BUILTIN_CATEGORIES
        .iter()
        .find(|info| info.category.name() == name)
}
