//! Built-in diagnostic passes.
//!
//! Every pass is a plain function from a [`PassContext`] to diagnostics;
//! it never mutates the scope tree and never sees the output of another
//! pass.
//!
//! [`PassContext`]: crate::context::PassContext

pub mod alias;
pub mod attached_reuse;
pub mod declaration_order;
pub mod deprecation;
pub mod imports;
pub mod inheritance;
pub mod literals;
pub mod member_access;
pub mod required;
pub mod type_compat;
pub mod uncreatable;
pub mod unqualified;
pub mod value_sources;
pub mod visibility;

use crate::registry::PassEntry;
use qmlint_common::category;

pub fn builtin_passes() -> Vec<PassEntry> {
    vec![
        PassEntry::new("unqualified", &[category::UNQUALIFIED], unqualified::check),
        PassEntry::new(
            "member-access",
            &[category::MISSING_PROPERTY, category::MISSING_ENUM_ENTRY],
            member_access::check,
        ),
        PassEntry::new(
            "type-compatibility",
            &[
                category::INCOMPATIBLE_TYPE,
                category::LITERAL_CONVERSION,
                category::MISSING_PROPERTY,
                category::READ_ONLY_PROPERTY,
                category::NON_LIST_PROPERTY,
            ],
            type_compat::check,
        ),
        PassEntry::new(
            "aliases",
            &[category::ALIAS_CYCLE, category::UNRESOLVED_ALIAS, category::SYNTAX],
            alias::check,
        )
        .per_component(),
        PassEntry::new("inheritance-cycles", &[category::INHERITANCE_CYCLE], inheritance::check),
        PassEntry::new("deprecation", &[category::DEPRECATED], deprecation::check),
        PassEntry::new("unused-imports", &[category::UNUSED_IMPORTS], imports::check),
        PassEntry::new("literals", &[category::SYNTAX, category::COLOR], literals::check),
        PassEntry::new("invisible-types", &[category::INVISIBLE_TYPE], visibility::check),
        PassEntry::new("required-properties", &[category::REQUIRED], required::check).per_component(),
        PassEntry::new("uncreatable-types", &[category::UNCREATABLE_TYPE], uncreatable::check),
        PassEntry::new(
            "value-sources",
            &[category::DUPLICATE_PROPERTY_BINDING, category::INCOMPATIBLE_TYPE],
            value_sources::check,
        ),
        PassEntry::new(
            "declaration-order",
            &[category::VAR_USED_BEFORE_DECLARATION],
            declaration_order::check,
        ),
        PassEntry::new(
            "attached-property-reuse",
            &[category::ATTACHED_PROPERTY_REUSE],
            attached_reuse::check,
        ),
    ]
}
