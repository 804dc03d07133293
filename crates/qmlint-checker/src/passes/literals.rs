//! Literal values checked for their own well-formedness: enum keys and
//! color strings.

use crate::context::PassContext;
use once_cell::sync::Lazy;
use qmlint_binder::{BindingKind, Literal, ScopeKind};
use qmlint_common::{Diagnostic, FixSuggestion, Span, category, did_you_mean};
use rustc_hash::{FxHashMap, FxHashSet};

const COLOR_TYPE: &str = "QColor";

/// SVG color keywords accepted by `color` properties.
static COLOR_NAMES: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
        "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
        "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue",
        "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
        "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
        "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
        "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
        "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
        "gray", "grey", "green", "greenyellow", "honeydew", "hotpink", "indianred", "indigo",
        "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
        "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
        "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
        "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
        "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
        "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
        "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
        "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
        "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
        "plum", "powderblue", "purple", "red", "rosybrown", "royalblue", "saddlebrown", "salmon",
        "sandybrown", "seagreen", "seashell", "sienna", "silver", "skyblue", "slateblue",
        "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan", "teal", "thistle",
        "tomato", "transparent", "turquoise", "violet", "wheat", "white", "whitesmoke", "yellow",
        "yellowgreen",
    ]
    .into_iter()
    .collect()
});

pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    check_enums(ctx, &mut diagnostics);
    check_colors(ctx, &mut diagnostics);
    diagnostics
}

fn check_enums(ctx: &PassContext<'_>, out: &mut Vec<Diagnostic>) {
    for record in &ctx.tree.enums {
        if ctx.tree.get(record.scope).kind == ScopeKind::InlineComponent {
            out.push(Diagnostic::new(
                category::SYNTAX,
                record.name_span,
                "Enums declared inside of inline component are ignored.",
            ));
        }
        let mut seen: FxHashMap<&str, Span> = FxHashMap::default();
        for (key, span) in &record.keys {
            if let Some(previous) = seen.get(key.as_str()) {
                out.push(
                    Diagnostic::new(
                        category::SYNTAX,
                        *span,
                        format!("Enum key '{key}' has already been declared"),
                    )
                    .with_note(*previous, format!("Note: previous declaration of '{key}' here")),
                );
                continue;
            }
            seen.insert(key, *span);
            if !key.starts_with(|c: char| c.is_uppercase()) {
                out.push(Diagnostic::new(
                    category::SYNTAX,
                    *span,
                    "Enum keys should start with an uppercase.",
                ));
            }
        }
    }
}

/// `#RGB`, `#RRGGBB`, `#AARRGGBB`, `#RRRGGGBBB`, `#RRRRGGGGBBBB` or an SVG
/// color name.
pub fn is_valid_color(text: &str) -> bool {
    match text.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6 | 8 | 9 | 12) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => COLOR_NAMES.contains(text.to_ascii_lowercase().as_str()),
    }
}

fn check_colors(ctx: &PassContext<'_>, out: &mut Vec<Diagnostic>) {
    for binding in &ctx.tree.bindings {
        let BindingKind::Literal(Literal::String { value, .. }) = &binding.value else {
            continue;
        };
        let Some(name) = &binding.name else {
            continue;
        };
        let is_color = ctx
            .binding_property(binding.scope, name)
            .and_then(|p| if p.is_list { None } else { p.ty })
            .is_some_and(|ty| ctx.registry.get(ty).internal_name == COLOR_TYPE);
        if !is_color || is_valid_color(value) {
            continue;
        }
        let mut diagnostic = Diagnostic::new(
            category::COLOR,
            binding.value_span,
            format!("Invalid color \"{value}\""),
        );
        if let Some(suggestion) = did_you_mean(&value.to_ascii_lowercase(), COLOR_NAMES.iter().copied()) {
            let inner = if binding.value_span.len() >= 2 {
                Span::new(binding.value_span.start + 1, binding.value_span.end - 1)
            } else {
                binding.value_span
            };
            diagnostic = diagnostic.with_fix(FixSuggestion::new(
                format!("Did you mean \"{suggestion}\"?"),
                inner,
                suggestion,
            ));
        }
        out.push(diagnostic);
    }
}
