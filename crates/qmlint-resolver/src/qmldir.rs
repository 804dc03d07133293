//! `qmldir` module descriptor parsing.

use qmlint_parser::ast::Version;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QmldirComponent {
    pub name: String,
    pub version: Option<Version>,
    pub file: String,
    pub singleton: bool,
    pub internal: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QmldirImport {
    pub uri: String,
    pub version: Option<Version>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Qmldir {
    pub module: Option<String>,
    pub typeinfos: Vec<String>,
    pub depends: Vec<QmldirImport>,
    /// `import` lines: modules re-exported by this one.
    pub imports: Vec<QmldirImport>,
    pub plugins: Vec<String>,
    pub components: Vec<QmldirComponent>,
    /// `Name 1.0 file.js` entries.
    pub scripts: Vec<(String, String)>,
}

/// `auto` and a missing version both mean "any version".
fn parse_version(text: Option<&str>) -> Option<Version> {
    text.filter(|t| *t != "auto").and_then(Version::parse)
}

fn is_version(text: &str) -> bool {
    text == "auto" || text.chars().next().is_some_and(|c| c.is_ascii_digit())
}

impl Qmldir {
    pub fn parse(content: &str) -> Qmldir {
        let mut qmldir = Qmldir::default();
        for line in content.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let words: Vec<&str> = line.split_whitespace().collect();
            let Some((&keyword, rest)) = words.split_first() else {
                continue;
            };
            match keyword {
                "module" => qmldir.module = rest.first().map(|s| s.to_string()),
                "typeinfo" => qmldir.typeinfos.extend(rest.first().map(|s| s.to_string())),
                "depends" => {
                    if let Some(uri) = rest.first() {
                        qmldir.depends.push(QmldirImport {
                            uri: uri.to_string(),
                            version: parse_version(rest.get(1).copied()),
                        });
                    }
                }
                "import" => {
                    if let Some(uri) = rest.first() {
                        qmldir.imports.push(QmldirImport {
                            uri: uri.to_string(),
                            version: parse_version(rest.get(1).copied()),
                        });
                    }
                }
                "plugin" => qmldir.plugins.extend(rest.first().map(|s| s.to_string())),
                "optional" if rest.first() == Some(&"plugin") => {
                    qmldir.plugins.extend(rest.get(1).map(|s| s.to_string()));
                }
                "singleton" | "internal" => {
                    if let Some(component) = Self::parse_component(rest) {
                        qmldir.components.push(QmldirComponent {
                            singleton: keyword == "singleton",
                            internal: keyword == "internal",
                            ..component
                        });
                    }
                }
                "classname" | "designersupported" | "static" | "system" | "prefer"
                | "linktarget" | "optional" | "default" => {}
                _ => {
                    if let Some(component) = Self::parse_component(&words) {
                        if component.file.ends_with(".js") || component.file.ends_with(".mjs") {
                            qmldir.scripts.push((component.name, component.file));
                        } else {
                            qmldir.components.push(component);
                        }
                    }
                }
            }
        }
        qmldir
    }

    /// `Name [version] File.qml`
    fn parse_component(words: &[&str]) -> Option<QmldirComponent> {
        let (name, version, file) = match words {
            [name, version, file] if is_version(version) => (*name, parse_version(Some(version)), *file),
            [name, file] => (*name, None, *file),
            _ => return None,
        };
        Some(QmldirComponent {
            name: name.to_string(),
            version,
            file: file.to_string(),
            singleton: false,
            internal: false,
        })
    }

    /// Names declared more than once with the same version but different
    /// files.
    pub fn ambiguous_components(&self) -> Vec<&QmldirComponent> {
        let mut ambiguous: Vec<&QmldirComponent> = Vec::new();
        for (i, component) in self.components.iter().enumerate() {
            let clash = self.components[..i].iter().any(|earlier| {
                earlier.name == component.name
                    && earlier.version == component.version
                    && earlier.file != component.file
            });
            if clash && !ambiguous.iter().any(|c| c.name == component.name) {
                ambiguous.push(component);
            }
        }
        ambiguous
    }
}
