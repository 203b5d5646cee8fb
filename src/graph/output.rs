//! The symbol graph of one package: defs, refs and docs.
//!
//! These are the records downstream consumers persist as JSON, so field
//! names are fixed by serde attributes and must not drift.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::base::Span;

/// Package import path used for universe objects.
pub const BUILTIN_PACKAGE: &str = "builtin";

/// Identity of a definition: owning package plus a hierarchical path.
///
/// Within one graphed package two distinct objects never share a key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DefKey {
    pub package_import_path: String,
    pub path: Vec<String>,
}

impl DefKey {
    pub fn new(package_import_path: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            package_import_path: package_import_path.into(),
            path,
        }
    }

    /// The key of a package itself (empty path).
    pub fn package(import_path: impl Into<String>) -> Self {
        Self::new(import_path, Vec::new())
    }

    /// The key of a universe object.
    pub fn builtin(name: impl Into<String>) -> Self {
        Self::new(BUILTIN_PACKAGE, vec![name.into()])
    }

    /// Path components joined with `/`.
    pub fn joined_path(&self) -> String {
        self.path.join("/")
    }
}

/// `import/path#A/b`, the form used for de-duplication and messages.
impl fmt::Display for DefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.package_import_path, self.joined_path())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefKind {
    Package,
    Const,
    Type,
    Var,
    Func,
    Method,
    Field,
}

impl DefKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DefKind::Package => "package",
            DefKind::Const => "const",
            DefKind::Type => "type",
            DefKind::Var => "var",
            DefKind::Func => "func",
            DefKind::Method => "method",
            DefKind::Field => "field",
        }
    }
}

impl fmt::Display for DefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declaring identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Def {
    pub name: String,
    pub def_key: DefKey,
    pub file: String,
    pub ident_span: Span,
    pub decl_span: Span,
    pub exported: bool,
    pub package_scope: bool,
    pub kind: DefKind,
    /// Receiver type of a method, without its package qualifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// Named struct type a field was declared in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_struct: Option<String>,
    pub type_string: String,
    pub underlying_type_string: String,
}

/// One identifier occurrence pointing at a def.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ref {
    /// Import path of the package the occurrence is in.
    pub unit: String,
    pub file: String,
    pub span: Span,
    pub def: DefKey,
    pub is_def: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocFormat {
    #[serde(rename = "text/html")]
    Html,
    #[serde(rename = "text/plain")]
    Plaintext,
}

impl DocFormat {
    pub fn mime(self) -> &'static str {
        match self {
            DocFormat::Html => "text/html",
            DocFormat::Plaintext => "text/plain",
        }
    }
}

/// Documentation for a def, or a floating comment when `def_key` is
/// absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Doc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub def_key: Option<DefKey>,
    pub unit: String,
    pub format: DocFormat,
    pub data: String,
    pub file: String,
    pub span: Span,
}

/// Everything graphed from one package.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub defs: Vec<Def>,
    pub refs: Vec<Ref>,
    pub docs: Vec<Doc>,
}

impl Output {
    /// Defs whose key path ends with `path`, mostly for lookups in tests
    /// and tooling.
    pub fn def(&self, path: &[&str]) -> Option<&Def> {
        self.defs.iter().find(|d| d.def_key.path == path)
    }

    /// Refs covering exactly `span` in `file`.
    pub fn refs_at<'a>(&'a self, file: &'a str, span: Span) -> impl Iterator<Item = &'a Ref> + 'a {
        self.refs
            .iter()
            .filter(move |r| r.file == file && r.span == span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_def_key_display() {
        let key = DefKey::new("net/http", vec!["Client".into(), "Do".into()]);
        assert_eq!(key.to_string(), "net/http#Client/Do");
        assert_eq!(DefKey::package("net/http").to_string(), "net/http#");
        assert_eq!(DefKey::builtin("len").package_import_path, "builtin");
    }

    #[test]
    fn test_ref_json_shape() {
        let r = Ref {
            unit: "example.com/p".into(),
            file: "p.go".into(),
            span: Span::new(3, 4),
            def: DefKey::new("example.com/p", vec!["A".into()]),
            is_def: true,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Unit": "example.com/p",
                "File": "p.go",
                "Span": [3, 4],
                "Def": { "PackageImportPath": "example.com/p", "Path": ["A"] },
                "IsDef": true
            })
        );
    }

    #[test]
    fn test_doc_format_and_optional_fields() {
        let doc = Doc {
            def_key: None,
            unit: "p".into(),
            format: DocFormat::Plaintext,
            data: "floating\n".into(),
            file: "p.go".into(),
            span: Span::new(0, 11),
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["Format"], "text/plain");
        assert!(json.get("DefKey").is_none());
        assert_eq!(DocFormat::Html.mime(), "text/html");
    }

    #[test]
    fn test_def_omits_empty_optionals() {
        let def = Def {
            name: "x".into(),
            def_key: DefKey::new("p", vec!["x".into()]),
            file: "p.go".into(),
            ident_span: Span::new(4, 5),
            decl_span: Span::new(0, 9),
            exported: false,
            package_scope: true,
            kind: DefKind::Var,
            receiver: None,
            field_of_struct: None,
            type_string: "int".into(),
            underlying_type_string: "int".into(),
        };
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["Kind"], "var");
        assert_eq!(json["PackageScope"], true);
        assert!(json.get("Receiver").is_none());
        let back: Def = serde_json::from_value(json).unwrap();
        assert_eq!(back, def);
    }
}
