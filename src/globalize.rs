//! Package-local graph records to globally keyed ones.
//!
//! A [`DefKey`] names a def by package import path. Consumers outside the
//! graphed tree need the repository and unit that import path resolves
//! to, which is what the [`ImportResolver`] provides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ResolveError};
use crate::graph::{Def, DefKey, Doc, DocFormat, Output, Ref};
use crate::resolve::{ImportResolver, ResolvedTarget, slash_path};

/// Global identity of a def.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalDefKey {
    /// Repository URI; empty for the tree being graphed.
    pub repo: String,
    pub unit: String,
    pub unit_type: String,
    /// Path components joined with `/`, or `.` for a package.
    pub path: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalDef {
    #[serde(flatten)]
    pub key: GlobalDefKey,
    pub tree_path: String,
    pub name: String,
    pub kind: String,
    pub file: String,
    pub def_start: u32,
    pub def_end: u32,
    pub exported: bool,
    pub local: bool,
    pub test: bool,
    /// Go-specific details of the def.
    pub data: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalRef {
    pub def_repo: String,
    pub def_unit_type: String,
    pub def_unit: String,
    pub def_path: String,
    pub def: bool,
    pub unit: String,
    pub file: String,
    pub start: u32,
    pub end: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalDoc {
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub key: Option<GlobalDefKey>,
    pub format: DocFormat,
    pub data: String,
    pub file: String,
    pub start: u32,
    pub end: u32,
    pub doc_unit: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalOutput {
    pub defs: Vec<GlobalDef>,
    pub refs: Vec<GlobalRef>,
    pub docs: Vec<GlobalDoc>,
}

/// What to do when one record fails to convert.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ItemPolicy {
    /// Log, collect the error and keep going.
    #[default]
    Skip,
    /// Stop at the first failure.
    Abort,
}

/// Convert a whole package graph.
///
/// Records whose package has no target are dropped silently. Under
/// [`ItemPolicy::Skip`] the returned vector holds every conversion
/// failure.
pub fn globalize(
    output: &Output,
    resolver: &ImportResolver,
    tree_root: &Path,
    policy: ItemPolicy,
) -> Result<(GlobalOutput, Vec<ConvertError>), ConvertError> {
    let mut global = GlobalOutput::default();
    let mut errors = Vec::new();

    let mut check = |result: Result<(), ConvertError>| -> Result<(), ConvertError> {
        match (result, policy) {
            (Ok(()), _) => Ok(()),
            (Err(err), ItemPolicy::Abort) => Err(err),
            (Err(err), ItemPolicy::Skip) => {
                tracing::warn!(%err, "skipping record");
                errors.push(err);
                Ok(())
            }
        }
    };

    for def in &output.defs {
        check(convert_def(def, resolver, tree_root).map(|d| global.defs.extend(d)))?;
    }
    for r in &output.refs {
        check(convert_ref(r, resolver, tree_root).map(|r| global.refs.extend(r)))?;
    }
    for doc in &output.docs {
        check(convert_doc(doc, resolver, tree_root).map(|d| global.docs.extend(d)))?;
    }
    tracing::debug!(
        defs = global.defs.len(),
        refs = global.refs.len(),
        docs = global.docs.len(),
        skipped = errors.len(),
        "globalized package"
    );
    Ok((global, errors))
}

pub fn convert_def(
    def: &Def,
    resolver: &ImportResolver,
    tree_root: &Path,
) -> Result<Option<GlobalDef>, ConvertError> {
    // some cgo defs have no file
    if def.file.is_empty() {
        return Ok(None);
    }
    let wrap = |source| ConvertError {
        item: "def",
        name: def.name.clone(),
        source,
    };
    let Some(target) = resolver
        .resolve(&def.def_key.package_import_path)
        .map_err(wrap)?
    else {
        return Ok(None);
    };

    let key = global_key(&target, &def.def_key);
    let tree_path = tree_path(&key.path.replace(".go", ""));
    let data = serde_json::json!({
        "PackageImportPath": def.def_key.package_import_path,
        "Exported": def.exported,
        "PkgScope": def.package_scope,
        "Kind": def.kind,
        "Receiver": def.receiver,
        "FieldOfStruct": def.field_of_struct,
        "TypeString": def.type_string,
        "UnderlyingTypeString": def.underlying_type_string,
    });
    Ok(Some(GlobalDef {
        key,
        tree_path,
        name: def.name.clone(),
        kind: def.kind.as_str().to_owned(),
        file: relative_file(tree_root, &def.file),
        def_start: def.decl_span.start,
        def_end: def.decl_span.end,
        exported: def.exported,
        local: !def.exported && !def.package_scope,
        test: def.file.ends_with("_test.go"),
        data,
    }))
}

pub fn convert_ref(
    r: &Ref,
    resolver: &ImportResolver,
    tree_root: &Path,
) -> Result<Option<GlobalRef>, ConvertError> {
    let wrap = |source| ConvertError {
        item: "ref",
        name: r.def.to_string(),
        source,
    };
    let Some(def_target) = resolver.resolve(&r.def.package_import_path).map_err(wrap)? else {
        return Ok(None);
    };
    let Some(unit_target) = resolver.resolve(&r.unit).map_err(wrap)? else {
        return Ok(None);
    };

    let key = global_key(&def_target, &r.def);
    Ok(Some(GlobalRef {
        def_repo: key.repo,
        def_unit_type: key.unit_type,
        def_unit: key.unit,
        def_path: key.path,
        def: r.is_def,
        unit: unit_target.to_unit,
        file: relative_file(tree_root, &r.file),
        start: r.span.start,
        end: r.span.end,
    }))
}

pub fn convert_doc(
    doc: &Doc,
    resolver: &ImportResolver,
    tree_root: &Path,
) -> Result<Option<GlobalDoc>, ConvertError> {
    let wrap = |source: ResolveError| ConvertError {
        item: "doc",
        name: doc
            .def_key
            .as_ref()
            .map_or_else(|| doc.file.clone(), DefKey::to_string),
        source,
    };
    let key = match &doc.def_key {
        Some(def_key) => {
            let Some(target) = resolver
                .resolve(&def_key.package_import_path)
                .map_err(wrap)?
            else {
                return Ok(None);
            };
            Some(global_key(&target, def_key))
        }
        None => None,
    };
    let Some(unit_target) = resolver.resolve(&doc.unit).map_err(wrap)? else {
        return Ok(None);
    };

    Ok(Some(GlobalDoc {
        key,
        format: doc.format,
        data: doc.data.clone(),
        file: relative_file(tree_root, &doc.file),
        start: doc.span.start,
        end: doc.span.end,
        doc_unit: unit_target.to_unit,
    }))
}

fn global_key(target: &ResolvedTarget, key: &DefKey) -> GlobalDefKey {
    GlobalDefKey {
        repo: make_uri(&target.to_repo_clone_url),
        unit: target.to_unit.clone(),
        unit_type: target.to_unit_type.clone(),
        path: path_or_dot(&key.joined_path()),
    }
}

/// Clone URL to repository URI: `https://github.com/a/b.git` becomes
/// `github.com/a/b`. Empty stays empty.
pub fn make_uri(clone_url: &str) -> String {
    let rest = clone_url
        .split_once("://")
        .map_or(clone_url, |(_, rest)| rest);
    let rest = rest.trim_end_matches('/');
    rest.strip_suffix(".git").unwrap_or(rest).to_owned()
}

fn path_or_dot(path: &str) -> String {
    if path.is_empty() {
        ".".to_owned()
    } else {
        path.to_owned()
    }
}

fn tree_path(path: &str) -> String {
    if path.is_empty() || path == "." {
        ".".to_owned()
    } else {
        format!("./{path}")
    }
}

/// `file` relative to `tree_root` when it lies inside it, with `/`
/// separators.
fn relative_file(tree_root: &Path, file: &str) -> String {
    let path = Path::new(file);
    match path.strip_prefix(tree_root) {
        Ok(rel) => slash_path(rel),
        Err(_) => file.replace('\\', "/"),
    }
}
