//! Doc emission: attach comment groups to the defs they document.

use rustc_hash::FxHashSet;

use super::html::comment_to_html;
use super::{DefKey, Doc, DocFormat, Grapher};
use crate::base::{FileId, Span, TextRange};
use crate::hir::ObjectId;
use crate::syntax::{CommentGroup, NodeId, NodeKind};

/// Which comment groups were attached and which defs were documented.
#[derive(Debug, Default)]
struct DocState {
    consumed: FxHashSet<(FileId, TextRange)>,
    seen_objs: FxHashSet<ObjectId>,
    seen_keys: FxHashSet<String>,
}

impl DocState {
    fn consume(&mut self, group: &CommentGroup) {
        self.consumed.insert((group.file, group.range));
    }

    fn consume_all<'g>(&mut self, groups: impl IntoIterator<Item = Option<&'g CommentGroup>>) {
        for group in groups.into_iter().flatten() {
            self.consume(group);
        }
    }
}

impl Grapher<'_> {
    pub(super) fn emit_docs(&mut self) {
        let program = self.program;
        let ast = program.ast();
        let sources = program.sources();

        let mut files: Vec<NodeId> = self.pkg.files.clone();
        files.sort_by_key(|&file| sources.name(ast.file(file)));

        let mut state = DocState::default();
        self.emit_package_doc(&files, &mut state);

        for &file in &files {
            for node in ast.descendants(file) {
                match ast.kind(node) {
                    NodeKind::GenDecl { specs, doc, .. } => {
                        for &spec in specs {
                            self.emit_spec_doc(spec, doc.as_ref(), &mut state);
                        }
                    }
                    NodeKind::FuncDecl { name, doc, .. } => {
                        self.emit_doc_for(&[*name], doc.as_ref(), &mut state);
                    }
                    NodeKind::Field { names, ty, doc, comment } if self.is_member(node) => {
                        state.consume_all([doc.as_ref(), comment.as_ref()]);
                        let group = doc.as_ref().or(comment.as_ref());
                        if names.is_empty() {
                            let embedded = match ast.kind(*ty) {
                                NodeKind::StarExpr { x } => *x,
                                _ => *ty,
                            };
                            self.emit_doc_for(&[embedded], group, &mut state);
                        } else {
                            self.emit_doc_for(names, group, &mut state);
                        }
                    }
                    _ => {}
                }
            }
        }

        self.emit_floating_docs(&files, &state);
    }

    /// Struct fields and interface methods; parameters don't count.
    fn is_member(&self, field: NodeId) -> bool {
        let program = self.program;
        let ast = program.ast();
        let owner = ast.parent(field).and_then(|list| ast.parent(list));
        matches!(
            owner.map(|owner| ast.kind(owner)),
            Some(NodeKind::StructType { .. } | NodeKind::InterfaceType { .. })
        )
    }

    fn emit_package_doc(&mut self, files: &[NodeId], state: &mut DocState) {
        let program = self.program;
        let ast = program.ast();
        let mut texts = Vec::new();
        for &file in files {
            if let NodeKind::File { doc: Some(group), .. } = ast.kind(file) {
                state.consume(group);
                let text = group.text();
                if !text.is_empty() {
                    texts.push(text);
                }
            }
        }
        let key = DefKey::package(self.unit());
        state.seen_keys.insert(key.to_string());
        if texts.is_empty() {
            return;
        }
        let text = texts.join("\n");
        self.push_doc_pair(key, &text, String::new(), Span::default());
    }

    fn emit_spec_doc(&mut self, spec: NodeId, decl_doc: Option<&CommentGroup>, state: &mut DocState) {
        let program = self.program;
        let ast = program.ast();
        let (names, doc, comment) = match ast.kind(spec) {
            NodeKind::ValueSpec {
                names, doc, comment, ..
            } => (names.as_slice(), doc, comment),
            NodeKind::TypeSpec {
                name, doc, comment, ..
            } => (std::slice::from_ref(name), doc, comment),
            // import names have no def to document
            _ => return,
        };
        // every attached group is claimed, used or not
        state.consume_all([doc.as_ref(), decl_doc, comment.as_ref()]);
        let group = doc.as_ref().or(decl_doc).or(comment.as_ref());
        self.emit_doc_for(names, group, state);
    }

    /// Emit the doc of `group` for every def among `names`.
    fn emit_doc_for(&mut self, names: &[NodeId], group: Option<&CommentGroup>, state: &mut DocState) {
        let Some(group) = group else {
            return;
        };
        state.consume(group);
        let text = group.text();
        if text.is_empty() {
            return;
        }

        let pkg = self.pkg;
        for name in names {
            let Some(&obj) = pkg.info.defs.get(name) else {
                continue;
            };
            if !state.seen_objs.insert(obj) {
                continue;
            }
            let Some(entry) = self.def_info(obj) else {
                continue;
            };
            if !state.seen_keys.insert(entry.key.to_string()) {
                tracing::debug!(key = %entry.key, "doc already emitted for key");
                continue;
            }
            let file = self.file_name(group.file);
            self.push_doc_pair(entry.key.clone(), &text, file, group.range.into());
        }
    }

    fn push_doc_pair(&mut self, key: DefKey, text: &str, file: String, span: Span) {
        let unit = self.unit().to_owned();
        self.output.docs.push(Doc {
            def_key: Some(key.clone()),
            unit: unit.clone(),
            format: DocFormat::Html,
            data: comment_to_html(text),
            file: file.clone(),
            span,
        });
        self.output.docs.push(Doc {
            def_key: Some(key),
            unit,
            format: DocFormat::Plaintext,
            data: text.to_owned(),
            file,
            span,
        });
    }

    /// Comment groups nothing claimed become key-less plain-text docs.
    fn emit_floating_docs(&mut self, files: &[NodeId], state: &DocState) {
        let program = self.program;
        let ast = program.ast();
        for &file in files {
            let NodeKind::File { comments, .. } = ast.kind(file) else {
                continue;
            };
            for group in comments {
                if state.consumed.contains(&(group.file, group.range)) {
                    continue;
                }
                let text = group.text();
                if text.is_empty() {
                    continue;
                }
                self.output.docs.push(Doc {
                    def_key: None,
                    unit: self.unit().to_owned(),
                    format: DocFormat::Plaintext,
                    data: text,
                    file: self.file_name(group.file),
                    span: group.range.into(),
                });
            }
        }
    }
}
