//! Def key uniqueness, ref coverage and the fatal paths of the grapher.

mod common;

use std::collections::HashSet;

use common::{Fixture, graph, try_graph};
use gograph::base::Span;
use gograph::error::GraphError;
use gograph::graph::{DefKeyCache, DefKind, GraphOptions, GraphState, Grapher};
use gograph::hir::{Object, ObjectKind, PackageInfo, Program, ProgramBuilder};
use gograph::syntax::{DeclToken, NodeId, NodeKind};

const SCOPES_SRC: &str = "package p

func init() {
\tx := 1
\t_ = x
}

func init() {
\tx := 2
\t_ = x
}

func _() {
\t{
\t\ty := 0
\t\t_ = y
\t}
\t{
\t\ty := 0
\t\t_ = y
\t}
}

func _() {
\ty := 0
L:
\tfor range []int{} {
\t\tbreak L
\t}
\t_ = y
}
";

/// Two `init`s, two blank functions with sibling blocks, and a label.
fn make_scopes() -> (Program, Vec<PackageInfo>) {
    let mut fx = Fixture::new("example.com/p", "p", "p.go", SCOPES_SRC);
    let file_scope = fx.file_scope();
    let int = fx.b.basic("int");

    let mut decls = Vec::new();

    // func init() { x := N; _ = x }
    for i in 0..2 {
        let scope = fx.b.new_scope(file_scope);
        let init = fx.object("init", i, ObjectKind::Func { scope: Some(scope) }, None, None);
        let x = fx.var("x", i * 2, int, scope);
        let init_id = fx.def("init", i, init);
        let x_id = fx.def("x", i * 2, x);
        let define = fx.wrap(NodeKind::AssignStmt {
            lhs: vec![x_id],
            rhs: vec![],
            define: true,
        });
        let x_use = fx.use_("x", i * 2 + 1, x);
        let blank = fx.blank_assign(i, x_use);
        decls.push(fx.func_decl(init_id, scope, ("()", i), vec![define, blank], None));
    }

    // func _() { { y := 0; _ = y }; { y := 0; _ = y } }
    let blank_scope = fx.b.new_scope(file_scope);
    let blank_fn = fx.object("_", 2, ObjectKind::Func { scope: Some(blank_scope) }, None, None);
    let blank_id = fx.def("_", 2, blank_fn);
    let mut blocks = Vec::new();
    for i in 0..2 {
        let block_scope = fx.b.new_scope(blank_scope);
        let y = fx.var("y", i * 2, int, block_scope);
        let y_id = fx.def("y", i * 2, y);
        let define = fx.wrap(NodeKind::AssignStmt {
            lhs: vec![y_id],
            rhs: vec![],
            define: true,
        });
        let y_use = fx.use_("y", i * 2 + 1, y);
        let blank = fx.blank_assign(3 + i, y_use);
        let block = fx.wrap(NodeKind::BlockStmt {
            stmts: vec![define, blank],
        });
        fx.b.scope_node(block, block_scope);
        blocks.push(block);
    }
    decls.push(fx.func_decl(blank_id, blank_scope, ("()", 2), blocks, None));

    // func _() { y := 0; L: for ... { break L }; _ = y }
    let scope = fx.b.new_scope(file_scope);
    let blank_fn = fx.object("_", 5, ObjectKind::Func { scope: Some(scope) }, None, None);
    let blank_id = fx.def("_", 5, blank_fn);
    let y = fx.var("y", 4, int, scope);
    let y_id = fx.def("y", 4, y);
    let define = fx.wrap(NodeKind::AssignStmt {
        lhs: vec![y_id],
        rhs: vec![],
        define: true,
    });
    let label = fx.ident("L", 0);
    let target = fx.ident("L", 1);
    let branch = fx.node_at(
        "break L",
        0,
        NodeKind::BranchStmt {
            token: "break".into(),
            label: Some(target),
        },
    );
    let for_stmt = fx.wrap(NodeKind::Other {
        label: "RangeStmt".into(),
        children: vec![branch],
    });
    let labeled = fx.wrap(NodeKind::LabeledStmt {
        label,
        stmt: for_stmt,
    });
    let y_use = fx.use_("y", 5, y);
    let blank = fx.blank_assign(6, y_use);
    decls.push(fx.func_decl(blank_id, scope, ("()", 3), vec![define, labeled, blank], None));

    fx.finish(decls, None, vec![])
}

fn offset_of(src: &str, needle: &str, nth: usize) -> usize {
    src.match_indices(needle).nth(nth).unwrap().0
}

#[test]
fn test_def_keys_are_unique() {
    let (program, infos) = make_scopes();
    let output = graph(&program, &infos[0]);

    let keys: HashSet<_> = output.defs.iter().map(|d| d.def_key.to_string()).collect();
    assert_eq!(keys.len(), output.defs.len(), "duplicate keys in {:#?}", output.defs);
}

#[test]
fn test_every_resolved_ident_has_one_ref() {
    let (program, infos) = make_scopes();
    let info = &infos[0].info;
    let output = graph(&program, &infos[0]);
    let ast = program.ast();

    let idents: HashSet<NodeId> = info.defs.keys().chain(info.uses.keys()).copied().collect();
    for ident in idents {
        if ast.ident_name(ident) == Some("_") {
            continue;
        }
        let file = program.sources().name(ast.file(ident));
        let span = Span::from(ast.range(ident));
        let count = output.refs_at(file, span).count();
        assert_eq!(count, 1, "ident {:?} at {span:?}", ast.ident_name(ident));
    }
}

#[test]
fn test_blank_idents_and_labels_are_skipped() {
    let (program, infos) = make_scopes();
    let output = graph(&program, &infos[0]);

    assert!(output.defs.iter().all(|d| d.name != "_"));
    let label_spans = [
        Span::new(
            offset_of(SCOPES_SRC, "L:", 0) as u32,
            offset_of(SCOPES_SRC, "L:", 0) as u32 + 1,
        ),
        Span::new(
            offset_of(SCOPES_SRC, "break L", 0) as u32 + 6,
            offset_of(SCOPES_SRC, "break L", 0) as u32 + 7,
        ),
    ];
    for span in label_spans {
        assert_eq!(output.refs_at("p.go", span).count(), 0);
    }
}

#[test]
fn test_init_functions_are_uniquified() {
    let (program, infos) = make_scopes();
    let output = graph(&program, &infos[0]);

    let first = format!("init$p{}", offset_of(SCOPES_SRC, "init", 0));
    let second = format!("init$p{}", offset_of(SCOPES_SRC, "init", 1));
    let init = output.def(&[first.as_str()]).unwrap();
    assert_eq!(init.kind, DefKind::Func);
    assert!(!init.exported);
    assert!(output.def(&[second.as_str()]).is_some());

    assert!(output.def(&[first.as_str(), "x"]).is_some());
    assert!(output.def(&[second.as_str(), "x"]).is_some());
}

#[test]
fn test_init_def_path_is_not_nested_in_its_own_scope() {
    let (program, infos) = make_scopes();

    // the init func type spans `func init()`, enclosing the name
    let ast = program.ast();
    let name_start = offset_of(SCOPES_SRC, "init", 0) as u32;
    let func_type = infos[0]
        .info
        .scopes
        .keys()
        .copied()
        .find(|&node| {
            matches!(ast.kind(node), NodeKind::FuncType { .. })
                && u32::from(ast.range(node).start()) == offset_of(SCOPES_SRC, "func init", 0) as u32
        })
        .unwrap();
    assert!(ast.range(func_type).contains(name_start.into()));

    let output = graph(&program, &infos[0]);
    let inits: Vec<_> = output.defs.iter().filter(|d| d.name == "init").collect();
    assert_eq!(inits.len(), 2);
    for (i, def) in inits.iter().enumerate() {
        let expected = format!("init$p{}", offset_of(SCOPES_SRC, "init", i));
        assert_eq!(def.def_key.path, vec![expected]);
    }
}

#[test]
fn test_sibling_scopes_are_disambiguated() {
    let (program, infos) = make_scopes();
    let output = graph(&program, &infos[0]);

    // blocks inside the first `func _`
    assert!(output.def(&["_", "$p0", "y"]).is_some());
    assert!(output.def(&["_", "$p1", "y"]).is_some());
    // the second `func _` collides with the first and gets its index
    assert!(output.def(&["_$3", "y"]).is_some());
}

#[test]
fn test_package_def_and_clause_ref() {
    let (program, infos) = make_scopes();
    let output = graph(&program, &infos[0]);

    let pkg = &output.defs[0];
    assert_eq!(pkg.kind, DefKind::Package);
    assert_eq!(pkg.name, "p");
    assert!(pkg.def_key.path.is_empty());
    assert_eq!(pkg.file, ".");

    let clause = Span::new(8, 9);
    let refs: Vec<_> = output.refs_at("p.go", clause).collect();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].def, pkg.def_key);
    assert!(!refs[0].is_def);
}

#[test]
fn test_main_package_paths_are_prefixed_by_file() {
    let src = "package main\n\nvar V int\n\nfunc main() {}\n";
    let mut fx = Fixture::new("example.com/cmd/tool", "main", "cmd/tool/main.go", src);
    let pkg_scope = fx.pkg_scope();
    let file_scope = fx.file_scope();
    let int = fx.b.basic("int");
    let v = fx.var("V", 0, int, pkg_scope);
    let func_scope = fx.b.new_scope(file_scope);
    let main = fx.object(
        "main",
        1,
        ObjectKind::Func {
            scope: Some(func_scope),
        },
        None,
        Some(pkg_scope),
    );

    let v_id = fx.def("V", 0, v);
    let int_obj = fx.b.universe_object("int").unwrap();
    let int_use = fx.use_("int", 0, int_obj);
    let spec = fx.wrap(NodeKind::ValueSpec {
        names: vec![v_id],
        ty: Some(int_use),
        values: vec![],
        doc: None,
        comment: None,
    });
    let var_decl = fx.wrap(NodeKind::GenDecl {
        token: DeclToken::Var,
        specs: vec![spec],
        doc: None,
    });
    let main_id = fx.def("main", 1, main);
    let main_decl = fx.func_decl(main_id, func_scope, ("()", 0), vec![], None);
    let (program, infos) = fx.finish(vec![var_decl, main_decl], None, vec![]);
    let output = graph(&program, &infos[0]);

    assert_eq!(output.defs[0].file, "cmd/tool");
    assert!(output.defs[0].def_key.path.is_empty());
    let v = output.def(&["main.go", "V"]).unwrap();
    assert!(v.exported);
    assert!(output.def(&["main.go", "main"]).is_some());
}

#[test]
fn test_empty_package_is_rejected() {
    let mut b = ProgramBuilder::new();
    b.package("example.com/empty", "empty");
    let (program, infos) = b.build();

    let cache = DefKeyCache::new();
    let grapher = Grapher::new(&program, &infos[0], &cache, GraphOptions::default());
    assert_eq!(grapher.state(), GraphState::Init);
    assert_eq!(
        grapher.graph(),
        Err(GraphError::EmptyPackage {
            path: "example.com/empty".into()
        })
    );
}

#[test]
fn test_duplicate_def_key_is_fatal() {
    let src = "package p\n\nvar x, x int\n";
    let mut fx = Fixture::new("example.com/p", "p", "p.go", src);
    let pkg_scope = fx.pkg_scope();
    let int = fx.b.basic("int");
    // no positions, so the shadowed one cannot be uniquified
    let pkg = fx.pkg;
    let first = fx
        .b
        .object(Object::new("x", ObjectKind::Var).in_package(pkg).typed(int));
    fx.b.declare(pkg_scope, first);
    let second = fx
        .b
        .object(Object::new("x", ObjectKind::Var).in_package(pkg).typed(int));
    fx.b.declare(pkg_scope, second);

    let a = fx.def("x", 0, first);
    let b = fx.def("x", 1, second);
    let spec = fx.wrap(NodeKind::ValueSpec {
        names: vec![a, b],
        ty: None,
        values: vec![],
        doc: None,
        comment: None,
    });
    let decl = fx.wrap(NodeKind::GenDecl {
        token: DeclToken::Var,
        specs: vec![spec],
        doc: None,
    });
    let (program, infos) = fx.finish(vec![decl], None, vec![]);

    let err = try_graph(&program, &infos[0]).unwrap_err();
    assert_eq!(
        err,
        GraphError::DuplicateDefKey {
            key: "example.com/p#x".into(),
            first: Some(first),
            second,
        }
    );
}

#[test]
fn test_defining_a_builtin_is_fatal() {
    let src = "package p\n\nvar len int\n";
    let mut fx = Fixture::new("example.com/p", "p", "p.go", src);
    let len = fx.b.universe_object("len").unwrap();
    let len_id = fx.def("len", 0, len);
    let spec = fx.wrap(NodeKind::ValueSpec {
        names: vec![len_id],
        ty: None,
        values: vec![],
        doc: None,
        comment: None,
    });
    let decl = fx.wrap(NodeKind::GenDecl {
        token: DeclToken::Var,
        specs: vec![spec],
        doc: None,
    });
    let (program, infos) = fx.finish(vec![decl], None, vec![]);

    assert_eq!(
        try_graph(&program, &infos[0]),
        Err(GraphError::UnhandledObjectKind {
            name: "len".into(),
            kind: "builtin",
        })
    );
}
