//! Property-based tests for import path resolution and repository URIs.
#![cfg(feature = "proptest")]

use std::collections::HashSet;
use std::sync::Arc;

use gograph::globalize::make_uri;
use gograph::resolve::{ImportResolver, MapContext, TreeLayout, replace_import_path_repo_root};
use proptest::prelude::*;

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// One import path element.
fn arb_elem() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,9}"
}

/// Zero or more trailing elements, each with a leading `/`.
fn arb_rest() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_elem(), 0..4).prop_map(|elems| {
        elems.iter().map(|e| format!("/{e}")).collect::<String>()
    })
}

fn arb_host() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}", prop_oneof![Just("com"), Just("org"), Just("io")])
        .prop_map(|(name, tld)| format!("{name}.{tld}"))
}

fn make_resolver() -> ImportResolver {
    ImportResolver::new(TreeLayout::new("/work/tree"), Arc::new(MapContext::new()))
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_make_uri_drops_scheme_and_git_suffix(
        host in arb_host(),
        path in arb_rest(),
        git in any::<bool>(),
        slash in any::<bool>(),
    ) {
        let uri = format!("{host}{path}");
        let mut clone_url = format!("https://{uri}");
        if git {
            clone_url.push_str(".git");
        }
        if slash {
            clone_url.push('/');
        }
        prop_assert_eq!(make_uri(&clone_url), uri.clone());
        prop_assert_eq!(make_uri(&uri), uri);
    }

    #[test]
    fn prop_repo_root_replacement_keeps_suffix(
        host in arb_host(),
        root_rest in arb_rest(),
        repo in arb_elem(),
        rest in arb_rest(),
    ) {
        let root = format!("{host}{root_rest}");
        let import_path = format!("{root}{rest}");
        let clone_url = format!("https://github.com/{repo}/{repo}.git");
        let unit = replace_import_path_repo_root(&import_path, &root, &clone_url);
        prop_assert_eq!(unit, format!("github.com/{repo}/{repo}{rest}"));
    }

    #[test]
    fn prop_github_paths_clone_from_owner_and_repo(
        owner in arb_elem(),
        repo in arb_elem(),
        rest in arb_rest(),
    ) {
        let import_path = format!("github.com/{owner}/{repo}{rest}");
        let target = make_resolver().resolve(&import_path).unwrap().unwrap();
        prop_assert_eq!(target.to_repo_clone_url, format!("https://github.com/{owner}/{repo}"));
        prop_assert_eq!(target.to_unit, import_path);
    }

    #[test]
    fn prop_golang_x_moves_to_github(repo in arb_elem(), rest in arb_rest()) {
        let target = make_resolver()
            .resolve(&format!("golang.org/x/{repo}{rest}"))
            .unwrap()
            .unwrap();
        prop_assert_eq!(target.to_repo_clone_url, format!("https://github.com/golang/{repo}"));
        prop_assert_eq!(target.to_unit, format!("github.com/golang/{repo}{rest}"));
    }

    #[test]
    fn prop_cache_holds_one_entry_per_resolved_path(
        paths in prop::collection::vec(
            prop_oneof![
                (arb_elem(), arb_elem()).prop_map(|(o, r)| format!("github.com/{o}/{r}")),
                arb_elem(),
                Just("C".to_string()),
            ],
            0..20,
        ),
    ) {
        let resolver = make_resolver();
        let mut resolved = HashSet::new();
        for path in &paths {
            let first = resolver.resolve(path).unwrap();
            prop_assert_eq!(resolver.resolve(path).unwrap(), first.clone());
            if first.is_some() {
                resolved.insert(path.clone());
            }
        }
        prop_assert_eq!(resolver.cache().len(), resolved.len());
    }
}
