//! One graph run over a program.
//!
//! A [`GraphSession`] owns the caches of a run: the [`DefKeyCache`] and,
//! through its [`ImportResolver`], the resolve cache. Both live exactly as
//! long as the session, so separate runs never share state.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{ConvertError, GraphError};
use crate::globalize::{GlobalOutput, ItemPolicy, globalize};
use crate::graph::{DefKeyCache, GraphOptions, Grapher, Output};
use crate::hir::{PackageInfo, Program};
use crate::resolve::ImportResolver;

pub struct GraphSession<'p> {
    program: &'p Program,
    options: GraphOptions,
    def_keys: DefKeyCache,
    resolver: Arc<ImportResolver>,
}

impl<'p> GraphSession<'p> {
    pub fn new(program: &'p Program, resolver: Arc<ImportResolver>) -> Self {
        Self {
            program,
            options: GraphOptions::default(),
            def_keys: DefKeyCache::new(),
            resolver,
        }
    }

    pub fn with_options(mut self, options: GraphOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn program(&self) -> &'p Program {
        self.program
    }

    #[inline]
    pub fn resolver(&self) -> &ImportResolver {
        &self.resolver
    }

    #[inline]
    pub fn def_keys(&self) -> &DefKeyCache {
        &self.def_keys
    }

    /// Graph a single package.
    #[tracing::instrument(skip_all, fields(pkg = %self.program.package(pkg.pkg).path))]
    pub fn graph_package(&self, pkg: &PackageInfo) -> Result<Output, GraphError> {
        Grapher::new(self.program, pkg, &self.def_keys, self.options).graph()
    }

    /// Graph packages in parallel. Results come back in input order; a
    /// failing package does not stop the others.
    pub fn graph_packages(&self, pkgs: &[PackageInfo]) -> Vec<Result<Output, GraphError>> {
        pkgs.par_iter().map(|pkg| self.graph_package(pkg)).collect()
    }

    /// Make a package's output global, resolving through the session's
    /// resolver.
    pub fn globalize(
        &self,
        output: &Output,
        policy: ItemPolicy,
    ) -> Result<(GlobalOutput, Vec<ConvertError>), ConvertError> {
        globalize(output, &self.resolver, self.tree_root(), policy)
    }

    fn tree_root(&self) -> &Path {
        self.resolver.layout().root()
    }
}
