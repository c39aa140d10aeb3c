//! Resource resolution
//!
//! Turns a request shape into the concrete set of (index, doc-kind) pairs
//! the permission check runs against. The resolver trait is implemented by
//! the host against its live catalog; the engine only depends on the
//! contract here.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::authz::matcher;
use crate::authz::request::{ActionRequest, IndexSpec};
use crate::authz::types::{ResourceRef, ALL};

/// The index side of a resolution outcome.
///
/// `All` is the true wildcard ("this action touches everything"), while
/// `None` is the distinct "no local indices" outcome (for example a
/// cross-cluster search with zero local targets): nothing to check, rather
/// than everything to deny.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedIndices {
    All,
    None,
    Named(BTreeSet<String>),
}

/// Resolved targeting of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub indices: ResolvedIndices,
    pub doc_kinds: BTreeSet<String>,
}

impl Resolved {
    /// The all-indices sentinel resolution.
    pub fn all() -> Self {
        Self { indices: ResolvedIndices::All, doc_kinds: [ALL.to_string()].into() }
    }

    pub fn is_all(&self) -> bool {
        matches!(self.indices, ResolvedIndices::All)
    }

    /// True for the explicit nothing-to-check outcome.
    pub fn is_none_sentinel(&self) -> bool {
        matches!(self.indices, ResolvedIndices::None)
    }

    /// Index names as used in matching; the `All` sentinel participates as
    /// the literal `_all` name.
    pub fn index_names(&self) -> Vec<String> {
        match &self.indices {
            ResolvedIndices::All => vec![ALL.to_string()],
            ResolvedIndices::None => Vec::new(),
            ResolvedIndices::Named(names) => names.iter().cloned().collect(),
        }
    }

    pub fn contains_index(&self, name: &str) -> bool {
        match &self.indices {
            ResolvedIndices::All => name == ALL,
            ResolvedIndices::None => false,
            ResolvedIndices::Named(names) => names.contains(name),
        }
    }

    /// Cross product of indices and doc kinds, the working set permission
    /// matching reduces.
    pub fn refs(&self) -> BTreeSet<ResourceRef> {
        let mut refs = BTreeSet::new();
        for index in self.index_names() {
            for doc_kind in &self.doc_kinds {
                refs.insert(ResourceRef::new(index.clone(), doc_kind.clone()));
            }
        }
        refs
    }
}

/// Catalog operations the engine consumes. Implemented by the host against
/// its cluster metadata; all methods are in-memory lookups.
pub trait ResourceResolver: Send + Sync {
    /// Expand an index name, alias or pattern to concrete index names. An
    /// unknown name yields an empty list.
    fn concrete_index_names(&self, pattern: &str) -> Vec<String>;

    /// True if a concrete index or alias with this exact name exists.
    fn has_index_or_alias(&self, name: &str) -> bool;

    /// Expand a date-math expression (`<...>`) to concrete dated names.
    fn resolve_date_math(&self, expression: &str) -> Vec<String> {
        vec![expression.to_string()]
    }

    /// Names of filter-carrying aliases pointing at a concrete index.
    fn filtered_aliases(&self, _index: &str) -> Vec<String> {
        Vec::new()
    }

    /// Index names contained in a snapshot, or `None` if the repository or
    /// snapshot does not exist.
    fn snapshot_indices(&self, _repository: &str, _snapshot: &str) -> Option<Vec<String>> {
        None
    }
}

/// Resolve a request shape against the catalog.
pub fn resolve_request(request: &ActionRequest, resolver: &dyn ResourceResolver) -> Resolved {
    match request {
        ActionRequest::Single(spec)
        | ActionRequest::ClusterSearchShards(spec)
        | ActionRequest::FieldCaps(spec) => resolve_spec(spec, resolver),

        ActionRequest::Bulk(items) => {
            let specs: Vec<IndexSpec> = items
                .iter()
                .map(|item| {
                    let mut spec = IndexSpec::indices([item.index.clone()]);
                    if let Some(doc_kind) = &item.doc_kind {
                        spec.doc_kinds = vec![doc_kind.clone()];
                    }
                    spec
                })
                .collect();
            resolve_union(&specs, resolver)
        }

        ActionRequest::MultiGet(specs)
        | ActionRequest::MultiSearch(specs)
        | ActionRequest::MultiTermVectors(specs) => resolve_union(specs, resolver),

        ActionRequest::Reindex { source, dest } => {
            resolve_union(&[source.clone(), dest.clone()], resolver)
        }

        ActionRequest::AliasesUpdate(alias_actions) => {
            let specs: Vec<IndexSpec> = alias_actions
                .iter()
                .map(|a| IndexSpec::indices([a.index().to_string()]))
                .collect();
            resolve_union(&specs, resolver)
        }

        ActionRequest::CreateIndex { index, .. } => {
            // the index typically does not exist yet; match on the raw name
            let mut indices = BTreeSet::new();
            indices.insert(index.clone());
            Resolved { indices: ResolvedIndices::Named(indices), doc_kinds: [ALL.to_string()].into() }
        }

        // restore resolution runs inside the dedicated sub-evaluator
        ActionRequest::SnapshotRestore(_) => Resolved::all(),

        ActionRequest::Opaque => {
            warn!("request shape cannot expose indices, resolving to _all");
            Resolved::all()
        }
    }
}

fn resolve_union(specs: &[IndexSpec], resolver: &dyn ResourceResolver) -> Resolved {
    let mut union: BTreeSet<String> = BTreeSet::new();
    let mut doc_kinds: BTreeSet<String> = BTreeSet::new();
    let mut saw_none = false;

    for spec in specs {
        let resolved = resolve_spec(spec, resolver);
        doc_kinds.extend(resolved.doc_kinds.iter().cloned());
        match resolved.indices {
            // a single wildcard item collapses the whole batch
            ResolvedIndices::All => {
                return Resolved { indices: ResolvedIndices::All, doc_kinds: normalize_kinds(doc_kinds) };
            }
            ResolvedIndices::None => saw_none = true,
            ResolvedIndices::Named(names) => union.extend(names),
        }
    }

    let indices = if union.is_empty() {
        if saw_none {
            ResolvedIndices::None
        } else {
            ResolvedIndices::All
        }
    } else {
        ResolvedIndices::Named(union)
    };

    Resolved { indices, doc_kinds: normalize_kinds(doc_kinds) }
}

fn resolve_spec(spec: &IndexSpec, resolver: &dyn ResourceResolver) -> Resolved {
    let doc_kinds = normalize_kinds(spec.doc_kinds.iter().cloned().collect());

    if spec.indices.is_empty() || spec.indices.iter().any(|i| i == ALL || i == "*") {
        debug!("no explicit indices in request, assuming all");
        return Resolved { indices: ResolvedIndices::All, doc_kinds };
    }

    // remote-cluster targets (cluster:index) are not local resources
    let local: Vec<&String> = spec.indices.iter().filter(|i| !i.contains(':')).collect();
    if local.is_empty() {
        debug!("only remote indices requested, nothing to check locally");
        return Resolved { indices: ResolvedIndices::None, doc_kinds };
    }

    let mut names = BTreeSet::new();
    for raw in local {
        if matcher::matches("<*>", raw) {
            // date-math expands to concrete dated names, never to patterns
            names.extend(resolver.resolve_date_math(raw));
            continue;
        }
        let concrete = resolver.concrete_index_names(raw);
        if concrete.is_empty() {
            // unknown name: keep the raw value so the permission check still
            // sees what was asked for
            names.insert(raw.clone());
        } else {
            names.extend(concrete);
        }
    }

    if names.is_empty() {
        return Resolved { indices: ResolvedIndices::All, doc_kinds };
    }

    Resolved { indices: ResolvedIndices::Named(names), doc_kinds }
}

fn normalize_kinds(mut doc_kinds: BTreeSet<String>) -> BTreeSet<String> {
    if doc_kinds.is_empty() {
        doc_kinds.insert(ALL.to_string());
    }
    doc_kinds
}
