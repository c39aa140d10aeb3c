//! Request shapes the engine can introspect
//!
//! The shapes are a closed set of variants the host constructs when it
//! dispatches an action; no runtime discovery of sub-request structure.
//! Anything the host cannot express is `Opaque` and resolves conservatively
//! to the all-indices sentinel.

use crate::authz::actions;

/// Index/doc-kind targeting of one plain request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSpec {
    /// Raw index names, aliases, patterns or date-math expressions. Entries
    /// containing `:` address remote clusters and are not local resources.
    pub indices: Vec<String>,
    /// Doc-kind names; empty means all
    pub doc_kinds: Vec<String>,
}

impl IndexSpec {
    pub fn indices<I, S>(indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { indices: indices.into_iter().map(Into::into).collect(), doc_kinds: Vec::new() }
    }

    pub fn with_doc_kinds<I, S>(mut self, doc_kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.doc_kinds = doc_kinds.into_iter().map(Into::into).collect();
        self
    }
}

/// Operation carried by one bulk item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOp {
    Create,
    Index,
    Delete,
    Update,
}

impl BulkOp {
    /// The underlying permission this opcode requires.
    pub fn required_permission(self) -> &'static str {
        match self {
            BulkOp::Create | BulkOp::Index => actions::WRITE_INDEX,
            BulkOp::Delete => actions::WRITE_DELETE,
            BulkOp::Update => actions::WRITE_UPDATE,
        }
    }
}

/// One item of a bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItem {
    pub op: BulkOp,
    pub index: String,
    pub doc_kind: Option<String>,
}

impl BulkItem {
    pub fn new(op: BulkOp, index: impl Into<String>) -> Self {
        Self { op, index: index.into(), doc_kind: None }
    }
}

/// One action of an aliases-update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasAction {
    Add { index: String, alias: String },
    Remove { index: String, alias: String },
    /// Removes the backing index itself, which implies delete-index rights
    RemoveIndex { index: String },
}

impl AliasAction {
    pub fn index(&self) -> &str {
        match self {
            AliasAction::Add { index, .. }
            | AliasAction::Remove { index, .. }
            | AliasAction::RemoveIndex { index } => index,
        }
    }
}

/// Snapshot-restore request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSpec {
    pub repository: String,
    pub snapshot: String,
    /// Index patterns to restore; empty means everything in the snapshot
    pub indices: Vec<String>,
    pub include_global_state: bool,
    /// Regex applied to each restored index name
    pub rename_pattern: Option<String>,
    pub rename_replacement: Option<String>,
}

/// The closed set of request shapes the evaluator understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    /// Any plain resource-scoped request (search, get, write, admin, ...)
    Single(IndexSpec),
    /// Bulk write with per-item opcodes
    Bulk(Vec<BulkItem>),
    /// Multi-get batch
    MultiGet(Vec<IndexSpec>),
    /// Multi-search batch
    MultiSearch(Vec<IndexSpec>),
    /// Multi-term-vectors batch
    MultiTermVectors(Vec<IndexSpec>),
    /// Reindex touches both its source and destination
    Reindex { source: IndexSpec, dest: IndexSpec },
    /// Aliases update batch
    AliasesUpdate(Vec<AliasAction>),
    /// Index creation, possibly declaring aliases up front
    CreateIndex { index: String, aliases: Vec<String> },
    /// Shard-targeting search preflight
    ClusterSearchShards(IndexSpec),
    /// Field capabilities / field mappings read
    FieldCaps(IndexSpec),
    /// Snapshot restore
    SnapshotRestore(RestoreSpec),
    /// A shape the host cannot introspect; resolves to all indices
    Opaque,
}

impl ActionRequest {
    /// Narrow the request to the given index subset (the DNFOF rewrite).
    ///
    /// Only request shapes that re-target cleanly support this; returns
    /// false when the shape cannot be rewritten, in which case the caller
    /// must fall back to a plain deny.
    pub fn replace_indices(&mut self, indices: &[String]) -> bool {
        match self {
            ActionRequest::Single(spec)
            | ActionRequest::ClusterSearchShards(spec)
            | ActionRequest::FieldCaps(spec) => {
                spec.indices = indices.to_vec();
                true
            }
            _ => false,
        }
    }

    /// True if the shape tolerates being narrowed to zero indices.
    pub fn supports_empty_rewrite(&self) -> bool {
        matches!(
            self,
            ActionRequest::Single(_) | ActionRequest::ClusterSearchShards(_) | ActionRequest::FieldCaps(_)
        )
    }
}
