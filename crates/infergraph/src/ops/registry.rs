//! Process-wide operator repository.
//!
//! Two-phase lifecycle: `register` fills a *known* mapping during the
//! initialization window; the first `OpType::parse` of a name moves it into
//! the *interned* table and assigns the next index of the append-only entry
//! vector. Indices are stable for the process lifetime and the vector never
//! reorders, so `OpType` comparison and dispatch are plain integer ops.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::kernel::{CollectorBox, Target};
use crate::tensor::Tensor;

use super::{InferResult, Operator};

/// Shape-inference routine of one operator kind.
pub type InferFn = fn(&Operator, &[Tensor]) -> InferResult;

/// Builds the kernel-candidate collector of one operator kind for a target.
pub type CollectorFactory = fn(&Operator, Target) -> CollectorBox;

struct OpEntry {
    name: &'static str,
    infer: InferFn,
    collector: CollectorFactory,
}

#[derive(Default)]
struct OpRepo {
    table: Vec<OpEntry>,
    interned: HashMap<&'static str, usize>,
    known: HashMap<String, (InferFn, CollectorFactory)>,
}

static OP_REPO: Lazy<RwLock<OpRepo>> = Lazy::new(|| RwLock::new(OpRepo::default()));

/// Adds an operator kind to the known mapping.
///
/// Panics when the name was already registered or interned; duplicate
/// registration is a programmer error during the init window.
pub fn register(name: &str, infer: InferFn, collector: CollectorFactory) {
    let mut repo = OP_REPO.write().unwrap();
    let duplicate = repo.interned.contains_key(name) || repo.known.contains_key(name);
    if duplicate {
        // Release the guard so the panic cannot poison the repository.
        drop(repo);
        panic!("operator \"{name}\" already registered");
    }
    repo.known.insert(name.to_string(), (infer, collector));
}

/// Interned operator kind; a plain index into the process-wide table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpType {
    id: usize,
}

impl OpType {
    /// Resolves a name to its stable id, interning it on first use.
    ///
    /// Panics on names that were never registered: such a model references
    /// an operator this build does not carry.
    pub fn parse(name: &str) -> OpType {
        let mut repo = OP_REPO.write().unwrap();
        if let Some(&id) = repo.interned.get(name) {
            return OpType { id };
        }
        if let Some((infer, collector)) = repo.known.remove(name) {
            let id = repo.table.len();
            // Entries are append-only for the process lifetime, so the
            // leaked name is the stable string the id resolves to.
            let name: &'static str = Box::leak(name.to_string().into_boxed_str());
            repo.table.push(OpEntry {
                name,
                infer,
                collector,
            });
            repo.interned.insert(name, id);
            return OpType { id };
        }
        // Release the guard so the panic cannot poison the repository.
        drop(repo);
        panic!("unknown operator \"{name}\"");
    }

    pub fn id(self) -> usize {
        self.id
    }

    /// The name this id was interned under.
    pub fn name(self) -> &'static str {
        OP_REPO.read().unwrap().table[self.id].name
    }

    pub fn is(self, name: &str) -> bool {
        self.name() == name
    }

    pub(super) fn infer_fn(self) -> InferFn {
        OP_REPO.read().unwrap().table[self.id].infer
    }

    pub(super) fn collector_factory(self) -> CollectorFactory {
        OP_REPO.read().unwrap().table[self.id].collector
    }
}
