use std::collections::HashSet;
use std::error::Error;
use std::ptr;

use super::CallFrame;

/// One link of an exception chain as seen by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub class_name: String,
    pub message: Option<String>,
    pub frames: Vec<CallFrame>,
}

impl Fault {
    pub fn new(class_name: impl Into<String>, message: Option<&str>) -> Self {
        Self {
            class_name: class_name.into(),
            message: message.map(str::to_owned),
            frames: Vec::new(),
        }
    }

    pub fn with_frames(mut self, frames: Vec<CallFrame>) -> Self {
        self.frames = frames;
        self
    }
}

/// Stable handle of a fault inside a [`FaultGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaultId(usize);

#[derive(Debug, Clone)]
struct FaultNode {
    fault: Fault,
    cause: Option<FaultId>,
}

/// Arena of faults linked by cause.
///
/// Cause links are plain handles, so a chain may loop back on itself; the
/// walk in [`FaultGraph::chain`] tolerates that.
#[derive(Debug, Clone, Default)]
pub struct FaultGraph {
    nodes: Vec<FaultNode>,
}

impl FaultGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fault: Fault) -> FaultId {
        let id = FaultId(self.nodes.len());
        self.nodes.push(FaultNode { fault, cause: None });
        id
    }

    /// Pushes `fault` with `cause` as its underlying cause.
    pub fn push_caused_by(&mut self, fault: Fault, cause: FaultId) -> FaultId {
        let id = self.push(fault);
        self.set_cause(id, Some(cause));
        id
    }

    /// Links `id` to `cause`. Handles from another graph are ignored.
    pub fn set_cause(&mut self, id: FaultId, cause: Option<FaultId>) {
        let cause = cause.filter(|c| c.0 < self.nodes.len());
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.cause = cause;
        }
    }

    pub fn get(&self, id: FaultId) -> Option<&Fault> {
        self.nodes.get(id.0).map(|n| &n.fault)
    }

    pub fn cause_of(&self, id: FaultId) -> Option<FaultId> {
        self.nodes.get(id.0).and_then(|n| n.cause)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks cause links from `head`, outermost first.
    ///
    /// Each fault is visited at most once and at most `max_depth` faults are
    /// yielded; reaching an already visited fault ends the chain.
    pub fn chain(&self, head: FaultId, max_depth: usize) -> ChainWalk<'_> {
        ChainWalk {
            graph: self,
            next: Some(head),
            visited: HashSet::new(),
            remaining: max_depth,
            stop: None,
        }
    }

    /// Captures a native error and its `source()` chain, outermost first.
    ///
    /// The class name is the leading identifier of the error's `Debug` form
    /// (the type or variant name for derived impls); the message is its
    /// `Display` form. Native errors carry no frames. A `source()` that
    /// returns an error already captured becomes a cause link back to it,
    /// and at most `max_depth` errors are captured.
    pub fn from_error(err: &(dyn Error + 'static), max_depth: usize) -> (Self, FaultId) {
        let mut graph = FaultGraph::new();
        let mut seen: Vec<*const ()> = Vec::new();
        let mut loops_to = None;
        let mut current = Some(err);
        while let Some(e) = current {
            let addr = (e as *const dyn Error).cast::<()>();
            if let Some(index) = seen.iter().position(|p| ptr::addr_eq(*p, addr)) {
                loops_to = Some(FaultId(index));
                break;
            }
            if seen.len() == max_depth {
                tracing::warn!(
                    limit = max_depth,
                    "error source chain exceeds depth bound, truncated"
                );
                break;
            }
            seen.push(addr);
            let message = e.to_string();
            let id = graph.push(Fault {
                class_name: debug_class_name(e),
                message: (!message.is_empty()).then_some(message),
                frames: Vec::new(),
            });
            if id.0 > 0 {
                graph.set_cause(FaultId(id.0 - 1), Some(id));
            }
            current = e.source();
        }

        if graph.is_empty() {
            let head = graph.push(Fault::new("Error", None));
            return (graph, head);
        }
        if let Some(target) = loops_to {
            graph.set_cause(FaultId(graph.len() - 1), Some(target));
        }
        (graph, FaultId(0))
    }
}

fn debug_class_name(err: &dyn Error) -> String {
    let debug = format!("{err:?}");
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if name.is_empty() {
        "Error".to_owned()
    } else {
        name
    }
}

/// Why a [`ChainWalk`] ended before the cause chain did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStop {
    /// A fault that was already visited.
    Cycle(FaultId),
    /// The depth bound.
    DepthLimit,
}

/// Iterator returned by [`FaultGraph::chain`].
pub struct ChainWalk<'a> {
    graph: &'a FaultGraph,
    next: Option<FaultId>,
    visited: HashSet<FaultId>,
    remaining: usize,
    stop: Option<ChainStop>,
}

impl ChainWalk<'_> {
    /// Set once the walk has been cut short.
    pub fn stop(&self) -> Option<ChainStop> {
        self.stop
    }
}

impl<'a> Iterator for ChainWalk<'a> {
    type Item = (FaultId, &'a Fault);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        if self.visited.contains(&id) {
            self.next = None;
            self.stop = Some(ChainStop::Cycle(id));
            return None;
        }
        if self.remaining == 0 {
            self.next = None;
            self.stop = Some(ChainStop::DepthLimit);
            return None;
        }
        let fault = self.graph.get(id)?;
        self.visited.insert(id);
        self.remaining -= 1;
        self.next = self.graph.cause_of(id);
        Some((id, fault))
    }
}
