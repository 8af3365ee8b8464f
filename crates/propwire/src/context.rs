//! Explicit diagnostic context for submitted tasks.
//!
//! A [`TaskContext`] is a plain value handed to whoever runs the task. It
//! names the worker thread and opens a `tracing` span carrying its fields;
//! nothing is stored in globals or thread-locals.

use std::fmt::Write as _;
use std::io;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskContext {
    name: String,
    fields: Vec<(String, String)>,
}

impl TaskContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// `key=value` pairs joined by spaces, as recorded on the span.
    pub fn render_fields(&self) -> String {
        let mut out = String::new();
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{key}={value}");
        }
        out
    }

    fn span(&self) -> tracing::Span {
        tracing::info_span!("task", name = %self.name, context = %self.render_fields())
    }

    /// Runs `f` on the current thread inside this context's span.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        self.span().in_scope(f)
    }

    /// Runs `f` on a new thread named after this context, inside its span.
    pub fn spawn<F, R>(self, f: F) -> io::Result<JoinHandle<R>>
    where
        F: FnOnce(&TaskContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                let span = self.span();
                let _entered = span.enter();
                f(&self)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_thread_carries_context_name() {
        let ctx = TaskContext::new("decode-worker-1").with_field("queue", "orders");
        let handle = ctx
            .spawn(|ctx| {
                let thread_name = thread::current().name().map(str::to_owned);
                (thread_name, ctx.render_fields())
            })
            .unwrap();
        let (thread_name, fields) = handle.join().unwrap();
        assert_eq!(thread_name.as_deref(), Some("decode-worker-1"));
        assert_eq!(fields, "queue=orders");
    }

    #[test]
    fn in_scope_returns_closure_result() {
        let ctx = TaskContext::new("inline").with_field("a", "1").with_field("b", "2");
        assert_eq!(ctx.render_fields(), "a=1 b=2");
        assert_eq!(ctx.in_scope(|| 41 + 1), 42);
    }
}
