use std::error::Error;
use std::fmt;

use serde::Serialize;

use super::CallFrame;

/// An exception rebuilt from a decoded chain.
///
/// Display-only: its frames are exactly the replayed ones and constructing
/// it never captures a backtrace. `Display` prefixes the originating class
/// with `remote` so it cannot be mistaken for a locally raised error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteException {
    class_name: String,
    message: Option<String>,
    frames: Vec<CallFrame>,
    cause: Option<Box<RemoteException>>,
}

impl RemoteException {
    pub fn new(
        class_name: impl Into<String>,
        message: Option<String>,
        frames: Vec<CallFrame>,
        cause: Option<RemoteException>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            message,
            frames,
            cause: cause.map(Box::new),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn frames(&self) -> &[CallFrame] {
        &self.frames
    }

    pub fn cause(&self) -> Option<&RemoteException> {
        self.cause.as_deref()
    }

    /// Iterates from this exception down to the root cause.
    pub fn chain(&self) -> impl Iterator<Item = &RemoteException> {
        std::iter::successors(Some(self), |e| e.cause.as_deref())
    }

    pub fn root_cause(&self) -> &RemoteException {
        self.chain().last().unwrap_or(self)
    }

    pub(crate) fn append_frames(&mut self, frames: impl IntoIterator<Item = CallFrame>) {
        self.frames.extend(frames);
    }

    /// Renders the whole chain with frames, one `Caused by:` section per
    /// cause. Trailing frames a cause shares with its enclosing exception
    /// are folded into `... N more`.
    pub fn render_trace(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_trace(&mut out);
        out
    }

    /// Streams [`render_trace`](Self::render_trace) output into `out`.
    pub fn write_trace(&self, out: &mut impl fmt::Write) -> fmt::Result {
        writeln!(out, "{self}")?;
        for frame in &self.frames {
            writeln!(out, "\tat {frame}")?;
        }
        let mut enclosing = &self.frames;
        for cause in self.chain().skip(1) {
            let shared = shared_suffix(&cause.frames, enclosing);
            writeln!(out, "Caused by: {cause}")?;
            for frame in &cause.frames[..cause.frames.len() - shared] {
                writeln!(out, "\tat {frame}")?;
            }
            if shared > 0 {
                writeln!(out, "\t... {shared} more")?;
            }
            enclosing = &cause.frames;
        }
        Ok(())
    }
}

fn shared_suffix(frames: &[CallFrame], enclosing: &[CallFrame]) -> usize {
    frames
        .iter()
        .rev()
        .zip(enclosing.iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
}

impl fmt::Display for RemoteException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remote {}", self.class_name)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl Error for RemoteException {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn Error + 'static))
    }
}
