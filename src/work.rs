//! The work capability and its three lifetime-specific implementations.
//!
//! Each variant writes one fixed line to a [`WorkOutput`] sink when asked to
//! do work. The variants are identical apart from that line; which lifetime
//! they live under is decided at registration time, see
//! [`configure_services`](crate::startup::configure_services).

use std::sync::Arc;

use parking_lot::Mutex;

use crate::traits::Dispose;
use crate::Lifetime;

/// Capability shared by every work service.
pub trait WorkService: Send + Sync {
    /// Writes this variant's line to its output sink.
    fn do_work(&self);

    /// The lifetime this variant is registered under.
    fn lifetime(&self) -> Lifetime;
}

/// Line-oriented sink the work services write to.
pub trait WorkOutput: Send + Sync {
    fn write_line(&self, line: &str);

    /// Called when a work service holding this sink is disposed.
    fn disposed(&self, _lifetime: Lifetime) {}
}

/// Writes to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl WorkOutput for ConsoleOutput {
    fn write_line(&self, line: &str) {
        println!("{line}");
    }
}

/// Records every line in memory.
///
/// # Examples
///
/// ```
/// use service_lifetimes::{MemoryOutput, WorkOutput};
///
/// let output = MemoryOutput::new();
/// output.write_line("first");
/// output.write_line("second");
/// assert_eq!(output.lines(), ["first", "second"]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryOutput {
    lines: Mutex<Vec<String>>,
    disposed: Mutex<Vec<Lifetime>>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Removes and returns the lines written so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    /// Lifetimes of the work services disposed so far, in disposal order.
    pub fn disposed_lifetimes(&self) -> Vec<Lifetime> {
        self.disposed.lock().clone()
    }
}

impl WorkOutput for MemoryOutput {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_owned());
    }

    fn disposed(&self, lifetime: Lifetime) {
        self.disposed.lock().push(lifetime);
    }
}

/// Work service meant to be created on every resolution.
pub struct TransientService {
    output: Arc<dyn WorkOutput>,
}

impl TransientService {
    pub const MESSAGE: &'static str = "Transient service is doing work.";

    pub fn new(output: Arc<dyn WorkOutput>) -> Self {
        Self { output }
    }
}

impl WorkService for TransientService {
    fn do_work(&self) {
        tracing::trace!(lifetime = %Lifetime::Transient, "doing work");
        self.output.write_line(Self::MESSAGE);
    }

    fn lifetime(&self) -> Lifetime {
        Lifetime::Transient
    }
}

/// Work service meant to live for one scope.
pub struct ScopedService {
    output: Arc<dyn WorkOutput>,
}

impl ScopedService {
    pub const MESSAGE: &'static str = "Scoped service is doing work.";

    pub fn new(output: Arc<dyn WorkOutput>) -> Self {
        Self { output }
    }
}

impl WorkService for ScopedService {
    fn do_work(&self) {
        tracing::trace!(lifetime = %Lifetime::Scoped, "doing work");
        self.output.write_line(Self::MESSAGE);
    }

    fn lifetime(&self) -> Lifetime {
        Lifetime::Scoped
    }
}

impl Dispose for ScopedService {
    fn dispose(&self) {
        tracing::debug!(lifetime = %Lifetime::Scoped, "work service disposed");
        self.output.disposed(Lifetime::Scoped);
    }
}

/// Work service meant to be shared by the whole process.
pub struct SingletonService {
    output: Arc<dyn WorkOutput>,
}

impl SingletonService {
    pub const MESSAGE: &'static str = "Singleton service is doing work.";

    pub fn new(output: Arc<dyn WorkOutput>) -> Self {
        Self { output }
    }
}

impl WorkService for SingletonService {
    fn do_work(&self) {
        tracing::trace!(lifetime = %Lifetime::Singleton, "doing work");
        self.output.write_line(Self::MESSAGE);
    }

    fn lifetime(&self) -> Lifetime {
        Lifetime::Singleton
    }
}

impl Dispose for SingletonService {
    fn dispose(&self) {
        tracing::debug!(lifetime = %Lifetime::Singleton, "work service disposed");
        self.output.disposed(Lifetime::Singleton);
    }
}
