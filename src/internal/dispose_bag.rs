//! Disposal bag for cleanup hooks owned by a scope or the root provider.

use std::future::Future;
use std::pin::Pin;

pub(crate) type BoxFutureUnit = Pin<Box<dyn Future<Output = ()> + Send>>;

type SyncHook = Box<dyn FnOnce() + Send>;
type AsyncHook = Box<dyn FnOnce() -> BoxFutureUnit + Send>;

/// Disposal hooks with LIFO execution order.
#[derive(Default)]
pub(crate) struct DisposeBag {
    sync: Vec<SyncHook>,
    asyncs: Vec<AsyncHook>,
}

impl DisposeBag {
    pub(crate) fn push_sync(&mut self, f: SyncHook) {
        self.sync.push(f);
    }

    pub(crate) fn push_async(&mut self, f: AsyncHook) {
        self.asyncs.push(f);
    }

    /// Detaches the sync hooks in LIFO order so they can run without the
    /// owner's lock held.
    pub(crate) fn take_sync_reverse(&mut self) -> Vec<SyncHook> {
        let mut hooks = std::mem::take(&mut self.sync);
        hooks.reverse();
        hooks
    }

    pub(crate) fn take_async_reverse(&mut self) -> Vec<AsyncHook> {
        let mut hooks = std::mem::take(&mut self.asyncs);
        hooks.reverse();
        hooks
    }

    pub(crate) fn async_len(&self) -> usize {
        self.asyncs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sync.is_empty() && self.asyncs.is_empty()
    }
}

/// Runs detached sync hooks in the order given.
pub(crate) fn run_sync(hooks: Vec<SyncHook>) {
    for hook in hooks {
        hook();
    }
}

/// Runs detached async hooks in the order given.
pub(crate) async fn run_async(hooks: Vec<AsyncHook>) {
    for hook in hooks {
        hook().await;
    }
}
