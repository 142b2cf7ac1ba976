use tokio::task::JoinHandle;

/// Registration of the provider change listeners of one connected session.
///
/// Dropping the guard deregisters the listeners.
#[derive(Debug)]
pub(crate) struct ListenerGuard {
    generation: u64,
    task: JoinHandle<()>,
}

impl ListenerGuard {
    pub(crate) fn new(generation: u64, task: JoinHandle<()>) -> Self {
        Self { generation, task }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        trace!(generation = self.generation, "deregistering provider listeners");
        self.task.abort();
    }
}
