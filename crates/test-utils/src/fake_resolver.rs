use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use procstream::ExecError;
use procstream::exec::CommandDescriptor;
use procstream::exec::resolver::{ExecutableResolver, ResolveFuture};

/// A resolver with fixed answers that:
/// - maps known command names to the configured paths
/// - reports every other name as not found
/// - records every name it was asked about.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    paths: HashMap<String, PathBuf>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(name.to_string(), path.into());
        self
    }

    /// Names looked up so far, in order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl ExecutableResolver for StaticResolver {
    fn resolve<'a>(&'a self, name: &'a str, _descriptor: &'a CommandDescriptor) -> ResolveFuture<'a> {
        self.lookups.lock().unwrap().push(name.to_string());

        let result = self
            .paths
            .get(name)
            .cloned()
            .ok_or_else(|| ExecError::ExecutableNotFound(name.to_string()));

        Box::pin(async move { result })
    }
}
