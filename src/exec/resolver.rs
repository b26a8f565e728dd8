// src/exec/resolver.rs

//! Turning a command token into a runnable path.
//!
//! The engine talks to an `ExecutableResolver` rather than searching `PATH`
//! itself, so tests can swap in a resolver with fixed answers.
//!
//! - [`PathResolver`] is the production implementation. Tokens starting with
//!   `/` or `./` are used verbatim; anything else is looked up on `PATH` the
//!   way the `which` utility would.

use std::ffi::OsString;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tracing::debug;

use crate::errors::ExecError;
use crate::exec::CommandDescriptor;

/// Boxed future returned by [`ExecutableResolver::resolve`].
pub type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<PathBuf, ExecError>> + Send + 'a>>;

/// Trait abstracting executable lookup.
///
/// Implementations fail with `ExecError::ExecutableNotFound(name)` carrying
/// the token exactly as it was given.
pub trait ExecutableResolver: Send + Sync {
    fn resolve<'a>(&'a self, name: &'a str, descriptor: &'a CommandDescriptor) -> ResolveFuture<'a>;
}

/// Whether a token bypasses the `PATH` search.
pub fn is_explicit_path(name: &str) -> bool {
    name.starts_with('/') || name.starts_with("./")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl ExecutableResolver for PathResolver {
    fn resolve<'a>(&'a self, name: &'a str, descriptor: &'a CommandDescriptor) -> ResolveFuture<'a> {
        if is_explicit_path(name) {
            return Box::pin(std::future::ready(Ok(PathBuf::from(name))));
        }

        // Search the PATH the child will see, falling back to ours.
        let path_var: Option<OsString> = descriptor
            .env_map()
            .get("PATH")
            .map(OsString::from)
            .or_else(|| std::env::var_os("PATH"));
        let cwd = descriptor
            .cwd()
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok());

        Box::pin(async move {
            let token = name.trim().to_string();
            if token.is_empty() {
                return Err(ExecError::ExecutableNotFound(name.to_string()));
            }

            let lookup = tokio::task::spawn_blocking(move || match cwd {
                Some(cwd) => which::which_in(&token, path_var, cwd),
                None => which::which(&token),
            })
            .await;

            match lookup {
                Ok(Ok(path)) => {
                    debug!(command = %name, path = %path.display(), "resolved executable");
                    Ok(path)
                }
                Ok(Err(e)) => {
                    debug!(command = %name, error = %e, "executable lookup failed");
                    Err(ExecError::ExecutableNotFound(name.to_string()))
                }
                Err(e) => {
                    debug!(command = %name, error = %e, "executable lookup task failed");
                    Err(ExecError::ExecutableNotFound(name.to_string()))
                }
            }
        })
    }
}
