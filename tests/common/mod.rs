#![allow(dead_code)]

pub use procstream_test_utils::{StaticResolver, init_tracing, with_timeout, write_script};

use procstream::CommandDescriptor;

/// `sh -c <script>` with the current environment.
pub fn sh(script: &str) -> CommandDescriptor {
    CommandDescriptor::new(["sh", "-c", script])
}
