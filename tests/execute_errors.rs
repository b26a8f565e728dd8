// tests/execute_errors.rs
mod common;
use crate::common::{StaticResolver, init_tracing, sh, with_timeout, write_script};

use std::error::Error;
use std::sync::Arc;

use futures::StreamExt;

use procstream::{CommandDescriptor, ExecError, ExecOptions, execute, execute_with};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn empty_argument_vector_is_missing_executable() -> TestResult {
    init_tracing();

    let resolver = StaticResolver::new();
    let stream = execute_with(
        CommandDescriptor::new(Vec::<String>::new()),
        ExecOptions::default(),
        Arc::new(resolver.clone()),
    );

    let result = with_timeout(stream.collect_output(true)).await;
    assert_eq!(result, Err(ExecError::MissingExecutable));
    assert!(resolver.lookups().is_empty(), "nothing resolved or spawned");
    Ok(())
}

#[tokio::test]
async fn unknown_command_is_not_found_with_exact_name() -> TestResult {
    init_tracing();

    let name = "procstream-no-such-tool-xyz";
    let result = with_timeout(execute(CommandDescriptor::new([name, "--version"])).collect_output(true)).await;
    assert_eq!(result, Err(ExecError::ExecutableNotFound(name.to_string())));
    Ok(())
}

#[tokio::test]
async fn exit_one_without_stderr() -> TestResult {
    init_tracing();

    let result = with_timeout(execute(sh("exit 1")).collect_output(true)).await;
    assert_eq!(
        result,
        Err(ExecError::NonZeroExit {
            code: 1,
            stderr: String::new(),
        })
    );
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_carries_full_stderr() -> TestResult {
    init_tracing();

    let result = with_timeout(
        execute(sh("echo 'first problem' >&2; echo progress; echo 'second problem' >&2; exit 1"))
            .collect_output(false),
    )
    .await;

    match result {
        Err(err @ ExecError::NonZeroExit { .. }) => {
            assert_eq!(err.exit_code(), Some(1));
            assert_eq!(err.stderr(), Some("first problem\nsecond problem\n"));
        }
        other => panic!("expected NonZeroExit, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn chunks_before_failure_are_still_delivered() -> TestResult {
    init_tracing();

    let mut stream = execute(sh("echo partial; exit 4"));
    let mut seen = Vec::new();
    let mut verdict = None;

    while let Some(item) = with_timeout(stream.next()).await {
        match item {
            Ok(chunk) => seen.extend_from_slice(chunk.bytes()),
            Err(err) => verdict = Some(err),
        }
    }

    assert_eq!(seen, b"partial\n".to_vec());
    assert_eq!(verdict.and_then(|e| e.exit_code()), Some(4));
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn self_inflicted_signal_is_signaled() -> TestResult {
    init_tracing();

    let result = with_timeout(execute(sh("kill -TERM $$")).collect_output(true)).await;
    assert_eq!(result, Err(ExecError::Signaled(15)));
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn absolute_path_is_run_without_lookup() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let script = write_script(dir.path(), "hello.sh", "echo \"hi $1\"")?;
    let path = script.to_string_lossy().into_owned();

    let text = with_timeout(execute(CommandDescriptor::new([path.as_str(), "there"])).collect_output(false)).await?;
    assert_eq!(text, "hi there\n");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn unstartable_file_is_not_found() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("not-executable");
    std::fs::write(&path, "plain text")?;
    let path = path.to_string_lossy().into_owned();

    let result = with_timeout(execute(CommandDescriptor::new([path.as_str()])).collect_output(true)).await;
    assert_eq!(result, Err(ExecError::ExecutableNotFound(path)));
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn custom_resolver_decides_the_program() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let script = write_script(dir.path(), "fake-tool", "echo \"fake $*\"")?;
    let resolver = StaticResolver::new().with("build-tool", script);

    let stream = execute_with(
        CommandDescriptor::new(["build-tool", "-v", "all"]),
        ExecOptions::default(),
        Arc::new(resolver.clone()),
    );

    let text = with_timeout(stream.collect_output(false)).await?;
    assert_eq!(text, "fake -v all\n");
    assert_eq!(resolver.lookups(), vec!["build-tool".to_string()]);

    let missing = execute_with(
        CommandDescriptor::new(["other-tool"]),
        ExecOptions::default(),
        Arc::new(resolver),
    );
    assert_eq!(
        with_timeout(missing.collect_output(false)).await,
        Err(ExecError::ExecutableNotFound("other-tool".to_string()))
    );
    Ok(())
}
