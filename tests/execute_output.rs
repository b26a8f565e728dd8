// tests/execute_output.rs
mod common;
use crate::common::{init_tracing, sh, with_timeout};

use std::collections::HashMap;
use std::error::Error;

use futures::StreamExt;

use procstream::{CommandDescriptor, Origin, execute, run};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn echo_hello_world_collects_stdout() -> TestResult {
    init_tracing();

    let text = with_timeout(execute(CommandDescriptor::new(["echo", "Hello World"])).collect_output(false)).await?;
    assert_eq!(text.trim(), "Hello World");
    Ok(())
}

#[tokio::test]
async fn stream_ends_cleanly_after_exit_zero() -> TestResult {
    init_tracing();

    let mut stream = execute(sh("printf 'a\\nb\\n'"));
    let mut stdout = Vec::new();
    while let Some(item) = with_timeout(stream.next()).await {
        let chunk = item?;
        assert_eq!(chunk.origin(), Origin::Stdout);
        assert!(!chunk.bytes().is_empty());
        stdout.extend_from_slice(chunk.bytes());
    }

    assert_eq!(stdout, b"a\nb\n".to_vec());
    assert!(stream.is_finished());
    assert!(stream.next().await.is_none(), "stream is not restartable");
    Ok(())
}

#[tokio::test]
async fn injected_environment_is_observed() -> TestResult {
    init_tracing();

    let desc = sh("printf %s \"$GREETING\"").env("GREETING", "hello from env");
    let text = with_timeout(execute(desc).collect_output(false)).await?;
    assert_eq!(text, "hello from env");
    Ok(())
}

#[tokio::test]
async fn replaced_environment_is_passed_exactly() -> TestResult {
    init_tracing();

    let env = HashMap::from([("ONLY_VAR".to_string(), "1".to_string())]);
    let text = with_timeout(run(["env"], Some(env), None).collect_output(false)).await?;
    assert_eq!(text, "ONLY_VAR=1\n");
    Ok(())
}

#[tokio::test]
async fn working_directory_is_observed() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let expected = std::fs::canonicalize(dir.path())?;

    let text = with_timeout(execute(sh("pwd -P").current_dir(dir.path())).collect_output(false)).await?;
    assert_eq!(std::path::PathBuf::from(text.trim()), expected);
    Ok(())
}

#[tokio::test]
async fn stderr_inclusion_is_optional() -> TestResult {
    init_tracing();

    let script = "echo out; echo err >&2";

    let stdout_only = with_timeout(execute(sh(script)).collect_output(false)).await?;
    assert_eq!(stdout_only.trim(), "out");

    let both = with_timeout(execute(sh(script)).collect_output(true)).await?;
    assert!(both.contains("out"));
    assert!(both.contains("err"));
    Ok(())
}

#[tokio::test]
async fn chunks_are_tagged_by_origin() -> TestResult {
    init_tracing();

    let collected = with_timeout(
        execute(sh("printf o1; printf e1 >&2; printf o2; printf e2 >&2")).collect_bytes(),
    )
    .await?;

    // Order within one origin is preserved.
    assert_eq!(collected.stdout, b"o1o2".to_vec());
    assert_eq!(collected.stderr, b"e1e2".to_vec());
    Ok(())
}

#[tokio::test]
async fn stderr_on_success_is_not_an_error() -> TestResult {
    init_tracing();

    let text = with_timeout(execute(sh("echo 'warning: ambiguous destination' >&2; echo ok")).collect_output(true)).await?;
    assert!(text.contains("warning: ambiguous destination"));
    assert!(text.contains("ok"));
    Ok(())
}

#[tokio::test]
async fn run_helper_applies_working_directory() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("marker.txt"), "x")?;

    let text = with_timeout(run(["ls"], None, Some(dir.path().to_path_buf())).collect_output(false)).await?;
    assert_eq!(text.trim(), "marker.txt");
    Ok(())
}

#[tokio::test]
async fn utf8_split_across_chunks_is_decoded() -> TestResult {
    init_tracing();

    // Two separate writes with a pause so the euro sign straddles chunks.
    let script = r"printf '\342\202'; sleep 0.1; printf '\254 end'";
    let text = with_timeout(execute(sh(script)).collect_output(false)).await?;
    assert_eq!(text, "€ end");
    Ok(())
}
