use vendo_util::process::{CommandBuilder, ProcessError};

#[test]
fn test_builder_simple_command() {
    let output = CommandBuilder::new("echo").arg("hello").run().unwrap();
    assert_eq!(output.exit_code, 0);
    assert_eq!(output.first_line(), Some("hello"));
}

#[test]
fn test_builder_multiple_args() {
    let output = CommandBuilder::new("echo")
        .args(["one", "two", "three"])
        .run()
        .unwrap();
    assert_eq!(output.first_line(), Some("one two three"));
}

#[test]
fn test_builder_with_env() {
    let output = CommandBuilder::new("sh")
        .arg("-c")
        .arg("echo $MY_TEST_VAR")
        .env("MY_TEST_VAR", "vendo_test_value")
        .run()
        .unwrap();
    assert_eq!(output.first_line(), Some("vendo_test_value"));
}

#[test]
fn test_builder_with_cwd() {
    let tmp = tempfile::TempDir::new().unwrap();

    // Write a marker file and verify the command can see it from the cwd.
    let marker = tmp.path().join("vendo_cwd_test.marker");
    std::fs::write(&marker, "ok").unwrap();

    let output = CommandBuilder::new("ls")
        .arg("vendo_cwd_test.marker")
        .cwd(tmp.path().to_str().unwrap())
        .run()
        .unwrap();

    assert!(output
        .first_line()
        .unwrap()
        .contains("vendo_cwd_test.marker"));
}

#[test]
fn test_builder_nonexistent_program() {
    let result = CommandBuilder::new("nonexistent_program_xyz_123").run();
    assert!(matches!(result, Err(ProcessError::Spawn { .. })));
}

#[test]
fn test_failed_command_carries_exit_code_and_output() {
    let err = CommandBuilder::new("sh")
        .arg("-c")
        .arg("echo broken >&2; exit 42")
        .run()
        .unwrap_err();
    match err {
        ProcessError::NonZeroExit { code, output, .. } => {
            assert_eq!(code, 42);
            assert_eq!(output.stderr, vec!["broken"]);
            let rendered = output.to_string();
            assert!(rendered.contains("exit 42"));
            assert!(rendered.contains("broken"));
        }
        other => panic!("expected NonZeroExit, got {other:?}"),
    }
}
