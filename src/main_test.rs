use super::*;

#[test]
fn parse_script_skips_blank_and_comment_lines() {
    let text = r#"
# draw one box
{"type": "pointer_down", "x": 10, "y": 10}
{"type": "pointer_move", "x": 60, "y": 50}

{"type": "pointer_up", "x": 60, "y": 50}
{"type": "wait", "ms": 1200}
"#;
    let inputs = parse_script(text).unwrap();
    assert_eq!(inputs.len(), 4);
    assert_eq!(inputs[3], SessionInput::Wait { ms: 1200 });
}

#[test]
fn parse_script_reports_line_number() {
    let text = "{\"type\": \"delete\"}\n{\"type\": \"pointer_down\"}\n";
    let err = parse_script(text).unwrap_err();
    assert!(matches!(err, CliError::Script { line: 2, .. }), "{err}");
}

#[test]
fn cli_parses_replay_command() {
    let cli = Cli::try_parse_from([
        "annostudio",
        "--autosave-ms",
        "250",
        "replay",
        "--project",
        "p1",
        "--image",
        "i1",
        "--script",
        "events.jsonl",
    ])
    .unwrap();
    assert_eq!(cli.autosave_ms, Some(250));
    assert!(matches!(cli.command, Command::Replay { ref project, .. } if project == "p1"));
}
