use super::*;
use crate::ErrorCode;
use sq_ir::Span;

fn sample_diagnostic() -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message("`y` is not defined")
        .with_label(Span::new(8, 9), "not found")
        .with_secondary_label(Span::new(0, 1), "declared here")
        .with_note("at f (line 2)")
}

#[test]
fn test_terminal_emitter_no_color() {
    let mut output = Vec::new();
    let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false);

    emitter.emit(&sample_diagnostic());
    emitter.flush();

    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("error[E2001]: `y` is not defined"));
    assert!(text.contains("--> 8..9"));
    assert!(text.contains("note: at f (line 2)"));
    assert!(!text.contains("\x1b["));
}

#[test]
fn test_terminal_emitter_with_color() {
    let mut output = Vec::new();
    let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Always, false);

    emitter.emit(&sample_diagnostic());
    emitter.flush();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("\x1b["));
    assert!(text.contains("E2001"));
}

#[test]
fn test_snippet_with_source() {
    let mut output = Vec::new();
    let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false)
        .with_source("main.squiggle", "x = 1\nz = x + y\n");

    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_message("`y` is not defined")
        .with_label(Span::new(14, 15), "not found");
    emitter.emit(&diag);
    emitter.flush();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("--> main.squiggle:2:9"));
    assert!(text.contains("2 | z = x + y"));
    assert!(text.contains("  |         ^ not found"));
}

#[test]
fn test_color_mode_resolution() {
    assert!(ColorMode::Auto.should_use_colors(true));
    assert!(!ColorMode::Auto.should_use_colors(false));
    assert!(ColorMode::Always.should_use_colors(false));
    assert!(!ColorMode::Never.should_use_colors(true));
}
