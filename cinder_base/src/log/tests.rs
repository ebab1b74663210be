use super::{Message, Severity, SourceLineDisplay};
use crate::source_text::{Location, SourceText};

#[test]
fn message_carries_its_severity_header() {
    let rendered = Message::new(Severity::Error, "something went wrong").to_string();

    assert!(rendered.contains("[error]:"));
    assert!(rendered.contains("something went wrong"));
}

#[test]
fn source_line_display_renders_over_a_source_text() {
    let source = SourceText::new("main.cn", "let x = 1;\nlet y = 2;\n");

    let display =
        SourceLineDisplay::new(&source, Location::new(2, 5), Some("look here")).to_string();

    assert!(display.contains("main.cn"));
    assert!(display.contains("let y = 2;"));
    assert!(display.contains("look here"));
}

#[test]
fn source_line_display_without_help() {
    let source = SourceText::new("main.cn", "x\n");
    let display = SourceLineDisplay::new(&source, Location::new(1, 1), Option::<i32>::None);

    assert!(!display.to_string().contains("help"));
}
