use super::*;

#[test]
fn test_log_format_parse_is_case_insensitive() {
    assert_eq!(LogFormat::parse("TREE"), LogFormat::Tree);
    assert_eq!(LogFormat::parse("json"), LogFormat::Json);
    assert_eq!(LogFormat::parse("Text"), LogFormat::Text);
}

#[test]
fn test_unknown_log_format_falls_back_to_text() {
    assert_eq!(LogFormat::parse(""), LogFormat::Text);
    assert_eq!(LogFormat::parse("bogus"), LogFormat::Text);
}

#[test]
fn test_init_tracing_can_be_called_twice() {
    init_tracing();
    init_tracing();
}
