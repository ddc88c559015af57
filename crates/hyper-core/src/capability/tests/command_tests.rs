use crate::capability::command::{CommandInfo, option_value};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_option_value_forms() {
    let a = args(&["--name", "Ada", "--count=3", "--loud"]);
    assert_eq!(option_value(&a, "name"), Some("Ada"));
    assert_eq!(option_value(&a, "count"), Some("3"));
    assert_eq!(option_value(&a, "loud"), Some(""));
    assert_eq!(option_value(&a, "missing"), None);
}

#[test]
fn test_flag_followed_by_option_is_bare() {
    let a = args(&["--loud", "--name", "x"]);
    assert_eq!(option_value(&a, "loud"), Some(""));
}

#[test]
fn test_help_text_includes_usage() {
    let info = CommandInfo::new("hello", "Say hello").with_usage("hello [--name NAME]");
    assert_eq!(info.help_text(), "hello - Say hello\n\nUsage: hello [--name NAME]");
    assert_eq!(CommandInfo::new("x", "y").help_text(), "x - y");
}
