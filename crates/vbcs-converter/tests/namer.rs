use super::*;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn test_unique_name_skips_visible_names_case_insensitively() {
    let mut registry = NameRegistry::new();
    let visible = names(&["ArgValue", "argvalue1"]);
    assert_eq!(registry.unique_name("argValue", &visible), "argValue2");
}

#[test]
fn test_synthesized_names_never_repeat_in_a_scope() {
    let mut registry = NameRegistry::new();
    let first = registry.unique_name("withBlock", &[]);
    let second = registry.unique_name("withBlock", &[]);
    let third = registry.unique_name("WITHBLOCK", &[]);
    assert_eq!(first, "withBlock");
    assert_eq!(second, "withBlock1");
    assert_eq!(third, "WITHBLOCK2");
}

#[test]
fn test_popped_scope_releases_names() {
    let mut registry = NameRegistry::new();
    registry.reserve("x");
    registry.push_scope();
    assert_eq!(registry.unique_name("loopTo", &[]), "loopTo");
    assert!(registry.is_reserved("x"));
    registry.pop_scope();
    assert!(!registry.is_reserved("loopTo"));
    assert_eq!(registry.depth(), 1);
    registry.pop_scope();
    assert_eq!(registry.depth(), 1);
}
