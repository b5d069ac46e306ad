use super::*;

#[test]
fn test_names_compare_case_insensitively() {
    assert!(names_equal("Value", "VALUE"));
    assert!(names_equal("[Select]", "select"));
    assert!(!names_equal("value1", "value"));
}

#[test]
fn test_name_key_lookup_by_str() {
    let mut set = NameSet::default();
    set.insert(NameKey::new("argX"));
    assert!(set.contains("argx"));
    assert!(set.contains(NameKey::new("ARGX").as_str()));
}

#[test]
fn test_first_letter_case() {
    assert_eq!(upper_first("value"), "Value");
    assert_eq!(lower_first("Value"), "value");
    assert_eq!(upper_first(""), "");
}

#[test]
fn test_name_set_folds_case_and_brackets() {
    let set = name_set(["Count", "[Select]"]);
    assert_eq!(set.len(), 2);
    assert!(set.contains("count"));
    assert!(set.contains("select"));
    assert!(!set.contains("Count1"));
}
