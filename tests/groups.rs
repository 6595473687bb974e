use netre::{Match, Options, Regex};

#[track_caller]
fn find(pattern: &str, input: &str) -> Match {
    let found = Regex::new(pattern).expect("pattern should compile").find(input);
    assert!(found.success(), "{pattern} should match {input}");
    found
}

#[track_caller]
fn capture_values<'a>(found: &'a Match, group: &str) -> Vec<&'a str> {
    found
        .group(group)
        .expect("group should exist")
        .captures()
        .iter()
        .map(|capture| capture.value())
        .collect()
}

#[test]
fn numbered_groups_count_opening_parens() {
    let found = find("((a)(b))", "ab");
    assert_eq!(found.group("1").unwrap().value(), "ab");
    assert_eq!(found.group("2").unwrap().value(), "a");
    assert_eq!(found.group("3").unwrap().value(), "b");
}

#[test]
fn every_iteration_is_remembered() {
    let found = find("(a(b)*)*(b)", "aabbbaab");
    assert_eq!((found.index(), found.length()), (0, 8));
    // the last outer iteration gives its `b` back to the final group, and
    // that capture is popped on the way
    assert_eq!(capture_values(&found, "1"), ["a", "abbb", "a", "a"]);
    assert_eq!(capture_values(&found, "2"), ["b", "b", "b"]);
    assert_eq!(capture_values(&found, "3"), ["b"]);
}

#[test]
fn group_accessors_report_the_newest_capture() {
    let found = find("(?<it>a|b)+", "abba");
    let group = found.group("it").unwrap();
    assert!(group.success());
    assert_eq!(group.value(), "a");
    assert_eq!(group.index(), 3);
    assert_eq!(group.length(), 1);
    assert_eq!(capture_values(&found, "it"), ["a", "b", "b", "a"]);
    // the newest capture is the last element of the history
    assert_eq!(group.captures().last().unwrap().value(), group.value());
}

#[test]
fn unmatched_groups_are_unsuccessful() {
    let found = find("(a)|(b)", "b");
    let unmatched = found.group("1").unwrap();
    assert!(!unmatched.success());
    assert_eq!(unmatched.value(), "");
    assert!(unmatched.captures().is_empty());
    assert!(found.group("2").unwrap().success());
}

#[test]
fn duplicate_names_share_one_capture_stack() {
    let found = find("(?<A>x)-(?<A>y)", "x-y");
    assert_eq!(capture_values(&found, "A"), ["x", "y"]);
}

#[test]
fn named_and_numbered_groups_share_a_namespace() {
    // the explicit (?<2>...) collides with the second auto-numbered group
    let found = find("(?<2>a)(b)(c)", "abc");
    assert_eq!(capture_values(&found, "2"), ["a", "c"]);
    assert_eq!(found.group("1").unwrap().value(), "b");
}

#[test]
fn leading_zero_names_refer_to_the_plain_number() {
    let found = find("(a)", "a");
    assert_eq!(found.group("01").unwrap().value(), "a");
    assert_eq!(found.group("1").unwrap().value(), "a");
}

#[test]
fn collapsed_enumeration_order() {
    let regex = Regex::new("(?<A>a)(?<2>b)(?<B>c)").unwrap();
    let names: Vec<&str> = regex.group_names().collect();
    assert_eq!(names, ["0", "A", "2", "B"]);

    let found = regex.find("abc");
    let names: Vec<&str> = found.groups().iter().map(|g| g.name()).collect();
    assert_eq!(names, ["0", "A", "2", "B"]);
}

#[test]
fn explicit_capture_mode() {
    let regex = Regex::with_options("(a)(?<keep>b)", Options::EXPLICIT_CAPTURE).unwrap();
    let names: Vec<&str> = regex.group_names().collect();
    assert_eq!(names, ["0", "keep"]);
    let found = regex.find("ab");
    assert!(found.success());
    assert!(found.group("1").is_none());
    assert_eq!(found.group("keep").unwrap().value(), "b");
}

#[test]
fn captures_inside_lookarounds_are_kept() {
    let found = find(r"(?=(\w+))x", "xyz");
    assert_eq!(found.value(), "x");
    assert_eq!(found.group("1").unwrap().value(), "xyz");
}

#[test]
fn group_zero_is_the_whole_match() {
    let found = find("b+", "abba");
    let zero = found.group("0").unwrap();
    assert_eq!(zero.value(), "bb");
    assert_eq!(zero.index(), 1);
    assert_eq!(found.groups()[0].name(), "0");
}
