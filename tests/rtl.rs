use netre::{Options, Regex, Repl};

#[track_caller]
fn rtl(pattern: &str) -> Regex {
    Regex::with_options(pattern, Options::RIGHT_TO_LEFT).expect("pattern should compile")
}

#[track_caller]
fn ltr(pattern: &str) -> Regex {
    Regex::new(pattern).expect("pattern should compile")
}

#[track_caller]
fn spans(regex: &Regex, input: &str) -> Vec<(usize, usize)> {
    regex
        .matches(input)
        .iter()
        .map(|m| (m.index(), m.length()))
        .collect()
}

#[test]
fn searches_from_the_high_end() {
    let found = rtl("a.").find("abcad");
    assert_eq!((found.index(), found.value()), (3, "ad"));
}

#[test]
fn indices_stay_ascending_within_a_match() {
    let found = rtl("ab+").find("xabbby");
    assert_eq!((found.index(), found.length()), (1, 4));
    assert_eq!(found.value(), "abbb");
}

#[test]
fn match_order_is_non_increasing() {
    assert_eq!(spans(&rtl("a"), "aaa"), [(2, 1), (1, 1), (0, 1)]);
    assert_eq!(spans(&rtl(r"\w+"), "one two"), [(4, 3), (0, 3)]);
}

#[test]
fn backreference_before_its_group() {
    // evaluated right to left, the group fills before the reference reads
    let regex = rtl(r"\1?(a)");
    let all = regex.matches("aaa");
    assert_eq!(all[0].value(), "aa");
    assert_eq!(all[0].group("1").unwrap().value(), "a");
    assert_eq!(all[1].value(), "a");
}

#[test]
fn same_matches_as_ltr_in_mirrored_order() {
    for (pattern, input) in [
        (r"\d+", "a12b345c"),
        ("ab+", "zabb abbb"),
        ("a|bc", "abca"),
    ] {
        let mut forward = spans(&ltr(pattern), input);
        let backward = spans(&rtl(pattern), input);
        forward.reverse();
        assert_eq!(forward, backward, "{pattern} on {input}");
    }
}

#[test]
fn absolute_anchors_keep_their_meaning() {
    assert_eq!(spans(&rtl("^a"), "aba"), [(0, 1)]);
    assert_eq!(spans(&rtl("a$"), "aba"), [(2, 1)]);
    let found = rtl("(?<=ab+)c").find("aabbcc");
    assert_eq!((found.index(), found.value()), (4, "c"));
}

#[test]
fn window_start_is_the_high_end() {
    let regex = rtl("a");
    // search [0, 2]: only the first two characters are visible
    let found = regex.find_in("aca", 2, 2);
    assert_eq!(found.index(), 0);
    // a window ending below the last character misses it
    assert!(!regex.find_from("bba", 2).success());
}

#[test]
fn replace_is_textual_left_to_right() {
    let regex = rtl("a");
    // the limit consumes the rightmost matches first
    assert_eq!(
        regex
            .replace("banana", Repl::Template("X"), 2, None)
            .unwrap(),
        "banXnX"
    );
    assert_eq!(
        regex
            .replace("banana", Repl::Template("[$&]"), -1, None)
            .unwrap(),
        "b[a]n[a]n[a]"
    );
}

#[test]
fn split_counts_from_the_right() {
    let regex = rtl(",");
    assert_eq!(
        regex.split("a,b,c", -1, None).unwrap(),
        ["a", "b", "c"]
    );
    // two pieces means one cut, taken at the rightmost separator
    assert_eq!(regex.split("a,b,c", 2, None).unwrap(), ["a,b", "c"]);
}

#[test]
fn previous_match_anchor_walks_leftward() {
    let glued = rtl(r"\w\G");
    let got: Vec<String> = glued
        .matches("ab cd")
        .iter()
        .map(|m| m.value().to_string())
        .collect();
    assert_eq!(got, ["d", "c"]);
}
