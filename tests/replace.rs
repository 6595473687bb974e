use netre::{Error, Match, Regex, Repl};

#[track_caller]
fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("pattern should compile")
}

#[track_caller]
fn apply(pattern: &str, input: &str, template: &str) -> String {
    re(pattern)
        .replace(input, Repl::Template(template), -1, None)
        .unwrap()
}

#[test]
fn numbered_and_named_substitutions() {
    assert_eq!(
        apply(r"(\w+)=(\w+)", "name=John age=25", "$2 is $1"),
        "John is name 25 is age"
    );
    assert_eq!(
        apply(r"(?<key>\w+)=(?<val>\w+)", "a=1", "${val}:${key}"),
        "1:a"
    );
    assert_eq!(apply("(a)", "a", "${01}"), "a");
}

#[test]
fn whole_match_and_context() {
    assert_eq!(apply("b+", "abba", "<$&>"), "a<bb>a");
    assert_eq!(apply("b+", "abba", "[$`|$']"), "a[a|a]a");
    assert_eq!(apply("b+", "abba", "($_)"), "a(abba)a");
    assert_eq!(apply(r"\d", "a1", "$$$&"), "a$1");
}

#[test]
fn dollar_plus_uses_collapsed_ordering() {
    // the collapsed walk is 0, A, 2, B; the last successful group is B
    assert_eq!(apply("(?<A>a)(?<2>b)(?<B>c)", "abc", "$+"), "c");
    // with no other group, $+ falls back to the whole match
    assert_eq!(apply("ab", "ab", "$+"), "ab");
    // unsuccessful groups are skipped
    assert_eq!(apply("(?<A>a)(?<B>x)?", "a", "$+"), "a");
}

#[test]
fn unresolved_sequences_stay_literal() {
    assert_eq!(apply("a", "a", "$9"), "$9");
    assert_eq!(apply("a", "a", "${nope}"), "${nope}");
    assert_eq!(apply("a", "a", "$x"), "$x");
    assert_eq!(apply("a", "a", "money$"), "money$");
}

#[test]
fn digit_runs_prefer_the_longest_existing_group() {
    // with one group, $12 reads as group 1 then literal 2
    assert_eq!(apply("(b)", "b", "$12"), "b2");
    // with twelve groups it reads as group 12
    let regex = re("(a)(a)(a)(a)(a)(a)(a)(a)(a)(a)(a)(b)");
    let input = "aaaaaaaaaaab";
    assert_eq!(
        regex
            .replace(input, Repl::Template("$12"), -1, None)
            .unwrap(),
        "b"
    );
}

#[test]
fn unsuccessful_groups_substitute_nothing() {
    assert_eq!(apply("(a)|(b)", "ab", "<$1$2>"), "<a><b>");
}

#[test]
fn function_replacement() {
    let regex = re(r"\d+");
    let doubled = regex
        .replace(
            "2 and 7",
            Repl::Function(&|m: &Match| {
                let n: u32 = m.value().parse().unwrap();
                (n * 2).to_string()
            }),
            -1,
            None,
        )
        .unwrap();
    assert_eq!(doubled, "4 and 14");
}

#[test]
fn counts_and_start() {
    let regex = re("a");
    assert_eq!(
        regex.replace("aaaa", Repl::Template("X"), 2, None).unwrap(),
        "XXaa"
    );
    assert_eq!(
        regex.replace("aaaa", Repl::Template("X"), 0, None).unwrap(),
        "aaaa"
    );
    assert_eq!(
        regex
            .replace("aaaa", Repl::Template("X"), -1, Some(2))
            .unwrap(),
        "aaXX"
    );
    assert_eq!(
        regex.replace("aaaa", Repl::Template("X"), -2, None),
        Err(Error::Count { count: -2 })
    );
}

#[test]
fn zero_width_matches_replace_between_characters() {
    assert_eq!(apply("x*", "ab", "-"), "-a-b-");
}

#[test]
fn result_expands_against_one_match() {
    let found = re(r"(?<word>\w+)").find("hello world");
    assert_eq!(found.result("[${word}]").unwrap(), "[hello]");
    assert_eq!(
        Match::empty().result("$&"),
        Err(Error::NoMatch)
    );
}

#[test]
fn escape_round_trips() {
    let raw = "1+1=2? (yes\\no) [#]";
    let escaped = Regex::escape(raw);
    assert_eq!(escaped, "1\\+1=2\\?\\ \\(yes\\\\no\\)\\ \\[\\#]");
    // the escaped form matches the raw text literally
    assert!(Regex::new(&escaped).unwrap().is_match(raw));
    assert_eq!(Regex::unescape(&escaped).unwrap(), raw);

    for s in ["plain", "a.b*c", "tabs\tand (parens)"] {
        let once = Regex::escape(s);
        assert_eq!(Regex::escape(&Regex::unescape(&once).unwrap()), once);
    }
}
