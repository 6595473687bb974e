use netre::{Error, Options, Regex};

#[track_caller]
fn fails(pattern: &str) -> Error {
    Regex::new(pattern).expect_err("pattern should be rejected")
}

#[test]
fn unbalanced_delimiters() {
    assert!(matches!(fails("(ab"), Error::UnexpectedEnd { .. }));
    assert_eq!(
        fails("ab)cd"),
        Error::Unexpected {
            pos: 2,
            found: ")".to_string()
        }
    );
    assert!(matches!(fails("[abc"), Error::UnexpectedEnd { .. }));
    assert!(matches!(fails("(?#no end"), Error::UnexpectedEnd { .. }));
    assert!(matches!(fails("[]"), Error::Unexpected { pos: 1, .. }));
}

#[test]
fn repetition_errors() {
    assert_eq!(
        fails("a{3,2}"),
        Error::RepetitionBounds {
            pos: 1,
            min: 3,
            max: 2
        }
    );
    assert_eq!(fails("*a"), Error::DanglingRepetition { pos: 0 });
    assert_eq!(fails("a|+b"), Error::DanglingRepetition { pos: 2 });
    assert_eq!(fails("({2})"), Error::DanglingRepetition { pos: 1 });
    assert!(matches!(fails("a**"), Error::DoubleRepetition { .. }));
    assert!(matches!(fails("a*??"), Error::DoubleRepetition { .. }));
    assert!(matches!(fails("a+{2}"), Error::DoubleRepetition { .. }));
}

#[test]
fn escape_errors() {
    assert_eq!(fails(r"a\q"), Error::InvalidEscape { pos: 1, lit: 'q' });
    assert!(matches!(fails(r"\x4"), Error::InvalidHex { .. }));
    assert!(matches!(fails(r"\xgg"), Error::InvalidHex { .. }));
    assert!(matches!(fails(r"\u12"), Error::InvalidHex { .. }));
    assert!(matches!(fails(r"\c1"), Error::InvalidControl { .. }));
    assert!(matches!(fails(r"[\q]"), Error::InvalidEscape { .. }));
}

#[test]
fn group_name_errors() {
    assert!(matches!(fails("(?<>x)"), Error::GroupName { .. }));
    assert!(matches!(fails("(?<1a>x)"), Error::GroupName { .. }));
    // leading-zero names refer, they never define
    assert!(matches!(fails("(?<01>x)"), Error::GroupName { .. }));
    assert!(matches!(fails("(?<0>x)"), Error::GroupName { .. }));
    // but an explicit plain number is a legal name
    assert!(Regex::new("(?<2>x)").is_ok());
}

#[test]
fn undefined_references() {
    assert!(matches!(fails(r"\k<missing>"), Error::UndefinedGroup { .. }));
    // 8 and 9 cannot fall back to octal
    assert!(matches!(fails(r"\8"), Error::UndefinedGroup { .. }));
    assert!(matches!(fails(r"(a)\9"), Error::UndefinedGroup { .. }));
    // a numbered conditional predicate must name a group
    assert!(matches!(fails("(?(7)a|b)"), Error::ConditionalGroup { .. }));
    // balancing must subtract an existing group
    assert!(matches!(fails("(?<-X>a)"), Error::UndefinedGroup { .. }));
}

#[test]
fn resolution_is_deferred_until_the_whole_pattern_is_known() {
    // every referenced group appears later in the pattern
    assert!(Regex::new(r"\1(a)").is_ok());
    assert!(Regex::new(r"\k<late>(?<late>x)").is_ok());
    assert!(Regex::new("(?<-X>a)(?<X>b)").is_ok());
    assert!(Regex::new("(?(X)a|b)(?<X>c)").is_ok());
}

#[test]
fn flag_errors() {
    assert_eq!(fails("(?q)a"), Error::UnknownFlag { pos: 2, flag: 'q' });
    assert!(matches!(fails("(?)"), Error::UnknownFlag { .. } | Error::Unexpected { .. }));
    assert_eq!(
        Options::parse("z"),
        Err(Error::UnknownFlag { pos: 0, flag: 'z' })
    );
}

#[test]
fn class_range_errors() {
    assert!(matches!(fails("[z-a]"), Error::ClassRange { .. }));
    assert!(matches!(fails(r"[a-\d]"), Error::ClassRange { .. }));
}

#[test]
fn conditional_shape_errors() {
    // a conditional has at most two branches
    assert!(matches!(fails("(?(x)a|b|c)"), Error::Unexpected { .. }));
}

#[test]
fn errors_abort_construction() {
    // no partial engine: the constructor returns the error by value
    let err = Regex::new("(a|b").unwrap_err();
    assert!(!format!("{err}").is_empty());
}
