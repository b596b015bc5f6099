use monaco::{evaluate, Environment, Value};
use proptest::prelude::*;

/// Lines of directive-free text that do not start with indentation.
fn plain_lines() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9=+*()\\[\\]-][a-z0-9 =+*()\\[\\]-]{0,15}", 0..6)
        .prop_map(|lines| lines.join("\n"))
}

proptest! {
    /// Evaluation returns Ok or Err on arbitrary input but never panics.
    #[test]
    fn evaluate_does_not_panic(s in "\\PC*") {
        let _ = evaluate(&s, &Environment::new());
    }

    /// Directive-heavy soup: blocks may be unbalanced, still no panic.
    #[test]
    fn directive_soup_does_not_panic(
        parts in prop::collection::vec(
            prop_oneof![
                Just("..for:: 0 2\n"),
                Just("..if:: true\n"),
                Just("..ifnot:: x\n"),
                Just("..else::\n"),
                Just("..end::\n"),
                Just("..it::"),
                Just("..x::[..it::]"),
                Just("..define:: x 1\n"),
                Just("..undef:: x\n"),
                Just("a "),
                Just("\n  "),
            ],
            0..12,
        )
    ) {
        let src: String = parts.concat();
        let env: Environment = [("x", vec![1i64, 2])].into_iter().collect();
        let _ = evaluate(&src, &env);
    }

    #[test]
    fn plain_text_passes_through(s in plain_lines()) {
        prop_assert_eq!(evaluate(&s, &Environment::new()).unwrap(), s);
    }

    /// Rendering directive-free output again changes nothing.
    #[test]
    fn rendering_is_idempotent(s in "[a-z0-9 \n=+*()\\[\\]-]{0,60}") {
        let env = Environment::new();
        let once = evaluate(&s, &env).unwrap();
        prop_assert_eq!(evaluate(&once, &env).unwrap(), once);
    }

    #[test]
    fn loop_repeats_body(n in 0i64..40) {
        let out = evaluate(&format!("..for:: 0 {n}\nA\n..end::"), &Environment::new()).unwrap();
        prop_assert_eq!(out, "A".repeat(n as usize));
    }

    #[test]
    fn defined_integer_substitutes(n in 0u32..) {
        let out = evaluate(&format!("..define:: x {n}\n..x::"), &Environment::new()).unwrap();
        prop_assert_eq!(out, n.to_string());
    }

    #[test]
    fn indexing_matches_list(items in prop::collection::vec(any::<i64>(), 1..10), pick in any::<prop::sample::Index>()) {
        let i = pick.index(items.len());
        let env: Environment = [("xs", Value::from(items.clone()))].into_iter().collect();
        let out = evaluate(&format!("..xs::[{i}]"), &env).unwrap();
        prop_assert_eq!(out, items[i].to_string());
    }
}
