//! Grammar and semantic-rule coverage, organized by production.

use tomlet::{parse, Value};

fn ok(input: &str) -> Value {
    match parse(input) {
        Ok(value) => value,
        Err(err) => panic!("expected `{input}` to parse, got: {err}"),
    }
}

fn fails(input: &str) {
    assert!(parse(input).is_err(), "expected `{input}` to fail");
}

fn str_at(doc: &Value, key: &str) -> String {
    doc.get(key)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("missing string key `{key}`"))
        .to_string()
}

mod keys {
    use super::*;

    #[test]
    fn bare_keys() {
        let doc = ok("key = 1\nbare-key_2 = 2\n1234 = 3\n");
        assert_eq!(doc.get("1234").and_then(Value::as_integer), Some(3));
        assert_eq!(doc.get("bare-key_2").and_then(Value::as_integer), Some(2));
    }

    #[test]
    fn quoted_keys() {
        let doc = ok("\"with space\" = 1\n'lit.key' = 2\n\"\" = 3\n");
        assert_eq!(doc.get("with space").and_then(Value::as_integer), Some(1));
        assert_eq!(doc.get("lit.key").and_then(Value::as_integer), Some(2));
        assert_eq!(doc.get("").and_then(Value::as_integer), Some(3));
    }

    #[test]
    fn quoted_and_bare_name_the_same_path() {
        fails("\"a\" = 1\na = 2\n");
    }

    #[test]
    fn dotted_keys_with_whitespace() {
        let doc = ok("a . b . c = 1\n");
        let c = doc
            .get("a")
            .and_then(|a| a.get("b"))
            .and_then(|b| b.get("c"));
        assert_eq!(c.and_then(Value::as_integer), Some(1));
    }

    #[test]
    fn missing_pieces() {
        fails("= 1\n");
        fails("a\n");
        fails("a =\n");
        fails("a . = 1\n");
    }
}

mod strings {
    use super::*;

    #[test]
    fn basic_escapes() {
        let doc = ok(r#"s = "a\tb\nc\"d\\e\bf\rg\fh""#);
        assert_eq!(str_at(&doc, "s"), "a\tb\nc\"d\\e\u{8}f\rg\u{c}h");
    }

    #[test]
    fn unicode_escapes() {
        let doc = ok(r#"s = "\u0041\U0001F600""#);
        assert_eq!(str_at(&doc, "s"), "A\u{1F600}");
    }

    #[test]
    fn bad_escapes() {
        fails(r#"s = "\x41""#);
        fails(r#"s = "\u12""#);
        fails(r#"s = "\ud800abcd""#); // surrogate
        fails(r#"s = "\U00110000""#); // beyond U+10FFFF
        fails("s = \"unterminated");
    }

    #[test]
    fn control_characters_are_rejected() {
        fails("s = \"a\u{1}b\"\n");
        fails("s = \"a\u{7f}b\"\n");
        fails("s = 'a\u{1}b'\n");
        // Tab is the one permitted control character.
        ok("s = \"a\tb\"\n");
        ok("s = 'a\tb'\n");
    }

    #[test]
    fn single_line_strings_reject_newlines() {
        fails("s = \"a\nb\"\n");
        fails("s = 'a\nb'\n");
    }

    #[test]
    fn literal_strings_take_content_verbatim() {
        let doc = ok(r#"s = 'C:\Users\nobody'"#);
        assert_eq!(str_at(&doc, "s"), r"C:\Users\nobody");
    }

    #[test]
    fn multiline_quote_counting() {
        // One and two embedded quotes need no escaping.
        let doc = ok("s = \"\"\"one \" two \"\" end\"\"\"\n");
        assert_eq!(str_at(&doc, "s"), "one \" two \"\" end");
        // Four and five closing quotes leave one and two content quotes.
        let doc = ok("s = \"\"\"x\"\"\"\"\n");
        assert_eq!(str_at(&doc, "s"), "x\"");
        let doc = ok("s = \"\"\"x\"\"\"\"\"\n");
        assert_eq!(str_at(&doc, "s"), "x\"\"");
        fails("s = \"\"\"x\"\"\"\"\"\"\n");
    }

    #[test]
    fn quotes_after_a_closed_multiline_string_are_unrelated() {
        // A four-quote close followed by other quoted content is not a
        // six-quote run.
        let doc = ok("a = [\"\"\"x\"\"\"\",\"y\"]\n");
        let a = doc.get("a").and_then(Value::as_array).unwrap();
        assert_eq!(a[0].as_str(), Some("x\""));
        assert_eq!(a[1].as_str(), Some("y"));

        let doc = ok("a = ['''x'''','y']\n");
        let a = doc.get("a").and_then(Value::as_array).unwrap();
        assert_eq!(a[0].as_str(), Some("x'"));
        assert_eq!(a[1].as_str(), Some("y"));
    }

    #[test]
    fn multiline_literal_quote_counting() {
        let doc = ok("s = '''can't'''\n");
        assert_eq!(str_at(&doc, "s"), "can't");
        let doc = ok("s = '''x''''\n");
        assert_eq!(str_at(&doc, "s"), "x'");
        fails("s = '''x''''''\n");
    }

    #[test]
    fn multiline_preserves_interior_newlines() {
        let doc = ok("s = \"\"\"a\nb\r\nc\"\"\"\n");
        assert_eq!(str_at(&doc, "s"), "a\nb\r\nc");
        let doc = ok("s = '''a\nb'''\n");
        assert_eq!(str_at(&doc, "s"), "a\nb");
    }

    #[test]
    fn multiline_rejects_bare_carriage_return() {
        fails("s = \"\"\"a\rb\"\"\"\n");
        fails("s = '''a\rb'''\n");
    }

    #[test]
    fn line_ending_backslash_swallows_whitespace() {
        let doc = ok("s = \"\"\"start\\\n\n   \t  end\"\"\"\n");
        assert_eq!(str_at(&doc, "s"), "startend");
        // A backslash with content after it on the same line is an escape.
        fails("s = \"\"\"a\\ b\"\"\"\n");
    }

    #[test]
    fn multiline_strings_are_not_keys() {
        fails("\"\"\"k\"\"\" = 1\n");
    }
}

mod numbers {
    use super::*;

    fn int_at(doc: &Value, key: &str) -> i64 {
        doc.get(key).and_then(Value::as_integer).unwrap()
    }

    #[test]
    fn decimal_integers() {
        let doc = ok("a = 99\nb = +17\nc = -5\nd = 0\ne = -0\nf = 1_000_000\n");
        assert_eq!(int_at(&doc, "a"), 99);
        assert_eq!(int_at(&doc, "b"), 17);
        assert_eq!(int_at(&doc, "c"), -5);
        assert_eq!(int_at(&doc, "d"), 0);
        assert_eq!(int_at(&doc, "e"), 0);
        assert_eq!(int_at(&doc, "f"), 1_000_000);
    }

    #[test]
    fn integer_bases() {
        let doc = ok("b = 0b1101\no = 0o777\nx = 0xDEAD_beef\nz = 0x0\n");
        assert_eq!(int_at(&doc, "b"), 13);
        assert_eq!(int_at(&doc, "o"), 0o777);
        assert_eq!(int_at(&doc, "x"), 0xDEAD_BEEF);
        assert_eq!(int_at(&doc, "z"), 0);
    }

    #[test]
    fn base_prefixes_are_lowercase_only() {
        fails("x = 0X1\n");
        fails("b = 0B1\n");
        fails("o = 0O7\n");
    }

    #[test]
    fn signs_are_decimal_only() {
        fails("x = -0x1\n");
        fails("x = +0o1\n");
    }

    #[test]
    fn leading_zeros_are_rejected() {
        fails("a = 01\n");
        fails("a = 007\n");
        fails("a = -01\n");
        fails("a = 0_1\n");
        ok("a = 0\nb = 0.1\nc = 0e9\n");
    }

    #[test]
    fn underscore_placement() {
        fails("a = _1\n");
        fails("a = 1_\n");
        fails("a = 1__2\n");
        fails("a = 1._5\n");
        fails("a = 1_.5\n");
        fails("a = 1e_5\n");
        fails("a = 1e5_\n");
        fails("a = 0x_1\n");
        ok("a = 1_2.3_4e5_6\n");
    }

    #[test]
    fn integer_range() {
        let doc = ok("max = 9223372036854775807\nmin = -9223372036854775808\n");
        assert_eq!(int_at(&doc, "max"), i64::MAX);
        assert_eq!(int_at(&doc, "min"), i64::MIN);
        fails("a = 9223372036854775808\n");
        fails("a = -9223372036854775809\n");
    }

    #[test]
    fn floats() {
        let doc = ok("a = 1.0\nb = 3.14\nc = -0.01\nd = 5e22\ne = 1e6\nf = -2E-2\ng = 6.626e-34\n");
        assert_eq!(doc.get("b").and_then(Value::as_float), Some(3.14));
        assert_eq!(doc.get("d").and_then(Value::as_float), Some(5e22));
        assert_eq!(doc.get("f").and_then(Value::as_float), Some(-0.02));
    }

    #[test]
    fn floats_need_digits_on_both_sides() {
        fails("a = .5\n");
        fails("a = 7.\n");
        fails("a = 3.e+20\n");
        fails("a = +.5\n");
        fails("a = 1e\n");
        fails("a = 1e+\n");
    }

    #[test]
    fn number_followed_by_junk() {
        fails("a = 1b\n");
        fails("a = 1.5x\n");
        fails("a = 0x\n");
    }
}

mod datetimes {
    use super::*;

    fn dt(doc: &Value, key: &str) -> tomlet::Datetime {
        *doc.get(key).and_then(Value::as_datetime).unwrap()
    }

    #[test]
    fn four_variants() {
        let doc = ok(concat!(
            "odt = 1979-05-27T07:32:00Z\n",
            "ldt = 1979-05-27T07:32:00\n",
            "ld = 1979-05-27\n",
            "lt = 07:32:00\n",
        ));
        assert!(dt(&doc, "odt").is_offset_datetime());
        assert!(dt(&doc, "ldt").is_local_datetime());
        assert!(dt(&doc, "ld").is_local_date());
        assert!(dt(&doc, "lt").is_local_time());
    }

    #[test]
    fn separator_and_offset_spellings() {
        let doc = ok(concat!(
            "a = 1979-05-27t07:32:00z\n",
            "b = 1979-05-27 07:32:00-05:00\n",
        ));
        assert!(dt(&doc, "a").is_offset_datetime());
        assert_eq!(dt(&doc, "b").offset_minutes(), Some(-300));
    }

    #[test]
    fn fractional_seconds() {
        let doc = ok("a = 07:32:00.9999999999\n");
        assert_eq!(dt(&doc, "a").nanosecond(), Some(999_999_999));
        fails("a = 07:32:00.\n");
    }

    #[test]
    fn invalid_dates_do_not_become_numbers() {
        fails("a = 2001-02-29T00:00:00Z\n");
        fails("a = 1979-05-32\n");
        fails("a = 1979-13-01\n");
        fails("a = 24:00:00\n");
        fails("a = 07:61:00\n");
        fails("a = 1979-05-27T07:32\n");
    }

    #[test]
    fn seconds_are_required() {
        fails("a = 07:32\n");
    }
}

mod arrays {
    use super::*;

    #[test]
    fn arrays_allow_trivia_and_trailing_commas() {
        let doc = ok("a = [\n  1, # one\n  2,\n  # a stray comment\n  3,\n]\n");
        let a = doc.get("a").and_then(Value::as_array).unwrap();
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn arrays_may_mix_types() {
        let doc = ok("a = [1, \"two\", 3.0, true, 1979-05-27, [4], { x = 5 }]\n");
        let a = doc.get("a").and_then(Value::as_array).unwrap();
        assert_eq!(a.len(), 7);
        assert!(a[4].is_datetime());
        assert!(a[6].is_table());
    }

    #[test]
    fn empty_array() {
        let doc = ok("a = []\nb = [ ]\nc = [\n]\n");
        assert_eq!(doc.get("a").and_then(Value::as_array).map(Vec::len), Some(0));
        assert_eq!(doc.get("c").and_then(Value::as_array).map(Vec::len), Some(0));
    }

    #[test]
    fn malformed_arrays() {
        fails("a = [1 2]\n");
        fails("a = [1,,2]\n");
        fails("a = [1\n");
        fails("a = [,]\n");
    }
}

mod inline_tables {
    use super::*;

    #[test]
    fn basics() {
        let doc = ok("p = { x = 1, y = 2 }\nempty = {}\n");
        let p = doc.get("p").unwrap();
        assert_eq!(p.get("x").and_then(Value::as_integer), Some(1));
        assert!(doc.get("empty").and_then(Value::as_table).unwrap().is_empty());
    }

    #[test]
    fn no_newlines_inside() {
        fails("p = { x = 1,\n y = 2 }\n");
        fails("p = {\n}\n");
    }

    #[test]
    fn no_trailing_comma() {
        fails("p = { x = 1, }\n");
        fails("p = { , }\n");
    }

    #[test]
    fn duplicate_keys_inside() {
        fails("p = { x = 1, x = 2 }\n");
    }

    #[test]
    fn nested() {
        let doc = ok("p = { q = { r = 1 } }\n");
        let r = doc
            .get("p")
            .and_then(|p| p.get("q"))
            .and_then(|q| q.get("r"));
        assert_eq!(r.and_then(Value::as_integer), Some(1));
    }
}

mod structure {
    use super::*;

    #[test]
    fn value_must_end_its_line() {
        fails("a = 1 b = 2\n");
        fails("a = 1 2\n");
        ok("a = 1 # trailing comment\n");
        ok("a = 1"); // end of input is fine
    }

    #[test]
    fn header_must_end_its_line() {
        fails("[a] x = 1\n");
        ok("[a] # comment\nx = 1\n");
    }

    #[test]
    fn malformed_headers() {
        fails("[]\n");
        fails("[ ]\n");
        fails("[a\n");
        fails("[a]]\n");
        fails("[[a]\n");
        fails("[a..b]\n");
    }

    #[test]
    fn crlf_is_accepted_bare_cr_is_not() {
        ok("a = 1\r\nb = 2\r\n");
        fails("a = 1\rb = 2\n");
    }

    #[test]
    fn comments_reject_control_characters() {
        fails("# bad \u{1} comment\na = 1\n");
        ok("# fine \t comment\na = 1\n");
    }
}

mod semantics {
    use super::*;

    // Rule 1: no path may be assigned twice.
    #[test]
    fn no_reassignment() {
        fails("a = 1\na = 2\n");
        fails("a.b = 1\na.b = 2\n");
        fails("[t]\nx = 1\nx = 2\n");
    }

    // Rule 2: explicit tables cannot be redefined.
    #[test]
    fn no_explicit_redefinition() {
        fails("[a]\n[a]\n");
        fails("[a.b]\n[a.b]\n");
    }

    // Rule 3: supertables may be filled in later, once.
    #[test]
    fn supertable_after_subtable() {
        ok("[a.b]\n[a]\n");
        fails("[a]\n[a.b]\n[a]\n");
    }

    // Rule 4: a dotted key closes its parent against headers.
    #[test]
    fn dotted_key_parent_cannot_become_a_header() {
        fails("a.b = 1\n[a]\n");
        fails("[t]\na.b = 1\n[t.a]\n");
    }

    // Rule 5: but deeper headers through it stay legal.
    #[test]
    fn dotted_key_parent_extends() {
        ok("a.b = 1\n[a.c]\nx = 1\n");
    }

    // Rule 6: arrays of tables are not tables.
    #[test]
    fn array_of_tables_conflicts() {
        fails("[[a]]\n[a]\n");
        fails("[a]\n[[a]]\n");
        fails("a = [1]\n[[a]]\n");
        ok("[[a]]\n[[a]]\n[[a]]\n");
    }

    // Rule 7: definitions are scoped to their header.
    #[test]
    fn keys_are_scoped_to_their_header() {
        ok("[a]\nx = 1\n[b]\nx = 1\n");
        ok("[[t]]\nx = 1\n[[t]]\nx = 1\n");
    }

    // Rule 8: inline tables are closed.
    #[test]
    fn inline_tables_are_closed() {
        fails("a = { x = 1 }\na.y = 2\n");
        fails("a = { x = 1 }\n[a.y]\n");
        fails("a = {}\n[a]\n");
    }

    #[test]
    fn values_cannot_be_traversed() {
        fails("a = 1\na.b = 2\n");
        fails("a = 1\n[a.b]\n");
        fails("a = \"s\"\n[a]\n");
    }

    #[test]
    fn subtables_inside_array_of_tables_elements() {
        let doc = ok(concat!(
            "[[fruit]]\nname = \"apple\"\n",
            "[fruit.physical]\ncolor = \"red\"\n",
            "[[fruit.variety]]\nname = \"red delicious\"\n",
            "[[fruit.variety]]\nname = \"granny smith\"\n",
            "[[fruit]]\nname = \"banana\"\n",
            "[[fruit.variety]]\nname = \"plantain\"\n",
        ));
        let fruit = doc.get("fruit").and_then(Value::as_array).unwrap();
        assert_eq!(fruit.len(), 2);
        assert_eq!(
            fruit[0]
                .get("physical")
                .and_then(|p| p.get("color"))
                .and_then(Value::as_str),
            Some("red")
        );
        assert_eq!(
            fruit[0].get("variety").and_then(Value::as_array).map(Vec::len),
            Some(2)
        );
        assert_eq!(
            fruit[1].get("variety").and_then(Value::as_array).map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn header_through_array_descends_into_last_element() {
        let doc = ok("[[a]]\nn = 1\n[[a]]\nn = 2\n[a.sub]\nx = 3\n");
        let a = doc.get("a").and_then(Value::as_array).unwrap();
        assert!(a[0].get("sub").is_none());
        assert_eq!(
            a[1].get("sub").and_then(|s| s.get("x")).and_then(Value::as_integer),
            Some(3)
        );
    }
}
