//! Declarative macros for command tests.
//!
//! Each command keeps three test files: `cli_tests.rs` (argument parsing),
//! `execute_tests.rs` (running against a schema file) and `output_tests.rs`
//! (rendering a fixed result). The macros below cover the repetitive cases of
//! all three; anything unusual is written as a plain `#[rstest]` function.
//!
//! CLI macros expect `Args`, `clap::Parser` and `rstest::rstest` in scope.

/// Binary name passed as `argv[0]` when parsing.
#[doc(hidden)]
#[macro_export]
macro_rules! __parse_command {
    ($cmd:literal $(, $arg:expr)* $(,)?) => {
        Args::try_parse_from(["docsql", $cmd $(, $arg)*])
    };
}

/// Parse a command line and hand the matched command struct to `$body`.
#[doc(hidden)]
#[macro_export]
macro_rules! __with_command {
    ($variant:ident, $parsed:expr, |$cmd:ident| $body:block) => {
        match $parsed.expect("arguments should parse").command {
            $crate::commands::Command::$variant($cmd) => $body,
            other => panic!("expected {} command, got {:?}", stringify!($variant), other),
        }
    };
}

// =============================================================================
// CLI Test Macros
// =============================================================================

/// Check the field values a command gets from its required arguments alone.
///
/// ```ignore
/// cli_defaults_test! {
///     command: "shape",
///     variant: Shape,
///     required_args: ["-s", "users.json"],
///     defaults: { filter: "{}" },
/// }
/// ```
#[macro_export]
macro_rules! cli_defaults_test {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        required_args: [$($req:literal),*],
        defaults: { $($field:ident : $expected:expr),* $(,)? } $(,)?
    ) => {
        #[rstest]
        fn test_defaults() {
            $crate::__with_command!($variant, $crate::__parse_command!($cmd $(, $req)*), |cmd| {
                $(
                    assert_eq!(cmd.$field, $expected, concat!("default for ", stringify!($field)));
                )*
            });
        }
    };
}

/// Check one field after parsing `args`, optionally preceded by required args.
///
/// ```ignore
/// cli_option_test! {
///     command: "compile",
///     variant: Compile,
///     test_name: test_with_select,
///     args: ["-s", "users.json", "--select"],
///     field: select,
///     expected: true,
/// }
/// ```
#[macro_export]
macro_rules! cli_option_test {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        test_name: $test_name:ident,
        args: [$($arg:literal),+],
        field: $field:ident,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            $crate::__with_command!($variant, $crate::__parse_command!($cmd $(, $arg)+), |cmd| {
                assert_eq!(cmd.$field, $expected, concat!("value of ", stringify!($field)));
            });
        }
    };
}

/// `cli_option_test!` with the required arguments listed separately.
#[macro_export]
macro_rules! cli_option_test_with_required {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        required_args: [$($req:literal),+],
        test_name: $test_name:ident,
        args: [$($arg:literal),+],
        field: $field:ident,
        expected: $expected:expr $(,)?
    ) => {
        $crate::cli_option_test! {
            command: $cmd,
            variant: $variant,
            test_name: $test_name,
            args: [$($req,)+ $($arg),+],
            field: $field,
            expected: $expected,
        }
    };
}

/// Check that a bare command fails and names the missing argument.
#[macro_export]
macro_rules! cli_required_arg_test {
    (
        command: $cmd:literal,
        test_name: $test_name:ident,
        required_arg: $arg:literal $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let err = $crate::__parse_command!($cmd).expect_err(concat!("should require ", $arg));
            assert!(err.to_string().contains($arg), concat!("error should mention ", $arg));
        }
    };
}

/// Check that parsing `args` fails.
#[macro_export]
macro_rules! cli_error_test {
    (
        command: $cmd:literal,
        test_name: $test_name:ident,
        args: [$($arg:literal),+] $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            assert!($crate::__parse_command!($cmd $(, $arg)+).is_err());
        }
    };
}

// =============================================================================
// Execute Test Macros
// =============================================================================

/// Run a command against the default cache and expect an error.
///
/// `cmd` is a closure receiving the path of a temporary users schema file.
///
/// ```ignore
/// execute_error_test! {
///     test_name: test_unknown_operator_fails,
///     cmd: |schema| ShapeCmd { schema, filter: r#"{"a": {"$regex": 1}}"#.into() },
///     contains: "$regex",
/// }
/// ```
#[macro_export]
macro_rules! execute_error_test {
    (
        test_name: $test_name:ident,
        cmd: $cmd:expr,
        contains: $needle:literal $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            use $crate::commands::Execute;
            let cache = $crate::query::StructuralCache::default();
            let schema_file = $crate::test_utils::users_schema_file();
            let err = ($cmd)(schema_file.path().to_path_buf())
                .execute(&cache)
                .expect_err("command should fail");
            assert!(err.to_string().contains($needle), "error '{}' should mention {}", err, $needle);
        }
    };
}

// =============================================================================
// Output Test Macros
// =============================================================================

/// Compare the table rendering of a fixture with an exact string.
#[macro_export]
macro_rules! output_table_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use $crate::output::Outputable;
            assert_eq!($fixture.to_table(), $expected);
        }
    };
}

/// Check that the table rendering contains each needle.
#[macro_export]
macro_rules! output_table_contains_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        contains: [$($needle:literal),* $(,)?] $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use $crate::output::Outputable;
            let output = $fixture.to_table();
            $(
                assert!(output.contains($needle), "table output should contain {}:\n{}", $needle, output);
            )*
        }
    };
}

/// Parse the JSON rendering and compare top-level fields.
///
/// ```ignore
/// output_json_test! {
///     test_name: test_format_json,
///     fixture: where_result,
///     fixture_type: CompileResult,
///     assertions: { "collection": "users" },
/// }
/// ```
#[macro_export]
macro_rules! output_json_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        assertions: { $($field:literal : $expected:expr),* $(,)? } $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use $crate::output::{OutputFormat, Outputable};
            let parsed: serde_json::Value = serde_json::from_str(&$fixture.format(OutputFormat::Json))
                .expect("JSON output should parse");
            $(
                assert_eq!(parsed[$field], $expected, concat!("JSON field ", $field));
            )*
        }
    };
}

/// Check that the toon rendering contains each needle.
#[macro_export]
macro_rules! output_toon_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        contains: [$($needle:literal),* $(,)?] $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use $crate::output::{OutputFormat, Outputable};
            let output = $fixture.format(OutputFormat::Toon);
            $(
                assert!(output.contains($needle), "toon output should contain {}:\n{}", $needle, output);
            )*
        }
    };
}
