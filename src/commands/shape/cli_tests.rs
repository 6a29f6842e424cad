//! CLI parsing tests for shape command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;
    use std::path::PathBuf;

    crate::cli_required_arg_test! {
        command: "shape",
        test_name: test_requires_schema,
        required_arg: "--schema",
    }

    crate::cli_defaults_test! {
        command: "shape",
        variant: Shape,
        required_args: ["-s", "users.json"],
        defaults: {
            schema: PathBuf::from("users.json"),
            filter: "{}",
        },
    }

    crate::cli_option_test_with_required! {
        command: "shape",
        variant: Shape,
        required_args: ["--schema", "users.json"],
        test_name: test_with_filter,
        args: ["--filter", "{\"age\": 1}"],
        field: filter,
        expected: "{\"age\": 1}",
    }

    crate::cli_error_test! {
        command: "shape",
        test_name: test_rejects_options_flag,
        args: ["-s", "users.json", "--options", "{}"],
    }
}
