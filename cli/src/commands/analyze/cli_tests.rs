//! CLI parsing tests for analyze command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "analyze",
        test_name: test_requires_sql,
        required_arg: "<SQL>",
    }

    crate::cli_option_test! {
        command: "analyze",
        variant: Analyze,
        test_name: test_with_sql,
        args: ["SELECT 1"],
        field: sql,
        expected: "SELECT 1",
    }
}
