//! CLI parsing tests for browse command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "browse",
        test_name: test_requires_table,
        required_arg: "<TABLE>",
    }

    crate::cli_defaults_test! {
        command: "browse",
        variant: Browse,
        required_args: ["users"],
        defaults: {
            schema: "public",
            page: 1,
            page_size: 50,
            sort: None,
            desc: false,
        },
    }

    crate::cli_option_test_with_required! {
        command: "browse",
        variant: Browse,
        required_args: ["users"],
        test_name: test_with_page,
        args: ["--page", "4"],
        field: page,
        expected: 4,
    }

    crate::cli_option_test_with_required! {
        command: "browse",
        variant: Browse,
        required_args: ["users"],
        test_name: test_with_page_size,
        args: ["--page-size", "200"],
        field: page_size,
        expected: 200,
    }

    crate::cli_option_test_with_required! {
        command: "browse",
        variant: Browse,
        required_args: ["users"],
        test_name: test_with_sort_desc,
        args: ["--sort", "created_at", "--desc"],
        field: desc,
        expected: true,
    }

    crate::cli_error_test! {
        command: "browse",
        test_name: test_page_zero_rejected,
        args: ["users", "--page", "0"],
    }

    crate::cli_error_test! {
        command: "browse",
        test_name: test_page_size_zero_rejected,
        args: ["users", "--page-size", "0"],
    }

    crate::cli_error_test! {
        command: "browse",
        test_name: test_page_size_too_large_rejected,
        args: ["users", "--page-size", "10001"],
    }

    crate::cli_error_test! {
        command: "browse",
        test_name: test_desc_requires_sort,
        args: ["users", "--desc"],
    }
}
