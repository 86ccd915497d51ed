//! # Exit Codes
//!
//! Standard exit codes for the Vigil CLI.
//!
//! These codes follow common Unix conventions and provide meaningful
//! feedback to scripts and CI/CD pipelines.

/// Successful execution, no failed checks
pub const EXIT_SUCCESS: i32 = 0;

/// General error (unspecified)
pub const EXIT_ERROR: i32 = 1;

/// Scan found failed checks
pub const EXIT_FINDINGS_FOUND: i32 = 5;

/// Invalid input (bad arguments, no scan target, etc.)
pub const EXIT_INVALID_INPUT: i32 = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_FINDINGS_FOUND,
            EXIT_INVALID_INPUT,
        ];

        for (i, &code1) in codes.iter().enumerate() {
            for (j, &code2) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(code1, code2, "Exit codes {} and {} are not unique", i, j);
                }
            }
        }
    }

    #[test]
    fn test_success_is_zero() {
        assert_eq!(EXIT_SUCCESS, 0);
    }

    #[test]
    fn test_error_codes_are_positive() {
        assert!(EXIT_ERROR > 0);
        assert!(EXIT_FINDINGS_FOUND > 0);
        assert!(EXIT_INVALID_INPUT > 0);
    }
}
