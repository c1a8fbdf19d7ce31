// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Utility functions for the BuyHigh client.

/// Mask a bearer credential for logging.
///
/// Shows only the first six characters and replaces the rest with "...".
/// Enough to correlate log lines against a known token without ever
/// writing the full credential to a log file.
///
/// # Examples
///
/// ```
/// use buyhigh::utils::mask_credential;
///
/// let token = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.e30.sig";
/// assert_eq!(mask_credential(token), "eyJhbG...");
/// ```
pub fn mask_credential(input: &str) -> String {
    const VISIBLE_PREFIX: usize = 6;

    if input.len() <= VISIBLE_PREFIX {
        // Shorter than the prefix: still mask, so length is not leaked either
        return format!("{}...", input);
    }

    let prefix: String = input.chars().take(VISIBLE_PREFIX).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_credential() {
        assert_eq!(mask_credential("eyJhbGciOiJSUzI1NiJ9"), "eyJhbG...");
        assert_eq!(mask_credential("short"), "short...");
        assert_eq!(mask_credential(""), "...");
    }
}
