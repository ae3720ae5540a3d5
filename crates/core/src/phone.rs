//! Phone-number normalization shared by the send and pairing-code paths.

use crate::error::{BridgeError, Result};

/// Domain suffix appended to bare numbers to form a transport-addressable JID.
pub const JID_SUFFIX: &str = "@s.whatsapp.net";

/// Normalize a user-supplied destination into a JID.
///
/// Strips every non-digit character, rejects anything with fewer than 10
/// digits remaining, and appends [`JID_SUFFIX`] unless the input already
/// carried it.
pub fn normalize(input: &str) -> Result<String> {
    // Digits are extracted from the local part only; an existing suffix is
    // discarded and re-appended so the output shape is uniform.
    let local = input.split('@').next().unwrap_or(input);
    let digits: String = local.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < 10 {
        return Err(BridgeError::InvalidInput(format!(
            "phone number needs at least 10 digits, got {} in {input:?}",
            digits.len()
        )));
    }

    Ok(format!("{digits}{JID_SUFFIX}"))
}

/// Extract the bare account identity (phone number) from a transport account
/// id like `15551234567:17@s.whatsapp.net`.
pub fn bare_identity(account_id: &str) -> String {
    let without_device = account_id.split(':').next().unwrap_or(account_id);
    without_device
        .split('@')
        .next()
        .unwrap_or(without_device)
        .to_owned()
}
