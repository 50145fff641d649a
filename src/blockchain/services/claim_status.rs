// src/blockchain/services/claim_status.rs

//! Turns raw faucet reads and claim submissions into the status sentences
//! shown to the agent. Everything here is pure: no I/O, no retained state.

use crate::blockchain::models::{
    ClaimOutcome, ClaimSubmission, NormalizedSeconds, RawClaimTimeValue,
};
use chrono::{DateTime, Datelike};
use ethers_core::types::U256;

/// Values above this are read as a Unix timestamp rather than a duration.
/// Heuristic only: no real cooldown comes close to ~31.7 years.
/// Timestamps past chrono's last representable year (262143, ~8.27e12 s)
/// render as "Invalid Date".
pub const EPOCH_THRESHOLD_SECS: u64 = 1_000_000_000;

/// Revert reason the faucet contract uses when the cooldown has not elapsed.
// Matched as a substring of the client error message; breaks if the contract
// ever rewords it.
pub const COOLDOWN_ERROR_MARKER: &str = "Wait for cooldown";

pub const RECEIPT_FAILED_REASON: &str = "transaction may have failed";
pub const UNKNOWN_ERROR: &str = "Unknown error";

pub const UNKNOWN_CLAIM_TIME: &str = "Could not determine next claim time for this user.";
pub const NEVER_CLAIMED: &str = "This user has not claimed any tokens yet.";

/// Normalize a raw read value into seconds. Never fails.
pub fn normalize_seconds(raw: &RawClaimTimeValue) -> NormalizedSeconds {
    match raw {
        RawClaimTimeValue::Wrapped(inner) => normalize_scalar(inner),
        other => normalize_scalar(other),
    }
}

fn normalize_scalar(raw: &RawClaimTimeValue) -> NormalizedSeconds {
    match raw {
        RawClaimTimeValue::Integer(n) => NormalizedSeconds::Seconds(saturating_u64(*n)),
        RawClaimTimeValue::Number(x) => {
            if x.is_finite() && *x >= 0.0 && x.fract() == 0.0 {
                // `as` saturates for floats beyond u64::MAX
                NormalizedSeconds::Seconds(*x as u64)
            } else {
                NormalizedSeconds::Unknown
            }
        }
        RawClaimTimeValue::Text(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            NormalizedSeconds::Seconds(s.parse::<u64>().unwrap_or(u64::MAX))
        }
        RawClaimTimeValue::Absent
        | RawClaimTimeValue::Text(_)
        | RawClaimTimeValue::Wrapped(_)
        | RawClaimTimeValue::Other => NormalizedSeconds::Unknown,
    }
}

fn saturating_u64(n: U256) -> u64 {
    if n > U256::from(u64::MAX) {
        u64::MAX
    } else {
        n.as_u64()
    }
}

/// Render normalized seconds as the next-claim sentence.
pub fn classify_and_format(seconds: NormalizedSeconds) -> String {
    let seconds = match seconds {
        NormalizedSeconds::Unknown => return UNKNOWN_CLAIM_TIME.to_string(),
        NormalizedSeconds::Seconds(0) => return NEVER_CLAIMED.to_string(),
        NormalizedSeconds::Seconds(s) => s,
    };

    if seconds > EPOCH_THRESHOLD_SECS {
        return format!("Next claim time (UTC): {}", format_utc(seconds));
    }

    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("Time until next claim: {}h {}m {}s", hrs, mins, secs)
}

/// RFC 1123 rendering, e.g. `Sun, 09 Sep 2001 01:46:41 GMT`.
/// Years past 9999 are printed unsigned (`%Y` would add a `+`).
fn format_utc(epoch_secs: u64) -> String {
    i64::try_from(epoch_secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|dt| {
            format!(
                "{} {} {}",
                dt.format("%a, %d %b"),
                dt.year(),
                dt.format("%H:%M:%S GMT")
            )
        })
        .unwrap_or_else(|| "Invalid Date".to_string())
}

/// Classify the result of a claim transaction attempt.
pub fn classify_claim_attempt(recipient: &str, submission: ClaimSubmission) -> ClaimOutcome {
    match submission {
        ClaimSubmission::Errored { message: Some(msg) } if msg.contains(COOLDOWN_ERROR_MARKER) => {
            ClaimOutcome::CooldownRejected {
                recipient: recipient.to_string(),
            }
        }
        ClaimSubmission::Sent { tx_hash } => ClaimOutcome::PendingConfirmation { tx_hash },
        ClaimSubmission::Confirmed { tx_hash, status } if status.is_success() => {
            ClaimOutcome::Success { tx_hash }
        }
        ClaimSubmission::Confirmed { tx_hash, .. } => ClaimOutcome::Failed {
            reason: RECEIPT_FAILED_REASON.to_string(),
            tx_hash: Some(tx_hash),
        },
        ClaimSubmission::Errored { message } => ClaimOutcome::Failed {
            reason: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            tx_hash: None,
        },
        ClaimSubmission::Empty => ClaimOutcome::Failed {
            reason: UNKNOWN_ERROR.to_string(),
            tx_hash: None,
        },
    }
}

/// Render a claim outcome. `next_claim` is the already formatted cooldown
/// sentence for a `CooldownRejected` outcome.
pub fn render_outcome(recipient: &str, outcome: &ClaimOutcome, next_claim: Option<&str>) -> String {
    match outcome {
        ClaimOutcome::Success { tx_hash } => format!(
            "Successfully claimed tokens from the faucet for user {}. Transaction hash: {}",
            recipient, tx_hash
        ),
        ClaimOutcome::PendingConfirmation { tx_hash } => format!(
            "Transaction sent for {} (tx: {}). Confirmation could not be verified; please check the transaction status on the explorer.",
            recipient, tx_hash
        ),
        ClaimOutcome::CooldownRejected { recipient } => format!(
            "The user {} cannot claim yet. {}",
            recipient,
            next_claim.unwrap_or(UNKNOWN_CLAIM_TIME)
        ),
        ClaimOutcome::Failed {
            reason,
            tx_hash: Some(tx_hash),
        } => format!(
            "Claim transaction for {}: {}. Transaction hash: {}",
            recipient, reason, tx_hash
        ),
        ClaimOutcome::Failed {
            reason,
            tx_hash: None,
        } => format!("Failed to claim tokens for {}. {}", recipient, reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::models::ReceiptStatus;

    const USER: &str = "0x4d4cC2E0c5cBC9737A0dEc28d7C2510E2BEF5A09";

    #[test]
    fn absent_is_unknown() {
        let n = normalize_seconds(&RawClaimTimeValue::Absent);
        assert_eq!(n, NormalizedSeconds::Unknown);
        assert_eq!(classify_and_format(n), UNKNOWN_CLAIM_TIME);
    }

    #[test]
    fn text_and_integer_agree() {
        let from_text = normalize_seconds(&RawClaimTimeValue::Text("45".into()));
        let from_int = normalize_seconds(&RawClaimTimeValue::Integer(U256::from(45u64)));
        let from_num = normalize_seconds(&RawClaimTimeValue::Number(45.0));
        assert_eq!(from_text, NormalizedSeconds::Seconds(45));
        assert_eq!(from_text, from_int);
        assert_eq!(from_int, from_num);
    }

    #[test]
    fn wrapped_values_unwrap_once() {
        let once = RawClaimTimeValue::Wrapped(Box::new(RawClaimTimeValue::Text("90".into())));
        assert_eq!(normalize_seconds(&once), NormalizedSeconds::Seconds(90));

        let twice = RawClaimTimeValue::Wrapped(Box::new(once));
        assert_eq!(normalize_seconds(&twice), NormalizedSeconds::Unknown);
    }

    #[test]
    fn unusable_shapes_are_unknown() {
        for raw in [
            RawClaimTimeValue::Text("12a".into()),
            RawClaimTimeValue::Text("".into()),
            RawClaimTimeValue::Text("-5".into()),
            RawClaimTimeValue::Number(-1.0),
            RawClaimTimeValue::Number(2.5),
            RawClaimTimeValue::Number(f64::NAN),
            RawClaimTimeValue::Other,
        ] {
            assert_eq!(normalize_seconds(&raw), NormalizedSeconds::Unknown, "{:?}", raw);
        }
    }

    #[test]
    fn oversized_integers_saturate() {
        let huge = RawClaimTimeValue::Integer(U256::MAX);
        assert_eq!(normalize_seconds(&huge), NormalizedSeconds::Seconds(u64::MAX));
        let long_text = RawClaimTimeValue::Text("99999999999999999999999".into());
        assert_eq!(normalize_seconds(&long_text), NormalizedSeconds::Seconds(u64::MAX));
        assert_eq!(
            classify_and_format(NormalizedSeconds::Seconds(u64::MAX)),
            "Next claim time (UTC): Invalid Date"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let raw = RawClaimTimeValue::Wrapped(Box::new(RawClaimTimeValue::Integer(U256::from(7u64))));
        assert_eq!(normalize_seconds(&raw), normalize_seconds(&raw));
    }

    #[test]
    fn zero_means_never_claimed() {
        assert_eq!(
            classify_and_format(NormalizedSeconds::Seconds(0)),
            "This user has not claimed any tokens yet."
        );
    }

    #[test]
    fn durations_decompose() {
        assert_eq!(
            classify_and_format(NormalizedSeconds::Seconds(3661)),
            "Time until next claim: 1h 1m 1s"
        );
        assert_eq!(
            classify_and_format(NormalizedSeconds::Seconds(59)),
            "Time until next claim: 0h 0m 59s"
        );
        assert_eq!(
            classify_and_format(NormalizedSeconds::Seconds(EPOCH_THRESHOLD_SECS)),
            "Time until next claim: 277777h 46m 40s"
        );
    }

    #[test]
    fn duration_components_reconstruct_input() {
        for s in [1u64, 60, 61, 3599, 3600, 86_399, 86_400, 123_456, 999_999_999] {
            let text = classify_and_format(NormalizedSeconds::Seconds(s));
            let rest = text.strip_prefix("Time until next claim: ").unwrap();
            let parts: Vec<u64> = rest
                .split(' ')
                .map(|p| p[..p.len() - 1].parse().unwrap())
                .collect();
            let (h, m, sec) = (parts[0], parts[1], parts[2]);
            assert!(m < 60 && sec < 60);
            assert_eq!(h * 3600 + m * 60 + sec, s);
        }
    }

    #[test]
    fn large_values_are_epoch_timestamps() {
        assert_eq!(
            classify_and_format(NormalizedSeconds::Seconds(1_000_000_001)),
            "Next claim time (UTC): Sun, 09 Sep 2001 01:46:41 GMT"
        );
        assert_eq!(
            classify_and_format(NormalizedSeconds::Seconds(1_700_000_000)),
            "Next claim time (UTC): Tue, 14 Nov 2023 22:13:20 GMT"
        );
    }

    #[test]
    fn five_digit_years_have_no_sign() {
        assert_eq!(
            classify_and_format(NormalizedSeconds::Seconds(253_402_300_800)),
            "Next claim time (UTC): Sat, 01 Jan 10000 00:00:00 GMT"
        );
        assert_eq!(
            classify_and_format(NormalizedSeconds::Seconds(8_300_000_000_000)),
            "Next claim time (UTC): Invalid Date"
        );
    }

    #[test]
    fn cooldown_error_is_detected() {
        let outcome = classify_claim_attempt(
            USER,
            ClaimSubmission::Errored {
                message: Some("Error: Wait for cooldown, try later".into()),
            },
        );
        assert_eq!(
            outcome,
            ClaimOutcome::CooldownRejected {
                recipient: USER.to_string()
            }
        );
        let text = render_outcome(USER, &outcome, Some("Time until next claim: 0h 5m 0s"));
        assert_eq!(
            text,
            format!("The user {} cannot claim yet. Time until next claim: 0h 5m 0s", USER)
        );
    }

    #[test]
    fn successful_receipt_in_either_form() {
        for status in [ReceiptStatus::Code(1), ReceiptStatus::Text("success".into())] {
            let outcome = classify_claim_attempt(
                USER,
                ClaimSubmission::Confirmed {
                    tx_hash: "0xabc".into(),
                    status,
                },
            );
            assert_eq!(outcome, ClaimOutcome::Success { tx_hash: "0xabc".into() });
            assert!(render_outcome(USER, &outcome, None).contains("0xabc"));
        }
    }

    #[test]
    fn failed_receipt_keeps_hash() {
        let outcome = classify_claim_attempt(
            USER,
            ClaimSubmission::Confirmed {
                tx_hash: "0xdead".into(),
                status: ReceiptStatus::Code(0),
            },
        );
        assert_eq!(
            outcome,
            ClaimOutcome::Failed {
                reason: RECEIPT_FAILED_REASON.into(),
                tx_hash: Some("0xdead".into())
            }
        );
        let text = render_outcome(USER, &outcome, None);
        assert!(text.contains("may have failed"));
        assert!(text.contains("0xdead"));
    }

    #[test]
    fn missing_receipt_is_pending() {
        let outcome = classify_claim_attempt(USER, ClaimSubmission::Sent { tx_hash: "0x01".into() });
        assert_eq!(outcome, ClaimOutcome::PendingConfirmation { tx_hash: "0x01".into() });
        let text = render_outcome(USER, &outcome, None);
        assert!(text.contains("0x01"));
        assert!(text.contains("explorer"));
    }

    #[test]
    fn other_errors_fail_with_reason() {
        let outcome = classify_claim_attempt(
            USER,
            ClaimSubmission::Errored {
                message: Some("insufficient funds".into()),
            },
        );
        assert_eq!(
            render_outcome(USER, &outcome, None),
            format!("Failed to claim tokens for {}. insufficient funds", USER)
        );

        for submission in [ClaimSubmission::Errored { message: None }, ClaimSubmission::Empty] {
            assert_eq!(
                classify_claim_attempt(USER, submission),
                ClaimOutcome::Failed {
                    reason: UNKNOWN_ERROR.into(),
                    tx_hash: None
                }
            );
        }
    }

    #[test]
    fn cooldown_without_follow_up_read() {
        let outcome = ClaimOutcome::CooldownRejected {
            recipient: USER.into(),
        };
        assert!(render_outcome(USER, &outcome, None).ends_with(UNKNOWN_CLAIM_TIME));
    }
}
