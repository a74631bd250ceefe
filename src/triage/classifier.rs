//! Keyword-based urgency scoring and topic detection for inbound messages.

use crate::model::Topic;

/// Ordered topic buckets. Order is load-bearing: the first bucket with at
/// least one keyword hit supplies the topic, regardless of how many hits a
/// later bucket scores. Kept as a slice, never a map.
static TOPIC_BUCKETS: &[(Topic, &[&str])] = &[
    (
        Topic::Loan,
        &["loan", "disburse", "disbursal", "approval", "approved", "when will i get", "payout"],
    ),
    (
        Topic::Account,
        &["account", "update", "profile", "change", "password"],
    ),
    (
        Topic::Kyc,
        &["kyc", "verify", "verification", "id", "identity"],
    ),
    (
        Topic::Payment,
        &["payment", "repay", "repayment", "due", "overdue"],
    ),
];

/// Words that bump urgency regardless of topic.
static EXTRA_URGENT: &[&str] = &["urgent", "asap", "immediately", "now", "help"];

const BUCKET_BASE: u32 = 30;
const PER_EXTRA_HIT: u32 = 10;
const BONUS: u32 = 20;
const MAX_SCORE: u32 = 100;

/// Result of classifying one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Urgency 0-100.
    pub urgency: u8,
    /// First matching topic bucket, absent when no keyword matched.
    pub topic: Option<Topic>,
}

/// Score how urgent an inbound message looks and detect its topic.
///
/// Matching is case-insensitive substring search. A bucket with `n` matching
/// keywords contributes `30 + 10 * (n - 1)`; repeated occurrences of the
/// same keyword count once. Callers must not invoke this for outbound
/// messages — those carry urgency 0 and no topic without being scored.
pub fn classify(text: &str) -> Classification {
    let t = text.to_lowercase();
    let mut score: u32 = 0;
    let mut topic: Option<Topic> = None;

    for (label, keywords) in TOPIC_BUCKETS {
        let hits = keywords.iter().filter(|&&kw| t.contains(kw)).count() as u32;
        if hits > 0 {
            score += BUCKET_BASE + PER_EXTRA_HIT * (hits - 1);
            topic.get_or_insert(*label);
        }
    }

    if EXTRA_URGENT.iter().any(|&word| t.contains(word)) {
        score += BONUS;
    }

    // "when" questions about loan delivery. This intentionally stacks with
    // the loan bucket score above.
    if t.contains("when") && (t.contains("loan") || t.contains("disbur") || t.contains("approved"))
    {
        score += BONUS;
    }

    Classification {
        urgency: score.min(MAX_SCORE) as u8,
        topic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_scores_zero() {
        let result = classify("");
        assert_eq!(result.urgency, 0);
        assert_eq!(result.topic, None);
    }

    #[test]
    fn unrelated_text_scores_zero() {
        let result = classify("thanks, talk soon");
        assert_eq!(result.urgency, 0);
        assert_eq!(result.topic, None);
    }

    #[test]
    fn single_keyword_scores_bucket_base() {
        let result = classify("any news on my loan?");
        assert_eq!(result.urgency, 30);
        assert_eq!(result.topic, Some(Topic::Loan));
    }

    #[test]
    fn repeated_keyword_counts_once() {
        // Three occurrences of one keyword are a single hit; only distinct
        // matching keywords raise the bucket score.
        let result = classify("loan loan loan");
        assert_eq!(result.urgency, 30);
        assert_eq!(result.topic, Some(Topic::Loan));
    }

    #[test]
    fn multiple_keywords_add_ten_each() {
        // "payment" + "due" = two hits in the payment bucket.
        let result = classify("my payment is due");
        assert_eq!(result.urgency, 40);
        assert_eq!(result.topic, Some(Topic::Payment));
    }

    #[test]
    fn substring_hits_count_per_keyword() {
        // "overdue" matches both the "due" and "overdue" keywords, plus
        // "payment": three distinct keywords hit.
        let result = classify("my payment is overdue");
        assert_eq!(result.urgency, 50);
        assert_eq!(result.topic, Some(Topic::Payment));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let result = classify("MY PAYMENT IS DUE");
        assert_eq!(result.urgency, 40);
        assert_eq!(result.topic, Some(Topic::Payment));
    }

    #[test]
    fn extra_urgent_word_adds_twenty() {
        let result = classify("please help with my account");
        // account bucket 30 + extra-urgency 20
        assert_eq!(result.urgency, 50);
        assert_eq!(result.topic, Some(Topic::Account));
    }

    #[test]
    fn when_loan_bonus_stacks_with_bucket() {
        // loan + approved (2 hits) = 40, "urgent" = 20, when+loan = 20
        let result = classify("urgent: when will my loan be approved");
        assert_eq!(result.urgency, 80);
        assert_eq!(result.topic, Some(Topic::Loan));
    }

    #[test]
    fn score_clamps_at_hundred() {
        let result = classify(
            "URGENT help ASAP: when will I get my loan disbursal payout approved? \
             payment overdue, verify my id and update my account password now",
        );
        assert_eq!(result.urgency, 100);
        assert_eq!(result.topic, Some(Topic::Loan));
    }

    #[test]
    fn first_bucket_wins_over_hit_count() {
        // One loan hit vs three account hits: loan is checked first, so it
        // keeps the topic even though account contributes more score.
        let result = classify("my loan: update account password");
        assert_eq!(result.topic, Some(Topic::Loan));
        // loan 30 + account (3 hits) 50
        assert_eq!(result.urgency, 80);
    }

    #[test]
    fn later_bucket_assigns_topic_when_earlier_miss() {
        let result = classify("please verify my identity for kyc");
        assert_eq!(result.topic, Some(Topic::Kyc));
        // kyc hits: kyc, verify, id ("identity" contains it), identity = 4
        assert_eq!(result.urgency, 60);
    }

    #[test]
    fn urgency_always_in_range() {
        for text in [
            "",
            "loan",
            "loan loan account kyc payment urgent now when disbursal approved",
            "completely unrelated chit chat",
            "HELP HELP HELP",
        ] {
            let result = classify(text);
            assert!(result.urgency <= 100, "urgency out of range for {text:?}");
        }
    }
}
