//! Duplicate transaction detection
//!
//! Scores a candidate against existing transactions of the same type using
//! three signals: merchant name similarity, amount equality (with a small
//! rounding tolerance) and date proximity. Amounts outside the tolerance
//! rule a pair out entirely. Results are advisory only.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::normalize_name;
use crate::models::Transaction;

/// Duplicate detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateConfig {
    /// Weight of the name similarity signal
    pub name_weight: f64,
    /// Weight of the amount equality signal
    pub amount_weight: f64,
    /// Weight of the date proximity signal
    pub date_weight: f64,
    /// Relative amount tolerance (0.01 = 1%)
    pub amount_relative_tolerance: f64,
    /// Absolute amount tolerance in currency units
    pub amount_absolute_tolerance: f64,
    /// Days over which the date signal decays to zero
    pub date_window_days: i64,
    /// Minimum confidence to call a pair a duplicate
    pub threshold: f64,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            name_weight: 0.35,
            amount_weight: 0.30,
            date_weight: 0.35,
            amount_relative_tolerance: 0.01,
            amount_absolute_tolerance: 0.01,
            date_window_days: 3,
            threshold: 0.70,
        }
    }
}

/// Outcome of checking one candidate against a set of transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateDetectionResult {
    pub is_duplicate: bool,
    pub confidence: f64,
    pub reason: String,
    /// Id of the best-matching existing transaction, if any scored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_transaction_id: Option<String>,
}

impl DuplicateDetectionResult {
    fn not_duplicate(reason: impl Into<String>) -> Self {
        Self {
            is_duplicate: false,
            confidence: 0.0,
            reason: reason.into(),
            matched_transaction_id: None,
        }
    }
}

/// A transaction and the later transactions that look like copies of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialDuplicate {
    pub transaction: Transaction,
    pub duplicates: Vec<Transaction>,
    pub confidence: f64,
}

/// Per-signal breakdown for a single pair
#[derive(Debug, Clone, Copy, PartialEq)]
struct PairScore {
    name: f64,
    amount: f64,
    date: f64,
    days_apart: i64,
    confidence: f64,
}

impl PairScore {
    fn reason(&self) -> String {
        let mut signals = Vec::new();

        if self.name >= 1.0 {
            signals.push("same merchant name".to_string());
        } else if self.name > 0.0 {
            signals.push("similar merchant name".to_string());
        }

        if self.amount >= 1.0 {
            signals.push("same amount".to_string());
        } else {
            signals.push("nearly identical amount".to_string());
        }

        match self.days_apart {
            0 => signals.push("same day".to_string()),
            1 => signals.push("1 day apart".to_string()),
            d if self.date > 0.0 => signals.push(format!("{} days apart", d)),
            _ => {}
        }

        signals.join(", ")
    }
}

/// Duplicate detector
#[derive(Debug, Clone, Default)]
pub struct DuplicateDetector {
    config: DuplicateConfig,
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DuplicateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DuplicateConfig {
        &self.config
    }

    /// Check whether `candidate` duplicates any transaction in `existing`
    pub fn detect(
        &self,
        candidate: &Transaction,
        existing: &[Transaction],
    ) -> DuplicateDetectionResult {
        if existing.is_empty() {
            return DuplicateDetectionResult::not_duplicate("no prior transactions");
        }
        if !candidate.is_well_formed() {
            warn!(id = %candidate.id, amount = candidate.amount, "Skipping malformed candidate");
            return DuplicateDetectionResult::not_duplicate("invalid candidate amount");
        }

        let mut best: Option<(PairScore, &Transaction)> = None;
        for other in existing {
            if other.id == candidate.id && !other.id.is_empty() {
                continue;
            }
            let Some(score) = self.score_pair(candidate, other) else {
                continue;
            };
            if best.is_none_or(|(b, _)| score.confidence > b.confidence) {
                best = Some((score, other));
            }
        }

        let Some((score, matched)) = best else {
            return DuplicateDetectionResult::not_duplicate("no similar transactions");
        };

        let is_duplicate = score.confidence >= self.config.threshold;
        let reason = if is_duplicate {
            score.reason()
        } else {
            format!("closest match below threshold: {}", score.reason())
        };

        debug!(
            candidate = %candidate.id,
            matched = %matched.id,
            confidence = score.confidence,
            is_duplicate,
            "Duplicate check complete"
        );

        DuplicateDetectionResult {
            is_duplicate,
            confidence: score.confidence,
            reason,
            matched_transaction_id: Some(matched.id.clone()),
        }
    }

    /// Group transactions with the later transactions that duplicate them.
    ///
    /// Transactions are ordered by date (stable for equal dates) and each is
    /// compared only with those after it, so a pair is reported once and never
    /// in both directions. A transaction listed as a duplicate still heads its
    /// own group when later transactions duplicate it.
    pub fn find_potential_duplicates(
        &self,
        transactions: &[Transaction],
    ) -> Vec<PotentialDuplicate> {
        let mut ordered: Vec<&Transaction> =
            transactions.iter().filter(|t| t.is_well_formed()).collect();
        ordered.sort_by_key(|t| t.date);

        let mut groups = Vec::new();

        for (i, head) in ordered.iter().enumerate() {
            let mut duplicates = Vec::new();
            let mut confidence: f64 = 0.0;
            for later in &ordered[i + 1..] {
                let Some(score) = self.score_pair(head, later) else {
                    continue;
                };
                if score.confidence >= self.config.threshold {
                    duplicates.push((*later).clone());
                    confidence = confidence.max(score.confidence);
                }
            }

            if !duplicates.is_empty() {
                groups.push(PotentialDuplicate {
                    transaction: (*head).clone(),
                    duplicates,
                    confidence,
                });
            }
        }

        debug!(
            transactions = ordered.len(),
            groups = groups.len(),
            "Duplicate scan complete"
        );
        groups
    }

    /// Score a pair, or None when they can never be duplicates
    /// (different type, malformed amount, amounts beyond tolerance)
    fn score_pair(&self, a: &Transaction, b: &Transaction) -> Option<PairScore> {
        if a.tx_type != b.tx_type || !a.is_well_formed() || !b.is_well_formed() {
            return None;
        }

        let amount = self.amount_score(a.amount, b.amount)?;
        let name = name_similarity(&a.name, &b.name);
        let days_apart = (a.date - b.date).num_days().abs();
        let date = self.date_score(days_apart);

        let c = &self.config;
        let total_weight = c.name_weight + c.amount_weight + c.date_weight;
        if total_weight <= 0.0 {
            return None;
        }
        let confidence =
            ((c.name_weight * name + c.amount_weight * amount + c.date_weight * date)
                / total_weight)
                .clamp(0.0, 1.0);

        Some(PairScore {
            name,
            amount,
            date,
            days_apart,
            confidence,
        })
    }

    fn amount_score(&self, a: f64, b: f64) -> Option<f64> {
        let diff = (a - b).abs();
        if diff < 0.005 {
            return Some(1.0);
        }
        let tolerance = (a.max(b) * self.config.amount_relative_tolerance)
            .max(self.config.amount_absolute_tolerance);
        if diff <= tolerance {
            Some(0.9)
        } else {
            None
        }
    }

    fn date_score(&self, days_apart: i64) -> f64 {
        let window = self.config.date_window_days.max(0);
        if days_apart == 0 {
            1.0
        } else if days_apart <= window {
            1.0 - days_apart as f64 / (window + 1) as f64
        } else {
            0.0
        }
    }
}

/// Name similarity in [0, 1]: exact normalized match 1.0, containment 0.7,
/// otherwise 0.6 × token Jaccard overlap
fn name_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_name(a);
    let b = normalize_name(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 0.7;
    }

    let a_tokens: HashSet<&str> = a.split(' ').filter(|t| t.len() >= 3).collect();
    let b_tokens: HashSet<&str> = b.split(' ').filter(|t| t.len() >= 3).collect();
    let union = a_tokens.union(&b_tokens).count();
    if union == 0 {
        return 0.0;
    }
    let shared = a_tokens.intersection(&b_tokens).count();
    0.6 * shared as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use chrono::NaiveDate;

    fn tx(id: &str, name: &str, amount: f64, date: &str) -> Transaction {
        Transaction::new(
            id,
            name,
            amount,
            TransactionType::Expense,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        )
    }

    #[test]
    fn test_detect_empty_existing() {
        let detector = DuplicateDetector::new();
        let result = detector.detect(&tx("a", "Starbucks", 5.5, "2024-01-15"), &[]);
        assert!(!result.is_duplicate);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.reason, "no prior transactions");
    }

    #[test]
    fn test_detect_identical() {
        let detector = DuplicateDetector::new();
        let existing = vec![tx("a", "Starbucks", 5.5, "2024-01-15")];
        let result = detector.detect(&tx("b", "STARBUCKS", 5.5, "2024-01-15"), &existing);

        assert!(result.is_duplicate);
        assert!(result.confidence >= 0.9);
        assert_eq!(result.reason, "same merchant name, same amount, same day");
        assert_eq!(result.matched_transaction_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_amount_beyond_tolerance_never_duplicate() {
        let detector = DuplicateDetector::new();
        let existing = vec![tx("a", "Starbucks", 5.5, "2024-01-15")];
        let result = detector.detect(&tx("b", "Starbucks", 6.5, "2024-01-15"), &existing);
        assert!(!result.is_duplicate);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_amount_within_rounding_tolerance() {
        let detector = DuplicateDetector::new();
        let existing = vec![tx("a", "Grocery Outlet", 100.00, "2024-01-15")];
        let result = detector.detect(&tx("b", "Grocery Outlet", 100.80, "2024-01-15"), &existing);
        assert!(result.is_duplicate);
        assert!(result.reason.contains("nearly identical amount"));
    }

    #[test]
    fn test_type_isolation() {
        let detector = DuplicateDetector::new();
        let mut income = tx("a", "Transfer", 50.0, "2024-01-15");
        income.tx_type = TransactionType::Income;
        let result = detector.detect(&tx("b", "Transfer", 50.0, "2024-01-15"), &[income]);
        assert!(!result.is_duplicate);
        assert_eq!(result.reason, "no similar transactions");
    }

    #[test]
    fn test_date_decay() {
        let detector = DuplicateDetector::new();
        let existing = vec![tx("a", "Netflix", 15.49, "2024-01-15")];

        let two_days = detector.detect(&tx("b", "Netflix", 15.49, "2024-01-17"), &existing);
        assert!(two_days.is_duplicate);
        assert!(two_days.reason.contains("2 days apart"));

        let month_later = detector.detect(&tx("c", "Netflix", 15.49, "2024-02-15"), &existing);
        assert!(!month_later.is_duplicate);
        assert!(month_later.reason.starts_with("closest match below threshold"));
    }

    #[test]
    fn test_detect_skips_self() {
        let detector = DuplicateDetector::new();
        let me = tx("a", "Netflix", 15.49, "2024-01-15");
        let result = detector.detect(&me, std::slice::from_ref(&me));
        assert!(!result.is_duplicate);
    }

    #[test]
    fn test_malformed_candidate() {
        let detector = DuplicateDetector::new();
        let existing = vec![tx("a", "Netflix", 15.49, "2024-01-15")];
        let result = detector.detect(&tx("b", "Netflix", f64::NAN, "2024-01-15"), &existing);
        assert!(!result.is_duplicate);
    }

    #[test]
    fn test_find_potential_duplicates_pair() {
        let detector = DuplicateDetector::new();
        let txs = vec![
            tx("1", "Starbucks", 5.5, "2024-01-15"),
            tx("2", "Starbucks", 5.5, "2024-01-15"),
        ];
        let groups = detector.find_potential_duplicates(&txs);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].transaction.id, "1");
        assert_eq!(groups[0].duplicates.len(), 1);
        assert_eq!(groups[0].duplicates[0].id, "2");
        assert!(groups[0].confidence >= 0.9);
    }

    #[test]
    fn test_find_potential_duplicates_no_symmetric_reports() {
        let detector = DuplicateDetector::new();
        let txs = vec![
            tx("3", "Lunch Spot", 12.0, "2024-01-16"),
            tx("1", "Lunch Spot", 12.0, "2024-01-15"),
            tx("2", "Lunch Spot", 12.0, "2024-01-15"),
            tx("4", "Bookstore", 30.0, "2024-01-15"),
        ];
        let groups = detector.find_potential_duplicates(&txs);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].transaction.id, "1");
        let ids: Vec<&str> = groups[0].duplicates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(groups[1].transaction.id, "2");
        assert_eq!(groups[1].duplicates[0].id, "3");

        for group in &groups {
            for dup in &group.duplicates {
                assert!(!groups.iter().any(|g| g.transaction.id == dup.id
                    && g.duplicates.iter().any(|d| d.id == group.transaction.id)));
            }
        }
    }

    #[test]
    fn test_find_potential_duplicates_chain() {
        // b matches both neighbours, but a and c are too far apart
        let detector = DuplicateDetector::new();
        let txs = vec![
            tx("a", "Lunch Spot", 12.0, "2024-01-01"),
            tx("b", "Lunch Spot", 12.0, "2024-01-03"),
            tx("c", "Lunch Spot", 12.0, "2024-01-05"),
        ];
        assert!(!detector.detect(&txs[2], &txs[..1]).is_duplicate);

        let groups = detector.find_potential_duplicates(&txs);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].transaction.id, "a");
        assert_eq!(groups[0].duplicates.len(), 1);
        assert_eq!(groups[0].duplicates[0].id, "b");
        assert_eq!(groups[1].transaction.id, "b");
        assert_eq!(groups[1].duplicates.len(), 1);
        assert_eq!(groups[1].duplicates[0].id, "c");
    }

    #[test]
    fn test_name_similarity() {
        assert_eq!(name_similarity("Starbucks", "STARBUCKS!"), 1.0);
        assert_eq!(name_similarity("Starbucks", "Starbucks Reserve"), 0.7);
        assert!(name_similarity("Blue Bottle Coffee", "Coffee Blue Bottle") > 0.5);
        assert_eq!(name_similarity("Netflix", "Spotify"), 0.0);
    }
}
