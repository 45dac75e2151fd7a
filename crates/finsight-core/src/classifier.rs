//! Category classifier for transaction names
//!
//! Suggests categories from a built-in keyword table. Priority:
//! learned (user corrections) → longest whole-word keyword → partial overlap.
//! Partial overlaps are only ever suggestions; `categorize` ignores them.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Candidate, TransactionType};

/// Classifier thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum confidence for `categorize` to commit to a category
    pub min_confidence: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
        }
    }
}

/// Built-in keyword table: (keyword, category, transaction type it applies to)
const BUILTIN_KEYWORDS: &[(&str, &str, Option<TransactionType>)] = &[
    // Food
    ("starbucks", "Food", Some(TransactionType::Expense)),
    ("coffee", "Food", Some(TransactionType::Expense)),
    ("cafe", "Food", Some(TransactionType::Expense)),
    ("restaurant", "Food", Some(TransactionType::Expense)),
    ("mcdonalds", "Food", Some(TransactionType::Expense)),
    ("chipotle", "Food", Some(TransactionType::Expense)),
    ("pizza", "Food", Some(TransactionType::Expense)),
    ("doordash", "Food", Some(TransactionType::Expense)),
    ("grubhub", "Food", Some(TransactionType::Expense)),
    ("uber eats", "Food", Some(TransactionType::Expense)),
    // Groceries
    ("grocery", "Groceries", Some(TransactionType::Expense)),
    ("supermarket", "Groceries", Some(TransactionType::Expense)),
    ("whole foods", "Groceries", Some(TransactionType::Expense)),
    ("trader joes", "Groceries", Some(TransactionType::Expense)),
    ("safeway", "Groceries", Some(TransactionType::Expense)),
    ("kroger", "Groceries", Some(TransactionType::Expense)),
    ("costco", "Groceries", Some(TransactionType::Expense)),
    // Transport
    ("uber", "Transport", Some(TransactionType::Expense)),
    ("lyft", "Transport", Some(TransactionType::Expense)),
    ("taxi", "Transport", Some(TransactionType::Expense)),
    ("shell", "Transport", Some(TransactionType::Expense)),
    ("chevron", "Transport", Some(TransactionType::Expense)),
    ("gas station", "Transport", Some(TransactionType::Expense)),
    ("parking", "Transport", Some(TransactionType::Expense)),
    ("metro", "Transport", Some(TransactionType::Expense)),
    // Shopping
    ("amazon", "Shopping", Some(TransactionType::Expense)),
    ("target", "Shopping", Some(TransactionType::Expense)),
    ("walmart", "Shopping", Some(TransactionType::Expense)),
    ("best buy", "Shopping", Some(TransactionType::Expense)),
    ("ikea", "Shopping", Some(TransactionType::Expense)),
    // Entertainment
    ("cinema", "Entertainment", Some(TransactionType::Expense)),
    ("movie", "Entertainment", Some(TransactionType::Expense)),
    ("concert", "Entertainment", Some(TransactionType::Expense)),
    ("steam", "Entertainment", Some(TransactionType::Expense)),
    // Subscriptions
    ("netflix", "Subscriptions", Some(TransactionType::Expense)),
    ("spotify", "Subscriptions", Some(TransactionType::Expense)),
    ("hulu", "Subscriptions", Some(TransactionType::Expense)),
    ("disney plus", "Subscriptions", Some(TransactionType::Expense)),
    ("icloud", "Subscriptions", Some(TransactionType::Expense)),
    ("subscription", "Subscriptions", Some(TransactionType::Expense)),
    // Utilities
    ("electric", "Utilities", Some(TransactionType::Expense)),
    ("water bill", "Utilities", Some(TransactionType::Expense)),
    ("internet", "Utilities", Some(TransactionType::Expense)),
    ("comcast", "Utilities", Some(TransactionType::Expense)),
    ("verizon", "Utilities", Some(TransactionType::Expense)),
    ("phone bill", "Utilities", Some(TransactionType::Expense)),
    // Housing
    ("rent", "Housing", Some(TransactionType::Expense)),
    ("mortgage", "Housing", Some(TransactionType::Expense)),
    ("hoa", "Housing", Some(TransactionType::Expense)),
    // Health
    ("pharmacy", "Health", Some(TransactionType::Expense)),
    ("cvs", "Health", Some(TransactionType::Expense)),
    ("walgreens", "Health", Some(TransactionType::Expense)),
    ("doctor", "Health", Some(TransactionType::Expense)),
    ("dental", "Health", Some(TransactionType::Expense)),
    ("gym", "Health", Some(TransactionType::Expense)),
    // Travel
    ("airline", "Travel", Some(TransactionType::Expense)),
    ("airbnb", "Travel", Some(TransactionType::Expense)),
    ("hotel", "Travel", Some(TransactionType::Expense)),
    ("delta air", "Travel", Some(TransactionType::Expense)),
    // Education
    ("tuition", "Education", Some(TransactionType::Expense)),
    ("udemy", "Education", Some(TransactionType::Expense)),
    ("bookstore", "Education", Some(TransactionType::Expense)),
    // Income
    ("salary", "Salary", Some(TransactionType::Income)),
    ("payroll", "Salary", Some(TransactionType::Income)),
    ("paycheck", "Salary", Some(TransactionType::Income)),
    ("direct deposit", "Salary", Some(TransactionType::Income)),
    ("bonus", "Salary", Some(TransactionType::Income)),
    ("freelance", "Freelance", Some(TransactionType::Income)),
    ("invoice", "Freelance", Some(TransactionType::Income)),
    ("dividend", "Investments", Some(TransactionType::Income)),
    ("interest", "Investments", Some(TransactionType::Income)),
    ("refund", "Refunds", Some(TransactionType::Income)),
    // Either direction
    ("transfer", "Transfers", None),
    ("venmo", "Transfers", None),
    ("zelle", "Transfers", None),
];

/// Where a suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    /// A user correction recorded with `learn`
    Learned,
    /// A whole-word keyword match
    Keyword,
    /// Partial overlap with a keyword (never used by `categorize`)
    Partial,
}

/// A category guess with its confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub category: String,
    pub confidence: f64,
    pub source: SuggestionSource,
}

#[derive(Debug, Clone)]
struct KeywordRule {
    keyword: String,
    category: String,
    scope: Option<TransactionType>,
    pattern: Regex,
}

impl KeywordRule {
    fn new(keyword: &str, category: &str, scope: Option<TransactionType>) -> Result<Self> {
        let keyword = normalize_name(keyword);
        if keyword.is_empty() || category.trim().is_empty() {
            return Err(Error::InvalidData(
                "keyword and category must be non-empty".to_string(),
            ));
        }
        let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&keyword)))?;
        Ok(Self {
            keyword,
            category: category.trim().to_string(),
            scope,
            pattern,
        })
    }

    fn applies_to(&self, tx_type: TransactionType) -> bool {
        self.scope.is_none_or(|s| s == tx_type)
    }
}

/// Keyword-based category classifier with user-learned overrides
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: Vec<KeywordRule>,
    /// normalized transaction name -> category
    learned: BTreeMap<String, String>,
    config: ClassifierConfig,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryClassifier {
    /// Create a classifier with the built-in keyword table
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        let mut rules = Vec::with_capacity(BUILTIN_KEYWORDS.len());
        for (keyword, category, scope) in BUILTIN_KEYWORDS {
            match KeywordRule::new(keyword, category, *scope) {
                Ok(rule) => rules.push(rule),
                Err(e) => warn!("Skipping built-in keyword '{}': {}", keyword, e),
            }
        }

        Self {
            rules,
            learned: BTreeMap::new(),
            config,
        }
    }

    /// Add a keyword association on top of the built-in table
    pub fn add_keyword(
        &mut self,
        keyword: &str,
        category: &str,
        scope: Option<TransactionType>,
    ) -> Result<()> {
        self.rules.push(KeywordRule::new(keyword, category, scope)?);
        Ok(())
    }

    /// Best category for the candidate, or None when no confident signal exists
    pub fn categorize(&self, candidate: &Candidate) -> Option<String> {
        self.best(candidate).map(|s| s.category)
    }

    /// Confidence of `categorize` for this candidate (0 when it returns None)
    pub fn confidence(&self, candidate: &Candidate) -> f64 {
        self.best(candidate).map(|s| s.confidence).unwrap_or(0.0)
    }

    fn best(&self, candidate: &Candidate) -> Option<CategorySuggestion> {
        self.suggest(candidate).into_iter().next().filter(|s| {
            s.source != SuggestionSource::Partial && s.confidence >= self.config.min_confidence
        })
    }

    /// All categories with a textual signal, highest confidence first,
    /// ties broken by category name
    pub fn suggest(&self, candidate: &Candidate) -> Vec<CategorySuggestion> {
        let name = normalize_name(&candidate.name);
        if name.is_empty() {
            return Vec::new();
        }

        let mut by_category: BTreeMap<String, CategorySuggestion> = BTreeMap::new();
        let mut offer = |category: &str, confidence: f64, source: SuggestionSource| {
            if confidence <= 0.0 {
                return;
            }
            let replace = by_category
                .get(category)
                .is_none_or(|existing| confidence > existing.confidence);
            if replace {
                by_category.insert(
                    category.to_string(),
                    CategorySuggestion {
                        category: category.to_string(),
                        confidence,
                        source,
                    },
                );
            }
        };

        if let Some(category) = self.learned.get(&name) {
            offer(category, 1.0, SuggestionSource::Learned);
        }

        let name_len = name.chars().count() as f64;
        for rule in self.rules.iter().filter(|r| r.applies_to(candidate.tx_type)) {
            if rule.pattern.is_match(&name) {
                let coverage = rule.keyword.chars().count() as f64 / name_len;
                offer(
                    &rule.category,
                    (0.6 + 0.3 * coverage).min(0.9),
                    SuggestionSource::Keyword,
                );
            } else {
                offer(
                    &rule.category,
                    partial_overlap(&name, &rule.keyword),
                    SuggestionSource::Partial,
                );
            }
        }

        let mut suggestions: Vec<CategorySuggestion> = by_category.into_values().collect();
        suggestions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });

        debug!(
            name = %name,
            count = suggestions.len(),
            "Category suggestions computed"
        );
        suggestions
    }

    /// Record a user correction. Later calls for the same normalized name
    /// replace the earlier category; repeating a call changes nothing.
    pub fn learn(&mut self, transaction_name: &str, category: &str) {
        let name = normalize_name(transaction_name);
        let category = category.trim();
        if name.is_empty() || category.is_empty() {
            debug!("Ignoring empty learned association");
            return;
        }
        self.learned.insert(name, category.to_string());
    }

    /// Drop a learned association. Returns true if one existed.
    pub fn forget(&mut self, transaction_name: &str) -> bool {
        self.learned.remove(&normalize_name(transaction_name)).is_some()
    }

    /// Learned associations keyed by normalized name
    pub fn learned(&self) -> &BTreeMap<String, String> {
        &self.learned
    }

    /// Serialize learned associations as a JSON object
    pub fn export_learned(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.learned)?)
    }

    /// Merge learned associations from a JSON object produced by `export_learned`.
    /// Returns the number of entries applied.
    pub fn import_learned(&mut self, json: &str) -> Result<usize> {
        let entries: BTreeMap<String, String> = serde_json::from_str(json)?;
        let before = self.learned.clone();
        for (name, category) in &entries {
            self.learn(name, category);
        }
        let applied = self
            .learned
            .iter()
            .filter(|(k, v)| before.get(*k) != Some(*v))
            .count();
        Ok(applied)
    }
}

/// Case-fold, trim, drop apostrophes, turn other punctuation into spaces
/// and collapse whitespace.
pub fn normalize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .to_lowercase();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Overlap score in (0, 0.3] when name tokens and keyword tokens share
/// prefixes; 0 when there is no textual signal at all.
fn partial_overlap(name: &str, keyword: &str) -> f64 {
    let name_tokens: Vec<&str> = name.split(' ').filter(|t| t.chars().count() >= 3).collect();
    let keyword_tokens: Vec<&str> = keyword.split(' ').collect();
    if name_tokens.is_empty() || keyword_tokens.is_empty() {
        return 0.0;
    }

    let mut total = 0.0;
    for kw in &keyword_tokens {
        let kw_len = kw.chars().count();
        let best = name_tokens
            .iter()
            .filter(|t| kw_len >= 3 && (kw.starts_with(**t) || t.starts_with(*kw)))
            .map(|t| {
                let t_len = t.chars().count();
                t_len.min(kw_len) as f64 / t_len.max(kw_len) as f64
            })
            .fold(0.0, f64::max);
        total += best;
    }

    0.3 * total / keyword_tokens.len() as f64
}
