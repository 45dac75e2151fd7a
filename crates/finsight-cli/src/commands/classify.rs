//! Categorize and learn commands

use std::path::Path;

use anyhow::{anyhow, bail, Result};
use serde::Serialize;

use finsight_core::{Candidate, CategorySuggestion, TransactionType};

use super::input::load_transactions;
use super::{print_json, truncate, Context};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategorizedTransaction {
    id: String,
    name: String,
    category: Option<String>,
    confidence: f64,
}

pub fn cmd_categorize(
    ctx: &Context,
    name: Option<&str>,
    file: Option<&Path>,
    tx_type: &str,
) -> Result<()> {
    let classifier = ctx.classifier()?;

    match (name, file) {
        (Some(name), _) => {
            let tx_type: TransactionType = tx_type.parse().map_err(|e: String| anyhow!(e))?;
            let candidate = Candidate::new(name, 0.0, tx_type);
            let suggestions: Vec<CategorySuggestion> = classifier.suggest(&candidate);

            if ctx.json {
                return print_json(&suggestions);
            }

            match classifier.categorize(&candidate) {
                Some(category) => println!(
                    "🏷️  {} → {} ({:.0}%)",
                    name,
                    category,
                    classifier.confidence(&candidate) * 100.0
                ),
                None => println!("🤷 No confident category for {}", name),
            }
            if !suggestions.is_empty() {
                println!();
                println!("   Suggestions:");
                for s in &suggestions {
                    println!("   {:>4.0}%  {}", s.confidence * 100.0, s.category);
                }
            }
            Ok(())
        }
        (None, Some(file)) => {
            let transactions = load_transactions(file)?;
            let results: Vec<CategorizedTransaction> = transactions
                .iter()
                .filter(|t| t.category.as_deref().is_none_or(|c| c.trim().is_empty()))
                .map(|t| {
                    let candidate = t.as_candidate();
                    CategorizedTransaction {
                        id: t.id.clone(),
                        name: t.name.clone(),
                        category: classifier.categorize(&candidate),
                        confidence: classifier.confidence(&candidate),
                    }
                })
                .collect();

            if ctx.json {
                return print_json(&results);
            }

            println!("🏷️  {} uncategorized transactions", results.len());
            for r in &results {
                match &r.category {
                    Some(c) => println!(
                        "   {:<32} {} ({:.0}%)",
                        truncate(&r.name, 32),
                        c,
                        r.confidence * 100.0
                    ),
                    None => println!("   {:<32} -", truncate(&r.name, 32)),
                }
            }
            Ok(())
        }
        (None, None) => bail!("Pass a transaction name or --file"),
    }
}

pub fn cmd_learn(ctx: &Context, name: &str, category: Option<&str>, forget: bool) -> Result<()> {
    let mut classifier = ctx.classifier()?;

    if forget {
        if !classifier.forget(name) {
            println!("   No learned category for {}", name);
            return Ok(());
        }
        let path = ctx.save_learned(&classifier)?;
        println!("🗑️  Forgot category for {} ({})", name, path.display());
        return Ok(());
    }

    let Some(category) = category.filter(|c| !c.trim().is_empty()) else {
        bail!("A category is required");
    };
    classifier.learn(name, category.trim());
    let path = ctx.save_learned(&classifier)?;
    println!("✅ {} → {} (saved to {})", name, category.trim(), path.display());
    Ok(())
}
