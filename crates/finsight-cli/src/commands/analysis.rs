//! Duplicate, pattern and insight commands

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use finsight_core::models::format_currency;
use finsight_core::{
    DuplicateDetector, InsightGenerator, InsightKind, OutlierReport, SpendingAnalyzer,
    SpendingPattern,
};

use super::input::{load_optional_budgets, load_transactions};
use super::{print_json, truncate, Context};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PatternOutput {
    patterns: Vec<SpendingPattern>,
    outliers: OutlierReport,
}

pub fn cmd_duplicates(ctx: &Context, file: &Path) -> Result<()> {
    let transactions = load_transactions(file)?;
    let detector = DuplicateDetector::with_config(ctx.config.duplicates.clone());
    let groups = detector.find_potential_duplicates(&transactions);

    if ctx.json {
        return print_json(&groups);
    }

    println!("👯 Duplicate check ({} transactions)", transactions.len());
    println!("   ─────────────────────────────");
    if groups.is_empty() {
        println!("✅ No likely duplicates found.");
        return Ok(());
    }

    for group in &groups {
        let tx = &group.transaction;
        println!(
            "   {} {:<28} {:>10}  ({:.0}% match)",
            tx.date,
            truncate(&tx.name, 28),
            format_currency(tx.amount),
            group.confidence * 100.0
        );
        for dup in &group.duplicates {
            println!(
                "     ↳ {} {:<26} {:>10}  id {}",
                dup.date,
                truncate(&dup.name, 26),
                format_currency(dup.amount),
                dup.id
            );
        }
    }
    println!();
    println!("⚠️  {} possible duplicate groups.", groups.len());
    Ok(())
}

pub fn cmd_patterns(ctx: &Context, file: &Path) -> Result<()> {
    let transactions = load_transactions(file)?;
    let analyzer = SpendingAnalyzer::with_config(ctx.config.patterns.clone());
    let output = PatternOutput {
        patterns: analyzer.analyze(&transactions),
        outliers: analyzer.detect_outliers(&transactions),
    };

    if ctx.json {
        return print_json(&output);
    }

    println!("📊 Spending Patterns");
    println!("   ─────────────────────────────");
    for p in &output.patterns {
        let arrow = match p.trend {
            finsight_core::Trend::Increasing => "📈",
            finsight_core::Trend::Decreasing => "📉",
            finsight_core::Trend::Stable => "➖",
        };
        println!(
            "   {} {:<20} {:>12} total  {:>10} avg  {:>5.1}/wk  last {}",
            arrow,
            truncate(&p.category, 20),
            format_currency(p.total_spent),
            format_currency(p.average_amount),
            p.frequency,
            p.last_transaction_date
        );
    }

    if !output.outliers.outliers.is_empty() {
        println!();
        println!(
            "🔎 Outliers (mean {}, std dev {})",
            format_currency(output.outliers.mean),
            format_currency(output.outliers.std_dev)
        );
        for tx in &output.outliers.outliers {
            println!(
                "   {} {:<28} {:>10}",
                tx.date,
                truncate(&tx.name, 28),
                format_currency(tx.amount)
            );
        }
    }
    Ok(())
}

pub fn cmd_insights(ctx: &Context, file: &Path, budgets: Option<&Path>) -> Result<()> {
    let transactions = load_transactions(file)?;
    let budgets = load_optional_budgets(budgets)?;
    let generator =
        InsightGenerator::with_config(ctx.config.insights.clone(), ctx.config.patterns.clone());
    let insights = generator.generate(&transactions, budgets.as_deref());

    if ctx.json {
        return print_json(&insights);
    }

    println!("💡 Spending Insights");
    println!("   ─────────────────────────────");
    if insights.is_empty() {
        println!("   Not enough data for insights yet.");
        return Ok(());
    }
    for insight in &insights {
        let icon = match insight.kind {
            InsightKind::Warning => "⚠️ ",
            InsightKind::Info => "ℹ️ ",
            InsightKind::Success => "✅",
            InsightKind::Tip => "💡",
        };
        println!(
            "   {} {} ({:.0}%)",
            icon,
            insight.title,
            insight.confidence * 100.0
        );
        println!("      {}", insight.message);
        if let (Some(text), Some(url)) = (&insight.action_text, &insight.action_url) {
            println!("      → {} ({})", text, url);
        }
    }
    Ok(())
}
