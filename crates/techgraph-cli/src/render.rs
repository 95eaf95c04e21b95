//! Human-readable terminal output.

use techgraph_core::engine::{DiagnosticResult, ErrorDiagnosis, Payload};
use techgraph_core::GraphStats;

pub fn print_result(result: &DiagnosticResult) {
    println!("Intent: {} ({} ms)", result.intent, result.response_time_ms);

    let Some(payload) = &result.payload else {
        let kind = result
            .failure_kind
            .map(|k| k.as_str())
            .unwrap_or("UNKNOWN");
        let reason = result.failure_reason.as_deref().unwrap_or("");
        println!("No answer [{kind}]: {reason}");
        if result.is_retryable() {
            println!("The graph backend may be temporarily unavailable; try again.");
        }
        return;
    };

    match payload {
        Payload::ErrorDiagnosis(diagnosis) => print_diagnosis(diagnosis),
        Payload::Compatibility(compat) => {
            println!("Compatible with {}:", compat.product_sku);
            for product in &compat.compatible_products {
                println!(
                    "  {:<14} {:>6.1} kW  {}",
                    product.sku, product.capacity_kw, product.name
                );
            }
        }
        Payload::CableSpecs(specs) => {
            if let Some(term) = &specs.term {
                println!("Cable specifications matching '{term}':");
            } else {
                println!("Cable specifications:");
            }
            for spec in &specs.cable_specs {
                let max = spec
                    .max_length_m
                    .map(|m| format!("max {m} m"))
                    .unwrap_or_default();
                println!(
                    "  [{}] {} - {} ({}) {max}",
                    spec.cable_type, spec.specification, spec.application, spec.id
                );
            }
        }
        Payload::FrequencyRanking(ranking) => {
            println!("Most frequent errors (top {}):", ranking.limit);
            for (i, entry) in ranking.ranking.iter().enumerate() {
                println!(
                    "  {:>2}. {} on {:<14} x{:<4} {}",
                    i + 1,
                    entry.error_code,
                    entry.product_sku,
                    entry.frequency,
                    entry.description.as_deref().unwrap_or("")
                );
            }
        }
        Payload::Installers(installers) => {
            match &installers.region {
                Some(region) => println!("Certified installers in {region}:"),
                None => println!("Certified installers:"),
            }
            for entry in &installers.installers {
                let i = &entry.installer;
                println!("  {} ({}) - {}", i.name, i.company, i.region);
                if let Some(contact) = &i.contact {
                    println!("      WhatsApp: {contact}");
                }
                if !entry.certified_for.is_empty() {
                    println!("      Certified for: {}", entry.certified_for.join(", "));
                }
            }
        }
    }
}

fn print_diagnosis(diagnosis: &ErrorDiagnosis) {
    let error = &diagnosis.error;
    println!("{} [{}] {}", error.code, error.severity, error.description);
    println!("Estimated resolution: {} min", error.resolution_minutes);
    println!("Steps:");
    for (i, step) in error.resolution_steps.iter().enumerate() {
        println!("  {}. {step}", i + 1);
    }

    let Some(product) = &diagnosis.product else {
        return;
    };
    println!();
    if !product.found {
        println!("Product {}: not found", product.sku);
    } else if product.affected {
        println!("Product {}: affected", product.sku);
        if let Some(frequency) = product.frequency {
            println!("  Reported {frequency} times");
        }
        for condition in &product.conditions {
            println!("  - {condition}");
        }
    } else {
        println!("Product {}: no record of this error", product.sku);
    }
    if let Some(note) = &product.note {
        println!("  Note: {note}");
    }
}

pub fn print_stats(stats: &GraphStats) {
    println!("Nodes ({}):", stats.total_nodes());
    for (label, count) in &stats.nodes {
        println!("  {label:<12} {count}");
    }
    println!("Relationships ({}):", stats.total_relationships());
    for (relation, count) in &stats.relationships {
        println!("  {relation:<16} {count}");
    }
}
