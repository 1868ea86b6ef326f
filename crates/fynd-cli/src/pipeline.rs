//! `fynd pipeline` — the full v2 scoring flow for one query.

use fynd_ai::LlmClient;
use fynd_core::{
    AppConfig, Condition, ConstraintKind, ExportBody, PreferenceCriterion, PreferenceProfile,
    SearchFilters,
};
use fynd_pipeline::{ExportWriter, PipelineOutcome};

pub(crate) struct ProfileArgs {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub locations: Vec<String>,
    pub require_shipping: bool,
    pub condition: Option<String>,
    pub prefer: Vec<String>,
}

pub(crate) async fn run(
    config: &AppConfig,
    query: &str,
    args: ProfileArgs,
    no_discovery: bool,
) -> anyhow::Result<()> {
    let soft_criteria = args
        .prefer
        .iter()
        .map(|raw| parse_soft_criterion(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let preferences = PreferenceProfile {
        min_price: args.min_price,
        max_price: args.max_price,
        locations: args.locations.clone(),
        require_shipping: args.require_shipping,
        condition: args.condition.as_deref().map(parse_condition).transpose()?,
        soft_criteria,
        ..PreferenceProfile::default()
    };
    let filters = SearchFilters {
        locations: args.locations,
        category: None,
        sort_order: None,
    };

    let client = crate::build_blocket_client(config)?;
    let llm = if no_discovery {
        None
    } else {
        Some(LlmClient::new(
            &config.openai_base_url,
            config.openai_api_key.as_deref(),
            &config.openai_model,
        )?)
    };

    let outcome = fynd_pipeline::run_pipeline(
        &client,
        llm.as_ref(),
        query,
        &filters,
        &preferences,
        &config.pipeline,
    )
    .await?;

    match outcome {
        PipelineOutcome::NeedsClarification(domain) => {
            println!(
                "domain unclear (best guess '{}', confidence {:.2})",
                domain.domain_label, domain.confidence
            );
            if let Some(question) = &domain.clarifying_question {
                println!("{question}");
            }
            for (i, option) in domain.clarification_options.iter().enumerate() {
                println!("  {}. {option}", i + 1);
            }
            println!("\nrefine the query and run again, or pass --no-discovery");
        }
        PipelineOutcome::Completed { export, domain } => {
            if let ExportBody::Ranked(ranked) = &export.body {
                if ranked.is_empty() {
                    println!("no candidates survived filtering for '{query}'");
                }
                for item in ranked {
                    let scores = &item.scores;
                    println!(
                        "#{:<3} score {:>3}  (value {:.0} / preference {:.0} / risk {:.0})",
                        item.rank,
                        scores.total_display(),
                        scores.value_score,
                        scores.preference_score,
                        scores.risk_score
                    );
                    crate::print_listing(&item.enriched.listing);
                    if let Some(stats) = &item.market_stats {
                        println!(
                            "{:>12}  market median {:.0} SEK over {} comparables",
                            "", stats.median, stats.n
                        );
                    }
                    for flag in &item.enriched.risk_flags {
                        println!("{:>12}  risk: {flag}", "");
                    }
                }
            }

            let meta = &export.metadata;
            println!(
                "\n{} fetched, {} after filter, {} ranked ({} invalid dropped)",
                meta.total_fetched,
                meta.after_filter,
                export.body.len(),
                meta.dropped_invalid
            );

            let path = ExportWriter::new(&config.exports_dir).write(&export)?;
            println!("exported to {}", path.display());

            if let Some(domain) = domain {
                if !domain.preference_questions.is_empty() {
                    println!(
                        "\nrefine the ranking for '{}' with --prefer attribute=value:",
                        domain.domain_label
                    );
                    for question in &domain.preference_questions {
                        println!("  {} ({})", question.question, question.id);
                        if !question.options.is_empty() {
                            println!("      options: {}", question.options.join(", "));
                        }
                        if let Some(why) = &question.why {
                            println!("      {why}");
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Parses one `--prefer` argument into a soft criterion.
///
/// `attribute=value` is an equality check, `attribute>=n` / `attribute<=n`
/// are numeric bounds, `attribute~text` is a substring match.
fn parse_soft_criterion(raw: &str) -> anyhow::Result<PreferenceCriterion> {
    let (attribute, constraint, value) = if let Some((a, v)) = raw.split_once(">=") {
        (a, ConstraintKind::Min, v)
    } else if let Some((a, v)) = raw.split_once("<=") {
        (a, ConstraintKind::Max, v)
    } else if let Some((a, v)) = raw.split_once('~') {
        (a, ConstraintKind::Contains, v)
    } else if let Some((a, v)) = raw.split_once('=') {
        (a, ConstraintKind::Equals, v)
    } else {
        anyhow::bail!(
            "invalid preference '{raw}' (expected attribute=value, attribute>=n, \
             attribute<=n or attribute~text)"
        );
    };

    let attribute = attribute.trim();
    let value = value.trim();
    if attribute.is_empty() || value.is_empty() {
        anyhow::bail!("invalid preference '{raw}': attribute and value must be non-empty");
    }

    let value = match constraint {
        ConstraintKind::Min | ConstraintKind::Max => {
            let number: f64 = value
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid preference '{raw}': '{value}' is not a number"))?;
            serde_json::json!(number)
        }
        ConstraintKind::Equals => value
            .parse::<f64>()
            .map_or_else(|_| serde_json::json!(value), |number| serde_json::json!(number)),
        ConstraintKind::Contains => serde_json::json!(value),
    };

    Ok(PreferenceCriterion {
        attribute: attribute.to_string(),
        value,
        constraint,
    })
}

fn parse_condition(value: &str) -> anyhow::Result<Condition> {
    match value.to_lowercase().replace('-', " ").as_str() {
        "ny" => Ok(Condition::Ny),
        "som ny" | "som_ny" => Ok(Condition::SomNy),
        "bra" => Ok(Condition::Bra),
        "ok" => Ok(Condition::Ok),
        "defekt" => Ok(Condition::Defekt),
        other => anyhow::bail!("unknown condition '{other}' (expected ny, som-ny, bra, ok, defekt)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_parsing_accepts_hyphenated_form() {
        assert_eq!(parse_condition("som-ny").unwrap(), Condition::SomNy);
        assert_eq!(parse_condition("NY").unwrap(), Condition::Ny);
        assert!(parse_condition("mint").is_err());
    }

    #[test]
    fn soft_criterion_parsing_covers_all_constraint_kinds() {
        let equals = parse_soft_criterion("condition=bra").unwrap();
        assert_eq!(equals.attribute, "condition");
        assert_eq!(equals.constraint, ConstraintKind::Equals);
        assert_eq!(equals.value, serde_json::json!("bra"));

        let min = parse_soft_criterion("storage_gb>=128").unwrap();
        assert_eq!(min.constraint, ConstraintKind::Min);
        assert_eq!(min.value, serde_json::json!(128.0));

        let max = parse_soft_criterion("battery_health<=90").unwrap();
        assert_eq!(max.constraint, ConstraintKind::Max);

        let contains = parse_soft_criterion("model_variant~pro").unwrap();
        assert_eq!(contains.constraint, ConstraintKind::Contains);
        assert_eq!(contains.value, serde_json::json!("pro"));
    }

    #[test]
    fn numeric_equals_value_is_parsed_as_a_number() {
        let criterion = parse_soft_criterion("storage_gb=256").unwrap();
        assert_eq!(criterion.value, serde_json::json!(256.0));
    }

    #[test]
    fn malformed_soft_criteria_are_rejected() {
        assert!(parse_soft_criterion("no-separator").is_err());
        assert!(parse_soft_criterion("=bra").is_err());
        assert!(parse_soft_criterion("condition=").is_err());
        assert!(parse_soft_criterion("storage_gb>=lots").is_err());
    }
}
