use std::fmt::Write as _;
use std::io::{self, Write};

use serde::Serialize;

use crate::discovery::DiscoveryRanking;
use crate::domain::GeneSymbol;
use crate::profile::TargetProfile;
use crate::xref::Resolution;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Json,
    Text,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_profile(profile: &TargetProfile) -> io::Result<()> {
        Self::print_json(profile)
    }

    pub fn print_ranking(ranking: &DiscoveryRanking) -> io::Result<()> {
        Self::print_json(ranking)
    }

    pub fn print_symbol(input: &str, symbol: &GeneSymbol) -> io::Result<()> {
        #[derive(Serialize)]
        struct Normalized<'a> {
            input: &'a str,
            symbol: &'a GeneSymbol,
        }
        Self::print_json(&Normalized { input, symbol })
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print(text: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }

    pub fn render_profile(profile: &TargetProfile) -> String {
        let mut out = String::new();
        let meta = &profile.metadata;
        let _ = writeln!(
            out,
            "{}  overall {}/100  {:?}",
            profile.gene.symbol, profile.scores.overall, profile.development_level
        );
        let _ = writeln!(
            out,
            "ensembl {}  uniprot {}",
            describe(&profile.gene.cross_refs.ensembl_gene_id),
            describe(&profile.gene.cross_refs.uniprot_accession)
        );
        let _ = writeln!(
            out,
            "sources {}/{} ok in {} ms (scoring v{})",
            meta.services_completed,
            meta.services_completed + meta.services_failed,
            meta.total_latency_ms,
            meta.scoring_version
        );
        out.push('\n');
        for (_, score) in profile.scores.dimensions.iter() {
            let _ = writeln!(
                out,
                "  {:<24}{:>6.1}  {}",
                score.label, score.score, score.rationale
            );
        }
        out.push('\n');
        for status in profile.raw_data.statuses() {
            let detail = status.error.as_deref().unwrap_or("ok");
            let _ = writeln!(
                out,
                "  {:<22}{:>7} ms  {}",
                status.kind.display_name(),
                status.response_time_ms,
                detail
            );
        }
        out
    }

    pub fn render_ranking(ranking: &DiscoveryRanking) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}: {} ranked, {} failed",
            ranking.disease,
            ranking.ranked.len(),
            ranking.failures.len()
        );
        for (position, target) in ranking.ranked.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>3}. {:<12}{:>4}  {:?}  ({}/7 sources)",
                position + 1,
                target.gene.as_str(),
                target.overall,
                target.development_level,
                target.services_completed
            );
        }
        for failure in &ranking.failures {
            let _ = writeln!(out, "   -  {:<12}{}", failure.input, failure.error);
        }
        out
    }
}

fn describe(resolution: &Resolution) -> &str {
    match resolution {
        Resolution::Found(id) => id,
        Resolution::NotFound => "not found",
        Resolution::Unavailable(_) => "unavailable",
    }
}
