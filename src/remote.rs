//! Remote genome corpus: taxon search and assembly download.
//!
//! `NcbiClient` talks to NCBI E-utilities; everything above it only sees the
//! `CorpusSource` trait so tests can substitute an in-process corpus.
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const SUMMARY_CHUNK: usize = 200;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonQuery {
    pub taxon: String,
    /// Restrict to complete genomes (`--no-draft` / `--complete`).
    pub complete_only: bool,
    pub max: Option<usize>,
}

/// One assembly as reported by the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    pub accession: String,
    pub organism: String,
    pub species: String,
    pub url: String,
}

impl RemoteRecord {
    /// Dataset name: organism plus accession, sanitized to `[A-Za-z0-9_]`.
    pub fn dataset_name(&self) -> String {
        let base = if self.organism.is_empty() {
            self.accession.clone()
        } else {
            format!("{}_{}", self.organism, self.accession)
        };
        let name = crate::util::sanitize_name(&base);
        let mut collapsed = String::with_capacity(name.len());
        for ch in name.chars() {
            if ch == '_' && collapsed.ends_with('_') {
                continue;
            }
            collapsed.push(ch);
        }
        collapsed.trim_matches('_').to_string()
    }

    /// `s:Species_name` label for the `tax` metadata key.
    pub fn taxonomy_label(&self) -> Option<String> {
        let species = self.species.trim();
        (!species.is_empty()).then(|| format!("s:{}", species.replace(' ', "_")))
    }
}

pub trait CorpusSource {
    fn search(&self, query: &TaxonQuery) -> Result<Vec<RemoteRecord>>;

    /// Download `record` into `dest_dir`, returning the written file.
    fn download(&self, record: &RemoteRecord, dest_dir: &Path) -> Result<PathBuf>;
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    esearchresult: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    result: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AssemblySummary {
    #[serde(default)]
    assemblyaccession: String,
    #[serde(default)]
    organism: String,
    #[serde(default)]
    speciesname: String,
    #[serde(default)]
    ftppath_genbank: String,
}

pub struct NcbiClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: Option<String>,
}

impl NcbiClient {
    pub fn new(api_key: Option<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DEFAULT_TIMEOUT))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            base_url: EUTILS_BASE.to_string(),
            api_key,
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        let mut request = self.agent.get(&url);
        for (key, value) in query {
            request = request.query(*key, value);
        }
        if let Some(key) = &self.api_key {
            request = request.query("api_key", key);
        }
        let mut response = request
            .call()
            .with_context(|| format!("request {endpoint}"))?;
        response
            .body_mut()
            .read_json::<T>()
            .with_context(|| format!("parse {endpoint} response"))
    }

    fn search_ids(&self, query: &TaxonQuery) -> Result<Vec<String>> {
        let mut term = format!("{}[Organism] AND latest[filter]", query.taxon);
        if query.complete_only {
            term.push_str(" AND \"complete genome\"[filter]");
        }
        let retmax = query.max.unwrap_or(100_000).to_string();
        let envelope: SearchEnvelope = self.get_json(
            "esearch.fcgi",
            &[
                ("db", "assembly".to_string()),
                ("term", term),
                ("retmode", "json".to_string()),
                ("retmax", retmax),
            ],
        )?;
        Ok(envelope.esearchresult.idlist)
    }
}

impl CorpusSource for NcbiClient {
    fn search(&self, query: &TaxonQuery) -> Result<Vec<RemoteRecord>> {
        let ids = self.search_ids(query)?;
        tracing::info!(taxon = %query.taxon, hits = ids.len(), "assembly search");
        let mut records = Vec::new();
        for chunk in ids.chunks(SUMMARY_CHUNK) {
            let envelope: SummaryEnvelope = self.get_json(
                "esummary.fcgi",
                &[
                    ("db", "assembly".to_string()),
                    ("id", chunk.join(",")),
                    ("retmode", "json".to_string()),
                ],
            )?;
            for id in chunk {
                let Some(raw) = envelope.result.get(id) else {
                    continue;
                };
                let summary: AssemblySummary = serde_json::from_value(raw.clone())
                    .with_context(|| format!("parse assembly summary {id}"))?;
                if summary.ftppath_genbank.is_empty() {
                    tracing::debug!(id = %id, "assembly without GenBank path");
                    continue;
                }
                records.push(RemoteRecord {
                    url: genomic_fasta_url(&summary.ftppath_genbank),
                    accession: summary.assemblyaccession,
                    organism: summary.organism,
                    species: summary.speciesname,
                });
            }
        }
        if let Some(max) = query.max {
            records.truncate(max);
        }
        Ok(records)
    }

    fn download(&self, record: &RemoteRecord, dest_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dest_dir)
            .with_context(|| format!("create {}", dest_dir.display()))?;
        let file_name = record
            .url
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| anyhow!("cannot derive a file name from {}", record.url))?;
        let dest = dest_dir.join(file_name);

        let mut response = self
            .agent
            .get(&record.url)
            .call()
            .with_context(|| format!("download {}", record.url))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dest_dir)
            .with_context(|| format!("create temp file in {}", dest_dir.display()))?;
        std::io::copy(&mut response.body_mut().as_reader(), &mut tmp)
            .with_context(|| format!("write {}", dest.display()))?;
        tmp.flush()?;
        tmp.persist(&dest)
            .map_err(|err| err.error)
            .with_context(|| format!("persist {}", dest.display()))?;
        tracing::debug!(accession = %record.accession, path = %dest.display(), "downloaded assembly");
        Ok(dest)
    }
}

/// `ftp://host/dir/GCA_x_name` → `https://host/dir/GCA_x_name/GCA_x_name_genomic.fna.gz`.
pub fn genomic_fasta_url(ftp_path: &str) -> String {
    let https = match ftp_path.strip_prefix("ftp://") {
        Some(rest) => format!("https://{rest}"),
        None => ftp_path.to_string(),
    };
    let https = https.trim_end_matches('/');
    let basename = https.rsplit('/').next().unwrap_or(https);
    format!("{https}/{basename}_genomic.fna.gz")
}
