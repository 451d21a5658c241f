//! Accession resolver - longest-prefix match against a URL template table.
//!
//! The [`AccessionTable`] keeps its entries sorted by descending prefix
//! length, so `PRJNA` is tried before `PRJ` and the most specific template
//! wins. Lookup is pure and synchronous.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::identifier::IdentifierType;

use super::{ResolutionSource, ResolveError, ResolvedUrl, Resolver};

/// Substitution point for the accession inside a template.
pub const ACCESSION_PLACEHOLDER: &str = "{acc}";

const NCBI_NUCCORE: &str = "https://www.ncbi.nlm.nih.gov/nuccore/{acc}";
const NCBI_PROTEIN: &str = "https://www.ncbi.nlm.nih.gov/protein/{acc}";
const NCBI_GEO: &str = "https://www.ncbi.nlm.nih.gov/geo/query/acc.cgi?acc={acc}";
const NCBI_SRA: &str = "https://www.ncbi.nlm.nih.gov/sra/{acc}";
const NCBI_ASSEMBLY: &str = "https://www.ncbi.nlm.nih.gov/datasets/genome/{acc}/";
const ENA_BROWSER: &str = "https://www.ebi.ac.uk/ena/browser/view/{acc}";

/// Built-in prefix → template pairs.
const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    // RefSeq nucleotide
    ("NC_", NCBI_NUCCORE),
    ("NG_", NCBI_NUCCORE),
    ("NM_", NCBI_NUCCORE),
    ("NR_", NCBI_NUCCORE),
    ("NT_", NCBI_NUCCORE),
    ("NW_", NCBI_NUCCORE),
    ("NZ_", NCBI_NUCCORE),
    ("XM_", NCBI_NUCCORE),
    ("XR_", NCBI_NUCCORE),
    // RefSeq protein
    ("NP_", NCBI_PROTEIN),
    ("WP_", NCBI_PROTEIN),
    ("XP_", NCBI_PROTEIN),
    ("YP_", NCBI_PROTEIN),
    // GEO
    ("GSE", NCBI_GEO),
    ("GSM", NCBI_GEO),
    ("GPL", NCBI_GEO),
    ("GDS", NCBI_GEO),
    // SRA
    ("SRP", NCBI_SRA),
    ("SRR", NCBI_SRA),
    ("SRS", NCBI_SRA),
    ("SRX", NCBI_SRA),
    // ENA
    ("ERP", ENA_BROWSER),
    ("ERR", ENA_BROWSER),
    ("ERS", ENA_BROWSER),
    ("ERX", ENA_BROWSER),
    ("PRJ", ENA_BROWSER),
    // BioProject / BioSample
    ("PRJNA", "https://www.ncbi.nlm.nih.gov/bioproject/{acc}"),
    ("SAMN", "https://www.ncbi.nlm.nih.gov/biosample/{acc}"),
    ("SAME", "https://www.ebi.ac.uk/biosamples/samples/{acc}"),
    // Assemblies
    ("GCA_", NCBI_ASSEMBLY),
    ("GCF_", NCBI_ASSEMBLY),
    // EBI archives
    ("E-MTAB-", "https://www.ebi.ac.uk/biostudies/arrayexpress/studies/{acc}"),
    ("PXD", "https://www.ebi.ac.uk/pride/archive/projects/{acc}"),
    ("MTBLS", "https://www.ebi.ac.uk/metabolights/{acc}"),
    ("EMD-", "https://www.ebi.ac.uk/emdb/{acc}"),
    ("EMPIAR-", "https://www.ebi.ac.uk/empiar/{acc}/"),
    // Ensembl stable IDs
    ("ENS", "https://www.ensembl.org/id/{acc}"),
];

/// Errors building an accession template table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessionTableError {
    /// Prefix was empty after trimming
    #[error("accession prefix must not be empty")]
    EmptyPrefix,

    /// Template does not contain exactly one placeholder
    #[error(
        "accession template for prefix '{prefix}' must contain {{acc}} exactly once: '{template}'"
    )]
    InvalidTemplate {
        /// Prefix the template was registered for
        prefix: String,
        /// The rejected template
        template: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TemplateEntry {
    prefix: String,
    template: String,
}

/// Prefix → URL template table with longest-prefix-match lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessionTable {
    // Sorted by descending prefix length, then prefix text.
    entries: Vec<TemplateEntry>,
}

impl AccessionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces the template for `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessionTableError`] when the prefix is empty or the template
    /// does not contain [`ACCESSION_PLACEHOLDER`] exactly once.
    pub fn insert(
        &mut self,
        prefix: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<(), AccessionTableError> {
        let prefix = prefix.into().trim().to_string();
        let template = template.into().trim().to_string();
        if prefix.is_empty() {
            return Err(AccessionTableError::EmptyPrefix);
        }
        if template.matches(ACCESSION_PLACEHOLDER).count() != 1 {
            return Err(AccessionTableError::InvalidTemplate { prefix, template });
        }

        match self.entries.iter_mut().find(|entry| entry.prefix == prefix) {
            Some(existing) => existing.template = template,
            None => {
                self.entries.push(TemplateEntry { prefix, template });
                self.sort_entries();
            }
        }
        Ok(())
    }

    fn sort_entries(&mut self) {
        self.entries.sort_by(|a, b| {
            b.prefix
                .len()
                .cmp(&a.prefix.len())
                .then_with(|| a.prefix.cmp(&b.prefix))
        });
    }

    /// Returns the number of prefixes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no prefixes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns prefixes in match order (longest first).
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.prefix.as_str())
    }

    /// Returns the template URL for `accession`, or `None` if no prefix matches.
    #[must_use]
    pub fn lookup(&self, accession: &str) -> Option<String> {
        let accession = accession.trim();
        self.entries
            .iter()
            .find(|entry| accession.starts_with(entry.prefix.as_str()))
            .map(|entry| entry.template.replace(ACCESSION_PLACEHOLDER, accession))
    }
}

impl Default for AccessionTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for (prefix, template) in DEFAULT_TEMPLATES {
            table.entries.push(TemplateEntry {
                prefix: (*prefix).to_string(),
                template: (*template).to_string(),
            });
        }
        table.sort_entries();
        table
    }
}

/// Resolves accessions through an [`AccessionTable`].
#[derive(Debug, Clone)]
pub struct AccessionResolver {
    table: AccessionTable,
}

impl AccessionResolver {
    /// Creates a resolver over `table`.
    #[must_use]
    pub fn new(table: AccessionTable) -> Self {
        Self { table }
    }

    /// Returns the underlying table.
    #[must_use]
    pub fn table(&self) -> &AccessionTable {
        &self.table
    }
}

#[async_trait]
impl Resolver for AccessionResolver {
    fn name(&self) -> &'static str {
        "accession"
    }

    fn can_handle(&self, identifier_type: IdentifierType) -> bool {
        identifier_type == IdentifierType::Accession
    }

    #[tracing::instrument(skip(self), fields(resolver = "accession"))]
    async fn resolve(&self, input: &str) -> Result<ResolvedUrl, ResolveError> {
        match self.table.lookup(input) {
            Some(url) => {
                debug!(url = %url, "Accession template matched");
                Ok(ResolvedUrl::new(url, ResolutionSource::AccessionTemplate))
            }
            None => {
                debug!("No accession prefix matched");
                Err(ResolveError::unsupported(input))
            }
        }
    }
}
