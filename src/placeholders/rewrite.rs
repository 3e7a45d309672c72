use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::{PlaceholderOccurrence, PlaceholderScan};

/// Original placeholder name to the generated names that replaced it, in text order.
///
/// Only names that occurred more than once have an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl ExpansionTable {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Generated names for an original name; empty when it was not rewritten.
    #[must_use]
    pub fn generated(&self, name: &str) -> &[String] {
        self.entries.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn push(&mut self, name: &str, generated: String) {
        self.entries
            .entry(name.to_string())
            .or_default()
            .push(generated);
    }
}

/// Statement text after duplicate placeholders have been given unique names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenQuery<'a> {
    /// Borrowed when nothing needed rewriting.
    pub sql: Cow<'a, str>,
    pub expansions: ExpansionTable,
    /// Generated-name tokens, with offsets into the rewritten text.
    pub replacements: Vec<PlaceholderOccurrence>,
}

/// Give every occurrence of a repeated placeholder name its own generated name.
///
/// All occurrences of a repeated name are replaced, the first one included. Generated
/// names take the form `<name>_<k>` with the smallest `k` not already used by any
/// placeholder in the statement. Text outside the replaced tokens is copied verbatim.
///
/// ```rust
/// use sql_cipher_middleware::placeholders::{rewrite, scan};
///
/// let sql = "SELECT * FROM t WHERE a = :x OR b = :x";
/// let out = rewrite(sql, &scan(sql));
/// assert_eq!(out.sql, "SELECT * FROM t WHERE a = :x_0 OR b = :x_1");
/// assert_eq!(out.expansions.generated("x"), ["x_0", "x_1"]);
/// ```
#[must_use]
pub fn rewrite<'a>(sql: &'a str, scan: &PlaceholderScan) -> RewrittenQuery<'a> {
    if !scan.has_duplicates() {
        return RewrittenQuery {
            sql: Cow::Borrowed(sql),
            expansions: ExpansionTable::default(),
            replacements: Vec::new(),
        };
    }

    let mut used: HashSet<String> = scan.counts.keys().cloned().collect();
    let mut next_suffix: HashMap<&str, usize> = HashMap::new();
    let mut expansions = ExpansionTable::default();
    let mut replacements = Vec::new();
    let mut out = String::with_capacity(sql.len() + scan.occurrences.len() * 2);
    let mut copied_to = 0;

    for occ in &scan.occurrences {
        if scan.counts.get(&occ.name).copied().unwrap_or(0) < 2 {
            continue;
        }

        // Suffixes below the hint are already taken; the used set only grows.
        let suffix = next_suffix.entry(occ.name.as_str()).or_insert(0);
        let generated = loop {
            let candidate = format!("{}_{}", occ.name, *suffix);
            *suffix += 1;
            if !used.contains(&candidate) {
                break candidate;
            }
        };
        used.insert(generated.clone());

        out.push_str(&sql[copied_to..occ.position]);
        replacements.push(PlaceholderOccurrence {
            position: out.len(),
            length: generated.len() + 1,
            name: generated.clone(),
        });
        out.push(':');
        out.push_str(&generated);
        copied_to = occ.position + occ.length;

        expansions.push(&occ.name, generated);
    }
    out.push_str(&sql[copied_to..]);

    RewrittenQuery {
        sql: Cow::Owned(out),
        expansions,
        replacements,
    }
}
