//! Keyword aggregation and ranking over extracted document text.
//!
//! An [`Aggregator`] owns the three accumulators a scan fills in: the files
//! matching each keyword, the files matching every keyword, and the number of
//! distinct keywords each file matched.

use std::collections::HashMap;

use serde::Serialize;

use crate::report::{KeywordSection, ReportView};
use crate::types::{DocumentRecord, KeywordSet, SkippedDocument};

/// Per-document presence flags, aligned with the [`KeywordSet`] they were
/// computed against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult<'k> {
    keywords: &'k KeywordSet,
    hits: Vec<bool>,
}

impl<'k> MatchResult<'k> {
    /// Presence flag for `keyword` as 0 or 1, or `None` if it was not queried.
    pub fn get(&self, keyword: &str) -> Option<u8> {
        self.keywords
            .position(keyword)
            .map(|index| u8::from(self.hits[index]))
    }

    /// Number of distinct keywords present.
    pub fn total(&self) -> usize {
        self.hits.iter().filter(|hit| **hit).count()
    }

    /// Whether every queried keyword is present.
    pub fn all(&self) -> bool {
        self.hits.iter().all(|hit| *hit)
    }

    /// Keywords present in the document, in query order.
    pub fn matched(&self) -> impl Iterator<Item = &'k str> + '_ {
        self.keywords
            .iter()
            .zip(self.hits.iter())
            .filter(|(_, hit)| **hit)
            .map(|(keyword, _)| keyword)
    }
}

/// Case-insensitive literal substring search of every keyword in `text`.
pub fn search_keywords_in_text<'k>(text: &str, keywords: &'k KeywordSet) -> MatchResult<'k> {
    let lower = text.to_lowercase();
    search_lowercase(&lower, keywords)
}

fn search_lowercase<'k>(lower: &str, keywords: &'k KeywordSet) -> MatchResult<'k> {
    let hits = keywords.iter().map(|keyword| lower.contains(keyword)).collect();
    MatchResult { keywords, hits }
}

/// One row of the match ranking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankedFile {
    pub file: String,
    pub matches: usize,
}

/// Order files by match count, highest first. Equal counts are ordered by
/// file name so the ranking is stable across runs.
pub fn rank(file_keyword_matches: &HashMap<String, usize>) -> Vec<RankedFile> {
    let mut ranking: Vec<RankedFile> = file_keyword_matches
        .iter()
        .map(|(file, matches)| RankedFile {
            file: file.clone(),
            matches: *matches,
        })
        .collect();

    ranking.sort_by(|a, b| b.matches.cmp(&a.matches).then_with(|| a.file.cmp(&b.file)));
    ranking
}

/// Accumulated keyword matches for one scan.
#[derive(Clone, Debug)]
pub struct Aggregator {
    keywords: KeywordSet,
    // indexed like `keywords`
    matched_files: Vec<Vec<String>>,
    // keyword indices in the order each first matched a file
    first_seen: Vec<usize>,
    matched_all_keywords: Vec<String>,
    // never holds a zero count
    file_keyword_matches: HashMap<String, usize>,
    documents_processed: usize,
}

impl Aggregator {
    pub fn new(keywords: KeywordSet) -> Self {
        let matched_files = vec![Vec::new(); keywords.len()];
        Self {
            keywords,
            matched_files,
            first_seen: Vec::new(),
            matched_all_keywords: Vec::new(),
            file_keyword_matches: HashMap::new(),
            documents_processed: 0,
        }
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    /// Fold one document's text into the accumulators.
    pub fn process_text(&mut self, filename: &str, text: &str) {
        let lower = text.to_lowercase();
        self.apply(filename, &lower);
    }

    /// Fold an already lowercased document into the accumulators.
    pub fn process_record(&mut self, record: &DocumentRecord) {
        self.apply(record.name(), record.text());
    }

    fn apply(&mut self, filename: &str, lower: &str) {
        let result = search_lowercase(lower, &self.keywords);
        let total = result.total();

        if total > 0 {
            self.file_keyword_matches.insert(filename.to_owned(), total);
        }

        if result.all() {
            self.matched_all_keywords.push(filename.to_owned());
        }

        for (index, hit) in result.hits.iter().enumerate() {
            if *hit {
                if self.matched_files[index].is_empty() {
                    self.first_seen.push(index);
                }
                self.matched_files[index].push(filename.to_owned());
            }
        }

        self.documents_processed += 1;
    }

    /// Files containing `keyword`, in processing order.
    pub fn matched_files(&self, keyword: &str) -> &[String] {
        match self.keywords.position(keyword) {
            Some(index) => self.matched_files[index].as_slice(),
            None => &[],
        }
    }

    /// Keywords with at least one matching file, paired with their files, in
    /// the order each keyword first matched.
    pub fn keywords_with_matches(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.first_seen.iter().map(|&index| {
            (
                self.keywords.as_slice()[index].as_str(),
                self.matched_files[index].as_slice(),
            )
        })
    }

    pub fn matched_all_keywords(&self) -> &[String] {
        &self.matched_all_keywords
    }

    pub fn file_keyword_matches(&self) -> &HashMap<String, usize> {
        &self.file_keyword_matches
    }

    pub fn documents_processed(&self) -> usize {
        self.documents_processed
    }

    pub fn rank(&self) -> Vec<RankedFile> {
        rank(&self.file_keyword_matches)
    }

    /// Build the three-section report view.
    pub fn report(&self, skipped: &[SkippedDocument]) -> ReportView {
        ReportView {
            keyword_count: self.keywords.len(),
            keywords: self.keywords.as_slice().to_vec(),
            all_keywords: self.matched_all_keywords.clone(),
            by_keyword: self
                .keywords_with_matches()
                .map(|(keyword, files)| KeywordSection {
                    keyword: keyword.to_owned(),
                    files: files.to_vec(),
                })
                .collect(),
            ranking: self.rank(),
            documents_scanned: self.documents_processed,
            skipped: skipped.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_keywords;

    fn keywords(input: &str) -> KeywordSet {
        parse_keywords(input).unwrap()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let set = keywords("java,python,rust");
        let result = search_keywords_in_text("Experienced JAVA and Python developer", &set);

        assert_eq!(result.get("java"), Some(1));
        assert_eq!(result.get("python"), Some(1));
        assert_eq!(result.get("rust"), Some(0));
        assert_eq!(result.get("go"), None);
        assert_eq!(result.total(), 2);
        assert!(!result.all());
        assert_eq!(result.matched().collect::<Vec<_>>(), vec!["java", "python"]);
    }

    #[test]
    fn test_search_has_no_tokenization() {
        // "javascript" contains "java"; substring semantics count it
        let set = keywords("java,c++,node.js");
        let result = search_keywords_in_text("JavaScript, C++ and Node.js", &set);
        assert!(result.all());
    }

    #[test]
    fn test_process_text_partial_match() {
        let mut aggregator = Aggregator::new(keywords("java,python,rust"));
        aggregator.process_text("doc.pdf", "Experienced Java and Python developer");

        assert!(aggregator.matched_all_keywords().is_empty());
        assert_eq!(aggregator.file_keyword_matches().get("doc.pdf"), Some(&2));
        assert_eq!(aggregator.matched_files("java"), &["doc.pdf"]);
        assert_eq!(aggregator.matched_files("python"), &["doc.pdf"]);
        assert!(aggregator.matched_files("rust").is_empty());
    }

    #[test]
    fn test_process_text_full_match() {
        let mut aggregator = Aggregator::new(keywords("sql,docker"));
        aggregator.process_text("a.docx", "Docker, PostgreSQL");

        assert_eq!(aggregator.matched_all_keywords(), &["a.docx"]);
        assert_eq!(aggregator.file_keyword_matches().get("a.docx"), Some(&2));
    }

    #[test]
    fn test_zero_matches_are_not_stored() {
        let mut aggregator = Aggregator::new(keywords("haskell"));
        aggregator.process_text("a.pdf", "Java developer");

        assert!(aggregator.file_keyword_matches().is_empty());
        assert!(aggregator.matched_all_keywords().is_empty());
        assert_eq!(aggregator.keywords_with_matches().count(), 0);
        assert_eq!(aggregator.documents_processed(), 1);
    }

    #[test]
    fn test_presence_invariants_over_many_documents() {
        let set = keywords("rust,go,sql");
        let texts = [
            ("a.pdf", "Rust and Go"),
            ("b.pdf", "nothing relevant"),
            ("c.pdf", "rust go sql"),
            ("d.pdf", "MySQL"),
        ];

        let mut aggregator = Aggregator::new(set.clone());
        for (name, text) in texts {
            aggregator.process_text(name, text);
        }

        for (name, text) in texts {
            let result = search_keywords_in_text(text, &set);
            assert_eq!(
                aggregator.file_keyword_matches().contains_key(name),
                result.total() > 0,
                "{}",
                name
            );
            assert_eq!(
                aggregator.matched_all_keywords().iter().any(|f| f == name),
                result.all(),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_rank_descending_with_name_tie_break() {
        let mut matches = HashMap::new();
        matches.insert("carol.pdf".to_string(), 1);
        matches.insert("bob.pdf".to_string(), 3);
        matches.insert("alice.pdf".to_string(), 1);
        matches.insert("dave.pdf".to_string(), 2);

        let ranking = rank(&matches);
        let order: Vec<(&str, usize)> = ranking
            .iter()
            .map(|r| (r.file.as_str(), r.matches))
            .collect();
        assert_eq!(
            order,
            vec![("bob.pdf", 3), ("dave.pdf", 2), ("alice.pdf", 1), ("carol.pdf", 1)]
        );
    }

    #[test]
    fn test_report_sections_follow_first_seen_order() {
        let mut aggregator = Aggregator::new(keywords("python,java,rust"));
        aggregator.process_text("a.pdf", "java");
        aggregator.process_text("b.pdf", "python java");

        let report = aggregator.report(&[]);
        let sections: Vec<&str> = report.by_keyword.iter().map(|s| s.keyword.as_str()).collect();
        assert_eq!(sections, vec!["java", "python"]);
        assert_eq!(report.by_keyword[0].files, vec!["a.pdf", "b.pdf"]);
        assert_eq!(report.by_keyword[1].files, vec!["b.pdf"]);
        assert_eq!(report.ranking[0].file, "b.pdf");
        assert_eq!(report.keyword_count, 3);
        assert_eq!(report.documents_scanned, 2);
    }

    #[test]
    fn test_first_seen_order_within_one_document_follows_query() {
        let mut aggregator = Aggregator::new(keywords("rust,go"));
        aggregator.process_text("a.pdf", "nothing");
        aggregator.process_text("b.pdf", "go and rust");

        let order: Vec<&str> = aggregator.keywords_with_matches().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["rust", "go"]);
    }

    #[test]
    fn test_keyword_count_uses_normalized_keywords() {
        let aggregator = Aggregator::new(keywords("Java,,python, JAVA"));
        let report = aggregator.report(&[]);
        assert_eq!(report.keyword_count, 2);
        assert_eq!(
            report.ranking_heading(),
            "File ranking according to matches (2 keywords entered):"
        );
    }
}
