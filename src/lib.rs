pub mod aggregator;
pub mod cmd;
pub mod config;
pub mod parsers;
pub mod report;
pub mod scan;
pub mod source;
pub mod types;
pub mod utils;

pub use aggregator::{rank, search_keywords_in_text, Aggregator, MatchResult, RankedFile};
pub use report::ReportView;
pub use scan::{scan, scan_blocking, ScanOptions, ScanSummary};
pub use source::Source;
pub use types::{DocumentRecord, FileType, KeywordSet, ReportFormat};
pub use utils::{parse_filetype, parse_keywords, read_keywords_from_file};
