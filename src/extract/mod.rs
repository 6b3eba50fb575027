use std::io::Read;
use std::path::Path;

use regex::Regex;
use tracing::warn;

/// Document formats the extractor understands. Anything else is rejected
/// by the submission handler before extraction is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Pptx,
}

impl DocumentKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(Self::Pdf)
        } else if lower.ends_with(".pptx") {
            Some(Self::Pptx)
        } else {
            None
        }
    }
}

/// Extracts plain text from a staged document. Extraction problems are
/// logged and degrade to whatever text was accumulated so far, possibly
/// nothing; they never fail the request.
pub fn extract_text(path: &Path, kind: DocumentKind) -> String {
    match kind {
        DocumentKind::Pdf => extract_pdf(path),
        DocumentKind::Pptx => extract_pptx(path),
    }
}

fn extract_pdf(path: &Path) -> String {
    match pdf_extract::extract_text(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("PDF extraction failed for {}: {}", path.display(), e);
            String::new()
        }
    }
}

// A .pptx is a zip archive; slide text lives in the <a:t> runs of
// ppt/slides/slideN.xml.
fn extract_pptx(path: &Path) -> String {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!("PPTX open failed for {}: {}", path.display(), e);
            return String::new();
        }
    };

    let mut archive = match zip::ZipArchive::new(file) {
        Ok(a) => a,
        Err(e) => {
            warn!("PPTX archive invalid for {}: {}", path.display(), e);
            return String::new();
        }
    };

    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    slide_names.sort_by_key(|n| slide_number(n));

    let run_pattern = Regex::new(r"(?s)<a:t[^>]*>(.*?)</a:t>").unwrap();

    let mut text = String::new();
    for name in slide_names {
        let mut slide = match archive.by_name(&name) {
            Ok(s) => s,
            Err(e) => {
                warn!("Skipping slide {}: {}", name, e);
                continue;
            }
        };

        let mut xml = String::new();
        if let Err(e) = slide.read_to_string(&mut xml) {
            warn!("Skipping slide {}: {}", name, e);
            continue;
        }

        for capture in run_pattern.captures_iter(&xml) {
            let run = decode_entities(&capture[1]);
            if !run.is_empty() {
                text.push_str(&run);
                text.push('\n');
            }
        }
    }

    text
}

fn slide_number(name: &str) -> u32 {
    name.trim_start_matches("ppt/slides/slide")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(0)
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
