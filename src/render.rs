//! Template renderer: fills `{{field}}` placeholder tokens with record
//! values. Supports docx templates (substitution inside the XML parts of the
//! ZIP package) and plain-text templates.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::spreadsheet::Record;

const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([^{}]+?)\s*\}\}";
const DOCUMENT_PART: &str = "word/document.xml";

pub struct Renderer {
    config: RenderConfig,
    pattern: Regex,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            pattern: Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"),
        }
    }

    /// Replaces every `{{field}}` token whose field exists in the record.
    /// Unmatched tokens stay as literal text; a stray placeholder is the
    /// template author's responsibility, not an error.
    pub fn substitute(&self, text: &str, record: &Record) -> String {
        self.substitute_with(text, record, |value| value.to_string())
    }

    fn substitute_with(
        &self,
        text: &str,
        record: &Record,
        escape: impl Fn(&str) -> String,
    ) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures| {
                let field = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
                match record.get(field) {
                    Some(value) => escape(value),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Renders one record into `output_path`, substituting placeholders in
    /// the template fetched to `template_path`.
    pub fn render(
        &self,
        template_path: &Path,
        record: &Record,
        output_path: &Path,
    ) -> Result<PathBuf, RenderError> {
        let is_docx = template_path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("docx"))
            .unwrap_or(false);
        if is_docx {
            self.render_docx(template_path, record, output_path)?;
        } else {
            self.render_text(template_path, record, output_path)?;
        }
        info!(
            template = %template_path.display(),
            output = %output_path.display(),
            "Rendered document"
        );
        Ok(output_path.to_path_buf())
    }

    /// Derives the output filename from the configured name field, or `None`
    /// when the record has no usable value there.
    pub fn output_filename(&self, record: &Record, extension: &str) -> Option<String> {
        let raw = record.get(&self.config.name_field)?.trim();
        let safe = sanitise_name(raw);
        if safe.is_empty() {
            return None;
        }
        if extension.is_empty() {
            Some(format!("{}{}", self.config.output_prefix, safe))
        } else {
            Some(format!("{}{}.{}", self.config.output_prefix, safe, extension))
        }
    }

    fn render_text(
        &self,
        template_path: &Path,
        record: &Record,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        let text = std::fs::read_to_string(template_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                RenderError::NotText(template_path.to_path_buf())
            } else {
                RenderError::Io(e)
            }
        })?;
        let filled = self.substitute(&text, record);
        std::fs::write(output_path, filled)?;
        Ok(())
    }

    /// Rewrites the docx ZIP package: entries holding visible text get their
    /// placeholders substituted (XML-escaped), everything else is copied raw.
    fn render_docx(
        &self,
        template_path: &Path,
        record: &Record,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        let package_err = |e: zip::result::ZipError| RenderError::Package {
            path: template_path.to_path_buf(),
            source: e,
        };

        let file = File::open(template_path)?;
        let mut archive = ZipArchive::new(file).map_err(package_err)?;

        if archive.by_name(DOCUMENT_PART).is_err() {
            return Err(RenderError::MissingDocumentPart(
                template_path.to_path_buf(),
            ));
        }

        let out = File::create(output_path)?;
        let mut writer = ZipWriter::new(out);

        for index in 0..archive.len() {
            let substitute_entry = {
                let entry = archive.by_index_raw(index).map_err(package_err)?;
                is_text_part(entry.name())
            };

            if substitute_entry {
                let mut entry = archive.by_index(index).map_err(package_err)?;
                let name = entry.name().to_string();
                let mut xml = String::new();
                entry.read_to_string(&mut xml)?;
                drop(entry);

                let filled = self.substitute_with(&xml, record, xml_escape);
                debug!(part = %name, "Substituted placeholders in package part");
                writer
                    .start_file(name, FileOptions::default())
                    .map_err(package_err)?;
                writer.write_all(filled.as_bytes())?;
            } else {
                let entry = archive.by_index_raw(index).map_err(package_err)?;
                writer.raw_copy_file(entry).map_err(package_err)?;
            }
        }

        writer.finish().map_err(package_err)?;
        Ok(())
    }
}

/// Parts of the docx package that carry visible text.
fn is_text_part(name: &str) -> bool {
    name == DOCUMENT_PART
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

/// Escapes a record value for insertion into an XML text node.
fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Lowercases the name-field value and strips path-hostile characters, the
/// same normalisation the published filenames have always used.
fn sanitise_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|ch| if ch.is_whitespace() { '_' } else { ch })
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
        .collect()
}
