//! Integration tests for directory batch processing.

use std::fs;
use std::path::Path;

use lopdf::dictionary;
use lopdf::{Document, Object, Stream, StringFormat};
use tempfile::TempDir;

use pdfoutline::error::Result;
use pdfoutline::render::from_json;
use pdfoutline::{
    run_batch, BatchOptions, Error, FileStatus, HeadingLevel, JsonFormat, LanguageModel,
    OutlineOptions, Prediction,
};

struct English;

impl LanguageModel for English {
    fn predict(&self, _text: &str, _k: usize) -> Result<Vec<Prediction>> {
        Ok(vec![Prediction::new("__label__en", 0.97)])
    }
}

/// Build a Letter-sized PDF with one content stream per page.
fn build_pdf(pages: &[String], title: Option<&str>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for content in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(title.as_bytes().to_vec(), StringFormat::Literal),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn chapter_page(number: usize) -> String {
    format!(
        "BT /F2 24 Tf 72 740 Td (Chapter {}) Tj ET \
         BT /F1 11 Tf 72 600 Td (Plain body text for the chapter.) Tj ET \
         BT /F1 11 Tf 72 585 Td (More plain body text follows here.) Tj ET",
        number
    )
}

fn write_pdf(dir: &Path, name: &str, pages: usize, title: Option<&str>) {
    let pages: Vec<String> = (1..=pages).map(chapter_page).collect();
    fs::write(dir.join(name), build_pdf(&pages, title)).unwrap();
}

struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("input")).unwrap();
        Self { root }
    }

    fn input(&self) -> std::path::PathBuf {
        self.root.path().join("input")
    }

    fn output(&self) -> std::path::PathBuf {
        self.root.path().join("output")
    }

    fn options(&self) -> BatchOptions {
        BatchOptions::new(self.input(), self.output())
            .with_root(self.root.path())
            .with_jobs(2)
    }
}

#[test]
fn test_batch_processes_directory() {
    let ws = Workspace::new();
    write_pdf(&ws.input(), "b_manual.pdf", 2, Some("Operator Manual"));
    write_pdf(&ws.input(), "A_Guide.PDF", 1, None);
    fs::write(ws.input().join("broken.pdf"), b"%PDF-1.4\nthis is not a pdf").unwrap();
    fs::write(ws.input().join("notes.txt"), b"ignored").unwrap();

    let report = run_batch(&ws.options(), &English).unwrap();

    // Inputs are visited in sorted order, text files ignored.
    let names: Vec<_> = report
        .files
        .iter()
        .map(|f| f.input.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["A_Guide.PDF", "b_manual.pdf", "broken.pdf"]);

    assert_eq!(report.processed(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.exit_code(), 0);
    assert!(matches!(report.files[2].status, FileStatus::Failed(_)));
    assert!(!ws.output().join("broken.json").exists());

    let manual = from_json(&fs::read_to_string(ws.output().join("b_manual.json")).unwrap()).unwrap();
    assert_eq!(manual.title, "Operator Manual");
    assert_eq!(manual.metadata.page_count, 2);
    assert_eq!(manual.metadata.body_font_size, 11.0);
    assert_eq!(manual.metadata.detected_language, "en");
    let chapters: Vec<_> = manual
        .outline
        .iter()
        .filter(|h| h.text.starts_with("Chapter"))
        .map(|h| (h.level, h.page))
        .collect();
    assert_eq!(chapters, vec![(HeadingLevel::H1, 1), (HeadingLevel::H1, 2)]);

    let guide = from_json(&fs::read_to_string(ws.output().join("A_Guide.json")).unwrap()).unwrap();
    assert_eq!(guide.title, "A_Guide");
}

#[test]
fn test_batch_output_is_pretty_utf8() {
    let ws = Workspace::new();
    write_pdf(&ws.input(), "doc.pdf", 1, Some("Quarterly Report"));

    run_batch(&ws.options(), &English).unwrap();
    let json = fs::read_to_string(ws.output().join("doc.json")).unwrap();
    assert!(json.starts_with("{\n  \"title\": \"Quarterly Report\",\n  \"outline\": ["));
    assert!(json.contains("\"font_distribution\": {"));
    assert!(json.contains("\"11.0\": "));

    let ws = Workspace::new();
    write_pdf(&ws.input(), "doc.pdf", 1, None);
    let options = ws.options().with_json_format(JsonFormat::Compact);
    run_batch(&options, &English).unwrap();
    let json = fs::read_to_string(ws.output().join("doc.json")).unwrap();
    assert!(!json.contains('\n'));
}

#[test]
fn test_batch_page_limit_counts_as_failure() {
    let ws = Workspace::new();
    write_pdf(&ws.input(), "long.pdf", 4, None);
    let options = ws
        .options()
        .with_outline_options(OutlineOptions::new().with_max_pages(3));

    let report = run_batch(&options, &English).unwrap();
    assert_eq!(report.processed(), 0);
    assert_eq!(report.exit_code(), 1);
    match &report.files[0].status {
        FileStatus::Failed(reason) => assert!(reason.contains("3-page limit")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_batch_empty_directory_exits_nonzero() {
    let ws = Workspace::new();
    let report = run_batch(&ws.options(), &English).unwrap();
    assert!(report.files.is_empty());
    assert_eq!(report.exit_code(), 1);
    assert!(ws.output().is_dir());
}

#[test]
fn test_batch_rejects_output_outside_root() {
    let ws = Workspace::new();
    let elsewhere = TempDir::new().unwrap();
    let options = BatchOptions::new(ws.input(), elsewhere.path().join("out"))
        .with_root(ws.root.path());

    let err = run_batch(&options, &English).unwrap_err();
    assert!(matches!(err, Error::PathOutsideRoot(_)));
    assert!(!elsewhere.path().join("out").exists());
}

#[test]
fn test_batch_rejects_traversal_in_input() {
    let ws = Workspace::new();
    let sneaky = ws.input().join("..").join("..").join("input");
    let options = BatchOptions::new(sneaky, ws.output()).with_root(ws.root.path());

    assert!(matches!(
        run_batch(&options, &English),
        Err(Error::PathOutsideRoot(_))
    ));
}

#[test]
fn test_batch_invalid_options() {
    let ws = Workspace::new();
    let options = ws
        .options()
        .with_outline_options(OutlineOptions::new().with_level_thresholds(1.0, 2.0, 3.0));
    assert!(matches!(
        run_batch(&options, &English),
        Err(Error::InvalidOption(_))
    ));
}
