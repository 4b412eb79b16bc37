//! End-to-end tests for graphical-abstract.
//!
//! Library-level tests call [`graphical_abstract::convert`]; CLI tests drive
//! the `convert` binary through `std::process::Command`. Fixtures are
//! generated in scratch directories: images with `image`, PDFs with `lopdf`.
//!
//! Tests that need a real PDF renderer (PDFium or pdftoppm) skip themselves
//! when neither is installed.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use graphical_abstract::{
    convert, detect_renderer, ConversionConfig, ConversionMode, ErrorKind, OutputFormat,
    RenderBackend,
};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// The `convert` binary with every `GA_*` override cleared.
fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_convert"));
    for var in [
        "GA_PRESERVE_VECTOR",
        "GA_PDF_ONLY",
        "GA_RENDERER",
        "GA_JSON",
        "GA_VERBOSE",
        "GA_QUIET",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn run(args: &[&str], input: &Path) -> Output {
    cli().args(args).arg(input).output().expect("spawn convert")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

/// Files in `dir` other than `keep`, sorted.
fn outputs(dir: &Path, keep: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p != keep)
        .collect();
    files.sort();
    files
}

fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(w, h, Rgb([200, 40, 40]))
        .save(&path)
        .unwrap();
    path
}

/// A PDF with one page per label; page size in points.
fn write_pdf(dir: &Path, name: &str, width: i64, height: i64, labels: &[&str]) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for label in labels {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 36_i64.into()]),
                Operation::new("Td", vec![72_i64.into(), 360_i64.into()]),
                Operation::new("Tj", vec![Object::string_literal(*label)]),
                Operation::new("ET", vec![]),
                Operation::new("re", vec![50_i64.into(), 50_i64.into(), 200_i64.into(), 100_i64.into()]),
                Operation::new("S", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(height),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => labels.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

fn page_size(pdf: &Path) -> (f32, f32) {
    let doc = Document::load(pdf).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1, "expected a single page");
    let page = doc.get_dictionary(*pages.get(&1).unwrap()).unwrap();
    let mb = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let n = |o: &Object| match o {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r as f32,
        other => panic!("non-numeric media box entry {other:?}"),
    };
    (n(&mb[2]) - n(&mb[0]), n(&mb[3]) - n(&mb[1]))
}

// ── CLI: raster input ────────────────────────────────────────────────────────

#[test]
fn png_400x800_produces_three_centred_artifacts() {
    let dir = TempDir::new().unwrap();
    let input = write_png(dir.path(), "abstract.png", 400, 800);

    let out = run(&[], &input);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let text = stdout(&out);
    assert!(text.contains("TIFF saved: "), "{text}");
    assert!(text.contains("PNG saved: "), "{text}");
    assert!(text.contains("PDF saved: "), "{text}");
    assert!(text.trim_end().ends_with("Conversion completed successfully!"));

    let tiff_at = text.find("TIFF saved").unwrap();
    let png_at = text.find("PNG saved").unwrap();
    let pdf_at = text.find("PDF saved").unwrap();
    assert!(tiff_at < png_at && png_at < pdf_at, "write order: {text}");

    let png = image::open(dir.path().join("abstract_1200px_300dpi.png"))
        .unwrap()
        .to_rgb8();
    assert_eq!(png.dimensions(), (1200, 1200));
    // 300 px white bands either side of a 600 px wide image.
    assert_eq!(*png.get_pixel(150, 600), Rgb([255, 255, 255]));
    assert_eq!(*png.get_pixel(1050, 600), Rgb([255, 255, 255]));
    assert_eq!(*png.get_pixel(600, 600), Rgb([200, 40, 40]));

    let tiff = image::open(dir.path().join("abstract_1200px_300dpi.tiff")).unwrap();
    assert_eq!((tiff.width(), tiff.height()), (1200, 1200));

    let (w, h) = page_size(&dir.path().join("abstract_1200px_300dpi.pdf"));
    assert!((w - 288.0).abs() < 0.01 && (h - 288.0).abs() < 0.01);
}

#[test]
fn pdf_only_skips_tiff_and_png() {
    let dir = TempDir::new().unwrap();
    let input = write_png(dir.path(), "fig.png", 300, 200);

    let out = run(&["--pdf-only"], &input);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        outputs(dir.path(), &input),
        vec![dir.path().join("fig_1200px_300dpi.pdf")]
    );
    assert!(!stdout(&out).contains("TIFF saved"));
}

#[test]
fn rgba_png_flattens_transparency_to_white() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("alpha.png");
    let mut img = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 0]));
    img.put_pixel(32, 32, Rgba([0, 0, 255, 255]));
    img.save(&input).unwrap();

    let out = run(&[], &input);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let png = image::open(dir.path().join("alpha_1200px_300dpi.png"))
        .unwrap()
        .to_rgb8();
    assert_eq!(*png.get_pixel(10, 10), Rgb([255, 255, 255]));
    assert_eq!(*png.get_pixel(600, 600), Rgb([255, 255, 255]));
}

#[test]
fn uppercase_jpeg_extension_is_decoded() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("photo.JPG");
    RgbImage::from_pixel(120, 90, Rgb([10, 120, 10]))
        .save_with_format(&input, image::ImageFormat::Jpeg)
        .unwrap();

    let out = run(&["--pdf-only"], &input);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(dir.path().join("photo_1200px_300dpi.pdf").exists());
}

#[test]
fn json_report_describes_artifacts() {
    let dir = TempDir::new().unwrap();
    let input = write_png(dir.path(), "fig.png", 400, 800);

    let out = run(&["--json"], &input);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["mode"], "raster");
    assert_eq!(report["artifacts"].as_array().unwrap().len(), 3);
    assert_eq!(report["placement"]["width"], 600);
    assert_eq!(report["placement"]["offset_x"], 300);
}

// ── CLI: failures ────────────────────────────────────────────────────────────

#[test]
fn preserve_vector_without_pdf_only_exits_1_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "doc.pdf", 612, 792, &["A"]);

    let out = run(&["--preserve-vector"], &input);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("--pdf-only"), "{}", stderr(&out));
    assert!(stdout(&out).contains("Conversion failed."));
    assert!(outputs(dir.path(), &input).is_empty());
}

#[test]
fn missing_input_exits_1() {
    let dir = TempDir::new().unwrap();
    let out = run(&[], &dir.path().join("nope.png"));
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("not found"), "{}", stderr(&out));
}

#[test]
fn pdf_without_renderer_fails_gracefully() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "doc.pdf", 612, 792, &["A"]);

    let out = run(&["--renderer", "none"], &input);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("no PDF renderer"), "{err}");
    assert!(err.contains("pdftoppm"), "{err}");
    assert!(!err.contains("panicked"), "{err}");
    assert!(outputs(dir.path(), &input).is_empty());
}

#[test]
fn file_named_pdf_that_is_not_a_pdf_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("fake.pdf");
    std::fs::write(&input, b"GIF89a not really").unwrap();

    let out = run(&["--preserve-vector", "--pdf-only"], &input);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("not a valid PDF"), "{}", stderr(&out));
}

// ── CLI: vector PDF ──────────────────────────────────────────────────────────

#[test]
fn letter_pdf_with_preserve_vector_becomes_288pt_square() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "letter.pdf", 612, 792, &["FIRST", "SECOND"]);

    let out = run(&["--preserve-vector", "--pdf-only"], &input);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("PDF saved with vector elements preserved: "));

    let output = dir.path().join("letter_1200px_300dpi.pdf");
    assert_eq!(outputs(dir.path(), &input), vec![output.clone()]);
    let (w, h) = page_size(&output);
    assert!((w - 288.0).abs() < 0.01 && (h - 288.0).abs() < 0.01);

    // Text stays text: the first page's string is still in a content stream,
    // the second page's is gone.
    let doc = Document::load(&output).unwrap();
    let mut found_first = false;
    for object in doc.objects.values() {
        if let Ok(stream) = object.as_stream() {
            let content = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            let text = String::from_utf8_lossy(&content);
            found_first |= text.contains("FIRST");
            assert!(!text.contains("SECOND"));
        }
    }
    assert!(found_first);

    // The page draws the wrapped original through a letter-fit matrix:
    // scale 288/792, centred horizontally, flush vertically.
    let page_id = doc.page_iter().next().unwrap();
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    let cm = content
        .operations
        .iter()
        .find(|op| op.operator == "cm")
        .expect("page content sets a cm matrix");
    let operands: Vec<f32> = cm.operands.iter().map(|o| o.as_float().unwrap()).collect();
    let s = 288.0_f32 / 792.0;
    let expected = [s, 0.0, 0.0, s, 50.727_27, 0.0];
    assert_eq!(operands.len(), 6, "cm operands: {operands:?}");
    for (got, want) in operands.iter().zip(expected) {
        assert!((got - want).abs() < 1e-3, "cm {operands:?}, expected {expected:?}");
    }
}

// ── Library ──────────────────────────────────────────────────────────────────

#[test]
fn library_vector_conversion_reports_mode() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "wide.pdf", 842, 595, &["A4"]);

    let config = ConversionConfig::builder()
        .preserve_vector(true)
        .pdf_only(true)
        .build()
        .unwrap();
    let report = convert(&input, &config).unwrap();
    assert_eq!(report.mode, ConversionMode::VectorPdf);
    assert!(report.artifact(OutputFormat::Pdf).is_some());
    assert!(report.artifact(OutputFormat::Png).is_none());
}

#[test]
fn library_rejects_bad_combination_before_io() {
    let config = ConversionConfig {
        preserve_vector: true,
        pdf_only: false,
        renderer: None,
    };
    let err = convert("/does/not/exist.pdf", &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedCombination);
}

#[test]
fn pdf_is_rasterised_when_a_renderer_is_installed() {
    let Some(renderer) = detect_renderer(RenderBackend::Auto) else {
        println!("SKIP: no PDF renderer installed");
        return;
    };

    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "letter.pdf", 612, 792, &["ONE", "TWO"]);
    let config = ConversionConfig::builder().renderer(renderer).build().unwrap();

    let report = convert(&input, &config).unwrap();
    assert_eq!(report.mode, ConversionMode::RasterizedPdf);
    // Letter at 300 dpi is 2550×3300 px.
    let (w, h) = report.source_size.unwrap();
    assert!((2540..=2560).contains(&w) && (3290..=3310).contains(&h), "{w}x{h}");

    let placement = report.placement.unwrap();
    assert_eq!(placement.height, 1200);

    let png = image::open(report.artifact(OutputFormat::Png).unwrap()).unwrap();
    assert_eq!((png.width(), png.height()), (1200, 1200));
}
