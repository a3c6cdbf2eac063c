//! Chapter document assembly
//!
//! Collects the images of a chapter workspace, orders them by the number in
//! their file name, normalises every image to 8-bit RGB and writes one PDF
//! with a page per image. Images that fail to decode are left out; the
//! document is still written from the rest.

use crate::output::run_log::{RunEvent, RunLog};
use crate::source::ChapterNumber;
use crate::AssemblyError;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};

/// File name of the assembled document inside a chapter workspace
pub const DOCUMENT_FILE: &str = "chapter.pdf";

/// Extensions (lowercase) picked up from a workspace
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

const JPEG_QUALITY: u8 = 90;

/// What happened when assembling one chapter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// The written document, if one was written
    pub document: Option<PathBuf>,

    /// Number of pages in the document
    pub page_count: usize,

    /// File names left out because they could not be decoded
    pub excluded: Vec<String>,
}

/// One page ready to be embedded
struct PageImage {
    width: u32,
    height: u32,
    jpeg: Vec<u8>,
}

/// Builds one PDF per chapter workspace
#[derive(Debug, Clone, Copy)]
pub struct DocumentAssembler {
    enabled: bool,
}

impl DocumentAssembler {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Assembles `chapter_dir` into `chapter_dir/chapter.pdf`
    ///
    /// This does blocking file and image work; async callers should run it
    /// on a blocking thread.
    pub fn assemble(&self, chapter_dir: &Path, run_log: &RunLog) -> AssemblyReport {
        let mut report = AssemblyReport::default();

        if !self.enabled {
            tracing::info!("PDF creation is disabled in the config file");
            return report;
        }

        let files = match ordered_images(chapter_dir) {
            Ok(files) => files,
            Err(e) => {
                fail(run_log, chapter_dir, &e.to_string());
                return report;
            }
        };

        let mut pages = Vec::with_capacity(files.len());
        for file in &files {
            let name = file_name(file);
            match load_page(file) {
                Ok(page) => {
                    tracing::debug!("Image {} added to document", name);
                    pages.push(page);
                }
                Err(e) => {
                    tracing::warn!("Error processing image {}: {}", file.display(), e);
                    run_log.record(RunEvent::ImageRejected {
                        file: name.clone(),
                        detail: e.to_string(),
                    });
                    report.excluded.push(name);
                }
            }
        }

        if pages.is_empty() {
            tracing::warn!("No valid images found in {}", chapter_dir.display());
            run_log.record(RunEvent::NoImages {
                dir: chapter_dir.display().to_string(),
            });
            return report;
        }

        let path = chapter_dir.join(DOCUMENT_FILE);
        let page_count = pages.len();
        match write_pdf(pages, &path) {
            Ok(()) => {
                tracing::info!("PDF created for chapter: {}", path.display());
                run_log.record(RunEvent::DocumentCreated {
                    path: path.display().to_string(),
                });
                report.document = Some(path);
                report.page_count = page_count;
            }
            Err(e) => fail(run_log, chapter_dir, &e.to_string()),
        }

        report
    }
}

fn fail(run_log: &RunLog, dir: &Path, detail: &str) {
    tracing::error!("Error creating document in {}: {}", dir.display(), detail);
    run_log.record(RunEvent::DocumentFailed {
        dir: dir.display().to_string(),
        detail: detail.to_string(),
    });
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lists the images of a workspace in document order
///
/// Files are ordered by the first number in their name (`img2` before
/// `img10`); files without a number come last, by name.
pub fn ordered_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()));

        if is_image {
            files.push(path);
        }
    }

    Ok(sort_by_number(files))
}

/// Stable numeric sort of file paths by the first number in the file name
pub fn sort_by_number(mut files: Vec<PathBuf>) -> Vec<PathBuf> {
    // Name order first so ties (and number-less files) come out deterministic
    files.sort();

    let mut keyed: Vec<(Option<ChapterNumber>, PathBuf)> = files
        .into_iter()
        .map(|path| (ChapterNumber::extract(&file_name(&path)), path))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    keyed.into_iter().map(|(_, path)| path).collect()
}

/// Decodes an image, converts it to RGB and re-encodes it as JPEG
fn load_page(path: &Path) -> Result<PageImage, AssemblyError> {
    let decoded = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(&rgb)?;

    Ok(PageImage {
        width,
        height,
        jpeg,
    })
}

/// Writes one page per image, each page sized to its image (1 px = 1 pt)
fn write_pdf(pages: Vec<PageImage>, path: &Path) -> Result<(), AssemblyError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = add_page(&mut doc, pages_id, page)?;
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => Object::Name(b"Pages".to_vec()),
            "Kids" => Object::Array(kids),
            "Count" => Object::Integer(count),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => Object::Name(b"Catalog".to_vec()),
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc.save(path)
        .map_err(|e| AssemblyError::Write(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    page: PageImage,
) -> Result<ObjectId, AssemblyError> {
    let width = i64::from(page.width);
    let height = i64::from(page.height);

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => Object::Name(b"XObject".to_vec()),
            "Subtype" => Object::Name(b"Image".to_vec()),
            "Width" => Object::Integer(width),
            "Height" => Object::Integer(height),
            "ColorSpace" => Object::Name(b"DeviceRGB".to_vec()),
            "BitsPerComponent" => Object::Integer(8),
            "Filter" => Object::Name(b"DCTDecode".to_vec()),
        },
        page.jpeg,
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(height),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| AssemblyError::Encode(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    Ok(doc.add_object(dictionary! {
        "Type" => Object::Name(b"Page".to_vec()),
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(width),
            Object::Integer(height),
        ]),
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => Object::Reference(image_id),
            },
        },
        "Contents" => Object::Reference(content_id),
    }))
}
